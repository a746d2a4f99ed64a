//! Mapping between forum member ids and host account names.

/// Prefix of every localpart minted for a forum member. Purely numeric
/// localparts belong to the host's own guest accounts.
pub const LOCALPART_PREFIX: &str = "xf-";

/// Usernames scoped to this provider look like `@xf-{user_id}:{server}`.
const USERNAME_PREFIX: &str = "@xf-";
const SERVER_SEPARATOR: char = ':';

/// Localpart for a forum member. Same id, same localpart; distinct ids never
/// collide.
pub fn localpart_for(forum_user_id: u64) -> String {
    format!("{LOCALPART_PREFIX}{forum_user_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameClaim<'a> {
    /// Not scoped to this provider; another provider may handle it.
    Foreign,
    /// Scoped to this provider but the embedded id is not an integer.
    Malformed(&'a str),
    Forum(u64),
}

pub fn claim_username(username: &str) -> UsernameClaim<'_> {
    let Some(rest) = username.strip_prefix(USERNAME_PREFIX) else {
        return UsernameClaim::Foreign;
    };
    let Some((uid, _server)) = rest.split_once(SERVER_SEPARATOR) else {
        return UsernameClaim::Foreign;
    };

    if uid.is_empty() || !uid.bytes().all(|b| b.is_ascii_digit()) {
        return UsernameClaim::Malformed(uid);
    }

    match uid.parse::<u64>() {
        Ok(uid) => UsernameClaim::Forum(uid),
        Err(_) => UsernameClaim::Malformed(uid),
    }
}
