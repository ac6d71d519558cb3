use teloxide::types::{ChatId, UserId};

/// Private chat with the user, None if the id can't be a user's
pub fn uid_to_cid(uid: UserId) -> Option<ChatId> {
    let cid = ChatId(uid.0 as i64);
    if cid.is_user() {
        Some(cid)
    } else {
        None
    }
}
