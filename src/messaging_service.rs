//! Guarded message operations.
//!
//! Every function here takes an [`Identity`] produced by
//! [`crate::auth::authenticate_request`]; requests without a valid session
//! never reach this module. Authorization is decided against the message's
//! own participants before any state changes:
//!
//! | operation | allowed actor        |
//! |-----------|----------------------|
//! | view      | sender or recipient  |
//! | mark read | recipient only       |
//! | create    | any authenticated user, always as the sender |

use serde::Deserialize;

use crate::auth::Identity;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::messages::{Message, MessageDetail, MessageStore, ReadReceipt};

#[derive(Debug, Clone, Deserialize)]
pub struct PostMessage {
    pub to_username: String,
    pub body: String,
}

/// Fetch a message with both participants resolved.
/// Only the sender or the recipient may see it.
pub async fn get_message<S: MessageStore>(
    ctx: &AppContext<S>,
    identity: &Identity,
    id: i64,
) -> AppResult<MessageDetail> {
    let message = ctx.store.get(id).await?;
    ensure_participant(identity, &message)?;
    Ok(message)
}

/// Create a message from the requester to `to_username`.
/// The sender is always the authenticated identity, never caller input.
pub async fn post_message<S: MessageStore>(
    ctx: &AppContext<S>,
    identity: &Identity,
    req: &PostMessage,
) -> AppResult<Message> {
    ctx.store
        .create(&identity.username, &req.to_username, &req.body)
        .await
}

/// Mark a message read. Recipient only; the store update itself is
/// unconditional once authorization has passed.
pub async fn mark_read<S: MessageStore>(
    ctx: &AppContext<S>,
    identity: &Identity,
    id: i64,
) -> AppResult<ReadReceipt> {
    let message = ctx.store.get(id).await?;
    ensure_recipient(identity, &message)?;
    ctx.store.mark_read(id).await
}

fn ensure_participant(identity: &Identity, message: &MessageDetail) -> AppResult<()> {
    if identity.username == message.from_user.username
        || identity.username == message.to_user.username
    {
        Ok(())
    } else {
        Err(AppError::forbidden("not a participant in this message"))
    }
}

fn ensure_recipient(identity: &Identity, message: &MessageDetail) -> AppResult<()> {
    if identity.username == message.to_user.username {
        Ok(())
    } else {
        Err(AppError::forbidden("only the recipient may mark a message read"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::UserProfile;
    use chrono::Utc;

    fn profile(username: &str) -> UserProfile {
        UserProfile {
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: "555-0000".to_string(),
        }
    }

    fn message(from: &str, to: &str) -> MessageDetail {
        MessageDetail {
            id: 1,
            body: "hi".to_string(),
            sent_at: Utc::now(),
            read_at: None,
            from_user: profile(from),
            to_user: profile(to),
        }
    }

    fn identity(username: &str) -> Identity {
        Identity {
            username: username.to_string(),
        }
    }

    #[test]
    fn sender_and_recipient_may_view() {
        let m = message("bob", "carol");
        assert!(ensure_participant(&identity("bob"), &m).is_ok());
        assert!(ensure_participant(&identity("carol"), &m).is_ok());
    }

    #[test]
    fn third_party_may_not_view() {
        let m = message("bob", "carol");
        let err = ensure_participant(&identity("eve"), &m).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn only_recipient_may_mark_read() {
        let m = message("bob", "carol");
        assert!(ensure_recipient(&identity("carol"), &m).is_ok());
        assert!(matches!(
            ensure_recipient(&identity("bob"), &m),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_recipient(&identity("eve"), &m),
            Err(AppError::Forbidden(_))
        ));
    }
}
