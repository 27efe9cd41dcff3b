//! Authenticated user lookups and per-user message listings.
//!
//! Profile reads are open to any valid session; the listings of what a user
//! sent or received are that user's own business and require the requester
//! to be that user.

use crate::auth::Identity;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::messages::{MessageStore, ReceivedMessage, SentMessage};
use crate::users::{User, UserProfile, UserStore};

pub async fn get_user<S: UserStore>(
    ctx: &AppContext<S>,
    _identity: &Identity,
    username: &str,
) -> AppResult<User> {
    ctx.store.get(username).await
}

pub async fn list_users<S: UserStore>(
    ctx: &AppContext<S>,
    _identity: &Identity,
) -> AppResult<Vec<UserProfile>> {
    ctx.store.list().await
}

/// Messages sent by `username`; requester must be that user.
pub async fn sent_messages<S: MessageStore>(
    ctx: &AppContext<S>,
    identity: &Identity,
    username: &str,
) -> AppResult<Vec<SentMessage>> {
    ensure_self(identity, username)?;
    ctx.store.sent_by(username).await
}

/// Messages received by `username`; requester must be that user.
pub async fn received_messages<S: MessageStore>(
    ctx: &AppContext<S>,
    identity: &Identity,
    username: &str,
) -> AppResult<Vec<ReceivedMessage>> {
    ensure_self(identity, username)?;
    ctx.store.received_by(username).await
}

fn ensure_self(identity: &Identity, username: &str) -> AppResult<()> {
    if identity.username == username {
        Ok(())
    } else {
        Err(AppError::forbidden("listings are visible to their owner only"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_listing_is_allowed() {
        let identity = Identity {
            username: "bob".to_string(),
        };
        assert!(ensure_self(&identity, "bob").is_ok());
    }

    #[test]
    fn someone_elses_listing_is_forbidden() {
        let identity = Identity {
            username: "bob".to_string(),
        };
        let err = ensure_self(&identity, "carol").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
