//! Flash notifications.
//!
//! Plain form posts answer with a redirect, so their notifications are kept
//! in the session until the next page render picks them up.

use tower_sessions::Session;
use weekly_shop_core::Notification;

use super::session_keys;

/// Append notifications to the session's flash queue.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn push(
    session: &Session,
    notifications: Vec<Notification>,
) -> Result<(), tower_sessions::session::Error> {
    if notifications.is_empty() {
        return Ok(());
    }

    let mut queued: Vec<Notification> = session
        .get(session_keys::FLASH)
        .await?
        .unwrap_or_default();
    queued.extend(notifications);
    session.insert(session_keys::FLASH, queued).await
}

/// Remove and return the session's flash queue.
///
/// A broken session yields no notifications rather than an error page.
pub async fn take(session: &Session) -> Vec<Notification> {
    match session.remove::<Vec<Notification>>(session_keys::FLASH).await {
        Ok(queued) => queued.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read flash notifications: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_round_trip_and_drains() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push(&session, vec![Notification::success("saved")])
            .await
            .unwrap();
        push(&session, vec![Notification::error("oops")]).await.unwrap();

        assert_eq!(
            take(&session).await,
            vec![Notification::success("saved"), Notification::error("oops")]
        );
        assert!(take(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_push_nothing_leaves_session_untouched() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push(&session, Vec::new()).await.unwrap();
        assert!(session.is_empty().await);
    }
}
