use std::{sync::Arc, time::Duration};

use flume::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{event::events::Event, http::NotificationApi};

/// Polls the unread count right away and then on a fixed interval.
/// Failures are logged and the next tick simply tries again.
pub fn spawn_unread_poller(
    api: Arc<dyn NotificationApi>,
    interval: Duration,
    tx: Sender<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match api.unread_count().await {
                Ok(count) => {
                    debug!(count, "unread_count_polled");
                    if tx.send_async(Event::UnreadCount(count)).await.is_err() {
                        break;
                    }
                }
                Err(e) if e.is_unauthorized() => {
                    warn!(error = %e, "unread_poll_unauthorized");
                    let _ = tx.send_async(Event::SessionExpired).await;
                    break;
                }
                Err(e) => warn!(error = %e, "unread_poll_failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::http::ApiError;

    struct Counting {
        calls: AtomicU32,
        fail_first: bool,
    }

    #[async_trait]
    impl NotificationApi for Counting {
        async fn unread_count(&self) -> Result<u32, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(ApiError::Invalid("flaky".into()));
            }
            Ok(n + 1)
        }
    }

    async fn next_count(rx: &flume::Receiver<Event>) -> u32 {
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv_async())
            .await
            .expect("poller went quiet")
            .unwrap();
        match event {
            Event::UnreadCount(n) => n,
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn polls_immediately_then_on_interval() {
        let (tx, rx) = flume::unbounded();
        let api = Arc::new(Counting {
            calls: AtomicU32::new(0),
            fail_first: false,
        });
        let handle = spawn_unread_poller(api, Duration::from_millis(10), tx);

        assert_eq!(next_count(&rx).await, 1);
        assert_eq!(next_count(&rx).await, 2);
        handle.abort();
    }

    #[tokio::test]
    async fn keeps_polling_after_failure() {
        let (tx, rx) = flume::unbounded();
        let api = Arc::new(Counting {
            calls: AtomicU32::new(0),
            fail_first: true,
        });
        let handle = spawn_unread_poller(api, Duration::from_millis(10), tx);

        assert_eq!(next_count(&rx).await, 2);
        handle.abort();
    }

    #[tokio::test]
    async fn stops_when_session_is_gone() {
        struct Expired;

        #[async_trait]
        impl NotificationApi for Expired {
            async fn unread_count(&self) -> Result<u32, ApiError> {
                Err(ApiError::Unauthorized)
            }
        }

        let (tx, rx) = flume::unbounded();
        let handle = spawn_unread_poller(Arc::new(Expired), Duration::from_millis(10), tx);

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv_async())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, Event::SessionExpired));
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
