use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    FavoriteChanged { node: String },
}

impl BusEvent {
    pub fn node(&self) -> &str {
        match self {
            BusEvent::FavoriteChanged { node } => node,
        }
    }
}

/// In-process broadcast bus shared by every screen of the host
#[derive(Debug, Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<BusEvent>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publishing with nobody listening is not an error.
    pub fn publish(&self, event: BusEvent) {
        tracing::debug!(?event, "bus publish");
        self.tx.send(event).ok();
    }

    /// Deliver the next event about `node` to `on_event`, then stop.
    ///
    /// The receiver is registered before this returns, so an event published
    /// right after the call is not missed.
    pub fn forward_once<F>(&self, node: String, on_event: F) -> Subscription
    where
        F: FnOnce(BusEvent) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(event) if event.node() == node => {
                            on_event(event);
                            break;
                        }
                        Ok(_) | Err(RecvError::Lagged(_)) => {}
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        });

        Subscription { cancel, task }
    }
}

/// Handle to a live bus subscription. Cancelled on drop.
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn changed(node: &str) -> BusEvent {
        BusEvent::FavoriteChanged {
            node: node.to_string(),
        }
    }

    #[tokio::test]
    async fn forward_once_delivers_matching_event() {
        let bus = NotificationBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = bus.forward_once("python".to_string(), move |event| {
            tx.send(event).ok();
        });

        bus.publish(changed("rust"));
        bus.publish(changed("python"));

        assert_eq!(rx.recv().await, Some(changed("python")));
        // The sender was moved into the finished task and dropped with it.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn cancelled_subscription_delivers_nothing() {
        let bus = NotificationBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = bus.forward_once("python".to_string(), move |event| {
            tx.send(event).ok();
        });

        sub.cancel();
        bus.publish(changed("python"));

        let got = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(matches!(got, Ok(None)));
    }

    #[tokio::test]
    async fn publish_without_listeners_is_fine() {
        let bus = NotificationBus::new();
        bus.publish(changed("python"));
    }
}
