use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Fan-out hub for "announcement set changed" events.
///
/// Events carry no payload: the only contract of the notification channel
/// is "something changed, re-list". A lagged subscriber therefore loses
/// nothing it cannot recover with its next refresh.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<()>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a change event. Having no subscribers is not an error.
    pub fn publish(&self) {
        let _ = self.tx.send(());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let feed = ChangeFeed::new();
        let mut one = feed.subscribe();
        let mut two = feed.subscribe();
        feed.publish();
        assert!(one.recv().await.is_ok());
        assert!(two.recv().await.is_ok());
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        ChangeFeed::new().publish();
    }
}
