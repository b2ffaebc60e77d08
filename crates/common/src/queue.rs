//! Bounded notification queue between the fetch cycle and the publisher.
//!
//! A single producer pushes formatted notifications in publication order; a
//! single consumer pops them with a bounded wait. A full queue stalls the
//! producer instead of dropping notifications.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::RelayError;
use crate::types::Notification;

/// Outcome of a bounded-wait pop.
#[derive(Debug, PartialEq, Eq)]
pub enum Popped {
    Item(Notification),
    /// Nothing arrived within the timeout.
    Empty,
    /// The producer is gone and the buffer is drained.
    Closed,
}

/// Largest capacity the underlying channel accepts.
pub const MAX_QUEUE_CAPACITY: usize = usize::MAX >> 3;

/// Create a queue holding at most `capacity` notifications.
///
/// Panics if `capacity` is zero or above [`MAX_QUEUE_CAPACITY`].
pub fn notification_queue(capacity: usize) -> (NotificationSender, NotificationReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (NotificationSender { tx }, NotificationReceiver { rx })
}

/// Producer half, owned by the fetch cycle.
pub struct NotificationSender {
    tx: mpsc::Sender<Notification>,
}

impl NotificationSender {
    /// Enqueue a notification, waiting while the queue is full.
    ///
    /// Fails only when the receiver has been dropped.
    pub async fn push(&self, notification: Notification) -> Result<(), RelayError> {
        self.tx
            .send(notification)
            .await
            .map_err(|_| RelayError::QueueClosed)
    }

    /// Number of notifications currently buffered.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Consumer half, owned by the publisher worker.
pub struct NotificationReceiver {
    rx: mpsc::Receiver<Notification>,
}

impl NotificationReceiver {
    /// Dequeue the oldest notification, waiting at most `timeout`.
    pub async fn pop(&mut self, timeout: Duration) -> Popped {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(notification)) => Popped::Item(notification),
            Ok(None) => Popped::Closed,
            Err(_) => Popped::Empty,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    const SHORT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_fifo_order() {
        let (tx, mut rx) = notification_queue(4);
        for text in ["a", "b", "c"] {
            tx.push(Notification::new(text)).await.unwrap();
        }
        assert_eq!(tx.len(), 3);
        assert_eq!(rx.pop(SHORT).await, Popped::Item(Notification::new("a")));
        assert_eq!(rx.pop(SHORT).await, Popped::Item(Notification::new("b")));
        assert_eq!(rx.pop(SHORT).await, Popped::Item(Notification::new("c")));
    }

    #[tokio::test]
    async fn test_pop_on_empty_returns_after_timeout() {
        let (_tx, mut rx) = notification_queue(1);
        let started = Instant::now();
        assert_eq!(rx.pop(SHORT).await, Popped::Empty);
        let elapsed = started.elapsed();
        assert!(elapsed >= SHORT);
        assert!(elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_pop_after_sender_dropped_reports_closed() {
        let (tx, mut rx) = notification_queue(2);
        tx.push(Notification::new("last")).await.unwrap();
        drop(tx);
        assert_eq!(rx.pop(SHORT).await, Popped::Item(Notification::new("last")));
        assert_eq!(rx.pop(SHORT).await, Popped::Closed);
    }

    #[tokio::test]
    async fn test_push_on_full_queue_waits_for_pop() {
        let (tx, mut rx) = notification_queue(1);
        tx.push(Notification::new("first")).await.unwrap();

        // Full: the second push cannot complete yet.
        let blocked = tokio::time::timeout(SHORT, tx.push(Notification::new("second"))).await;
        assert!(blocked.is_err());
        assert_eq!(tx.len(), 1);

        let pusher = tokio::spawn(async move {
            tx.push(Notification::new("second")).await.unwrap();
            tx
        });
        tokio::time::sleep(SHORT).await;
        assert!(!pusher.is_finished());

        assert_eq!(rx.pop(SHORT).await, Popped::Item(Notification::new("first")));
        let tx = pusher.await.unwrap();
        assert_eq!(tx.len(), 1);
        assert_eq!(rx.pop(SHORT).await, Popped::Item(Notification::new("second")));
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped_fails() {
        let (tx, rx) = notification_queue(1);
        drop(rx);
        let err = tx.push(Notification::new("lost")).await.unwrap_err();
        assert!(matches!(err, RelayError::QueueClosed));
    }
}
