//! Process-local message queue

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::domain::messaging::{Delivery, MessageQueue};
use crate::domain::DomainError;

const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
struct StoredMessage {
    body: Vec<u8>,
    redelivered: bool,
}

#[derive(Debug, Default)]
struct NamedQueue {
    messages: VecDeque<StoredMessage>,
    notify: Arc<Notify>,
}

/// Delivery counters of an [`InMemoryQueue`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Delivered but not yet acked or nacked
    pub in_flight: usize,
    pub acked: usize,
    pub requeued: usize,
    pub dropped: usize,
}

#[derive(Debug, Default)]
struct QueueState {
    queues: HashMap<String, NamedQueue>,
    /// tag -> (queue name, message)
    in_flight: HashMap<String, (String, StoredMessage)>,
    next_tag: u64,
    acked: usize,
    requeued: usize,
    dropped: usize,
    closed: bool,
}

/// In-memory queue for development and tests
///
/// Same delivery contract as a broker: a received message is held in flight
/// until it is acked or nacked, and a requeued message goes back to the head
/// of its queue.
#[derive(Debug)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
    poll_timeout: Duration,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::with_poll_timeout(DEFAULT_POLL_TIMEOUT)
    }

    /// How long `receive` waits on an empty queue before returning `None`
    pub fn with_poll_timeout(poll_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            poll_timeout,
        }
    }

    /// Appends a message, declaring the queue if needed
    pub async fn publish(&self, queue: &str, body: impl Into<Vec<u8>>) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;

        if state.closed {
            return Err(DomainError::queue_unavailable("Queue connection is closed"));
        }

        let named = state.queues.entry(queue.to_string()).or_default();
        named.messages.push_back(StoredMessage {
            body: body.into(),
            redelivered: false,
        });
        named.notify.notify_one();

        Ok(())
    }

    /// Messages waiting to be delivered
    pub async fn pending(&self, queue: &str) -> usize {
        let state = self.state.lock().await;
        state.queues.get(queue).map_or(0, |q| q.messages.len())
    }

    /// Snapshot of delivery outcomes so far
    pub async fn stats(&self) -> QueueStats {
        let state = self.state.lock().await;

        QueueStats {
            in_flight: state.in_flight.len(),
            acked: state.acked,
            requeued: state.requeued,
            dropped: state.dropped,
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    async fn take_in_flight(&self, delivery: &Delivery) -> Result<(String, StoredMessage), DomainError> {
        let mut state = self.state.lock().await;

        state.in_flight.remove(&delivery.tag).ok_or_else(|| {
            DomainError::internal(format!("Unknown delivery tag '{}'", delivery.tag))
        })
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn declare(&self, queue: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;

        if state.closed {
            return Err(DomainError::queue_unavailable("Queue connection is closed"));
        }

        state.queues.entry(queue.to_string()).or_default();
        Ok(())
    }

    async fn receive(&self, queue: &str) -> Result<Option<Delivery>, DomainError> {
        loop {
            let notify = {
                let mut state = self.state.lock().await;

                if state.closed {
                    return Err(DomainError::queue_unavailable("Queue connection is closed"));
                }

                let named = state.queues.get_mut(queue).ok_or_else(|| {
                    DomainError::queue_unavailable(format!("Queue '{}' is not declared", queue))
                })?;

                match named.messages.pop_front() {
                    Some(message) => {
                        state.next_tag += 1;
                        let tag = state.next_tag.to_string();

                        let mut delivery = Delivery::new(tag.clone(), message.body.clone());
                        if message.redelivered {
                            delivery = delivery.redelivered();
                        }

                        state.in_flight.insert(tag, (queue.to_string(), message));
                        return Ok(Some(delivery));
                    }
                    None => named.notify.clone(),
                }
            };

            if tokio::time::timeout(self.poll_timeout, notify.notified())
                .await
                .is_err()
            {
                return Ok(None);
            }
        }
    }

    async fn ack(&self, _queue: &str, delivery: &Delivery) -> Result<(), DomainError> {
        self.take_in_flight(delivery).await?;
        self.state.lock().await.acked += 1;
        Ok(())
    }

    async fn nack(
        &self,
        _queue: &str,
        delivery: &Delivery,
        requeue: bool,
    ) -> Result<(), DomainError> {
        let (queue, mut message) = self.take_in_flight(delivery).await?;
        let mut state = self.state.lock().await;

        if requeue {
            message.redelivered = true;
            let named = state.queues.entry(queue).or_default();
            named.messages.push_front(message);
            named.notify.notify_one();
            state.requeued += 1;
        } else {
            state.dropped += 1;
        }

        Ok(())
    }

    async fn close(&self) -> Result<(), DomainError> {
        self.state.lock().await.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUEUE: &str = "user_events";

    #[tokio::test]
    async fn test_receive_in_order_and_ack() {
        let queue = InMemoryQueue::new();
        queue.declare(QUEUE).await.unwrap();
        queue.publish(QUEUE, "first").await.unwrap();
        queue.publish(QUEUE, "second").await.unwrap();

        let first = queue.receive(QUEUE).await.unwrap().unwrap();
        assert_eq!(first.body, b"first");
        assert!(!first.redelivered);
        assert_eq!(queue.stats().await.in_flight, 1);

        queue.ack(QUEUE, &first).await.unwrap();
        let stats = queue.stats().await;
        assert_eq!(stats.acked, 1);
        assert_eq!(stats.in_flight, 0);

        let second = queue.receive(QUEUE).await.unwrap().unwrap();
        assert_eq!(second.body, b"second");
    }

    #[tokio::test]
    async fn test_requeue_goes_to_head() {
        let queue = InMemoryQueue::new();
        queue.publish(QUEUE, "first").await.unwrap();
        queue.publish(QUEUE, "second").await.unwrap();

        let first = queue.receive(QUEUE).await.unwrap().unwrap();
        queue.nack(QUEUE, &first, true).await.unwrap();

        let again = queue.receive(QUEUE).await.unwrap().unwrap();
        assert_eq!(again.body, b"first");
        assert!(again.redelivered);
        assert_eq!(queue.stats().await.requeued, 1);
    }

    #[tokio::test]
    async fn test_nack_without_requeue_drops() {
        let queue = InMemoryQueue::new();
        queue.publish(QUEUE, "poison").await.unwrap();

        let delivery = queue.receive(QUEUE).await.unwrap().unwrap();
        queue.nack(QUEUE, &delivery, false).await.unwrap();

        assert_eq!(queue.stats().await.dropped, 1);
        assert_eq!(queue.pending(QUEUE).await, 0);
    }

    #[tokio::test]
    async fn test_receive_times_out_when_empty() {
        let queue = InMemoryQueue::with_poll_timeout(Duration::from_millis(10));
        queue.declare(QUEUE).await.unwrap();

        assert!(queue.receive(QUEUE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_receive_wakes_on_publish() {
        let queue = Arc::new(InMemoryQueue::with_poll_timeout(Duration::from_secs(5)));
        queue.declare(QUEUE).await.unwrap();

        let receiver = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.receive(QUEUE).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.publish(QUEUE, "late").await.unwrap();

        let delivery = receiver.await.unwrap().unwrap().unwrap();
        assert_eq!(delivery.body, b"late");
    }

    #[tokio::test]
    async fn test_unknown_tag_and_closed_queue() {
        let queue = InMemoryQueue::new();
        queue.declare(QUEUE).await.unwrap();

        let stray = Delivery::new("999", "x");
        assert!(matches!(
            queue.ack(QUEUE, &stray).await,
            Err(DomainError::Internal { .. })
        ));

        queue.close().await.unwrap();
        assert!(matches!(
            queue.receive(QUEUE).await,
            Err(DomainError::QueueUnavailable { .. })
        ));
        assert!(queue.publish(QUEUE, "x").await.is_err());
    }

    #[tokio::test]
    async fn test_receive_undeclared_queue() {
        let queue = InMemoryQueue::new();
        assert!(matches!(
            queue.receive("missing").await,
            Err(DomainError::QueueUnavailable { .. })
        ));
    }
}
