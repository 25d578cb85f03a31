//! Message bus implementation: ordered history, FIFO pull queue, and
//! role/broadcast callback fanout with per-callback failure isolation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use interview_core::{AgentMessage, AgentRole};

use crate::types::{BusError, CallbackError, HistoryFilter, SubscriberCallback};

struct Inner {
    subscribers: Mutex<HashMap<AgentRole, Vec<SubscriberCallback>>>,
    broadcast: Mutex<Vec<SubscriberCallback>>,
    /// Append order here is the global message order. The queue sender is
    /// fed while the history lock is held so the pull queue sees the same
    /// order.
    history: Mutex<Vec<AgentMessage>>,
    queue_tx: mpsc::UnboundedSender<AgentMessage>,
    queue_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<AgentMessage>>,
    published: AtomicUsize,
}

/// Pub/sub message bus with a durable, queryable history.
///
/// Cloning is cheap and shares all state. Publish order defines the history
/// and pull-queue order; delivery order across different push subscribers is
/// unspecified. A failing or panicking callback never affects sibling
/// subscribers or the publisher.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<Inner>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                subscribers: Mutex::new(HashMap::new()),
                broadcast: Mutex::new(Vec::new()),
                history: Mutex::new(Vec::new()),
                queue_tx,
                queue_rx: tokio::sync::Mutex::new(queue_rx),
                published: AtomicUsize::new(0),
            }),
        }
    }

    /// Register a callback for every message addressed to `role`.
    /// Broadcast messages (no receiver) are also delivered to it.
    pub fn subscribe<F, Fut>(&self, role: AgentRole, callback: F)
    where
        F: Fn(AgentMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        let callback: SubscriberCallback = Arc::new(move |msg| Box::pin(callback(msg)));
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(role)
            .or_default()
            .push(callback);
    }

    /// Register a callback for every published message regardless of
    /// receiver.
    pub fn subscribe_broadcast<F, Fut>(&self, callback: F)
    where
        F: Fn(AgentMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        let callback: SubscriberCallback = Arc::new(move |msg| Box::pin(callback(msg)));
        self.inner
            .broadcast
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(callback);
    }

    /// Publish a message: append it to the history, enqueue it for pull
    /// consumers, then fan out to subscribers.
    ///
    /// Returns the number of callbacks the message was dispatched to.
    /// Dispatch runs each callback on its own task; errors and panics are
    /// logged and contained.
    pub fn publish(&self, message: AgentMessage) -> usize {
        self.inner.published.fetch_add(1, Ordering::Relaxed);

        {
            let mut history = self
                .inner
                .history
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            history.push(message.clone());
            // The receiver lives inside Inner, so the send cannot fail while
            // the bus exists.
            let _ = self.inner.queue_tx.send(message.clone());
        }

        let mut callbacks: Vec<SubscriberCallback> = self
            .inner
            .broadcast
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        {
            let subscribers = self
                .inner
                .subscribers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match message.receiver {
                Some(receiver) => {
                    if let Some(role_callbacks) = subscribers.get(&receiver) {
                        callbacks.extend(role_callbacks.iter().cloned());
                    }
                }
                None => {
                    for role_callbacks in subscribers.values() {
                        callbacks.extend(role_callbacks.iter().cloned());
                    }
                }
            }
        }

        let dispatched = callbacks.len();
        for callback in callbacks {
            Self::dispatch(callback, message.clone());
        }
        dispatched
    }

    fn dispatch(callback: SubscriberCallback, message: AgentMessage) {
        let message_id = message.id;
        let task = tokio::spawn(callback(message));
        tokio::spawn(async move {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(%message_id, %error, "Subscriber callback failed");
                }
                Err(join_error) => {
                    tracing::warn!(%message_id, %join_error, "Subscriber callback panicked");
                }
            }
        });
    }

    /// Pull the next message from the FIFO queue, suspending until one is
    /// available or `timeout` elapses.
    pub async fn get_message(&self, timeout: Option<Duration>) -> Result<AgentMessage, BusError> {
        let mut queue = self.inner.queue_rx.lock().await;
        match timeout {
            Some(duration) => match tokio::time::timeout(duration, queue.recv()).await {
                Ok(Some(message)) => Ok(message),
                Ok(None) => Err(BusError::Closed),
                Err(_) => Err(BusError::Timeout),
            },
            None => queue.recv().await.ok_or(BusError::Closed),
        }
    }

    /// Query the history in publish order, keeping only messages matching
    /// `filter` and truncating to its `limit` if set.
    pub fn get_history(&self, filter: &HistoryFilter) -> Vec<AgentMessage> {
        let history = self
            .inner
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let matched: Vec<AgentMessage> = history
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();

        match filter.limit {
            Some(limit) if matched.len() > limit => matched[matched.len() - limit..].to_vec(),
            _ => matched,
        }
    }

    /// Discard the history. Pending pull-queue items and registered
    /// subscribers are unaffected.
    pub fn clear_history(&self) {
        self.inner
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Total number of messages published on this bus.
    pub fn published_count(&self) -> usize {
        self.inner.published.load(Ordering::Relaxed)
    }

    /// Number of role-specific subscribers currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Number of broadcast subscribers currently registered.
    pub fn broadcast_count(&self) -> usize {
        self.inner
            .broadcast
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("broadcast_count", &self.broadcast_count())
            .field("published_count", &self.published_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::MessageKind;

    fn message(sender: AgentRole) -> AgentMessage {
        AgentMessage::new(sender, MessageKind::Evaluation, "test")
    }

    #[tokio::test]
    async fn test_publish_appends_history_in_order() {
        let bus = MessageBus::new();

        for confidence in [0.9, 0.5, 0.2] {
            bus.publish(message(AgentRole::Recruiter).with_confidence(confidence));
        }

        let history = bus.get_history(&HistoryFilter::new());
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].confidence, 0.9);
        assert_eq!(history[2].confidence, 0.2);
        assert_eq!(bus.published_count(), 3);
    }

    #[tokio::test]
    async fn test_history_limit_keeps_suffix() {
        let bus = MessageBus::new();
        bus.publish(message(AgentRole::Recruiter).with_confidence(0.9));
        bus.publish(message(AgentRole::DsaInterviewer).with_confidence(0.5));
        bus.publish(message(AgentRole::Critic).with_confidence(0.2));

        let last_two = bus.get_history(&HistoryFilter::new().limit(2));
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].confidence, 0.5);
        assert_eq!(last_two[1].confidence, 0.2);

        // limit larger than the history returns everything
        let all = bus.get_history(&HistoryFilter::new().limit(10));
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_history_filters_compose() {
        let bus = MessageBus::new();
        bus.publish(message(AgentRole::Recruiter));
        bus.publish(AgentMessage::new(
            AgentRole::DsaInterviewer,
            MessageKind::Question,
            "two sum",
        ));
        bus.publish(message(AgentRole::DsaInterviewer));

        let dsa_evals = bus.get_history(
            &HistoryFilter::new()
                .sender(AgentRole::DsaInterviewer)
                .kind(MessageKind::Evaluation),
        );
        assert_eq!(dsa_evals.len(), 1);
        assert_eq!(dsa_evals[0].kind, MessageKind::Evaluation);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let bus = MessageBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let tx_broadcast = tx.clone();
        bus.subscribe_broadcast(move |msg| {
            let tx = tx_broadcast.clone();
            async move {
                tx.send(("broadcast", msg.id)).unwrap();
                Ok(())
            }
        });

        let tx_critic = tx.clone();
        bus.subscribe(AgentRole::Critic, move |msg| {
            let tx = tx_critic.clone();
            async move {
                tx.send(("critic", msg.id)).unwrap();
                Ok(())
            }
        });

        let dispatched = bus.publish(message(AgentRole::Recruiter));
        assert_eq!(dispatched, 2);

        let mut seen = vec![rx.recv().await.unwrap().0, rx.recv().await.unwrap().0];
        seen.sort();
        assert_eq!(seen, vec!["broadcast", "critic"]);
    }

    #[tokio::test]
    async fn test_targeted_message_skips_other_roles() {
        let bus = MessageBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let tx_critic = tx.clone();
        bus.subscribe(AgentRole::Critic, move |msg| {
            let tx = tx_critic.clone();
            async move {
                tx.send(("critic", msg.id)).unwrap();
                Ok(())
            }
        });

        let tx_recruiter = tx.clone();
        bus.subscribe(AgentRole::Recruiter, move |msg| {
            let tx = tx_recruiter.clone();
            async move {
                tx.send(("recruiter", msg.id)).unwrap();
                Ok(())
            }
        });

        let dispatched =
            bus.publish(message(AgentRole::DsaInterviewer).with_receiver(AgentRole::Critic));
        assert_eq!(dispatched, 1);

        let (name, _) = rx.recv().await.unwrap();
        assert_eq!(name, "critic");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failing_subscriber_does_not_block_siblings() {
        let bus = MessageBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        bus.subscribe_broadcast(|_msg| async move {
            Err::<(), CallbackError>("subscriber exploded".into())
        });
        bus.subscribe_broadcast(|_msg| async move {
            panic!("subscriber panicked");
        });

        let tx_ok = tx.clone();
        bus.subscribe_broadcast(move |msg| {
            let tx = tx_ok.clone();
            async move {
                tx.send(msg.id).unwrap();
                Ok(())
            }
        });

        let published = message(AgentRole::Recruiter);
        let expected_id = published.id;
        let dispatched = bus.publish(published);
        assert_eq!(dispatched, 3);

        // The healthy sibling still gets its delivery.
        let received = rx.recv().await.unwrap();
        assert_eq!(received, expected_id);
    }

    #[tokio::test]
    async fn test_get_message_returns_fifo_order() {
        let bus = MessageBus::new();
        bus.publish(message(AgentRole::Recruiter).with_confidence(0.1));
        bus.publish(message(AgentRole::Recruiter).with_confidence(0.2));

        let first = bus.get_message(None).await.unwrap();
        let second = bus.get_message(None).await.unwrap();
        assert_eq!(first.confidence, 0.1);
        assert_eq!(second.confidence, 0.2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_message_times_out() {
        let bus = MessageBus::new();
        let result = bus.get_message(Some(Duration::from_millis(50))).await;
        assert_eq!(result.unwrap_err(), BusError::Timeout);
    }

    #[tokio::test]
    async fn test_clear_history_leaves_queue_intact() {
        let bus = MessageBus::new();
        bus.publish(message(AgentRole::Recruiter));
        bus.clear_history();

        assert!(bus.get_history(&HistoryFilter::new()).is_empty());
        // The pull queue still has the message.
        let pulled = bus.get_message(Some(Duration::from_millis(50))).await;
        assert!(pulled.is_ok());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let bus = MessageBus::new();
        let clone = bus.clone();

        clone.publish(message(AgentRole::Recruiter));
        assert_eq!(bus.get_history(&HistoryFilter::new()).len(), 1);
        assert_eq!(bus.published_count(), 1);
    }
}
