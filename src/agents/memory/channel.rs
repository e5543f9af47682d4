//! Pub/sub message channel for collaborative workflows
//!
//! Agents running in parallel exchange direct and broadcast messages through
//! a shared channel. Every accepted message lands in an append-only history;
//! delivery into per-subscriber inboxes is non-blocking, so a slow consumer
//! can never stall a sender.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::sync::{mpsc, Mutex, RwLock};

pub use tokio::sync::mpsc::error::TryRecvError;

/// Inbox capacity used when the caller passes 0 or less
pub const DEFAULT_BUFFER_SIZE: usize = 100;

/// Errors raised by the message channel
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Send was attempted on a closed channel
    #[error("message channel is closed")]
    Closed,
}

/// One message delivered on the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Agent id of the sender
    pub from: String,
    /// Target agent id, or `*` for broadcast
    pub to: String,
    /// Message content
    pub content: String,
    /// Send time, Unix epoch milliseconds
    pub timestamp: u64,
}

/// A subscriber's bounded FIFO inbox.
///
/// Cloneable so that repeated [`MessageChannel::subscribe`] calls for the
/// same agent observe the same underlying queue. Intended for a single
/// consumer at a time.
#[derive(Clone)]
pub struct Inbox {
    rx: Arc<Mutex<mpsc::Receiver<ChannelMessage>>>,
}

impl Inbox {
    /// Receives the next message, waiting if the inbox is empty.
    ///
    /// Returns `None` once the inbox has been closed and drained; the run is
    /// ending and the receiver should exit its loop.
    pub async fn recv(&self) -> Option<ChannelMessage> {
        self.rx.lock().await.recv().await
    }

    /// Receives a message if one is immediately available.
    pub async fn try_recv(&self) -> Result<ChannelMessage, TryRecvError> {
        self.rx.lock().await.try_recv()
    }
}

struct Subscriber {
    tx: mpsc::Sender<ChannelMessage>,
    inbox: Inbox,
}

struct ChannelState {
    /// Append-only log of every accepted message
    history: Vec<ChannelMessage>,
    subscribers: HashMap<String, Subscriber>,
    closed: bool,
}

/// Multi-producer / multi-consumer pub/sub bus with bounded inboxes.
///
/// Created once per workflow run and closed by the executor when the run
/// ends. All state is guarded by one lock; history queries take the shared
/// side.
pub struct MessageChannel {
    state: RwLock<ChannelState>,
    buffer_size: usize,
}

impl MessageChannel {
    /// Creates an open channel. `buffer_size <= 0` falls back to
    /// [`DEFAULT_BUFFER_SIZE`].
    pub fn new(buffer_size: i64) -> Self {
        let buffer_size = if buffer_size <= 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            buffer_size as usize
        };

        Self {
            state: RwLock::new(ChannelState {
                history: Vec::new(),
                subscribers: HashMap::new(),
                closed: false,
            }),
            buffer_size,
        }
    }

    /// Sends a message from one agent to another, or to all subscribers when
    /// `to` is `*`.
    ///
    /// The message is appended to history first, then delivered with a
    /// non-blocking enqueue; a full inbox drops the delivery silently while
    /// history retains the message. The sender never receives its own
    /// broadcast.
    pub async fn send(&self, from: &str, to: &str, content: &str) -> Result<(), ChannelError> {
        let mut state = self.state.write().await;

        if state.closed {
            return Err(ChannelError::Closed);
        }

        let msg = ChannelMessage {
            from: from.to_string(),
            to: to.to_string(),
            content: content.to_string(),
            timestamp: now_millis(),
        };

        state.history.push(msg.clone());

        if to == "*" {
            for (agent_id, sub) in &state.subscribers {
                if agent_id != from {
                    let _ = sub.tx.try_send(msg.clone());
                }
            }
        } else if let Some(sub) = state.subscribers.get(to) {
            let _ = sub.tx.try_send(msg);
        }

        Ok(())
    }

    /// Creates (or returns the existing) inbox for an agent.
    ///
    /// Idempotent: a second call for the same id hands back the same inbox.
    /// Subscribing after [`close`](Self::close) yields an inbox that is
    /// already closed.
    pub async fn subscribe(&self, agent_id: &str) -> Inbox {
        let mut state = self.state.write().await;

        if let Some(existing) = state.subscribers.get(agent_id) {
            return existing.inbox.clone();
        }

        let (tx, rx) = mpsc::channel(self.buffer_size);
        let inbox = Inbox {
            rx: Arc::new(Mutex::new(rx)),
        };

        if state.closed {
            // Late subscriber on a closed channel observes teardown
            // immediately: the sender is dropped, never stored.
            drop(tx);
            return inbox;
        }

        state.subscribers.insert(
            agent_id.to_string(),
            Subscriber {
                tx,
                inbox: inbox.clone(),
            },
        );

        inbox
    }

    /// Removes an agent's subscription and closes its inbox. Idempotent if
    /// the agent is not subscribed.
    pub async fn unsubscribe(&self, agent_id: &str) {
        let mut state = self.state.write().await;
        // Dropping the Subscriber drops its sender, which closes the inbox.
        state.subscribers.remove(agent_id);
    }

    /// Closes the channel: rejects further sends and closes every subscriber
    /// inbox exactly once. Idempotent.
    pub async fn close(&self) {
        let mut state = self.state.write().await;

        if state.closed {
            return;
        }

        state.closed = true;
        state.subscribers.clear();
    }

    /// Returns a snapshot copy of the full message history.
    pub async fn history(&self) -> Vec<ChannelMessage> {
        self.state.read().await.history.clone()
    }

    /// Returns history filtered to messages addressed to `agent_id`,
    /// including broadcasts.
    pub async fn messages_for(&self, agent_id: &str) -> Vec<ChannelMessage> {
        self.state
            .read()
            .await
            .history
            .iter()
            .filter(|m| m.to == agent_id || m.to == "*")
            .cloned()
            .collect()
    }

    /// Returns history filtered to messages sent by `agent_id`.
    pub async fn messages_from(&self, agent_id: &str) -> Vec<ChannelMessage> {
        self.state
            .read()
            .await
            .history
            .iter()
            .filter(|m| m.from == agent_id)
            .cloned()
            .collect()
    }

    /// Total number of messages accepted.
    pub async fn count(&self) -> usize {
        self.state.read().await.history.len()
    }

    /// Number of active subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.state.read().await.subscribers.len()
    }

    /// Whether the channel has been closed.
    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_new_channel_default_buffer() {
        let mc = MessageChannel::new(0);
        assert_eq!(mc.buffer_size, DEFAULT_BUFFER_SIZE);
        assert!(!mc.is_closed().await);

        let mc = MessageChannel::new(10);
        assert_eq!(mc.buffer_size, 10);
    }

    #[tokio::test]
    async fn test_subscribe_and_send() {
        let mc = MessageChannel::new(10);
        let inbox = mc.subscribe("agent1").await;

        mc.send("agent2", "agent1", "hello").await.unwrap();

        let msg = timeout(Duration::from_secs(1), inbox.recv())
            .await
            .expect("timeout waiting for message")
            .expect("inbox closed unexpectedly");
        assert_eq!(msg.from, "agent2");
        assert_eq!(msg.to, "agent1");
        assert_eq!(msg.content, "hello");
        assert_eq!(mc.count().await, 1);
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        let mc = MessageChannel::new(10);
        let inbox1 = mc.subscribe("agent1").await;
        let inbox2 = mc.subscribe("agent2").await;
        let inbox3 = mc.subscribe("agent3").await;

        mc.send("agent1", "*", "broadcast message").await.unwrap();

        // The sender must not receive its own broadcast.
        assert!(
            timeout(Duration::from_millis(100), inbox1.recv()).await.is_err(),
            "sender received its own broadcast"
        );

        for inbox in [&inbox2, &inbox3] {
            let msg = timeout(Duration::from_secs(1), inbox.recv())
                .await
                .expect("timeout waiting for broadcast")
                .expect("inbox closed unexpectedly");
            assert_eq!(msg.content, "broadcast message");
        }
    }

    #[tokio::test]
    async fn test_subscribe_is_idempotent() {
        let mc = MessageChannel::new(10);
        let first = mc.subscribe("agent1").await;
        let second = mc.subscribe("agent1").await;

        assert_eq!(mc.subscriber_count().await, 1);

        mc.send("agent2", "agent1", "once").await.unwrap();

        // Both handles drain the same queue.
        let msg = first.try_recv().await.unwrap();
        assert_eq!(msg.content, "once");
        assert!(second.try_recv().await.is_err());
    }

    #[tokio::test]
    async fn test_history_preserves_order() {
        let mc = MessageChannel::new(10);
        mc.subscribe("agent1").await;
        mc.subscribe("agent2").await;

        mc.send("agent1", "agent2", "msg1").await.unwrap();
        mc.send("agent2", "agent1", "msg2").await.unwrap();
        mc.send("agent1", "*", "msg3").await.unwrap();

        let history = mc.history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "msg1");
        assert_eq!(history[1].content, "msg2");
        assert_eq!(history[2].content, "msg3");
    }

    #[tokio::test]
    async fn test_messages_for() {
        let mc = MessageChannel::new(10);
        mc.subscribe("agent1").await;
        mc.subscribe("agent2").await;

        mc.send("agent1", "agent2", "direct").await.unwrap();
        mc.send("agent1", "*", "broadcast").await.unwrap();
        mc.send("agent2", "agent1", "other").await.unwrap();

        let msgs = mc.messages_for("agent2").await;
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].content, "direct");
        assert_eq!(msgs[1].content, "broadcast");
    }

    #[tokio::test]
    async fn test_messages_from() {
        let mc = MessageChannel::new(10);
        mc.subscribe("agent1").await;
        mc.subscribe("agent2").await;

        mc.send("agent1", "agent2", "msg1").await.unwrap();
        mc.send("agent1", "*", "msg2").await.unwrap();
        mc.send("agent2", "agent1", "other").await.unwrap();

        let msgs = mc.messages_from("agent1").await;
        assert_eq!(msgs.len(), 2);
    }

    #[tokio::test]
    async fn test_close_rejects_send_and_closes_inboxes() {
        let mc = MessageChannel::new(10);
        let inbox = mc.subscribe("agent1").await;

        mc.close().await;
        assert!(mc.is_closed().await);

        let err = mc.send("agent2", "agent1", "hello").await.unwrap_err();
        assert_eq!(err, ChannelError::Closed);

        // Closed inbox yields None without waiting.
        let closed = timeout(Duration::from_millis(100), inbox.recv())
            .await
            .expect("inbox should be closed immediately");
        assert!(closed.is_none());

        // Close is idempotent.
        mc.close().await;
    }

    #[tokio::test]
    async fn test_unsubscribe_closes_inbox() {
        let mc = MessageChannel::new(10);
        let inbox = mc.subscribe("agent1").await;
        mc.unsubscribe("agent1").await;

        let closed = timeout(Duration::from_millis(100), inbox.recv())
            .await
            .expect("inbox should be closed immediately");
        assert!(closed.is_none());

        // History still records sends to an unsubscribed agent.
        mc.send("agent2", "agent1", "hello").await.unwrap();
        assert_eq!(mc.count().await, 1);

        // Idempotent when absent.
        mc.unsubscribe("agent1").await;
    }

    #[tokio::test]
    async fn test_subscribe_after_close_is_rejected() {
        let mc = MessageChannel::new(10);
        mc.close().await;

        let inbox = mc.subscribe("late").await;
        assert!(inbox.recv().await.is_none());
        assert_eq!(mc.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_full_inbox_drops_silently() {
        let mc = MessageChannel::new(2);
        let inbox = mc.subscribe("agent1").await;

        for i in 0..5 {
            mc.send("agent2", "agent1", &format!("msg{}", i)).await.unwrap();
        }

        // History keeps all five; the inbox kept only the first two.
        assert_eq!(mc.count().await, 5);
        assert_eq!(inbox.try_recv().await.unwrap().content, "msg0");
        assert_eq!(inbox.try_recv().await.unwrap().content, "msg1");
        assert!(inbox.try_recv().await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_send_receive() {
        let mc = Arc::new(MessageChannel::new(100));
        let num_agents = 5;
        let num_messages = 10;

        let mut inboxes = Vec::new();
        for i in 0..num_agents {
            let id = format!("agent{}", i);
            inboxes.push(mc.subscribe(&id).await);
        }

        let mut senders = Vec::new();
        for i in 0..num_agents {
            let mc = mc.clone();
            let id = format!("agent{}", i);
            senders.push(tokio::spawn(async move {
                for _ in 0..num_messages {
                    mc.send(&id, "*", "msg").await.unwrap();
                }
            }));
        }

        for handle in senders {
            handle.await.unwrap();
        }

        assert_eq!(mc.count().await, num_agents * num_messages);

        // Each agent receives broadcasts from every other agent.
        for inbox in &inboxes {
            let mut count = 0;
            while inbox.try_recv().await.is_ok() {
                count += 1;
            }
            assert_eq!(count, (num_agents - 1) * num_messages);
        }
    }
}
