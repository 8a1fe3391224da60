//! Typed signal bus for cross-view change notification.
//!
//! Views that write the persisted session directly (an exercise picker, a
//! second window) publish [`SyncSignal::SessionChanged`]; the host forwards
//! visibility and focus changes. The coordinator reloads on each, last
//! write wins.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Whether the workout view is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// A notification that the persisted session may have changed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SyncSignal {
    /// Another view wrote the active session.
    SessionChanged,
    /// The view was shown or hidden.
    VisibilityChange { state: Visibility },
    /// The view regained input focus.
    Focus,
}

/// Publish/subscribe channel for [`SyncSignal`]s.
#[derive(Debug, Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<SyncSignal>,
}

impl SignalBus {
    /// Create a bus buffering up to `capacity` signals per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send a signal to every subscriber. Returns how many received it.
    pub fn publish(&self, signal: SyncSignal) -> usize {
        match self.tx.send(signal) {
            Ok(count) => {
                tracing::trace!(?signal, subscribers = count, "signal published");
                count
            }
            Err(_) => {
                tracing::debug!(?signal, "no subscribers for signal");
                0
            }
        }
    }

    /// Shorthand for publishing [`SyncSignal::SessionChanged`].
    pub fn notify_session_changed(&self) -> usize {
        self.publish(SyncSignal::SessionChanged)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncSignal> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&SyncSignal::SessionChanged).unwrap();
        assert_eq!(json, r#"{"type":"session-changed"}"#);

        let signal: SyncSignal =
            serde_json::from_str(r#"{"type":"visibility-change","state":"hidden"}"#).unwrap();
        assert_eq!(
            signal,
            SyncSignal::VisibilityChange {
                state: Visibility::Hidden
            }
        );
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = SignalBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.notify_session_changed(), 2);
        assert_eq!(first.recv().await.unwrap(), SyncSignal::SessionChanged);
        assert_eq!(second.recv().await.unwrap(), SyncSignal::SessionChanged);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = SignalBus::default();
        assert_eq!(bus.publish(SyncSignal::Focus), 0);
    }
}
