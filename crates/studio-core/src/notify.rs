//! User notifications
//!
//! Every lifecycle outcome the user should hear about is emitted as a
//! `Notification` through an injected `Notifier`. Failures never travel
//! further up the call stack than this.

use crate::error::StudioError;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Notification titles
pub mod titles {
    /// `load()` failed
    pub const LOAD_FAILED: &str = "Error loading images";
    /// Generation succeeded
    pub const GENERATED: &str = "Image generated!";
    /// Generation failed
    pub const GENERATION_FAILED: &str = "Generation failed";
    /// Upload succeeded
    pub const UPLOADED: &str = "Image uploaded!";
    /// Upload failed
    pub const UPLOAD_FAILED: &str = "Upload failed";
    /// Favorite toggle or delete failed
    pub const ERROR: &str = "Error";
    /// Delete succeeded
    pub const DELETED: &str = "Image deleted";
}

/// Visual weight of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Informational / success
    Success,
    /// Failure (destructive styling)
    Failure,
}

/// One user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Success or failure
    pub kind: NotificationKind,
}

impl Notification {
    /// Success notification
    #[inline]
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NotificationKind::Success,
        }
    }

    /// Failure notification carrying the error's message
    #[inline]
    #[must_use]
    pub fn failure(title: impl Into<String>, error: &StudioError) -> Self {
        Self {
            title: title.into(),
            description: error.message(),
            kind: NotificationKind::Failure,
        }
    }

    /// Whether this reports a failure
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.kind == NotificationKind::Failure
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Failure => "error",
        };
        write!(f, "[{marker}] {}: {}", self.title, self.description)
    }
}

/// Sink for user notifications
pub trait Notifier: Send + Sync {
    /// Emit a notification (fire and forget)
    fn notify(&self, notification: Notification);
}

/// Notifier that forwards into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create notifier and its receiving end
    #[must_use]
    pub fn new() -> (Self, NotificationReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, NotificationReceiver { rx })
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Receiver gone means nobody renders notifications anymore
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification dropped: receiver closed");
        }
    }
}

/// Receiving end of a `ChannelNotifier`
#[derive(Debug)]
pub struct NotificationReceiver {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl NotificationReceiver {
    /// Wait for the next notification
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Take everything emitted so far without waiting
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = self.rx.try_recv() {
            out.push(n);
        }
        out
    }
}

/// Notifier that writes to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                tracing::info!(title = %notification.title, "{}", notification.description);
            }
            NotificationKind::Failure => {
                tracing::warn!(title = %notification.title, "{}", notification.description);
            }
        }
    }
}

/// Notifier that fans out to several sinks
#[derive(Clone, Default)]
pub struct FanoutNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    /// Empty fan-out
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    #[inline]
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl std::fmt::Debug for FanoutNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutNotifier")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn failure_carries_underlying_message() {
        let err = StudioError::from(StoreError::Network("connection refused".into()));
        let n = Notification::failure(titles::LOAD_FAILED, &err);
        assert!(n.is_failure());
        assert_eq!(n.description, "connection refused");
        assert_eq!(n.to_string(), "[error] Error loading images: connection refused");
    }

    #[tokio::test]
    async fn channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::success("a", "1"));
        notifier.notify(Notification::success("b", "2"));

        let got = rx.drain();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].title, "a");
        assert_eq!(got[1].title, "b");
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn fanout_reaches_every_sink() {
        let (a, mut rx_a) = ChannelNotifier::new();
        let (b, mut rx_b) = ChannelNotifier::new();
        let fanout = FanoutNotifier::new()
            .with(Arc::new(a))
            .with(Arc::new(b))
            .with(Arc::new(TracingNotifier));

        fanout.notify(Notification::success(titles::DELETED, "gone"));
        assert_eq!(rx_a.drain().len(), 1);
        assert_eq!(rx_b.drain().len(), 1);
    }
}
