use std::path::PathBuf;

use log::Level;
use tokio::sync::mpsc;

/// Session-level events for whoever drives the debugger UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The VM finished initializing.
    SessionStarted,
    /// Execution stopped at a source position.
    PositionChanged { path: PathBuf, line: u32 },
    /// The VM is going away. JDWP does not report the exit code.
    ProcessExited { code: Option<i32> },
    /// A diagnostic the user should see.
    Log { level: Level, message: String },
}

/// Sending half of the notification channel.
///
/// A dropped receiver is not an error: nobody is listening, the session goes
/// on without its observer.
#[derive(Debug, Clone)]
pub(crate) struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub(crate) fn send(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            log::trace!("notification dropped, receiver is gone");
        }
    }

    pub(crate) fn log(&self, level: Level, message: impl Into<String>) {
        let message = message.into();
        log::log!(level, "{message}");
        self.send(Notification::Log { level, message });
    }
}
