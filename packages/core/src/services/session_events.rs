use tokio::sync::broadcast;
use tracing::debug;

use crate::services::service_client::ServiceName;

/// Published whenever the stored session is destroyed, or a service refuses
/// the current user.
///
/// The hosting application decides where to navigate; the networking layer
/// only announces what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A service answered 401, or the token was found expired before a call.
    Invalidated { service: ServiceName, path: String },
    /// A service answered 403. The session is left intact.
    Forbidden {
        service: ServiceName,
        path: String,
        message: String,
    },
    /// Explicit logout or account deletion.
    Cleared,
}

const CHANNEL_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        SessionEvents { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Fire-and-forget; having no subscribers is not an error.
    pub fn emit(&self, event: SessionEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!("Session event delivered to {} subscriber(s)", receivers),
            Err(broadcast::error::SendError(event)) => {
                debug!("No subscribers for session event {:?}", event)
            }
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
