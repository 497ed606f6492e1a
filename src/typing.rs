use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::router::{EventHandler, Outcome};
use crate::telegram::ChatTransport;
use crate::types::ChatEvent;

/// Wraps `inner` so every event first shows "typing…" in its chat.
pub fn with_typing<H: EventHandler>(transport: Arc<dyn ChatTransport>, inner: H) -> Typing<H> {
    Typing { transport, inner }
}

pub struct Typing<H> {
    transport: Arc<dyn ChatTransport>,
    inner: H,
}

#[async_trait]
impl<H: EventHandler> EventHandler for Typing<H> {
    async fn handle(&self, event: ChatEvent) -> Outcome {
        debug!("Sending typing indicator");
        // best-effort, a failed indicator must not block the reply
        if let Err(e) = self.transport.send_typing(event.chat_id).await {
            warn!("Failed to send typing indicator: {:?}", e);
        }
        self.inner.handle(event).await
    }
}
