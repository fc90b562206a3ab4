//! Chat transport abstraction.
//!
//! The workflow only needs to send plain-text replies back to the chat the
//! request came from; the concrete transport lives in the binary.

use async_trait::async_trait;
use thiserror::Error;

/// Error sending a reply.
#[derive(Debug, Error)]
#[error("failed to send chat reply: {0}")]
pub struct ChatError(pub String);

/// Reply channel bound to one inbound message.
#[async_trait]
pub trait ChatReply: Send + Sync {
    /// Send a plain-text reply.
    async fn send_text(&self, text: &str) -> Result<(), ChatError>;
}
