//! Chat reply sink for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::chat::{ChatError, ChatReply};

/// Records every reply; optionally fails the first N sends.
#[derive(Debug, Default, Clone)]
pub struct RecordingReply {
    sent: Arc<RwLock<Vec<String>>>,
    failures_left: Arc<RwLock<usize>>,
}

impl RecordingReply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply sink whose first `count` sends fail.
    pub fn failing_first(count: usize) -> Self {
        Self {
            sent: Arc::default(),
            failures_left: Arc::new(RwLock::new(count)),
        }
    }

    /// Successfully sent replies, in order.
    pub async fn sent(&self) -> Vec<String> {
        self.sent.read().await.clone()
    }

    /// Last successfully sent reply.
    pub async fn last(&self) -> Option<String> {
        self.sent.read().await.last().cloned()
    }
}

#[async_trait]
impl ChatReply for RecordingReply {
    async fn send_text(&self, text: &str) -> Result<(), ChatError> {
        {
            let mut failures = self.failures_left.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(ChatError("mock send failure".to_string()));
            }
        }
        self.sent.write().await.push(text.to_string());
        Ok(())
    }
}
