//! Telegram transport.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters};
use tracing::{debug, error, info, warn};

use nasbot_core::{ChatError, ChatReply, DsmApi, MagnetWorkflow, TelegramConfig};

use crate::metrics;

/// Replies to one inbound Telegram message.
pub struct TelegramReply {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl TelegramReply {
    pub fn new(bot: Bot, msg: &Message) -> Self {
        Self {
            bot,
            chat_id: msg.chat.id,
            message_id: msg.id,
        }
    }
}

#[async_trait]
impl ChatReply for TelegramReply {
    async fn send_text(&self, text: &str) -> Result<(), ChatError> {
        self.bot
            .send_message(self.chat_id, text)
            .reply_parameters(ReplyParameters::new(self.message_id))
            .await
            .map(|_| ())
            .map_err(|e| ChatError(e.to_string()))
    }
}

/// Handle one inbound message.
///
/// The dispatcher runs handlers for distinct chats concurrently, so every
/// message gets its own workflow run.
pub async fn handle_message<D>(
    bot: Bot,
    msg: Message,
    workflow: Arc<MagnetWorkflow<D>>,
    telegram: Arc<TelegramConfig>,
) -> ResponseResult<()>
where
    D: DsmApi + 'static,
{
    if !telegram.is_chat_allowed(msg.chat.id.0) {
        warn!(chat_id = msg.chat.id.0, "Ignoring message from chat outside allow-list");
        metrics::MESSAGES_RECEIVED
            .with_label_values(&["chat_not_allowed"])
            .inc();
        return Ok(());
    }

    let Some(text) = msg.text() else {
        debug!(chat_id = msg.chat.id.0, "Ignoring message without text");
        metrics::MESSAGES_RECEIVED
            .with_label_values(&["no_text"])
            .inc();
        return Ok(());
    };

    info!(chat_id = msg.chat.id.0, "Received message");
    metrics::MESSAGES_RECEIVED
        .with_label_values(&["accepted"])
        .inc();

    let reply = TelegramReply::new(bot, &msg);
    metrics::WORKFLOWS_IN_FLIGHT.inc();
    let result = workflow.run(text, &reply).await;
    metrics::WORKFLOWS_IN_FLIGHT.dec();

    match result {
        Ok(outcome) => info!(chat_id = msg.chat.id.0, outcome = outcome.as_str(), "Message handled"),
        Err(e) => error!(chat_id = msg.chat.id.0, "Workflow aborted: {}", e),
    }

    Ok(())
}
