//! Magnet workflow implementation.

use std::sync::Arc;

use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::chat::ChatReply;
use crate::destination::DestinationPolicy;
use crate::dsm::{with_session, DsmApi, ServiceKind};
use crate::message::parse_message;
use crate::metadata::{MetadataError, MetadataResolver};
use crate::metrics;

use super::types::{Outcome, WorkflowError, PREPARING_MESSAGE};

/// Turns one chat message into a queued DownloadStation task.
///
/// Holds no per-run state, so one instance can serve concurrent messages.
/// Every run opens its own DSM sessions.
pub struct MagnetWorkflow<D: DsmApi> {
    resolver: Arc<dyn MetadataResolver>,
    dsm: Arc<D>,
    policy: DestinationPolicy,
}

impl<D: DsmApi> MagnetWorkflow<D> {
    /// Create a new workflow.
    pub fn new(resolver: Arc<dyn MetadataResolver>, dsm: Arc<D>, policy: DestinationPolicy) -> Self {
        Self {
            resolver,
            dsm,
            policy,
        }
    }

    /// Process one inbound message, replying through `reply`.
    ///
    /// Returns the terminal outcome after its reply has been sent. An
    /// unreachable metadata service is returned as an error without a reply.
    pub async fn run(&self, text: &str, reply: &dyn ChatReply) -> Result<Outcome, WorkflowError> {
        let span = info_span!("workflow", run_id = %Uuid::new_v4());
        let result = self.execute(text, reply).instrument(span).await;

        let label = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(WorkflowError::MetadataUnavailable(_)) => "metadata_unavailable",
        };
        metrics::WORKFLOW_RUNS.with_label_values(&[label]).inc();

        result
    }

    async fn execute(&self, text: &str, reply: &dyn ChatReply) -> Result<Outcome, WorkflowError> {
        let parsed = match parse_message(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                info!("Rejecting message: {}", e);
                return Ok(self.finish(reply, Outcome::MagnetNotFound).await);
            }
        };
        info!(
            title = ?parsed.title,
            alternative_title = ?parsed.alternative_title,
            year = ?parsed.year,
            "Magnet extracted"
        );

        let metadata = match self.resolver.resolve(&parsed.magnet).await {
            Ok(metadata) => metadata,
            Err(e @ MetadataError::NotFound { .. }) => {
                info!("Metadata lookup via {} failed: {}", self.resolver.name(), e);
                return Ok(self.finish(reply, Outcome::TorrentNotFound).await);
            }
            Err(e @ (MetadataError::Unreachable(_) | MetadataError::InvalidResponse(_))) => {
                error!("Metadata lookup via {} failed: {}", self.resolver.name(), e);
                return Err(WorkflowError::MetadataUnavailable(e));
            }
        };
        info!(
            "Metadata resolved: '{}' ({} files)",
            metadata.name,
            metadata.files.len()
        );

        if let Err(e) = reply.send_text(PREPARING_MESSAGE).await {
            warn!("Failed to send acknowledgement: {}", e);
        }

        let decision = self.policy.decide(&metadata, &parsed);
        info!(
            needs_folder = decision.needs_folder,
            folder = ?decision.folder_name,
            "Destination decided"
        );

        let folder = match &decision.folder_name {
            Some(name) => self.create_folder(name).await,
            None => {
                let result = if decision.needs_folder {
                    "unnamed"
                } else {
                    "not_needed"
                };
                metrics::FOLDER_PHASE.with_label_values(&[result]).inc();
                None
            }
        };
        let destination = folder.as_ref().and(decision.destination_path.clone());

        let outcome = match self.create_task(&parsed.magnet, destination).await {
            Ok(()) => Outcome::Queued { folder },
            Err(e) => {
                error!("Failed to create download task: {}", e);
                Outcome::TaskFailed
            }
        };

        Ok(self.finish(reply, outcome).await)
    }

    /// Create the dedicated folder; `None` means "use the default location".
    async fn create_folder(&self, name: &str) -> Option<String> {
        let folder = name.to_string();
        let parent = self.policy.folder_parent().to_string();

        let result = with_session(
            &*self.dsm,
            ServiceKind::FileStation,
            move |api, session| {
                Box::pin(async move { api.create_folder(session, &folder, &parent).await })
            },
        )
        .await;

        match result {
            Ok(()) => {
                info!("Created folder '{}'", name);
                metrics::FOLDER_PHASE.with_label_values(&["created"]).inc();
                Some(name.to_string())
            }
            Err(e) => {
                warn!(
                    "Could not create folder '{}', using default location: {}",
                    name, e
                );
                metrics::FOLDER_PHASE.with_label_values(&["failed"]).inc();
                None
            }
        }
    }

    async fn create_task(
        &self,
        magnet: &str,
        destination: Option<String>,
    ) -> Result<(), crate::dsm::DsmError> {
        let magnet = magnet.to_string();
        info!("Creating download task (destination: {:?})", destination);

        with_session(
            &*self.dsm,
            ServiceKind::DownloadStation,
            move |api, session| {
                Box::pin(async move {
                    api.create_task(session, &magnet, destination.as_deref())
                        .await
                })
            },
        )
        .await
    }

    /// Send the terminal reply; a send failure is logged only.
    async fn finish(&self, reply: &dyn ChatReply, outcome: Outcome) -> Outcome {
        if let Err(e) = reply.send_text(&outcome.reply_text()).await {
            warn!("Failed to send final reply ({}): {}", outcome.as_str(), e);
        }
        outcome
    }
}
