pub mod chat;
pub mod config;
pub mod destination;
pub mod dsm;
pub mod message;
pub mod metadata;
pub mod metrics;
pub mod testing;
pub mod workflow;

pub use chat::{ChatError, ChatReply};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, DestinationConfig, DsmConfig, LogFormat, MetadataConfig, SanitizedConfig,
    TelegramConfig,
};
pub use destination::{sanitize_folder_name, DestinationDecision, DestinationPolicy};
pub use dsm::{
    with_session, ApiErrorCode, ApiInfo, DsmApi, DsmClient, DsmError, DsmSession, ServiceKind,
    SessionError,
};
pub use message::{parse_message, ParseError, ParsedMessage};
pub use metadata::{FileEntry, MetadataError, MetadataResolver, TorrentMetaClient, TorrentMetadata};
pub use workflow::{MagnetWorkflow, Outcome, WorkflowError};
