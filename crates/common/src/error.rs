//! Central error types for the engine (thiserror-based).

use thiserror::Error;

use crate::types::ChannelId;

/// Errors raised by producers and producer factories.
///
/// Construction-time errors surface to the caller; render-time failures
/// are absorbed by the stage and transition failure barriers and never
/// escape a tick.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Producer \"{name}\" failed: {reason}")]
    Failed { name: String, reason: String },

    #[error("No producer factory registered for \"{name}\"")]
    UnknownProducer { name: String },

    #[error("Producer factory \"{name}\" already registered")]
    AlreadyRegistered { name: String },
}

impl ProducerError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised at the channel boundary (consumers, driver lifecycle).
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Consumer \"{name}\" failed: {reason}")]
    ConsumerSend { name: String, reason: String },

    #[error("Channel {index} is shut down")]
    ShutDown { index: ChannelId },

    #[error("Channel {index} driver thread failed to start: {reason}")]
    DriverSpawn { index: ChannelId, reason: String },
}
