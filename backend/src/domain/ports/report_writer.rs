//! Port for the report export sink.

use async_trait::async_trait;

use crate::domain::report::ReportSnapshot;

/// Failures raised by report sink adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportWriterError {
    /// The report artefact could not be written.
    #[error("report write failed: {message}")]
    Io {
        /// Adapter-level detail.
        message: String,
    },
}

impl ReportWriterError {
    /// I/O error with the given detail.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Sink that renders a snapshot into the downloadable report artefact,
/// replacing whatever was there before.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Overwrite the report artefact with `snapshot`.
    async fn write(&self, snapshot: &ReportSnapshot) -> Result<(), ReportWriterError>;
}
