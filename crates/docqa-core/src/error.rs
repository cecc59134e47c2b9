use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A persisted store artifact is absent, unreadable, or disagrees with its partner.
    #[error("Missing artifact: {0}")]
    MissingArtifact(String),

    /// Query or stored vector width differs from the index width (model/version skew).
    #[error("Dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The chunk list and the vector list of one corpus differ in length.
    #[error("Corpus has {chunks} chunks but {vectors} vectors")]
    ParityMismatch { chunks: usize, vectors: usize },

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Failed to extract {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Structural invariant violations that must stop the process rather than a single request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MissingArtifact(_)
                | Error::DimensionMismatch { .. }
                | Error::ParityMismatch { .. }
                | Error::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_errors_are_fatal() {
        assert!(Error::MissingArtifact("index.bin".into()).is_fatal());
        assert!(Error::DimensionMismatch { expected: 384, actual: 1024 }.is_fatal());
        assert!(!Error::Encoding("empty query".into()).is_fatal());
    }

    #[test]
    fn dimension_mismatch_message_names_both_widths() {
        let msg = Error::DimensionMismatch { expected: 384, actual: 3 }.to_string();
        assert!(msg.contains("384") && msg.contains('3'));
    }
}
