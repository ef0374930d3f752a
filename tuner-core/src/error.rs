//! # Error Module
//!
//! Every failure the analysis pipeline can surface. A failed analysis never
//! returns a partial result; callers get exactly one [`AnalysisError`].

use std::path::PathBuf;
use thiserror::Error;

/// The tagged kind of a failed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The audio source could not be read or decoded.
    FileLoad,
    /// The signal (or the selected sub-window of it) holds no samples.
    EmptyBuffer,
    /// The signal has a sample rate of zero.
    InvalidSampleRate,
    /// No fundamental could be found inside the musical band.
    UndetectedPitch,
    /// The analysis configuration is invalid.
    Config,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("could not load audio file {path:?}: {reason}")]
    FileLoad { path: PathBuf, reason: String },
    #[error("audio buffer is empty")]
    EmptyBuffer,
    #[error("sample rate must be a positive number of Hz")]
    InvalidSampleRate,
    #[error("no pitch detected between 20 Hz and 5000 Hz")]
    UndetectedPitch,
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::FileLoad { .. } => FailureKind::FileLoad,
            AnalysisError::EmptyBuffer => FailureKind::EmptyBuffer,
            AnalysisError::InvalidSampleRate => FailureKind::InvalidSampleRate,
            AnalysisError::UndetectedPitch => FailureKind::UndetectedPitch,
            AnalysisError::Config(_) => FailureKind::Config,
        }
    }

    pub(crate) fn file_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AnalysisError::FileLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(AnalysisError::EmptyBuffer.kind(), FailureKind::EmptyBuffer);
        assert_eq!(AnalysisError::UndetectedPitch.kind(), FailureKind::UndetectedPitch);
        assert_eq!(
            AnalysisError::InvalidSampleRate.kind(),
            FailureKind::InvalidSampleRate
        );
        assert_eq!(
            AnalysisError::file_load("missing.wav", "not found").kind(),
            FailureKind::FileLoad
        );
        assert_eq!(AnalysisError::Config("x".into()).kind(), FailureKind::Config);
    }

    #[test]
    fn file_load_message_names_the_path() {
        let err = AnalysisError::file_load("takes/a4.wav", "No such file");
        let message = err.to_string();
        assert!(message.contains("a4.wav"), "{message}");
        assert!(message.contains("No such file"), "{message}");
    }
}
