use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipscoutError {
    #[error("Unusable input {path}: {reason}")]
    Input { path: PathBuf, reason: String },

    #[error("Transcription failed for {path}: {reason}")]
    Transcription { path: PathBuf, reason: String },

    #[error("Analysis service unreachable at {endpoint}: {reason}")]
    AnalysisUnavailable { endpoint: String, reason: String },

    #[error("Could not parse analysis response: {reason}")]
    AnalysisParse { reason: String },

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClipscoutError>;
