use serde::{Deserialize, Serialize};

/// Whisper transcription result. Whisper's JSON output carries more fields
/// per segment (tokens, temperature, ...); only these are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// One promotable excerpt suggested by the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSuggestion {
    pub start_seconds: f64,
    pub end_seconds: Option<f64>,
    pub description: String,
}

impl Transcript {
    /// Duration in seconds, taken from the last segment boundary.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }
}
