//! Clipscout Core Library
//!
//! Core functionality for transcribing local audio/video files with Whisper
//! and extracting clip suggestions with a locally running Ollama model.

pub mod analyze;
pub mod error;
pub mod format;
pub mod job;
pub mod report;
pub mod reveal;
pub mod runner;
pub mod srt;
pub mod transcribe;
pub mod types;

// Re-export commonly used items at crate root
pub use analyze::{Analyzer, OllamaClient, parse_suggestions};
pub use error::{ClipscoutError, Result};
pub use format::{format_timestamp, format_transcript_with_timestamps};
pub use job::{Job, JobStatus, StatusUpdate};
pub use report::{render_report, write_report};
pub use reveal::open_in_file_browser;
pub use runner::{JobHandle, JobOutput, JobRunner, SubmitError, run_job};
pub use srt::{render_srt, write_srt};
pub use transcribe::{Transcriber, WhisperCommand, normalize_segments};
pub use types::{ClipSuggestion, Segment, Transcript};
