use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{ClipscoutError, Result};

const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "mp4"];

/// One end-to-end request to process a single input file. Jobs only live
/// for the duration of a run; nothing is persisted.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub srt_path: PathBuf,
    pub report_path: PathBuf,
    pub status: JobStatus,
}

/// Lifecycle of a job. Transitions are strictly forward and driven by the
/// runner; a failed job has to be re-submitted by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Transcribing,
    Analyzing,
    Done {
        srt_path: PathBuf,
        report_path: PathBuf,
    },
    Failed {
        message: String,
    },
}

/// One-way status message from the worker to the interactive surface.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub job_id: Uuid,
    pub status: JobStatus,
}

impl Job {
    /// Validate the input file and derive the sibling output paths:
    /// `<base>.srt` and `<base> content ideas.md`.
    pub fn new(input: impl Into<PathBuf>) -> Result<Self> {
        let input: PathBuf = input.into();

        if !input.is_file() {
            return Err(ClipscoutError::Input {
                path: input,
                reason: "file does not exist".to_string(),
            });
        }

        let ext = input
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ClipscoutError::Input {
                path: input,
                reason: format!("unsupported extension (expected one of: {})", SUPPORTED_EXTENSIONS.join(", ")),
            });
        }

        let output_dir = input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());

        let srt_path = output_dir.join(format!("{stem}.srt"));
        let report_path = output_dir.join(format!("{stem} content ideas.md"));

        Ok(Self {
            id: Uuid::new_v4(),
            input,
            output_dir,
            srt_path,
            report_path,
            status: JobStatus::Pending,
        })
    }

    pub fn input_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}
