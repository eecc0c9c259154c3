use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, process::Command};
use uuid::Uuid;

use crate::{
    error::{ClipscoutError, Result},
    types::{Segment, Transcript},
};

/// Narrow boundary around the speech-to-text service.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, input: &Path) -> Result<Transcript>;
}

/// Transcriber backed by the `whisper` CLI. Video inputs get their audio
/// track extracted with ffmpeg first; all scratch files live in a per-job
/// directory under the OS temp dir.
pub struct WhisperCommand {
    model: String,
}

impl WhisperCommand {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    async fn extract_audio(&self, input: &Path, audio_path: &Path) -> Result<()> {
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-vn")
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("-ar")
            .arg("16000")
            .arg("-ac")
            .arg("1")
            .arg(audio_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ClipscoutError::Transcription {
                path: input.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }

    async fn run_whisper(&self, audio_path: &Path, output_dir: &Path) -> Result<Transcript> {
        let output = Command::new("whisper")
            .arg(audio_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_format")
            .arg("json")
            .arg("--output_dir")
            .arg(output_dir)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ClipscoutError::Transcription {
                path: audio_path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        // Whisper names its output after the input file
        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let json_path = output_dir.join(format!("{stem}.json"));

        let json_content = fs::read_to_string(&json_path).await?;
        let transcript: Transcript = serde_json::from_str(&json_content)?;

        Ok(transcript)
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("clipscout-{}", Uuid::new_v4()))
    }
}

#[async_trait]
impl Transcriber for WhisperCommand {
    async fn transcribe(&self, input: &Path) -> Result<Transcript> {
        let scratch = Self::scratch_dir();
        fs::create_dir_all(&scratch).await?;

        let result = async {
            let is_video = input
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase() == "mp4")
                .unwrap_or(false);

            let audio_path = if is_video {
                let wav = scratch.join("audio.wav");
                self.extract_audio(input, &wav).await?;
                wav
            } else {
                input.to_path_buf()
            };

            let mut transcript = self.run_whisper(&audio_path, &scratch).await?;
            normalize_segments(&mut transcript.segments);
            Ok(transcript)
        }
        .await;

        // Scratch cleanup is best-effort
        let _ = fs::remove_dir_all(&scratch).await;

        result
    }
}

/// Clamp segment boundaries so timestamp ranges are monotonically
/// non-decreasing and non-overlapping.
pub fn normalize_segments(segments: &mut [Segment]) {
    let mut previous_end = 0.0_f64;
    for segment in segments.iter_mut() {
        if segment.start < previous_end {
            segment.start = previous_end;
        }
        if segment.end < segment.start {
            segment.end = segment.start;
        }
        previous_end = segment.end;
    }
}
