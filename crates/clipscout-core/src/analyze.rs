use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ClipscoutError, Result},
    format::format_transcript_with_timestamps,
    types::{ClipSuggestion, Transcript},
};

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

static CLIP_IDEAS_PROMPT: &str = r#"You are a social media content strategist. Below is a timestamped
transcript of a podcast episode, one line per segment in the format
[HH:MM:SS] text.

Identify the moments most likely to perform well as short promotional
clips: strong hooks, emotional peaks, hot takes, surprising facts.

Output ONLY a plain list, one suggestion per line, in this exact format:
[HH:MM:SS] short description of the clip
or, when the clip spans a range:
[HH:MM:SS - HH:MM:SS] short description of the clip

Rules:
- Use timestamps that actually appear in the transcript
- 3 to 8 suggestions, ordered by timestamp
- No markdown, no numbering, no extra commentary"#;

/// Narrow boundary around the language-model service.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, transcript: &Transcript) -> Result<Vec<ClipSuggestion>>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Analyzer backed by a locally running Ollama instance.
pub struct OllamaClient {
    endpoint: String,
    model: String,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    fn unavailable(&self, reason: impl ToString) -> ClipscoutError {
        ClipscoutError::AnalysisUnavailable {
            endpoint: self.endpoint.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Analyzer for OllamaClient {
    async fn analyze(&self, transcript: &Transcript) -> Result<Vec<ClipSuggestion>> {
        let prompt = format!(
            "{}\n\nTranscript:\n\n{}",
            CLIP_IDEAS_PROMPT,
            format_transcript_with_timestamps(transcript)
        );

        let response = self
            .http
            .post(format!("{}/api/generate", self.endpoint))
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        if !response.status().is_success() {
            return Err(self.unavailable(format!("HTTP {}", response.status())));
        }

        let envelope: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| ClipscoutError::AnalysisParse {
                    reason: format!("invalid response envelope: {e}"),
                })?;

        let text = envelope
            .response
            .ok_or_else(|| ClipscoutError::AnalysisParse {
                reason: "response envelope has no `response` field".to_string(),
            })?;

        Ok(parse_suggestions(&text))
    }
}

/// Best-effort parse of the model's free-form output. Lines matching the
/// `[HH:MM:SS] description` pattern (optionally with a range inside the
/// brackets) become suggestions; everything else is skipped. Zero matches
/// is a valid empty result.
pub fn parse_suggestions(text: &str) -> Vec<ClipSuggestion> {
    text.lines()
        .filter_map(parse_suggestion_line)
        .collect()
}

fn parse_suggestion_line(line: &str) -> Option<ClipSuggestion> {
    let line = line
        .trim()
        .trim_start_matches(['-', '*', '•'])
        .trim_start();

    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let (inside, after) = (&rest[..close], &rest[close + 1..]);

    let (start, end) = match inside.split_once('-') {
        Some((a, b)) => (parse_clock(a)?, parse_clock(b)),
        None => (parse_clock(inside)?, None),
    };

    let description = after.trim().trim_start_matches([':', '-', '–']).trim();
    if description.is_empty() {
        return None;
    }

    Some(ClipSuggestion {
        start_seconds: start,
        end_seconds: end,
        description: description.to_string(),
    })
}

/// Parse `HH:MM:SS` or `MM:SS` into seconds. Absurd values the model may
/// hallucinate are rejected, never fatal.
fn parse_clock(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    let numbers: Option<Vec<u64>> = parts.iter().map(|p| p.trim().parse().ok()).collect();

    let (h, m, s) = match numbers?.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return None,
    };

    let total = h
        .checked_mul(3600)?
        .checked_add(m.checked_mul(60)?)?
        .checked_add(s)?;

    Some(total as f64)
}
