use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::{
    analyze::Analyzer,
    error::{ClipscoutError, Result},
    job::{Job, JobStatus, StatusUpdate},
    report::write_report,
    srt::write_srt,
    transcribe::Transcriber,
};

/// What a finished job produced.
#[derive(Debug, Clone)]
pub struct JobOutput {
    pub srt_path: PathBuf,
    pub report_path: PathBuf,
    pub segment_count: usize,
    pub suggestion_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("A job is already running; wait for it to finish")]
    Busy,
}

/// Handle to an in-flight job. `done` resolves with the job outcome.
pub struct JobHandle {
    pub id: Uuid,
    pub done: oneshot::Receiver<Result<JobOutput>>,
}

/// Run one job through the pipeline, emitting a status update on every
/// transition. Stage order is fixed: transcribe (and write the subtitle
/// file), analyze (and write the report). A parse failure in the analysis
/// stage degrades to an empty suggestion list; every other error fails the
/// job. No stage is retried.
pub async fn run_job(
    mut job: Job,
    transcriber: &dyn Transcriber,
    analyzer: &dyn Analyzer,
    status_tx: &mpsc::UnboundedSender<StatusUpdate>,
) -> Result<JobOutput> {
    let result = execute(&mut job, transcriber, analyzer, status_tx).await;

    if let Err(e) = &result {
        transition(
            &mut job,
            JobStatus::Failed {
                message: e.to_string(),
            },
            status_tx,
        );
    }

    result
}

async fn execute(
    job: &mut Job,
    transcriber: &dyn Transcriber,
    analyzer: &dyn Analyzer,
    status_tx: &mpsc::UnboundedSender<StatusUpdate>,
) -> Result<JobOutput> {
    transition(job, JobStatus::Transcribing, status_tx);
    let transcript = transcriber.transcribe(&job.input).await?;
    write_srt(&transcript, &job.srt_path).await?;

    transition(job, JobStatus::Analyzing, status_tx);
    let suggestions = match analyzer.analyze(&transcript).await {
        Ok(suggestions) => suggestions,
        Err(ClipscoutError::AnalysisParse { reason }) => {
            tracing::warn!(%reason, "model response was unparseable, writing report without suggestions");
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    write_report(&job.input_name(), &transcript, &suggestions, &job.report_path).await?;

    let output = JobOutput {
        srt_path: job.srt_path.clone(),
        report_path: job.report_path.clone(),
        segment_count: transcript.segments.len(),
        suggestion_count: suggestions.len(),
    };

    transition(
        job,
        JobStatus::Done {
            srt_path: job.srt_path.clone(),
            report_path: job.report_path.clone(),
        },
        status_tx,
    );

    Ok(output)
}

fn transition(job: &mut Job, status: JobStatus, status_tx: &mpsc::UnboundedSender<StatusUpdate>) {
    job.status = status.clone();
    // The receiver side may be gone (frontend closed); nothing to do then
    let _ = status_tx.send(StatusUpdate {
        job_id: job.id,
        status,
    });
}

/// Owns the external-service boundaries and runs one job at a time on the
/// tokio runtime. The interactive surface only ever sees `StatusUpdate`s.
pub struct JobRunner {
    transcriber: Arc<dyn Transcriber>,
    analyzer: Arc<dyn Analyzer>,
    status_tx: mpsc::UnboundedSender<StatusUpdate>,
    busy: Arc<AtomicBool>,
}

impl JobRunner {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        analyzer: Arc<dyn Analyzer>,
    ) -> (Self, mpsc::UnboundedReceiver<StatusUpdate>) {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        (
            Self {
                transcriber,
                analyzer,
                status_tx,
                busy: Arc::new(AtomicBool::new(false)),
            },
            status_rx,
        )
    }

    /// Start a job on the runtime. Both model services are single-consumer
    /// local resources, so a submission while a job is in flight is
    /// rejected rather than run concurrently.
    pub fn submit(&self, job: Job) -> std::result::Result<JobHandle, SubmitError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::Busy);
        }

        let id = job.id;
        let (done_tx, done_rx) = oneshot::channel();
        let transcriber = Arc::clone(&self.transcriber);
        let analyzer = Arc::clone(&self.analyzer);
        let status_tx = self.status_tx.clone();
        let busy = Arc::clone(&self.busy);

        tokio::spawn(async move {
            let result = run_job(job, transcriber.as_ref(), analyzer.as_ref(), &status_tx).await;
            busy.store(false, Ordering::Release);
            let _ = done_tx.send(result);
        });

        Ok(JobHandle { id, done: done_rx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClipSuggestion, Segment, Transcript};
    use async_trait::async_trait;
    use std::path::Path;
    use tokio::sync::Semaphore;

    fn transcript() -> Transcript {
        Transcript {
            text: "hello world again".to_string(),
            segments: vec![
                Segment {
                    start: 0.0,
                    end: 2.0,
                    text: "hello world".to_string(),
                },
                Segment {
                    start: 2.0,
                    end: 4.0,
                    text: "again".to_string(),
                },
            ],
            language: "en".to_string(),
        }
    }

    struct FakeTranscriber {
        gate: Option<Arc<Semaphore>>,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, _input: &Path) -> Result<Transcript> {
            if let Some(gate) = &self.gate {
                let _permit = gate.acquire().await.unwrap();
            }
            Ok(transcript())
        }
    }

    enum FakeAnalysis {
        Suggestions(Vec<ClipSuggestion>),
        ParseError,
        Unavailable,
    }

    struct FakeAnalyzer {
        outcome: FakeAnalysis,
    }

    #[async_trait]
    impl Analyzer for FakeAnalyzer {
        async fn analyze(&self, _transcript: &Transcript) -> Result<Vec<ClipSuggestion>> {
            match &self.outcome {
                FakeAnalysis::Suggestions(s) => Ok(s.clone()),
                FakeAnalysis::ParseError => Err(ClipscoutError::AnalysisParse {
                    reason: "not even close to the expected format".to_string(),
                }),
                FakeAnalysis::Unavailable => Err(ClipscoutError::AnalysisUnavailable {
                    endpoint: "http://localhost:11434".to_string(),
                    reason: "connection refused".to_string(),
                }),
            }
        }
    }

    fn fake_input(dir: &Path) -> Job {
        let input = dir.join("episode1.mp4");
        std::fs::write(&input, b"fake media").unwrap();
        Job::new(input).unwrap()
    }

    fn suggestion() -> ClipSuggestion {
        ClipSuggestion {
            start_seconds: 2.0,
            end_seconds: None,
            description: "The good part".to_string(),
        }
    }

    #[tokio::test]
    async fn pipeline_writes_srt_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let job = fake_input(dir.path());
        let (status_tx, mut status_rx) = mpsc::unbounded_channel();

        let output = run_job(
            job,
            &FakeTranscriber { gate: None },
            &FakeAnalyzer {
                outcome: FakeAnalysis::Suggestions(vec![suggestion()]),
            },
            &status_tx,
        )
        .await
        .unwrap();

        assert_eq!(output.segment_count, 2);
        assert_eq!(output.suggestion_count, 1);

        let srt = std::fs::read_to_string(&output.srt_path).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,000\nhello world"));

        let report = std::fs::read_to_string(&output.report_path).unwrap();
        assert!(report.contains("- **[00:00:02]** The good part"));

        let mut statuses = Vec::new();
        while let Ok(update) = status_rx.try_recv() {
            statuses.push(update.status);
        }
        assert!(matches!(statuses[0], JobStatus::Transcribing));
        assert!(matches!(statuses[1], JobStatus::Analyzing));
        assert!(matches!(statuses[2], JobStatus::Done { .. }));
    }

    #[tokio::test]
    async fn parse_error_degrades_to_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let job = fake_input(dir.path());
        let (status_tx, _status_rx) = mpsc::unbounded_channel();

        let output = run_job(
            job,
            &FakeTranscriber { gate: None },
            &FakeAnalyzer {
                outcome: FakeAnalysis::ParseError,
            },
            &status_tx,
        )
        .await
        .unwrap();

        assert_eq!(output.suggestion_count, 0);
        let report = std::fs::read_to_string(&output.report_path).unwrap();
        assert!(report.contains("_No clip suggestions were produced"));
    }

    #[tokio::test]
    async fn unreachable_service_fails_job_without_report() {
        let dir = tempfile::tempdir().unwrap();
        let job = fake_input(dir.path());
        let report_path = job.report_path.clone();
        let srt_path = job.srt_path.clone();
        let (status_tx, mut status_rx) = mpsc::unbounded_channel();

        let err = run_job(
            job,
            &FakeTranscriber { gate: None },
            &FakeAnalyzer {
                outcome: FakeAnalysis::Unavailable,
            },
            &status_tx,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClipscoutError::AnalysisUnavailable { .. }));
        // Transcription finished, so the subtitle file exists; no report
        assert!(srt_path.exists());
        assert!(!report_path.exists());

        let mut last = None;
        while let Ok(update) = status_rx.try_recv() {
            last = Some(update.status);
        }
        assert!(matches!(last, Some(JobStatus::Failed { .. })));
    }

    #[tokio::test]
    async fn rerun_overwrites_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let (status_tx, _status_rx) = mpsc::unbounded_channel();
        let transcriber = FakeTranscriber { gate: None };
        let analyzer = FakeAnalyzer {
            outcome: FakeAnalysis::Suggestions(vec![suggestion()]),
        };

        let first = run_job(fake_input(dir.path()), &transcriber, &analyzer, &status_tx)
            .await
            .unwrap();
        let first_srt = std::fs::read_to_string(&first.srt_path).unwrap();

        let second = run_job(fake_input(dir.path()), &transcriber, &analyzer, &status_tx)
            .await
            .unwrap();
        let second_srt = std::fs::read_to_string(&second.srt_path).unwrap();

        assert_eq!(first.srt_path, second.srt_path);
        assert_eq!(first_srt, second_srt);
    }

    #[tokio::test]
    async fn second_submission_while_busy_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let (runner, _status_rx) = JobRunner::new(
            Arc::new(FakeTranscriber {
                gate: Some(Arc::clone(&gate)),
            }),
            Arc::new(FakeAnalyzer {
                outcome: FakeAnalysis::Suggestions(vec![]),
            }),
        );

        let handle = runner.submit(fake_input(dir.path())).unwrap();
        let rejected = runner.submit(fake_input(dir.path()));
        assert!(matches!(rejected, Err(SubmitError::Busy)));

        // Let the first job finish, then a new submission is accepted again
        gate.add_permits(1);
        handle.done.await.unwrap().unwrap();
        assert!(runner.submit(fake_input(dir.path())).is_ok());
    }
}
