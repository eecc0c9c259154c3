use std::path::{Path, PathBuf};
use std::sync::Arc;

use iced::futures::SinkExt;
use iced::widget::{button, column, text, text_input};
use iced::{Element, Task};
use uuid::Uuid;

use clipscout_core::{
    Job, JobRunner, JobStatus, OllamaClient, StatusUpdate, WhisperCommand,
    analyze::{DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL},
    open_in_file_browser,
};

fn main() -> iced::Result {
    iced::application(App::new, App::update, App::view)
        .title("Clipscout")
        .run()
}

#[derive(Default)]
struct App {
    path: String,
    status: String,
    processing: bool,
}

#[derive(Debug, Clone)]
enum Message {
    PathChanged(String),
    Process,
    Status(StatusUpdate),
    Revealed,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        (Self::default(), Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PathChanged(path) => {
                self.path = path;
                Task::none()
            }
            Message::Process => {
                if self.processing {
                    return Task::none();
                }
                self.processing = true;
                self.status = "Starting...".to_string();

                let input = self.path.clone();
                Task::run(
                    iced::stream::channel(16, move |mut output| async move {
                        run_pipeline(input, &mut output).await;
                    }),
                    Message::Status,
                )
            }
            Message::Status(update) => match update.status {
                JobStatus::Pending => Task::none(),
                JobStatus::Transcribing => {
                    self.status = "Transcribing with Whisper... Please wait.".to_string();
                    Task::none()
                }
                JobStatus::Analyzing => {
                    self.status = "Transcription done. Generating clip suggestions...".to_string();
                    Task::none()
                }
                JobStatus::Done {
                    srt_path,
                    report_path,
                } => {
                    self.processing = false;
                    self.status = format!(
                        "Finished.\nSubtitles: {}\nIdeas: {}",
                        file_name(&srt_path),
                        file_name(&report_path)
                    );

                    let dir = srt_path.parent().map(PathBuf::from);
                    Task::perform(
                        async move {
                            if let Some(dir) = dir {
                                // Revealing the folder is best-effort
                                let _ = open_in_file_browser(&dir).await;
                            }
                        },
                        |_| Message::Revealed,
                    )
                }
                JobStatus::Failed { message } => {
                    self.processing = false;
                    self.status = format!("Error occurred: {message}");
                    Task::none()
                }
            },
            Message::Revealed => Task::none(),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        column![
            text("Clipscout - Podcast Clip Finder").size(24),
            text("Select an audio or video file (.mp3 / .mp4):"),
            text_input("Path to media file...", &self.path).on_input(Message::PathChanged),
            button("Start Processing")
                .on_press_maybe((!self.processing).then_some(Message::Process)),
            text(self.status.as_str()),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run one job and forward every status update into the UI stream. The UI
/// never shares state with the worker; this channel is the only bridge.
async fn run_pipeline(
    input: String,
    output: &mut iced::futures::channel::mpsc::Sender<StatusUpdate>,
) {
    let failed = |message: String| StatusUpdate {
        job_id: Uuid::nil(),
        status: JobStatus::Failed { message },
    };

    let job = match Job::new(PathBuf::from(input)) {
        Ok(job) => job,
        Err(e) => {
            let _ = output.send(failed(e.to_string())).await;
            return;
        }
    };

    let (runner, mut status_rx) = JobRunner::new(
        Arc::new(WhisperCommand::new("medium")),
        Arc::new(OllamaClient::new(
            DEFAULT_OLLAMA_ENDPOINT,
            DEFAULT_OLLAMA_MODEL,
        )),
    );

    let _handle = match runner.submit(job) {
        Ok(handle) => handle,
        Err(e) => {
            let _ = output.send(failed(e.to_string())).await;
            return;
        }
    };

    while let Some(update) = status_rx.recv().await {
        let terminal = matches!(
            update.status,
            JobStatus::Done { .. } | JobStatus::Failed { .. }
        );
        let _ = output.send(update).await;
        if terminal {
            break;
        }
    }
}
