use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use clipscout_core::{
    Job, JobRunner, JobStatus, OllamaClient, WhisperCommand,
    analyze::{DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL},
    open_in_file_browser,
};

#[derive(Parser)]
#[command(name = "clipscout")]
#[command(
    about = "Transcribe a local audio/video file with Whisper and extract clip suggestions with a locally running LLM"
)]
struct Cli {
    /// Path to an .mp3 or .mp4 file
    input: PathBuf,

    /// Whisper model to transcribe with
    #[arg(short, long, default_value = "medium")]
    whisper_model: String,

    /// Ollama endpoint
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_OLLAMA_ENDPOINT)]
    endpoint: String,

    /// Ollama model for clip suggestions
    #[arg(short, long, env = "OLLAMA_MODEL", default_value = DEFAULT_OLLAMA_MODEL)]
    model: String,

    /// Open the output folder when processing finishes
    #[arg(long)]
    open: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(
            |_| format!("clipscout_core={log_level},clipscout={log_level}"),
        )))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    println!(
        "\n{}  {}\n",
        style("clipscout").cyan().bold(),
        style("Podcast Clip Finder").dim()
    );

    let job = match Job::new(&cli.input) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    let output_dir = job.output_dir.clone();

    let (runner, mut status_rx) = JobRunner::new(
        Arc::new(WhisperCommand::new(cli.whisper_model.clone())),
        Arc::new(OllamaClient::new(cli.endpoint.clone(), cli.model.clone())),
    );

    let handle = runner.submit(job)?;

    let mut spinner: Option<ProgressBar> = None;
    while let Some(update) = status_rx.recv().await {
        match update.status {
            JobStatus::Pending => {}
            JobStatus::Transcribing => {
                spinner = Some(create_spinner("Transcribing with Whisper..."));
            }
            JobStatus::Analyzing => {
                if let Some(pb) = spinner.take() {
                    pb.finish_with_message(format!(
                        "{} Transcribed",
                        style("✓").green().bold()
                    ));
                }
                spinner = Some(create_spinner(&format!(
                    "Asking {} for clip suggestions...",
                    cli.model
                )));
            }
            JobStatus::Done { .. } => {
                if let Some(pb) = spinner.take() {
                    pb.finish_with_message(format!(
                        "{} Report generated",
                        style("✓").green().bold()
                    ));
                }
                break;
            }
            JobStatus::Failed { message } => {
                if let Some(pb) = spinner.take() {
                    pb.finish_with_message(format!("{} {}", style("✗").red().bold(), message));
                }
                break;
            }
        }
    }

    let output = handle.done.await??;

    println!(
        "\n{} {} ({} segments)",
        style("Subtitles:").dim(),
        style(output.srt_path.display()).cyan(),
        output.segment_count
    );
    println!(
        "{} {} ({} suggestions)",
        style("Report:   ").dim(),
        style(output.report_path.display()).cyan(),
        output.suggestion_count
    );

    if cli.open {
        open_in_file_browser(&output_dir).await?;
    }

    Ok(())
}
