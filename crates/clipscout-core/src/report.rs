use std::path::Path;

use tokio::fs;

use crate::{
    error::Result,
    format::format_timestamp,
    types::{ClipSuggestion, Transcript},
};

/// Render the content-ideas report as markdown.
pub fn render_report(
    input_name: &str,
    transcript: &Transcript,
    suggestions: &[ClipSuggestion],
) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Content ideas for {}\n\n", input_name));

    output.push_str(&format!(
        "**Source:** {} | **Duration:** {} | **Segments:** {}\n\n",
        input_name,
        format_timestamp(transcript.duration_seconds()),
        transcript.segments.len()
    ));

    output.push_str("## Clip suggestions\n\n");
    if suggestions.is_empty() {
        output.push_str("_No clip suggestions were produced for this transcript._\n");
    } else {
        for suggestion in suggestions {
            let stamp = match suggestion.end_seconds {
                Some(end) => format!(
                    "[{} - {}]",
                    format_timestamp(suggestion.start_seconds),
                    format_timestamp(end)
                ),
                None => format!("[{}]", format_timestamp(suggestion.start_seconds)),
            };
            output.push_str(&format!("- **{}** {}\n", stamp, suggestion.description));
        }
    }

    output
}

/// Write the report in one shot, overwriting any previous run's output.
pub async fn write_report(
    input_name: &str,
    transcript: &Transcript,
    suggestions: &[ClipSuggestion],
    path: &Path,
) -> Result<()> {
    let rendered = render_report(input_name, transcript, suggestions);
    fs::write(path, rendered).await?;
    Ok(())
}
