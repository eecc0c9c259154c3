use std::path::Path;

use tokio::fs;

use crate::{error::Result, types::Transcript};

/// Format seconds as an SRT timestamp: HH:MM:SS,mmm
pub fn format_srt_timestamp(seconds: f64) -> String {
    // Round on whole milliseconds so .9995 carries into the seconds field
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let total = total_millis / 1000;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Render a transcript as a standard SRT document: numbered blocks with a
/// `start --> end` line followed by the segment text.
pub fn render_srt(transcript: &Transcript) -> String {
    let mut output = String::new();
    for (i, segment) in transcript.segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(segment.start),
            format_srt_timestamp(segment.end)
        ));
        output.push_str(segment.text.trim());
        output.push_str("\n\n");
    }
    output
}

/// Write the subtitle file in one shot. The document is rendered fully in
/// memory first so a failed transcription never leaves a partial file.
pub async fn write_srt(transcript: &Transcript, path: &Path) -> Result<()> {
    let rendered = render_srt(transcript);
    fs::write(path, rendered).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Segment;

    fn transcript(segments: Vec<Segment>) -> Transcript {
        Transcript {
            text: String::new(),
            segments,
            language: "en".to_string(),
        }
    }

    #[test]
    fn srt_timestamp_has_millis() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_srt_timestamp(3661.25), "01:01:01,250");
    }

    #[test]
    fn near_second_boundaries_carry_into_seconds() {
        assert_eq!(format_srt_timestamp(1.9995), "00:00:02,000");
        assert_eq!(format_srt_timestamp(59.9999), "00:01:00,000");
    }

    #[test]
    fn renders_numbered_blocks() {
        let t = transcript(vec![
            Segment {
                start: 0.0,
                end: 2.5,
                text: " First line ".to_string(),
            },
            Segment {
                start: 2.5,
                end: 5.0,
                text: "Second line".to_string(),
            },
        ]);

        let srt = render_srt(&t);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:02,500\nFirst line\n\n\
             2\n00:00:02,500 --> 00:00:05,000\nSecond line\n\n"
        );
    }

    #[test]
    fn empty_transcript_renders_empty_document() {
        assert_eq!(render_srt(&transcript(vec![])), "");
    }

    #[tokio::test]
    async fn write_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode1.srt");
        std::fs::write(&path, "stale content").unwrap();

        let t = transcript(vec![Segment {
            start: 0.0,
            end: 1.0,
            text: "fresh".to_string(),
        }]);
        write_srt(&t, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("1\n00:00:00,000 --> 00:00:01,000\nfresh"));
    }
}
