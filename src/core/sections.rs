use crate::core::prompt::RefineStyle;
use crate::core::transcript::Transcript;
use derive_more::Display;
use std::sync::Arc;

/// One timestamped slice of a generated summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub timestamp: String,
    pub text: String,
    pub link: String,
    pub transcript: Arc<Transcript>,
    pub refinements: Vec<Refinement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    pub style: RefineStyle,
    pub text: String,
}

impl Section {
    /// The line as the model wrote it, used as the focus of refine prompts.
    pub fn summary_line(&self) -> String {
        format!("{} {}", self.timestamp, self.text)
    }

    pub fn latest_refinement(&self) -> Option<&Refinement> {
        self.refinements.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LineError {
    #[display("missing space between timestamp and text")]
    MissingSeparator,
    #[display("timestamp '{_0}' is not hh:mm:ss")]
    InvalidTimestamp(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("line {line_number}: {reason} ({line:?})")]
pub struct FormatWarning {
    pub line_number: usize,
    pub line: String,
    pub reason: LineError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattedSummary {
    pub sections: Vec<Section>,
    pub warnings: Vec<FormatWarning>,
}

/// Splits model output into sections, skipping lines that do not start with a timestamp.
pub fn format_sections(summary: &str, video_url: &str, transcript: Arc<Transcript>) -> FormattedSummary {
    let mut formatted = FormattedSummary::default();

    for (idx, raw) in summary.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok((timestamp, seconds, text)) => formatted.sections.push(Section {
                timestamp,
                text,
                link: deep_link(video_url, seconds),
                transcript: Arc::clone(&transcript),
                refinements: Vec::new(),
            }),
            Err(reason) => {
                let warning = FormatWarning {
                    line_number: idx + 1,
                    line: line.to_string(),
                    reason,
                };
                tracing::warn!(%warning, "Skipping malformed summary line");
                formatted.warnings.push(warning);
            }
        }
    }

    formatted
}

fn parse_line(line: &str) -> Result<(String, u64, String), LineError> {
    let line = line.trim_start_matches(['-', '*', '•', ' ']);
    let (token, text) = line.split_once(' ').ok_or(LineError::MissingSeparator)?;

    // Models sometimes wrap the timestamp in brackets or bold markers.
    let timestamp = token.trim_matches(['[', ']', '(', ')', '*']);
    let seconds =
        time_to_seconds(timestamp).ok_or_else(|| LineError::InvalidTimestamp(token.to_string()))?;

    Ok((
        seconds_to_time(seconds),
        seconds,
        text.trim().trim_start_matches(['-', ' ']).to_string(),
    ))
}

/// `hh:mm:ss` to total seconds; `None` unless there are exactly three numeric parts
/// with minutes and seconds below 60 and the total fits in a `u64`.
pub fn time_to_seconds(timestamp: &str) -> Option<u64> {
    let mut parts = timestamp.split(':');
    let (h, m, s) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let parse = |part: &str| -> Option<u64> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };

    let (h, m, s) = (parse(h)?, parse(m)?, parse(s)?);
    if m >= 60 || s >= 60 {
        return None;
    }

    h.checked_mul(3600)?.checked_add(m * 60 + s)
}

pub fn seconds_to_time(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

pub fn deep_link(video_url: &str, seconds: u64) -> String {
    let separator = if video_url.contains('?') { '&' } else { '?' };
    format!("{video_url}{separator}t={seconds}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Arc<Transcript> {
        Arc::new(Transcript {
            video_id: "ABC".into(),
            language_code: "en".into(),
            lines: Vec::new(),
        })
    }

    #[test]
    fn round_trips_whole_seconds() {
        for s in [0, 1, 59, 60, 90, 3599, 3600, 3661, 86_399, 360_000] {
            assert_eq!(time_to_seconds(&seconds_to_time(s)), Some(s), "s = {s}");
        }
    }

    #[test]
    fn rejects_malformed_timestamps() {
        assert_eq!(time_to_seconds("00:01"), None);
        assert_eq!(time_to_seconds("00:01:30:00"), None);
        assert_eq!(time_to_seconds("aa:01:30"), None);
        assert_eq!(time_to_seconds("00:75:00"), None);
        assert_eq!(time_to_seconds("-1:00:00"), None);
    }

    #[test]
    fn builds_deep_links_per_section() {
        let formatted = format_sections(
            "00:00:00 Intro\n00:01:30 Details",
            "https://x/watch?v=ABC",
            transcript(),
        );

        assert!(formatted.warnings.is_empty());
        let links: Vec<&str> = formatted.sections.iter().map(|s| s.link.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://x/watch?v=ABC&t=0", "https://x/watch?v=ABC&t=90"]
        );
        assert_eq!(formatted.sections[1].timestamp, "00:01:30");
        assert_eq!(formatted.sections[1].text, "Details");
    }

    #[test]
    fn skips_lines_without_separator() {
        let formatted = format_sections(
            "00:00:00 Intro\nnoseparator\n\n00:02:00 Outro",
            "https://x/watch?v=ABC",
            transcript(),
        );

        assert_eq!(formatted.sections.len(), 2);
        assert_eq!(formatted.warnings.len(), 1);
        assert_eq!(formatted.warnings[0].line_number, 2);
        assert_eq!(formatted.warnings[0].reason, LineError::MissingSeparator);
    }

    #[test]
    fn skips_non_numeric_timestamps() {
        let formatted = format_sections("Summary: the video", "https://x/watch?v=ABC", transcript());
        assert!(formatted.sections.is_empty());
        assert!(matches!(
            formatted.warnings[0].reason,
            LineError::InvalidTimestamp(_)
        ));
    }

    #[test]
    fn tolerates_list_markers_and_brackets() {
        let formatted = format_sections(
            "- [00:00:10] Opening remarks\n**00:00:20** - Next",
            "https://youtu.be/ABC",
            transcript(),
        );
        assert_eq!(formatted.sections.len(), 2);
        assert_eq!(formatted.sections[0].timestamp, "00:00:10");
        assert_eq!(formatted.sections[0].link, "https://youtu.be/ABC?t=10");
        assert_eq!(formatted.sections[1].text, "Next");
    }

    #[test]
    fn oversized_hours_are_skipped() {
        assert_eq!(time_to_seconds("18446744073709551615:00:00"), None);
        assert_eq!(time_to_seconds("5124095576030432:00:00"), None);

        let formatted = format_sections(
            "18446744073709551615:00:00 Intro\n00:00:05 Next",
            "https://x/watch?v=ABC",
            transcript(),
        );
        assert_eq!(formatted.sections.len(), 1);
        assert_eq!(formatted.sections[0].text, "Next");
        assert!(matches!(
            formatted.warnings[0].reason,
            LineError::InvalidTimestamp(_)
        ));
    }

    #[test]
    fn normalizes_unpadded_timestamps() {
        let formatted = format_sections("0:1:2 Short form", "https://x/watch?v=ABC", transcript());
        assert_eq!(formatted.sections[0].timestamp, "00:01:02");
        assert_eq!(formatted.sections[0].link, "https://x/watch?v=ABC&t=62");
    }

    #[test]
    fn sections_share_the_transcript() {
        let shared = transcript();
        let formatted = format_sections("00:00:00 a\n00:00:05 b", "u?v=1", Arc::clone(&shared));
        assert!(formatted
            .sections
            .iter()
            .all(|s| Arc::ptr_eq(&s.transcript, &shared)));
    }
}
