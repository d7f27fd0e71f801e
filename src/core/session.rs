use crate::core::prompt::{
    LANGUAGES, Prompt, RefineStyle, detailed_summary_prompt, refine_prompt, summary_prompt,
};
use crate::core::sections::{FormatWarning, Refinement, Section, format_sections};
use crate::core::summary::Completer;
use crate::core::transcript::{Transcript, TranscriptSource, extract_video_id, fetch_transcript, video_title};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Transient per-user state. Actions return an updated copy instead of mutating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub video_url: String,
    pub language: String,
    pub summary: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            video_url: String::new(),
            language: LANGUAGES[0].to_string(),
            summary: String::new(),
        }
    }
}

impl Session {
    pub fn new(video_url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into().trim().to_string(),
            language: language.into(),
            summary: String::new(),
        }
    }

    /// New input invalidates the previous summary.
    pub fn with_input(&self, video_url: &str, language: &str) -> Self {
        let video_url = video_url.trim();
        let summary = if video_url == self.video_url && language == self.language {
            self.summary.clone()
        } else {
            String::new()
        };
        Self {
            video_url: video_url.to_string(),
            language: language.to_string(),
            summary,
        }
    }

    pub fn with_summary(&self, summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    Standard,
    Detailed,
}

/// Everything the shell shows after a summary run.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub title: String,
    pub video_url: String,
    pub transcript: Arc<Transcript>,
    pub prompt: Prompt,
    pub sections: Vec<Section>,
    pub warnings: Vec<FormatWarning>,
}

/// Fetch, complete, format. Each call is one user action.
pub struct Pipeline<S, C> {
    source: S,
    completer: C,
}

impl<S: TranscriptSource, C: Completer> Pipeline<S, C> {
    pub fn new(source: S, completer: C) -> Self {
        Self { source, completer }
    }

    pub async fn generate(&self, session: &Session, mode: SummaryMode) -> Result<(Session, SummaryView)> {
        let video_id = extract_video_id(&session.video_url)
            .ok_or_else(|| Error::InvalidUrl(session.video_url.clone()))?;

        let transcript = fetch_transcript(&self.source, &video_id).await?;
        if transcript.is_empty() {
            return Err(Error::custom("The transcript for this video is empty."));
        }

        let transcript_text = transcript.text();
        let prompt = match mode {
            SummaryMode::Standard => summary_prompt(&session.language, &transcript_text),
            SummaryMode::Detailed => detailed_summary_prompt(&session.language, &transcript_text),
        };

        let raw_summary = self.completer.complete(&prompt).await?;
        let transcript = Arc::new(transcript);
        let formatted = format_sections(&raw_summary, &session.video_url, Arc::clone(&transcript));
        if formatted.sections.is_empty() {
            tracing::warn!(%video_id, warnings = formatted.warnings.len(), "Summary had no timestamped sections");
        }

        let title = video_title(&self.source, &video_id).await;
        tracing::info!(%video_id, %title, sections = formatted.sections.len(), ?mode, "Summary ready");

        let view = SummaryView {
            title,
            video_url: session.video_url.clone(),
            transcript,
            prompt,
            sections: formatted.sections,
            warnings: formatted.warnings,
        };

        Ok((session.with_summary(raw_summary), view))
    }

    /// Re-runs one section through a style-specific prompt over the already-fetched transcript.
    pub async fn refine(&self, session: &Session, section: &Section, style: RefineStyle) -> Result<Refinement> {
        let prompt = refine_prompt(
            style,
            &session.language,
            &section.summary_line(),
            &section.transcript.text(),
        );
        let text = self.completer.complete(&prompt).await?;
        tracing::info!(timestamp = %section.timestamp, ?style, "Section refined");
        Ok(Refinement { style, text })
    }
}
