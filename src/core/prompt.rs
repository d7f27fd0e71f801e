use clap::ValueEnum;
use std::fmt;

pub const SYSTEM_PROMPT: &str = "You are helpful assistant.";

/// Target languages offered by the shell.
pub const LANGUAGES: [&str; 3] = ["en", "zh-TW", "zh-CN"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Regeneration styles for a single section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RefineStyle {
    Detailed,
    Concise,
    Fun,
}

impl RefineStyle {
    pub fn label(self) -> &'static str {
        match self {
            RefineStyle::Detailed => "More Detail",
            RefineStyle::Concise => "More Concise",
            RefineStyle::Fun => "More Fun",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            RefineStyle::Detailed => "Detailed Summary",
            RefineStyle::Concise => "Concise Summary",
            RefineStyle::Fun => "Fun Summary",
        }
    }
}

impl fmt::Display for RefineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

const SECTION_FORMAT: &str = "Divide the summary into sections. Write each section on its own line \
as `hh:mm:ss <summary text>`, where the timestamp is where that section starts in the video. \
Do not add any other lines.";

pub fn summary_prompt(language: &str, transcript: &str) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "Summarize the transcript by generate summary depend on selected language {language}. \
{SECTION_FORMAT}\nTranscript: {transcript}"
        ),
    }
}

/// Whole-video variant behind "Generate Detailed Summary".
pub fn detailed_summary_prompt(language: &str, transcript: &str) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "Please provide a detailed summary of the following transcript in {language}, \
covering every topic the speakers discuss. {SECTION_FORMAT}\nTranscript: {transcript}"
        ),
    }
}

pub fn refine_prompt(style: RefineStyle, language: &str, section: &str, transcript: &str) -> Prompt {
    let instruction = match style {
        RefineStyle::Detailed => format!(
            "Please provide a more detailed summary of the following section of the transcript in {language}:"
        ),
        RefineStyle::Concise => format!(
            "Please provide a more concise summary of the following section of the transcript in {language}:"
        ),
        RefineStyle::Fun => {
            format!("Make the following summary more fun and add emojis in {language}:")
        }
    };

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!("{instruction}\n{section}\n\nFull transcript for context:\n{transcript}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_embeds_language_and_transcript() {
        let prompt = summary_prompt("zh-TW", "(00:00:01) hello");
        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert!(prompt.user.contains("selected language zh-TW"));
        assert!(prompt.user.ends_with("Transcript: (00:00:01) hello"));
    }

    #[test]
    fn refine_variants_differ() {
        let prompts: Vec<String> = [RefineStyle::Detailed, RefineStyle::Concise, RefineStyle::Fun]
            .iter()
            .map(|style| refine_prompt(*style, "en", "00:01:30 Details", "(00:01:30) body").user)
            .collect();
        assert!(prompts[0].contains("more detailed"));
        assert!(prompts[1].contains("more concise"));
        assert!(prompts[2].contains("emojis"));
        for user in &prompts {
            assert!(user.contains("00:01:30 Details"));
            assert!(user.contains("(00:01:30) body"));
        }
    }

    #[test]
    fn detailed_summary_is_not_the_plain_summary() {
        assert_ne!(
            detailed_summary_prompt("en", "t").user,
            summary_prompt("en", "t").user
        );
    }
}
