use derive_more::{Display, From};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("Transcript service returned {status} for {endpoint}")]
    TranscriptFetch { endpoint: String, status: u16 },

    #[display("HTTP error: {_0}")]
    #[from]
    Http(reqwest::Error),

    #[display("Completion request failed: {_0}")]
    #[from]
    Completion(async_openai::error::OpenAIError),

    #[display("Completion returned no content (model {model})")]
    EmptyCompletion { model: String },

    #[display("Invalid video URL: {_0}")]
    InvalidUrl(String),

    #[display("Missing configuration: {_0} is not set")]
    MissingConfig(String),

    #[display("IO error: {_0}")]
    #[from]
    Io(std::io::Error),

    #[display("JSON error: {_0}")]
    #[from]
    Json(serde_json::Error),

    #[display("{_0}")]
    Custom(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Completion(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }

    /// Text shown to the user in the shell's status line.
    ///
    /// Transport details stay in the log; the user only sees which stage failed.
    pub fn user_message(&self) -> String {
        match self {
            Error::TranscriptFetch { .. } | Error::Http(_) => "Failed to fetch transcript.".into(),
            Error::Completion(_) | Error::EmptyCompletion { .. } => {
                "Summary generation failed.".into()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn transcript_failures_map_to_fetch_message() {
        let err = Error::TranscriptFetch {
            endpoint: "/lang".into(),
            status: 404,
        };
        assert_eq!(err.user_message(), "Failed to fetch transcript.");
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn completion_failures_map_to_generic_message() {
        let err = Error::EmptyCompletion {
            model: "gpt-4o-mini".into(),
        };
        assert_eq!(err.user_message(), "Summary generation failed.");
    }

    #[test]
    fn custom_errors_show_their_text() {
        assert_eq!(Error::custom("nope").user_message(), "nope");
    }
}
