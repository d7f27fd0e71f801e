use crate::config::TranscriptApiConfig;
use crate::core::sections::seconds_to_time;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;

pub const DEFAULT_LANGUAGE_CODE: &str = "en";
const FALLBACK_TITLE: &str = "Video Title";

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub start: f64,
    pub text: String,
}

/// Captions for one video, in the order the service returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: String,
    pub language_code: String,
    pub lines: Vec<CaptionLine>,
}

impl Transcript {
    /// `(hh:mm:ss) text` per caption.
    pub fn formatted_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| format!("({}) {}", format_time(line.start), line.text.trim()))
            .collect()
    }

    pub fn text(&self) -> String {
        self.formatted_lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Remote caption lookup. Implemented over HTTP by [`TranscriptService`].
pub trait TranscriptSource {
    fn list_languages(&self, video_id: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn fetch_captions(
        &self,
        video_id: &str,
        language_code: &str,
    ) -> impl Future<Output = Result<Vec<CaptionLine>>> + Send;

    fn fetch_title(&self, video_id: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Resolves the caption language, then downloads that track.
pub async fn fetch_transcript<S: TranscriptSource>(source: &S, video_id: &str) -> Result<Transcript> {
    let languages = source.list_languages(video_id).await?;
    let language_code = resolve_language_code(&languages).to_string();
    if languages.is_empty() {
        tracing::info!(video_id, "No caption languages reported, defaulting to en");
    } else {
        tracing::info!(video_id, ?languages, %language_code, "Using first caption language");
    }

    let lines = source.fetch_captions(video_id, &language_code).await?;
    tracing::debug!(video_id, lines = lines.len(), "Fetched transcript");

    Ok(Transcript {
        video_id: video_id.to_string(),
        language_code,
        lines,
    })
}

/// Title for display; lookup failures fall back to a placeholder.
pub async fn video_title<S: TranscriptSource>(source: &S, video_id: &str) -> String {
    match source.fetch_title(video_id).await {
        Ok(title) if !title.trim().is_empty() => title,
        Ok(_) => FALLBACK_TITLE.to_string(),
        Err(e) => {
            tracing::warn!(video_id, error = %e, "Title lookup failed");
            FALLBACK_TITLE.to_string()
        }
    }
}

pub fn resolve_language_code(available: &[String]) -> &str {
    available
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_LANGUAGE_CODE)
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    language_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptPayload {
    #[serde(default)]
    transcript: Vec<CaptionEntry>,
}

#[derive(Debug, Deserialize)]
struct CaptionEntry {
    start: Option<f64>,
    duration: Option<f64>,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    video_title: Option<String>,
}

#[derive(Clone)]
pub struct TranscriptService {
    client: reqwest::Client,
    base_url: String,
    password: String,
}

impl TranscriptService {
    pub fn new(config: &TranscriptApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vidsum/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            password: config.password.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, path, "Transcript request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), path, "Transcript service rejected request");
            return Err(Error::TranscriptFetch {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp.json::<T>().await?)
    }
}

impl TranscriptSource for TranscriptService {
    async fn list_languages(&self, video_id: &str) -> Result<Vec<String>> {
        let entries: Vec<LanguageEntry> = self
            .get_json(
                "/lang",
                &[
                    ("password", self.password.as_str()),
                    ("language", DEFAULT_LANGUAGE_CODE),
                    ("video_id", video_id),
                ],
            )
            .await?;

        Ok(entries.into_iter().filter_map(|e| e.language_code).collect())
    }

    async fn fetch_captions(&self, video_id: &str, language_code: &str) -> Result<Vec<CaptionLine>> {
        let payload: TranscriptPayload = self
            .get_json(
                "/transcript",
                &[
                    ("language_code", language_code),
                    ("password", self.password.as_str()),
                    ("video_id", video_id),
                ],
            )
            .await?;

        Ok(captions_from(payload))
    }

    async fn fetch_title(&self, video_id: &str) -> Result<String> {
        let info: VideoInfo = self
            .get_json(
                "/transcript",
                &[("password", self.password.as_str()), ("video_id", video_id)],
            )
            .await?;

        Ok(info.video_title.unwrap_or_default())
    }
}

// Entries without timing information are dropped.
fn captions_from(payload: TranscriptPayload) -> Vec<CaptionLine> {
    payload
        .transcript
        .into_iter()
        .filter_map(|entry| match (entry.start, entry.duration) {
            (Some(start), Some(_)) => Some(CaptionLine {
                start,
                text: entry.text,
            }),
            _ => None,
        })
        .collect()
}

/// Whole seconds as zero-padded `hh:mm:ss`; fractions are truncated.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    seconds_to_time(total)
}

pub fn extract_video_id(url: &str) -> Option<String> {
    // Extract video ID from various YouTube URL formats
    let raw_id = if let Some(v_param) = url.split("v=").nth(1) {
        v_param.split('&').next().unwrap_or(v_param)
    } else if let Some(youtu_be) = url.split("youtu.be/").nth(1) {
        youtu_be.split('?').next().unwrap_or(youtu_be)
    } else {
        url
    };

    sanitize_video_id(raw_id).ok()
}

const MAX_VIDEO_ID_LEN: usize = 128;

/// Only ASCII alphanumeric characters plus `_` and `-` are allowed.
pub fn sanitize_video_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("video ID cannot be empty".into()));
    }

    if trimmed.len() > MAX_VIDEO_ID_LEN {
        return Err(Error::InvalidUrl("video ID is unexpectedly long".into()));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(Error::InvalidUrl(format!(
            "'{trimmed}' contains unsupported characters; expected only letters, numbers, '-' or '_'"
        )));
    }

    Ok(trimmed.to_string())
}


#[cfg(test)]
mod tests {
    use super::mock::MockTranscriptSource;
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Local HTTP server answering each connection with the next canned reply.
    // Returns the service pointed at it and the request lines it received.
    async fn stub_service(
        replies: Vec<(u16, &'static str)>,
    ) -> (TranscriptService, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            for (status, body) in replies {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while read < buf.len() {
                    let n = stream.read(&mut buf[read..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let head = String::from_utf8_lossy(&buf[..read]).to_string();
                let request_line = head.lines().next().unwrap_or_default().to_string();
                seen.lock().unwrap().push(request_line);

                let response = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        let service = TranscriptService {
            client: reqwest::Client::builder().no_proxy().build().expect("client"),
            base_url: format!("http://{addr}"),
            password: "secret".into(),
        };
        (service, requests)
    }

    #[tokio::test]
    async fn service_queries_languages_then_captions() {
        let (service, requests) = stub_service(vec![
            (200, r#"[{"language_code": "zh-TW"}, {"language_code": "en"}]"#),
            (
                200,
                r#"{"transcript": [{"start": 90.0, "duration": 2.0, "text": "Hello"}]}"#,
            ),
        ])
        .await;

        let transcript = fetch_transcript(&service, "ABC").await.expect("transcript");
        assert_eq!(transcript.language_code, "zh-TW");
        assert_eq!(transcript.text(), "(00:01:30) Hello");
        assert_eq!(
            *requests.lock().unwrap(),
            vec![
                "GET /lang?password=secret&language=en&video_id=ABC HTTP/1.1".to_string(),
                "GET /transcript?language_code=zh-TW&password=secret&video_id=ABC HTTP/1.1"
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn service_maps_not_found_to_fetch_error() {
        let (service, requests) = stub_service(vec![(404, r#"{"detail": "Not Found"}"#)]).await;

        let err = fetch_transcript(&service, "ABC").await.unwrap_err();
        assert!(
            matches!(&err, Error::TranscriptFetch { endpoint, status: 404 } if endpoint == "/lang"),
            "{err}"
        );
        assert_eq!(err.user_message(), "Failed to fetch transcript.");
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn service_title_request_omits_language() {
        let (service, requests) =
            stub_service(vec![(200, r#"{"video_title": "My Talk", "transcript": []}"#)]).await;

        assert_eq!(video_title(&service, "ABC").await, "My Talk");
        let requests = requests.lock().unwrap();
        assert_eq!(
            requests[0],
            "GET /transcript?password=secret&video_id=ABC HTTP/1.1"
        );
        assert!(!requests[0].contains("language_code"));
    }

    #[test]
    fn formats_caption_offsets() {
        assert_eq!(format_time(90.0), "00:01:30");
        assert_eq!(format_time(3661.9), "01:01:01");
        assert_eq!(format_time(-3.0), "00:00:00");
    }

    #[test]
    fn formatted_lines_prefix_timestamps() {
        let transcript = Transcript {
            video_id: "ABC".into(),
            language_code: "en".into(),
            lines: vec![CaptionLine {
                start: 90.0,
                text: "Hello".into(),
            }],
        };
        assert_eq!(transcript.formatted_lines(), vec!["(00:01:30) Hello"]);
    }

    #[test]
    fn defaults_to_english_without_reported_languages() {
        assert_eq!(resolve_language_code(&[]), "en");
        let langs = vec!["zh-Hant".to_string(), "en".to_string()];
        assert_eq!(resolve_language_code(&langs), "zh-Hant");
    }

    #[test]
    fn skips_entries_without_timing() {
        let payload: TranscriptPayload = serde_json::from_str(
            r#"{"transcript": [
                {"start": 1.5, "duration": 2.0, "text": "kept"},
                {"start": 3.0, "text": "no duration"},
                {"duration": 1.0, "text": "no start"}
            ]}"#,
        )
        .expect("payload");
        let captions = captions_from(payload);
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].text, "kept");
    }

    #[test]
    fn ignores_language_entries_without_code() {
        let entries: Vec<LanguageEntry> =
            serde_json::from_str(r#"[{"language_code": "en"}, {"name": "auto"}]"#).expect("langs");
        let codes: Vec<String> = entries.into_iter().filter_map(|e| e.language_code).collect();
        assert_eq!(codes, vec!["en"]);
    }

    #[tokio::test]
    async fn fetch_uses_first_reported_language() {
        let mut source = MockTranscriptSource::with_captions(&[(0.0, "hi")]);
        source.languages = vec!["zh-TW".into(), "en".into()];
        let calls = source.calls.clone();

        let transcript = fetch_transcript(&source, "ABC").await.expect("transcript");
        assert_eq!(transcript.language_code, "zh-TW");
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["lang:ABC".to_string(), "transcript:ABC:zh-TW".to_string()]
        );
    }

    #[tokio::test]
    async fn fetch_stops_after_language_failure() {
        let source = MockTranscriptSource::failing(404);
        let calls = source.calls.clone();

        let err = fetch_transcript(&source, "ABC").await.unwrap_err();
        assert!(matches!(err, Error::TranscriptFetch { status: 404, .. }));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn title_falls_back_on_failure() {
        let source = MockTranscriptSource::failing(500);
        assert_eq!(video_title(&source, "ABC").await, "Video Title");
    }

    #[test]
    fn extracts_ids_from_urls() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=SLwpqD8n3d0&t=10").as_deref(),
            Some("SLwpqD8n3d0")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/SLwpqD8n3d0?si=x").as_deref(),
            Some("SLwpqD8n3d0")
        );
        assert_eq!(extract_video_id("SLwpqD8n3d0").as_deref(), Some("SLwpqD8n3d0"));
        assert!(extract_video_id("https://example.com/watch").is_none());
    }

    #[test]
    fn allows_expected_characters() {
        let id = sanitize_video_id("abcDEF123-_x").expect("valid ID");
        assert_eq!(id, "abcDEF123-_x");
    }

    #[test]
    fn rejects_empty() {
        assert!(sanitize_video_id("   ").is_err());
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(sanitize_video_id("abc/../../etc").is_err());
    }

    #[test]
    fn rejects_too_long() {
        let long = "a".repeat(MAX_VIDEO_ID_LEN + 1);
        assert!(sanitize_video_id(&long).is_err());
    }
}
