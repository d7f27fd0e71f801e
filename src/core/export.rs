use crate::core::sections::Section;
use crate::error::Result;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const EXPORT_FILE_NAME: &str = "summary.html";
pub const EXPORT_MIME: &str = "text/html";
const DOCUMENT_TITLE: &str = "YouTube Summary";

/// A rendered document ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub body: String,
}

impl ExportArtifact {
    pub fn from_sections(sections: &[Section]) -> Self {
        Self {
            file_name: EXPORT_FILE_NAME,
            mime: EXPORT_MIME,
            body: render_html(sections),
        }
    }

    /// Writes into `dir` under the artifact's file name.
    pub async fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name);
        write_html(&path, &self.body).await?;
        Ok(path)
    }
}

pub fn render_html(sections: &[Section]) -> String {
    let mut html = format!("<html><body><h1>{DOCUMENT_TITLE}</h1>");

    for section in sections {
        html.push_str(&format!(
            "<h2>{} - {}</h2>",
            encode_text(&section.timestamp),
            encode_text(&section.text)
        ));
        html.push_str(&format!(
            "<p><a href=\"{}\">Watch on YouTube</a></p>",
            encode_double_quoted_attribute(&section.link)
        ));
    }

    html.push_str("</body></html>");
    html
}

pub async fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, html).await?;
    tracing::info!(path = %path.display(), bytes = html.len(), "Exported summary");
    Ok(())
}
