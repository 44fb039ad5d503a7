// src/types/document.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which generated document a cache slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Storage key holding the document body, shared with the web
    /// front-ends that read the same backend.
    pub fn storage_key(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "generatedResume",
            DocumentKind::CoverLetter => "generatedCoverLetter",
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover-letter",
        }
    }

    /// Default filename for exported HTML.
    pub fn export_file_name(&self) -> String {
        format!("{}.html", self.file_stem())
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "Resume",
            DocumentKind::CoverLetter => "Cover Letter",
        }
    }
}

/// The most recently generated document of one kind.
///
/// Immutable once sanitized; the next successful generation of the same
/// kind overwrites it wholesale, never merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub sanitized_html: String,
    pub source_template_id: Option<String>,
    /// Absent for documents stored before metadata was recorded.
    pub generated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_match_front_end_names() {
        assert_eq!(DocumentKind::Resume.storage_key(), "generatedResume");
        assert_eq!(
            DocumentKind::CoverLetter.storage_key(),
            "generatedCoverLetter"
        );
    }

    #[test]
    fn export_file_names() {
        assert_eq!(DocumentKind::Resume.export_file_name(), "resume.html");
        assert_eq!(
            DocumentKind::CoverLetter.export_file_name(),
            "cover-letter.html"
        );
    }
}
