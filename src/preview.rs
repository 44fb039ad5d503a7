// src/preview.rs
//! Download and print surfaces for generated documents.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::document::{DocumentKind, GeneratedDocument};

/// Write HTML content to disk, creating parent directories as needed.
pub async fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    tokio::fs::write(path, html)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Write a document's sanitized HTML to disk, the download-button
/// equivalent.
pub async fn export_html(doc: &GeneratedDocument, path: &Path) -> Result<()> {
    write_html(path, &doc.sanitized_html).await
}

/// Export path carrying a generation timestamp, for callers that keep
/// more than one export around.
pub fn timestamped_export_path(dir: &Path, kind: DocumentKind) -> PathBuf {
    dir.join(format!(
        "{}_{}.html",
        kind.file_stem(),
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Wrap a sanitized document in the fixed print shell used by the preview
/// surfaces: zero margin, padded on screen, unpadded on paper.
pub fn printable_document(html: &str, title: &str) -> String {
    format!(
        r#"<html>
  <head>
    <title>{title}</title>
    <style>
      body {{ margin: 0; padding: 20px; }}
      @media print {{
        body {{ padding: 0; }}
      }}
    </style>
  </head>
  <body>
    {html}
  </body>
</html>"#
    )
}
