// src/store.rs
//! Local document cache: the most recently generated document per kind,
//! with localStorage semantics. Last write wins, no history, no expiry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::document::{DocumentKind, GeneratedDocument};

/// Key remembering the template the last resume was generated from.
pub const SELECTED_TEMPLATE_KEY: &str = "selectedTemplate";

/// String key/value storage. Injected so callers can swap the file-backed
/// store for an in-memory one in tests.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store mutex poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// One file per key under the state directory. Entries survive process
/// restarts the way localStorage survives page reloads, until overwritten
/// or removed.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // Keys are fixed identifiers, safe to use as filenames directly.
    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read state file: {}", path.display()))
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create state directory: {}", self.root.display())
        })?;
        let path = self.key_path(key);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write state file: {}", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove state file: {}", path.display()))
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DocumentMeta {
    source_template_id: Option<String>,
    generated_at: DateTime<Utc>,
}

/// Cache of generated documents on top of any [`KeyValueStore`].
pub struct DocumentStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> DocumentStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrite the slot for `kind`; the previous document is gone.
    /// A supplied template id also updates the selected-template key.
    pub fn store_document(
        &self,
        kind: DocumentKind,
        html: &str,
        template_id: Option<&str>,
    ) -> Result<()> {
        debug!("Storing {} ({} bytes)", kind.storage_key(), html.len());
        self.store.set(kind.storage_key(), html)?;

        let meta = DocumentMeta {
            source_template_id: template_id.map(str::to_string),
            generated_at: Utc::now(),
        };
        self.store.set(
            &Self::meta_key(kind),
            &serde_json::to_string(&meta).context("Failed to serialize document metadata")?,
        )?;

        if let Some(template) = template_id {
            self.store.set(SELECTED_TEMPLATE_KEY, template)?;
        }
        Ok(())
    }

    /// `None` means nothing has been generated yet for this kind; callers
    /// render an empty state, never crash.
    pub fn load_document(&self, kind: DocumentKind) -> Result<Option<GeneratedDocument>> {
        let Some(html) = self.store.get(kind.storage_key())? else {
            return Ok(None);
        };

        // Metadata is best-effort; a missing or stale sidecar never blocks
        // the document itself.
        let meta: Option<DocumentMeta> = self
            .store
            .get(&Self::meta_key(kind))?
            .and_then(|raw| serde_json::from_str(&raw).ok());

        Ok(Some(GeneratedDocument {
            kind,
            sanitized_html: html,
            source_template_id: meta.as_ref().and_then(|m| m.source_template_id.clone()),
            generated_at: meta.map(|m| m.generated_at),
        }))
    }

    pub fn selected_template(&self) -> Result<Option<String>> {
        self.store.get(SELECTED_TEMPLATE_KEY)
    }

    pub fn clear(&self, kind: DocumentKind) -> Result<()> {
        self.store.remove(kind.storage_key())?;
        self.store.remove(&Self::meta_key(kind))
    }

    fn meta_key(kind: DocumentKind) -> String {
        format!("{}.meta", kind.storage_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_overwrite() {
        let documents = DocumentStore::new(MemoryStore::default());

        documents
            .store_document(DocumentKind::Resume, "<p>A</p>", Some("cv_1"))
            .unwrap();
        let loaded = documents.load_document(DocumentKind::Resume).unwrap().unwrap();
        assert_eq!(loaded.sanitized_html, "<p>A</p>");
        assert_eq!(loaded.source_template_id.as_deref(), Some("cv_1"));
        assert!(loaded.generated_at.is_some());

        documents
            .store_document(DocumentKind::Resume, "<p>B</p>", Some("cv_2"))
            .unwrap();
        let loaded = documents.load_document(DocumentKind::Resume).unwrap().unwrap();
        assert_eq!(loaded.sanitized_html, "<p>B</p>");
        assert_eq!(documents.selected_template().unwrap().as_deref(), Some("cv_2"));
    }

    #[test]
    fn kinds_do_not_collide() {
        let documents = DocumentStore::new(MemoryStore::default());
        documents
            .store_document(DocumentKind::Resume, "<p>cv</p>", None)
            .unwrap();
        documents
            .store_document(DocumentKind::CoverLetter, "<p>cl</p>", None)
            .unwrap();

        let resume = documents.load_document(DocumentKind::Resume).unwrap().unwrap();
        let letter = documents
            .load_document(DocumentKind::CoverLetter)
            .unwrap()
            .unwrap();
        assert_eq!(resume.sanitized_html, "<p>cv</p>");
        assert_eq!(letter.sanitized_html, "<p>cl</p>");
    }

    #[test]
    fn absent_document_loads_as_none() {
        let documents = DocumentStore::new(MemoryStore::default());
        assert!(documents
            .load_document(DocumentKind::CoverLetter)
            .unwrap()
            .is_none());
    }

    #[test]
    fn template_is_not_touched_without_an_id() {
        let documents = DocumentStore::new(MemoryStore::default());
        documents
            .store_document(DocumentKind::Resume, "<p>A</p>", Some("cv_1"))
            .unwrap();
        documents
            .store_document(DocumentKind::CoverLetter, "<p>B</p>", None)
            .unwrap();
        assert_eq!(documents.selected_template().unwrap().as_deref(), Some("cv_1"));
    }

    #[test]
    fn clear_removes_document_and_metadata() {
        let documents = DocumentStore::new(MemoryStore::default());
        documents
            .store_document(DocumentKind::Resume, "<p>A</p>", None)
            .unwrap();
        documents.clear(DocumentKind::Resume).unwrap();
        assert!(documents.load_document(DocumentKind::Resume).unwrap().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        {
            let documents = DocumentStore::new(FileStore::new(dir.path()));
            documents
                .store_document(DocumentKind::Resume, "<p>persisted</p>", Some("cv_2"))
                .unwrap();
        }

        let documents = DocumentStore::new(FileStore::new(dir.path()));
        let loaded = documents.load_document(DocumentKind::Resume).unwrap().unwrap();
        assert_eq!(loaded.sanitized_html, "<p>persisted</p>");
        assert_eq!(loaded.source_template_id.as_deref(), Some("cv_2"));
    }

    #[test]
    fn file_store_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("generatedResume").unwrap().is_none());
        store.remove("generatedResume").unwrap();
    }
}
