//! Client-side plumbing for an HTML document-generation backend: request
//! transport, response sanitization, and a local cache of the most recent
//! generated resume and cover letter.

pub mod client;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod preview;
pub mod store;
pub mod types;

pub use client::{AnalysisType, PdfUpload, TransportClient};
pub use config::AppConfig;
pub use error::TransportError;
pub use normalizer::{
    normalize, normalize_with, AlignmentFix, NormalizeOptions, SanitizationResult,
};
pub use store::{DocumentStore, FileStore, KeyValueStore, MemoryStore};
pub use types::document::{DocumentKind, GeneratedDocument};
