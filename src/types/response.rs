// src/types/response.rs
use serde::{Deserialize, Serialize};

// ===== Service Response Types =====

/// Body of a successful `/ats-analyze` call. The `response` field carries
/// HTML or plain text and is handed back unmodified; callers decide
/// whether to normalize it for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsAnalysis {
    pub response: String,
}

/// `/health` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Error body servers send alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ServerErrorBody {
    pub error: String,
}
