// src/client.rs
//! HTTP client for the document-generation backend. JSON bodies for the
//! generation endpoints, multipart for ATS analysis, one fixed timeout
//! for every call, and a small error taxonomy instead of raw transport
//! failures.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::TransportError;
use crate::types::response::{AtsAnalysis, HealthResponse, ServerErrorBody};

const GENERATE_CV_ENDPOINT: &str = "/generate-cv";
const GENERATE_COVER_LETTER_ENDPOINT: &str = "/generate-cover-letter";
const GENERATE_RESUME_FROM_JOB_ENDPOINT: &str = "/generate-resume-from-job";
const ATS_ANALYZE_ENDPOINT: &str = "/ats-analyze";
const HEALTH_ENDPOINT: &str = "/health";

/// A 2xx body at or below this length cannot be a usable document.
const MIN_DOCUMENT_LEN: usize = 100;

/// Supported ATS analysis modes, matching the backend's `analysis_type`
/// form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AnalysisType {
    Match,
    About,
    Improve,
    Tailor,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Match => "match",
            AnalysisType::About => "about",
            AnalysisType::Improve => "improve",
            AnalysisType::Tailor => "tailor",
        }
    }
}

/// PDF bytes plus the original filename for the multipart upload.
pub struct PdfUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct TransportClient {
    client: reqwest::Client,
    base_url: String,
    in_flight: AtomicBool,
}

impl TransportClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resume generation from a filled questionnaire. Returns the raw HTML
    /// body, to be normalized by the caller before display.
    pub async fn generate_cv(
        &self,
        template: &str,
        questionnaire: &Value,
    ) -> Result<String, TransportError> {
        if template.trim().is_empty() {
            return Err(TransportError::Validation(
                "template must not be empty".to_string(),
            ));
        }
        if !questionnaire.is_object() {
            return Err(TransportError::Validation(
                "questionnaire must be a JSON object".to_string(),
            ));
        }

        let payload = serde_json::json!({
            "template": template,
            "questionnaire": questionnaire,
        });
        self.post_for_html(GENERATE_CV_ENDPOINT, &payload).await
    }

    /// Cover-letter generation; the backend keys on the fixed `cl` template.
    pub async fn generate_cover_letter(
        &self,
        job: &Value,
        applicant: &Value,
    ) -> Result<String, TransportError> {
        if !job.is_object() || !applicant.is_object() {
            return Err(TransportError::Validation(
                "job and applicant must be JSON objects".to_string(),
            ));
        }

        let payload = serde_json::json!({
            "template": "cl",
            "job": job,
            "applicant": applicant,
        });
        self.post_for_html(GENERATE_COVER_LETTER_ENDPOINT, &payload)
            .await
    }

    /// Resume generation from a bare job description.
    pub async fn generate_resume_from_job(
        &self,
        job_description: &str,
    ) -> Result<String, TransportError> {
        if job_description.trim().is_empty() {
            return Err(TransportError::Validation(
                "job_description must not be empty".to_string(),
            ));
        }

        let payload = serde_json::json!({ "job_description": job_description });
        self.post_for_html(GENERATE_RESUME_FROM_JOB_ENDPOINT, &payload)
            .await
    }

    /// ATS analysis of an uploaded PDF against a job description. Unlike
    /// the HTML endpoints the response is structured JSON, returned as-is.
    pub async fn ats_analyze(
        &self,
        pdf: PdfUpload,
        job_description: &str,
        analysis_type: AnalysisType,
    ) -> Result<AtsAnalysis, TransportError> {
        validate_pdf(&pdf)?;
        if job_description.trim().is_empty() {
            return Err(TransportError::Validation(
                "job_description must not be empty".to_string(),
            ));
        }

        let _guard = self.begin_request()?;
        let url = format!("{}{}", self.base_url, ATS_ANALYZE_ENDPOINT);

        let pdf_part = Part::bytes(pdf.bytes)
            .file_name(pdf.file_name)
            .mime_str("application/pdf")
            .map_err(|_| TransportError::Validation("could not attach PDF part".to_string()))?;
        let form = Form::new()
            .part("pdf_file", pdf_part)
            .text("job_description", job_description.to_string())
            .text("analysis_type", analysis_type.as_str());

        info!("Calling ATS analysis service: {}", url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| self.network_error(err))?;

        let status = response.status();
        debug!("Response status: {}", status);
        let body = response
            .text()
            .await
            .map_err(|err| self.network_error(err))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|err| {
            TransportError::MalformedResponse(format!("could not parse analysis response: {err}"))
        })
    }

    /// Backend availability probe.
    pub async fn health(&self) -> Result<HealthResponse, TransportError> {
        let _guard = self.begin_request()?;
        let url = format!("{}{}", self.base_url, HEALTH_ENDPOINT);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.network_error(err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.network_error(err))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|err| {
            TransportError::MalformedResponse(format!("could not parse health response: {err}"))
        })
    }

    async fn post_for_html(
        &self,
        endpoint: &str,
        payload: &Value,
    ) -> Result<String, TransportError> {
        let _guard = self.begin_request()?;
        let url = format!("{}{}", self.base_url, endpoint);
        info!("Calling generation service: {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|err| self.network_error(err))?;

        let status = response.status();
        debug!("Response status: {}", status);
        let body = response
            .text()
            .await
            .map_err(|err| self.network_error(err))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }
        check_document_shape(body)
    }

    // One request in flight per client: user actions are serialized by the
    // front-end, and programmatic callers get the same contract.
    fn begin_request(&self) -> Result<RequestGuard<'_>, TransportError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(TransportError::RequestInFlight);
        }
        Ok(RequestGuard {
            flag: &self.in_flight,
        })
    }

    fn network_error(&self, err: reqwest::Error) -> TransportError {
        warn!("Request to {} failed: {}", self.base_url, err);
        TransportError::Network {
            base_url: self.base_url.clone(),
        }
    }
}

struct RequestGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn validate_pdf(pdf: &PdfUpload) -> Result<(), TransportError> {
    if !pdf.file_name.to_lowercase().ends_with(".pdf") {
        return Err(TransportError::Validation(format!(
            "please select a PDF file, got: {}",
            pdf.file_name
        )));
    }
    if !pdf.bytes.starts_with(b"%PDF") {
        return Err(TransportError::Validation(format!(
            "{} does not look like a PDF file",
            pdf.file_name
        )));
    }
    Ok(())
}

/// Map a non-success response to a server error, preferring the backend's
/// `{"error": ...}` body when it parses.
fn classify_failure(status: u16, body: &str) -> TransportError {
    let message = serde_json::from_str::<ServerErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unknown server error".to_string()
            } else {
                trimmed.to_string()
            }
        });
    TransportError::Server { status, message }
}

fn check_document_shape(body: String) -> Result<String, TransportError> {
    if body.trim().is_empty() {
        return Err(TransportError::MalformedResponse(
            "empty response body".to_string(),
        ));
    }
    if body.len() <= MIN_DOCUMENT_LEN {
        return Err(TransportError::MalformedResponse(format!(
            "response too short to be a document ({} bytes)",
            body.len()
        )));
    }
    Ok(body)
}
