use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use cv_client::{
    normalize, preview, AnalysisType, AppConfig, DocumentKind, DocumentStore, FileStore, PdfUpload,
    TransportClient, TransportError,
};

#[derive(Parser)]
#[command(name = "cvpreview")]
#[command(about = "Generate, preview and export resumes and cover letters")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a resume from a filled questionnaire
    Generate {
        #[arg(long, default_value = "cv_1")]
        template: String,
        /// Questionnaire answers, JSON or YAML
        #[arg(long)]
        questionnaire: PathBuf,
    },
    /// Generate a cover letter from job and applicant details
    CoverLetter {
        /// Job details, JSON or YAML
        #[arg(long)]
        job: PathBuf,
        /// Applicant details, JSON or YAML
        #[arg(long)]
        applicant: PathBuf,
    },
    /// Generate a resume tailored to a job description
    FromJob {
        /// Plain-text job description file
        #[arg(long)]
        job_description: PathBuf,
    },
    /// Run an ATS analysis of a PDF resume against a job description
    Ats {
        #[arg(long)]
        pdf: PathBuf,
        #[arg(long)]
        job_description: PathBuf,
        #[arg(long, value_enum, default_value = "match")]
        analysis_type: AnalysisType,
    },
    /// Print the most recently generated document
    Show {
        #[arg(long, value_enum)]
        kind: DocumentKind,
    },
    /// Export the most recently generated document to an HTML file
    Export {
        #[arg(long, value_enum)]
        kind: DocumentKind,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Wrap the document in the print shell
        #[arg(long)]
        print_shell: bool,
        /// Append a timestamp to the default filename
        #[arg(long)]
        timestamped: bool,
    },
    /// Check backend availability
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let documents = DocumentStore::new(FileStore::new(config.state_dir.clone()));

    match cli.command {
        Command::Generate {
            template,
            questionnaire,
        } => {
            let answers = read_structured(&questionnaire)?;
            validate_questionnaire(&answers)?;
            let client = TransportClient::new(&config)?;
            let raw = client.generate_cv(&template, &answers).await?;
            finish_generation(&documents, DocumentKind::Resume, &raw, Some(&template))?;
        }
        Command::CoverLetter { job, applicant } => {
            let job = read_structured(&job)?;
            let applicant = read_structured(&applicant)?;
            validate_cover_letter(&job, &applicant)?;
            let client = TransportClient::new(&config)?;
            let raw = client.generate_cover_letter(&job, &applicant).await?;
            finish_generation(&documents, DocumentKind::CoverLetter, &raw, None)?;
        }
        Command::FromJob { job_description } => {
            let description = read_text(&job_description)?;
            let client = TransportClient::new(&config)?;
            let raw = client.generate_resume_from_job(&description).await?;
            finish_generation(&documents, DocumentKind::Resume, &raw, None)?;
        }
        Command::Ats {
            pdf,
            job_description,
            analysis_type,
        } => {
            let upload = read_pdf(&pdf)?;
            let description = read_text(&job_description)?;
            let client = TransportClient::new(&config)?;
            let analysis = client
                .ats_analyze(upload, &description, analysis_type)
                .await?;

            // The analysis arrives as model-produced HTML; give it the
            // same cleanup as generated documents before display.
            let result = normalize(&analysis.response);
            log_warnings(&result.warnings);
            println!("{}", result.html);
        }
        Command::Show { kind } => {
            let doc = load_or_explain(&documents, kind)?;
            println!("{}", doc.sanitized_html);
        }
        Command::Export {
            kind,
            output,
            print_shell,
            timestamped,
        } => {
            let doc = load_or_explain(&documents, kind)?;
            let path = output.unwrap_or_else(|| {
                if timestamped {
                    preview::timestamped_export_path(Path::new("."), kind)
                } else {
                    PathBuf::from(kind.export_file_name())
                }
            });

            if print_shell {
                let shell = preview::printable_document(&doc.sanitized_html, kind.title());
                preview::write_html(&path, &shell).await?;
            } else {
                preview::export_html(&doc, &path).await?;
            }
            println!("✓ Exported {} to {}", kind.title(), path.display());
        }
        Command::Health => {
            let client = TransportClient::new(&config)?;
            let health = client.health().await?;
            println!("✓ Backend {} is {}", client.base_url(), health.status);
            if !health.templates.is_empty() {
                println!("  Templates: {}", health.templates.join(", "));
            }
        }
    }

    Ok(())
}

/// Normalize, cache, and report one successful generation.
fn finish_generation(
    documents: &DocumentStore<FileStore>,
    kind: DocumentKind,
    raw: &str,
    template: Option<&str>,
) -> Result<()> {
    let result = normalize(raw);
    log_warnings(&result.warnings);
    documents.store_document(kind, &result.html, template)?;
    println!(
        "✓ {} generated ({} bytes). Run `cvpreview show --kind {}` to view it.",
        kind.title(),
        result.html.len(),
        kind.file_stem()
    );
    Ok(())
}

fn log_warnings(warnings: &[String]) {
    for warning in warnings {
        warn!("Sanitizer: {}", warning);
    }
}

fn load_or_explain(
    documents: &DocumentStore<FileStore>,
    kind: DocumentKind,
) -> Result<cv_client::GeneratedDocument> {
    documents.load_document(kind)?.ok_or_else(|| {
        anyhow::anyhow!(
            "No {} found. Please generate a {} first.",
            kind.title().to_lowercase(),
            kind.title().to_lowercase()
        )
    })
}

/// Read a JSON or YAML file into an opaque JSON value.
fn read_structured(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "yaml" | "yml"))
        .unwrap_or(false);

    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON: {}", path.display()))
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

fn read_pdf(path: &Path) -> Result<PdfUpload> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("resume.pdf")
        .to_string();
    Ok(PdfUpload { file_name, bytes })
}

/// Required questionnaire fields, matching what the backend's form expects.
fn validate_questionnaire(answers: &Value) -> Result<()> {
    let personal_info = answers.get("personal_info").unwrap_or(&Value::Null);
    let missing = missing_fields(personal_info, "personal_info", &["full_name", "email"]);
    if !missing.is_empty() {
        return Err(TransportError::Validation(format!(
            "Please fill in required fields: {}",
            missing.join(", ")
        ))
        .into());
    }
    Ok(())
}

fn validate_cover_letter(job: &Value, applicant: &Value) -> Result<()> {
    let mut missing = missing_fields(job, "job", &["job_description", "company"]);
    missing.extend(missing_fields(
        applicant,
        "applicant",
        &["name", "designation", "email"],
    ));
    if !missing.is_empty() {
        return Err(TransportError::Validation(format!(
            "Please fill in required fields: {}",
            missing.join(", ")
        ))
        .into());
    }
    Ok(())
}

fn missing_fields(section_value: &Value, section: &str, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| {
            section_value
                .get(**field)
                .and_then(Value::as_str)
                .map_or(true, |text| text.trim().is_empty())
        })
        .map(|field| format!("{section}.{field}"))
        .collect()
}
