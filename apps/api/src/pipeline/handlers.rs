//! Axum route handler for the optimize trigger.

use axum::{
    extract::{Multipart, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, HeaderName, HeaderValue,
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::{OptimizeInput, PipelineOutcome};
use crate::state::AppState;

pub const DOWNLOAD_FILENAME: &str = "optimized_resume.pdf";
const PDF_MIME: &str = "application/pdf";
const MAX_NOTICE_LEN: usize = 300;

const MATCH_SCORE_HEADER: &str = "x-match-score";
const PAGE_COUNT_HEADER: &str = "x-page-count";
const NOTICES_HEADER: &str = "x-pipeline-notices";

/// Raw multipart fields before validation.
#[derive(Debug, Default)]
struct OptimizeForm {
    resume: Option<Bytes>,
    job_url: Option<String>,
}

/// POST /api/v1/optimize
///
/// Multipart form: `resume` (PDF file) and `job_url` (text).
/// Runs the full pipeline and answers with the rendered PDF as an attachment.
pub async fn handle_optimize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let input = OptimizeInput::new(form.resume, form.job_url)?;

    let outcome = state.pipeline.run(input).await?;
    info!(
        "Optimized resume ready: {} bytes from {} chars of resume text, page one {:.0}% full, {} notice(s)",
        outcome.document.bytes.len(),
        outcome.resume_text.len(),
        outcome.page_fill.first_page_fill * 100.0,
        outcome.notices.len()
    );

    Ok(download_response(outcome))
}

async fn read_form(mut multipart: Multipart) -> Result<OptimizeForm, AppError> {
    let mut form = OptimizeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form data: {e}")))?
    {
        match field.name() {
            Some("resume") => {
                let is_pdf = field.content_type() == Some(PDF_MIME)
                    || field
                        .file_name()
                        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
                        .unwrap_or(false);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid resume upload: {e}")))?;
                if !data.is_empty() && !is_pdf {
                    return Err(AppError::Validation(
                        "Only PDF resumes are accepted.".to_string(),
                    ));
                }
                form.resume = Some(data);
            }
            Some("job_url") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid job_url field: {e}")))?;
                form.job_url = Some(text);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn download_response(outcome: PipelineOutcome) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(PDF_MIME));
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""))
    {
        headers.insert(CONTENT_DISPOSITION, disposition);
    }
    headers.insert(
        HeaderName::from_static(PAGE_COUNT_HEADER),
        HeaderValue::from(outcome.document.page_count),
    );
    if let Ok(score) = HeaderValue::from_str(&format!("{:.4}", outcome.best_match.score)) {
        headers.insert(HeaderName::from_static(MATCH_SCORE_HEADER), score);
    }
    if !outcome.notices.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&notices_header(&outcome.notices)) {
            headers.insert(HeaderName::from_static(NOTICES_HEADER), value);
        }
    }

    (headers, outcome.document.bytes).into_response()
}

/// Notices as one JSON array of strings. Non-ASCII is written as `\uXXXX` escapes so the
/// value stays visible ASCII while the client still decodes the original text.
fn notices_header(notices: &[String]) -> String {
    let truncated: Vec<String> = notices
        .iter()
        .map(|n| n.chars().take(MAX_NOTICE_LEN).collect())
        .collect();
    let json = serde_json::Value::from(truncated).to_string();

    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        if (c as u32) < 0x7F {
            escaped.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    escaped
}
