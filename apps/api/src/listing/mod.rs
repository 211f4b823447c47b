//! Job Listing Fetcher: downloads a job posting and reduces its HTML to visible text.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use reqwest::{Client, Url};
use tracing::info;

use crate::errors::AppError;
use crate::models::job::JobDescription;

#[async_trait]
pub trait JobFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<JobDescription, AppError>;
}

/// Plain unauthenticated GET. No timeout, no retry.
pub struct HttpJobFetcher {
    client: Client,
}

impl HttpJobFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobFetcher for HttpJobFetcher {
    async fn fetch(&self, url: &Url) -> Result<JobDescription, AppError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::JobFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::JobFetch(format!("{url} returned {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::JobFetch(e.to_string()))?;
        let text = html_to_text(&html);

        if text.is_empty() {
            return Err(AppError::EmptyJobDescription(format!(
                "{url} contains no readable text"
            )));
        }

        info!("Fetched job description: {} chars from {url}", text.len());
        Ok(JobDescription {
            source_url: url.to_string(),
            text,
        })
    }
}

/// Parses and validates a user-supplied job URL. Only http and https are accepted.
pub fn parse_job_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Validation(format!("Invalid job description URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Validation(format!(
            "Job description URL must use http or https, got '{other}'"
        ))),
    }
}

fn invisible_blocks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<template\b.*?</template\s*>|<head\b.*?</head\s*>",
        )
        .expect("invisible block pattern is valid")
    })
}

fn block_breaks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6]|tr|section|article|ul|ol)\s*>")
            .expect("block break pattern is valid")
    })
}

fn tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Strips markup and returns the visible text, one trimmed line per text run.
pub fn html_to_text(html: &str) -> String {
    let visible = invisible_blocks().replace_all(html, " ");
    let broken = block_breaks().replace_all(&visible, "\n");
    let stripped = tags().replace_all(&broken, " ");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn entities() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
            .expect("entity pattern is valid")
    })
}

/// Decodes named and numeric character references in one pass, so decoded output is
/// never decoded again. Unknown references are left as written.
fn decode_entities(text: &str) -> String {
    entities()
        .replace_all(text, |caps: &Captures| match decode_entity(&caps[1]) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code).filter(|c| !c.is_control() || c.is_whitespace());
    }

    let c = match body {
        "nbsp" => ' ',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "bull" => '•',
        "middot" => '·',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "euro" => '€',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use axum::{response::Html, routing::get, Router};

    use super::*;
    use crate::test_server;

    const LISTING: &str = r#"<!DOCTYPE html>
<html>
<head><title>Careers</title><style>.x { color: red; }</style></head>
<body>
  <script>window.track("view");</script>
  <h1>Senior Rust Engineer</h1>
  <!-- internal note -->
  <p>Build &amp; operate <b>distributed</b> systems.</p>
  <ul><li>5+ years Rust</li><li>Kubernetes &nbsp;a plus</li></ul>
  <noscript>Enable JavaScript</noscript>
</body>
</html>"#;

    #[test]
    fn test_html_to_text_keeps_visible_text_in_order() {
        let text = html_to_text(LISTING);
        assert_eq!(
            text,
            "Senior Rust Engineer\nBuild & operate distributed systems.\n5+ years Rust\nKubernetes a plus"
        );
    }

    #[test]
    fn test_html_to_text_drops_scripts_styles_and_comments() {
        let text = html_to_text(LISTING);
        assert!(!text.contains("track"));
        assert!(!text.contains("color"));
        assert!(!text.contains("internal note"));
        assert!(!text.contains("Enable JavaScript"));
        assert!(!text.contains("Careers"));
    }

    #[test]
    fn test_html_to_text_plain_text_passes_through() {
        assert_eq!(html_to_text("just text"), "just text");
    }

    #[test]
    fn test_html_to_text_markup_only_is_empty() {
        assert_eq!(html_to_text("<div><span></span></div>"), "");
    }

    #[test]
    fn test_decode_entities_does_not_double_decode() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&#38;amp;"), "&amp;");
    }

    #[test]
    fn test_decode_entities_numeric_references() {
        assert_eq!(
            decode_entities("We&#8217;re hiring &#x2019;now&#X2019; &#8226; remote"),
            "We’re hiring ’now’ • remote"
        );
        assert_eq!(decode_entities("it&#39;s &#x27;fine&#x27;"), "it's 'fine'");
    }

    #[test]
    fn test_decode_entities_leaves_unknown_and_invalid_alone() {
        assert_eq!(decode_entities("&bogus; &#xD800; &#0; AT&T"), "&bogus; &#xD800; &#0; AT&T");
    }

    async fn spawn_job_board() -> String {
        let router = Router::new()
            .route("/jobs/rust", get(|| async { Html(LISTING) }))
            .route(
                "/jobs/blank",
                get(|| async {
                    Html("<html><head><title>Loading</title></head><body><script>boot()</script></body></html>")
                }),
            );
        test_server::spawn(router).await
    }

    fn job_url(base: &str, path: &str) -> Url {
        Url::parse(&format!("{base}{path}")).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_visible_text() {
        let base = spawn_job_board().await;
        let url = job_url(&base, "/jobs/rust");

        let job = HttpJobFetcher::new(Client::new()).fetch(&url).await.unwrap();

        assert_eq!(job.source_url, url.to_string());
        assert!(job.text.starts_with("Senior Rust Engineer\n"));
        assert!(!job.text.contains('<'));
    }

    #[tokio::test]
    async fn test_fetch_page_without_text_is_empty_job_description() {
        let base = spawn_job_board().await;
        let result = HttpJobFetcher::new(Client::new())
            .fetch(&job_url(&base, "/jobs/blank"))
            .await;
        assert!(matches!(result, Err(AppError::EmptyJobDescription(_))));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_job_fetch_error() {
        let base = spawn_job_board().await;
        match HttpJobFetcher::new(Client::new())
            .fetch(&job_url(&base, "/jobs/closed"))
            .await
        {
            Err(AppError::JobFetch(msg)) => assert!(msg.contains("404"), "got {msg}"),
            other => panic!("expected JobFetch, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_job_url_accepts_https() {
        let url = parse_job_url("  https://jobs.example.com/rust-engineer ").unwrap();
        assert_eq!(url.host_str(), Some("jobs.example.com"));
    }

    #[test]
    fn test_parse_job_url_rejects_other_schemes() {
        assert!(matches!(
            parse_job_url("file:///etc/passwd"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_job_url("not a url"),
            Err(AppError::Validation(_))
        ));
    }
}
