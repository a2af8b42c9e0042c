use crate::domain::enrichment::{ContentFetcher, EnrichmentOutcome, EntryMetadata};
use crate::domain::error::{DomainError, DomainResult};
use reqwest::header::{CONTENT_LANGUAGE, CONTENT_TYPE};
use select::document::Document;
use select::predicate::Name;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Fetches articles over HTTP and derives their metadata from headers and HTML
#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    client: reqwest::blocking::Client,
}

impl HttpContentFetcher {
    pub fn new(timeout_milliseconds: u64, user_agent: &str) -> DomainResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_milliseconds))
            .user_agent(user_agent)
            .build()
            .map_err(|e| DomainError::EnrichmentFailure(format!("Cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl ContentFetcher for HttpContentFetcher {
    #[instrument(skip(self), level = "debug")]
    fn fetch(&self, url: &str) -> EnrichmentOutcome {
        let response = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);
                return EnrichmentOutcome::Failed(e.to_string());
            }
        };

        if !response.status().is_success() {
            warn!("Fetch of {} returned {}", url, response.status());
            return EnrichmentOutcome::Failed(format!("HTTP status {}", response.status()));
        }

        let final_url = response.url().clone();
        let content_type = header_value(&response, CONTENT_TYPE);
        let content_language = header_value(&response, CONTENT_LANGUAGE);

        let is_html = content_type
            .as_deref()
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);

        let body = if is_html {
            match response.text() {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!("Cannot read body of {}: {}", url, e);
                    None
                }
            }
        } else {
            None
        };

        let metadata = extract_metadata(
            content_type.as_deref(),
            content_language.as_deref(),
            &final_url,
            body.as_deref(),
        );
        let outcome = EnrichmentOutcome::from_metadata(metadata);
        debug!("Enrichment of {}: {}", url, outcome.label());
        outcome
    }
}

fn header_value(
    response: &reqwest::blocking::Response,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Derive entry metadata from response headers and an optional HTML body
pub fn extract_metadata(
    content_type: Option<&str>,
    content_language: Option<&str>,
    final_url: &Url,
    body: Option<&str>,
) -> EntryMetadata {
    let mimetype = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_lowercase())
        .filter(|ct| !ct.is_empty());

    let header_language = content_language
        .and_then(|l| l.split(',').next())
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());

    let mut metadata = EntryMetadata {
        mimetype,
        language: header_language.clone(),
        ..Default::default()
    };

    if metadata
        .mimetype
        .as_deref()
        .is_some_and(|m| m.starts_with("image/"))
    {
        metadata.preview_picture = Some(final_url.to_string());
        return metadata;
    }

    let Some(body) = body else {
        return metadata;
    };
    let document = Document::from(body);

    metadata.title = meta_content(&document, "property", "og:title").or_else(|| {
        document
            .find(Name("title"))
            .next()
            .map(|n| n.text().trim().to_owned())
            .filter(|t| !t.is_empty())
    });

    metadata.preview_picture = meta_content(&document, "property", "og:image")
        .or_else(|| meta_content(&document, "name", "twitter:image"))
        .or_else(|| meta_content(&document, "property", "twitter:image"))
        .and_then(|src| final_url.join(&src).ok())
        .map(|u| u.to_string());

    metadata.language = document
        .find(Name("html"))
        .next()
        .and_then(|n| n.attr("lang"))
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .or_else(|| meta_content(&document, "http-equiv", "content-language"))
        .or_else(|| meta_content(&document, "property", "og:locale"))
        .or(header_language);

    metadata
}

/// `content` of the first `<meta>` whose `attr` equals `value`, ignoring case
fn meta_content(document: &Document, attr: &str, value: &str) -> Option<String> {
    document
        .find(Name("meta"))
        .filter(|n| n.attr(attr).is_some_and(|a| a.eq_ignore_ascii_case(value)))
        .filter_map(|n| n.attr("content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
}
