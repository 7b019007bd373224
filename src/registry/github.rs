//! GitHub tag and release listings
//!
//! API endpoints:
//! - Tags: {api_base}/repos/{repo}/tags
//! - Releases: {api_base}/repos/{repo}/releases
//!
//! Both are paged; `Link: rel="next"` targets are followed up to `MAX_PAGES`.

use crate::error::SourceError;
use crate::registry::HttpClient;
use serde_json::Value;
use tracing::{debug, warn};

/// Upper bound on listing pages followed through `rel="next"` links
pub const MAX_PAGES: usize = 30;

/// Fetch tag names of a repository, across every listing page
pub async fn fetch_tag_names(
    client: &HttpClient,
    url: &str,
    service: &str,
) -> Result<Vec<String>, SourceError> {
    fetch_all_pages(client, url, service, tag_names).await
}

/// Fetch tag names of published, non-prerelease releases, across every listing page
pub async fn fetch_release_tags(
    client: &HttpClient,
    url: &str,
    service: &str,
) -> Result<Vec<String>, SourceError> {
    fetch_all_pages(client, url, service, release_tags).await
}

async fn fetch_all_pages(
    client: &HttpClient,
    url: &str,
    service: &str,
    extract: fn(&Value, &str) -> Result<Vec<String>, SourceError>,
) -> Result<Vec<String>, SourceError> {
    let mut names = Vec::new();
    let mut next = Some(url.to_string());
    let mut pages = 0;

    while let Some(page_url) = next.take() {
        if pages == MAX_PAGES {
            warn!(service, pages, "listing truncated at page limit");
            break;
        }
        let (body, link) = client.get_github_page(&page_url, service).await?;
        names.extend(extract(&body, service)?);
        pages += 1;
        next = link;
    }

    debug!(service, pages, names = names.len(), "listing pages fetched");
    Ok(names)
}

/// Extract `name` from each element of a tags response
fn tag_names(body: &Value, service: &str) -> Result<Vec<String>, SourceError> {
    let items = as_array(body, service)?;
    Ok(items
        .iter()
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// Extract `tag_name` from each element of a releases response
fn release_tags(body: &Value, service: &str) -> Result<Vec<String>, SourceError> {
    let items = as_array(body, service)?;
    Ok(items
        .iter()
        .filter(|item| !flag(item, "draft") && !flag(item, "prerelease"))
        .filter_map(|item| item.get("tag_name").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

fn as_array<'a>(body: &'a Value, service: &str) -> Result<&'a Vec<Value>, SourceError> {
    body.as_array().ok_or_else(|| {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(|m| format!("expected a JSON array, got message '{}'", m))
            .unwrap_or_else(|| "expected a JSON array".to_string());
        SourceError::invalid_response(service, message)
    })
}

fn flag(item: &Value, key: &str) -> bool {
    item.get(key).and_then(Value::as_bool).unwrap_or(false)
}
