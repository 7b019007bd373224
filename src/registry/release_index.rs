//! Release index listing
//!
//! A release index is a JSON object keyed by release line, for example the
//! PHP for Windows `releases.json`:
//!
//! ```json
//! { "8.3": { "version": "8.3.15", "nts-vs16-x64": { ... } },
//!   "8.2": { "version": "8.2.27", ... } }
//! ```

use crate::error::SourceError;
use crate::registry::HttpClient;
use serde_json::Value;

/// Fetch the current version of every line in the index
pub async fn fetch_index_versions(
    client: &HttpClient,
    url: &str,
    service: &str,
) -> Result<Vec<String>, SourceError> {
    let body = client.get_json(url, service).await?;
    index_versions(&body, service)
}

fn index_versions(body: &Value, service: &str) -> Result<Vec<String>, SourceError> {
    let lines = body
        .as_object()
        .ok_or_else(|| SourceError::invalid_response(service, "expected a JSON object"))?;

    Ok(lines
        .values()
        .filter_map(|line| line.get("version").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}
