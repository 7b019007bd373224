//! Download URL templates

use crate::domain::Version;
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("valid placeholder regex"));

const KNOWN_PLACEHOLDERS: &[&str] = &["version", "major", "minor", "patch"];

/// A URL with `{version}`, `{major}`, `{minor}` and `{patch}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
}

impl UrlTemplate {
    /// Parse a template, rejecting unknown placeholders
    ///
    /// The template must identify the full version: either `{version}` or
    /// all of `{major}`, `{minor}` and `{patch}`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut used = Vec::new();
        for caps in PLACEHOLDER.captures_iter(raw) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            if !KNOWN_PLACEHOLDERS.contains(&name) {
                return Err(format!("unknown placeholder {{{}}}", name));
            }
            used.push(name);
        }
        let has_components = ["major", "minor", "patch"]
            .iter()
            .all(|part| used.contains(part));
        if !used.contains(&"version") && !has_components {
            return Err(
                "template must contain {version} or all of {major}, {minor} and {patch}"
                    .to_string(),
            );
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Render the template for a version
    pub fn render(&self, version: &Version) -> String {
        PLACEHOLDER
            .replace_all(&self.raw, |caps: &regex::Captures| match &caps[1] {
                "version" => version.to_string(),
                "major" => version.major().to_string(),
                "minor" => version.minor().to_string(),
                "patch" => version.patch().to_string(),
                other => format!("{{{}}}", other),
            })
            .into_owned()
    }
}
