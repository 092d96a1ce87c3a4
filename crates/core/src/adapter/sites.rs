//! Per-site input locator table
//!
//! An ordered list of `{hostContains, pathPrefix?, strategies}` rules. The
//! first rule whose host substring and optional path prefix match the page
//! wins; its strategies are tried in order until one yields an element.

use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dom::PageLocation;
use crate::errors::{DockError, Result};

/// Table shipped with the crate
const BUNDLED_SITES: &str = include_str!("sites.json");

/// One way of finding the input element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Strategy {
    /// First element matching `css`
    Selector { css: String },
    /// Elements matching `css` whose text contains `contains`; the first
    /// editable element at or below such a match is used
    TextScan { css: String, contains: String },
    /// Generic `form textarea`
    FormTextarea,
}

impl Strategy {
    /// Selector this strategy queries with
    pub fn css(&self) -> &str {
        match self {
            Strategy::Selector { css } | Strategy::TextScan { css, .. } => css,
            Strategy::FormTextarea => "form textarea",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRule {
    pub name:          String,
    pub host_contains: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix:   Option<String>,
    pub strategies:    Vec<Strategy>,
}

impl SiteRule {
    pub fn matches(&self, location: &PageLocation) -> bool {
        location
            .hostname
            .contains(&self.host_contains.to_ascii_lowercase())
            && self
                .path_prefix
                .as_deref()
                .map_or(true, |prefix| location.pathname.starts_with(prefix))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteTable {
    pub sites: Vec<SiteRule>,
}

impl SiteTable {
    /// Table embedded in the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_SITES)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let table: SiteTable = serde_json::from_str(text)
            .map_err(|e| DockError::ConfigError(format!("Invalid site table: {}", e)))?;
        for rule in &table.sites {
            if rule.host_contains.trim().is_empty() {
                return Err(DockError::ConfigError(format!(
                    "Site '{}' has an empty hostContains",
                    rule.name
                )));
            }
            for strategy in &rule.strategies {
                let css = strategy.css();
                Selector::parse(css).map_err(|e| {
                    DockError::ConfigError(format!("Site '{}' has an invalid selector '{}': {}", rule.name, css, e))
                })?;
            }
        }
        Ok(table)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let table = Self::from_json(&text)?;
        debug!(path = %path.display(), sites = table.sites.len(), "loaded site table");
        Ok(table)
    }

    /// External table when `path` is given, bundled otherwise
    pub async fn load_or_bundled(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Self::bundled(),
        }
    }

    pub fn rule_for(&self, location: &PageLocation) -> Option<&SiteRule> {
        self.sites.iter().find(|rule| rule.matches(location))
    }
}
