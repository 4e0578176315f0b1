//! Configuration file structure (lamina.toml).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use lamina_bundle::BundlePolicy;
use lamina_prerender::Decision;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub site: SiteSection,
    pub errors: ErrorsSection,
    /// Logical import prefix -> physical directory.
    pub aliases: BTreeMap<String, String>,
    pub bundle: BundlePolicy,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Entry patterns; `*` crawls everything reachable from the root.
    pub entries: Vec<String>,

    /// Directory holding the origin documents to prerender from.
    pub origin: String,

    /// Output directory.
    pub output: String,

    /// SPA fallback file name under the output root.
    pub fallback: Option<String>,

    /// Route whose document becomes the fallback shell.
    pub fallback_source: String,

    /// Maximum concurrent renders.
    pub concurrency: usize,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            entries: vec!["*".to_string()],
            origin: "prerendered".to_string(),
            output: "build".to_string(),
            fallback: Some("index.html".to_string()),
            fallback_source: "/".to_string(),
            concurrency: 8,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ErrorsSection {
    /// Fallback decision for failures no rule matches.
    pub default: Decision,

    /// Rules in declaration order; order is part of the policy.
    pub rules: Vec<RuleEntry>,
}

impl Default for ErrorsSection {
    fn default() -> Self {
        Self {
            default: Decision::Warn,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RuleEntry {
    pub pattern: String,
    pub decision: Decision,
}

/// Load configuration from the given path if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}
