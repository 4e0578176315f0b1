//! Configuration check command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use lamina_bundle::AliasTable;
use lamina_prerender::{ErrorPolicy, PathPattern};

use crate::config;

/// Validate the configuration surface without rendering anything.
pub fn run(config_path: &Path) -> Result<()> {
    let cfg = config::load(config_path)?;

    for pattern in &cfg.site.entries {
        if pattern != "*" {
            PathPattern::parse(pattern)?;
        }
    }
    tracing::info!("{} entry pattern(s) ok", cfg.site.entries.len());

    let policy = ErrorPolicy::new(
        cfg.errors
            .rules
            .iter()
            .map(|rule| (rule.pattern.as_str(), rule.decision)),
        cfg.errors.default,
    )?;
    tracing::info!(
        "error policy ok: {} rule(s), default {:?}",
        policy.rules().len(),
        policy.default_decision()
    );

    let aliases = AliasTable::new(cfg.aliases.clone())?;
    aliases.check_targets(Path::new("."))?;
    tracing::info!("{} alias(es) ok", aliases.len());

    cfg.bundle.validate()?;
    tracing::info!(
        "bundle policy ok: {} chunk group(s), {} proxy rule(s)",
        cfg.bundle.manual_chunks.len(),
        cfg.bundle.proxy.len()
    );

    let origin = PathBuf::from(&cfg.site.origin);
    if !origin.exists() {
        tracing::warn!(
            "origin directory {} does not exist yet; 'lamina build' will fail until it does",
            origin.display()
        );
    }

    tracing::info!("Configuration ok");
    Ok(())
}
