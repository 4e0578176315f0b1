//! Prerender build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use lamina_bundle::AliasTable;
use lamina_prerender::{
    BuildReport, Decision, ErrorPolicy, PrerenderConfig, PrerenderError, Prerenderer,
    StaticDirRenderer,
};

use crate::config;

/// Run the build command.
pub async fn run(
    config_path: &Path,
    output: Option<PathBuf>,
    strict: bool,
    report: Option<PathBuf>,
) -> Result<()> {
    let cfg = config::load(config_path)?;

    // The whole configuration surface is validated before any rendering;
    // a bad alias or proxy rule must not leave partial output behind.
    let aliases = AliasTable::new(cfg.aliases.clone())?;
    cfg.bundle.validate()?;
    if !aliases.is_empty() {
        tracing::debug!(aliases = aliases.len(), "alias table validated");
    }

    let default = if strict { Decision::Abort } else { cfg.errors.default };
    let policy = ErrorPolicy::new(
        cfg.errors
            .rules
            .iter()
            .map(|rule| (rule.pattern.as_str(), rule.decision)),
        default,
    )?;

    let origin = PathBuf::from(&cfg.site.origin);
    if !origin.exists() {
        anyhow::bail!("Origin directory not found: {}", origin.display());
    }
    let renderer = StaticDirRenderer::new(&origin);
    let known_routes = renderer.list_routes();

    let prerender_config = PrerenderConfig {
        entries: cfg.site.entries.clone(),
        output_dir: output.unwrap_or_else(|| PathBuf::from(&cfg.site.output)),
        fallback: cfg.site.fallback.clone(),
        fallback_source: cfg.site.fallback_source.clone(),
        concurrency: cfg.site.concurrency,
        known_routes,
    };

    tracing::info!("Prerendering from {}...", origin.display());
    let result = Prerenderer::new(prerender_config, policy, renderer)
        .build()
        .await;

    match result {
        Ok(summary) => {
            if summary.warned > 0 {
                tracing::warn!("Build completed with {} warning(s)", summary.warned);
            }
            tracing::info!(
                "Rendered {} route(s), wrote {} file(s) in {}ms",
                summary.rendered,
                summary.written,
                summary.duration_ms
            );
            if let Some(report_path) = &report {
                write_report(report_path, &summary)?;
            }
            Ok(())
        }
        // An aborted build still gets its report written: the abort cause
        // is part of the report.
        Err(PrerenderError::Aborted { failure, report: summary }) => {
            if let Some(report_path) = &report {
                write_report(report_path, &summary)?;
            }
            Err(anyhow::anyhow!("build aborted: {}", failure))
        }
        Err(other) => Err(other.into()),
    }
}

fn write_report(path: &Path, report: &BuildReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    tracing::info!("Wrote build report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn aborted_build_still_writes_requested_report() {
        let temp = tempfile::tempdir().unwrap();
        let origin = temp.path().join("prerendered");
        fs::create_dir_all(&origin).unwrap();
        fs::write(origin.join("index.html"), r#"<a href="/hidden">x</a>"#).unwrap();

        let config_path = temp.path().join("lamina.toml");
        fs::write(
            &config_path,
            format!(
                "[site]\nentries = [\"*\"]\norigin = {:?}\noutput = {:?}\n",
                origin,
                temp.path().join("build")
            ),
        )
        .unwrap();

        let report_path = temp.path().join("report.json");
        let err = run(&config_path, None, true, Some(report_path.clone()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/hidden"));

        let json = fs::read_to_string(&report_path).unwrap();
        assert!(json.contains("\"/hidden\""));
        assert!(json.contains("\"abort\""));
    }
}
