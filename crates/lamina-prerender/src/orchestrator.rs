//! Build orchestrator: drives route resolution, rendering, classification,
//! and output writing for one build run.
//!
//! The build moves through `Idle -> Resolving -> Rendering -> {Aborted |
//! Completed}`. Renders run on a bounded blocking-task pool; the
//! orchestrator task is the single writer of the queue, the seen-set, and
//! the report, and consumes results in completion order. After the first
//! Abort no new renders are submitted and in-flight results are drained
//! and discarded.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::task::JoinSet;

use crate::policy::{Decision, ErrorPolicy};
use crate::render::{RenderError, RenderFailure, RenderedDoc, Renderer};
use crate::report::BuildReport;
use crate::route::{normalize_route, resolve_entries, EntryError, Route, RouteQueue};
use crate::writer::{OutputWriter, WriteError};

/// Orchestrator phases across one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    Resolving,
    Rendering,
    Aborted,
    Completed,
}

/// Immutable configuration for one build run.
#[derive(Debug, Clone)]
pub struct PrerenderConfig {
    /// Entry patterns: exact routes, explicit globs, or the bare `*`
    /// wildcard enabling crawl discovery from the site root.
    pub entries: Vec<String>,

    /// Output root for rendered documents.
    pub output_dir: PathBuf,

    /// File name of the SPA fallback document under the output root;
    /// `None` disables the fallback.
    pub fallback: Option<String>,

    /// Route whose rendered bytes become the fallback document.
    pub fallback_source: String,

    /// Maximum concurrent renders. `1` gives fully sequential behavior.
    pub concurrency: usize,

    /// Route listing used to resolve explicit glob entries, typically the
    /// origin's listable routes.
    pub known_routes: Vec<String>,
}

impl Default for PrerenderConfig {
    fn default() -> Self {
        Self {
            entries: vec!["*".to_string()],
            output_dir: PathBuf::from("build"),
            fallback: Some("index.html".to_string()),
            fallback_source: "/".to_string(),
            concurrency: 8,
            known_routes: Vec::new(),
        }
    }
}

/// Fatal build errors.
#[derive(Debug, thiserror::Error)]
pub enum PrerenderError {
    #[error("configuration error: {0}")]
    Config(#[from] EntryError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("render task failed: {0}")]
    Task(String),

    /// The build hit an Abort-classified failure. Carries the report
    /// accumulated up to the abort so callers can still surface counts
    /// and the first abort cause.
    #[error("build aborted: {failure}")]
    Aborted {
        failure: RenderFailure,
        report: BuildReport,
    },
}

/// Drives one build from entry resolution to the output tree.
pub struct Prerenderer<R: Renderer + 'static> {
    config: PrerenderConfig,
    policy: ErrorPolicy,
    writer: OutputWriter,
    renderer: Arc<R>,
    state: Mutex<BuildState>,
}

impl<R: Renderer + 'static> Prerenderer<R> {
    pub fn new(config: PrerenderConfig, policy: ErrorPolicy, renderer: R) -> Self {
        let writer = OutputWriter::new(&config.output_dir);
        Self {
            config,
            policy,
            writer,
            renderer: Arc::new(renderer),
            state: Mutex::new(BuildState::Idle),
        }
    }

    /// Current build phase.
    pub fn state(&self) -> BuildState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: BuildState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        tracing::debug!(?state, "build state");
    }

    /// Run the build.
    ///
    /// Returns the report on `Completed`; an Abort-classified failure
    /// surfaces as [`PrerenderError::Aborted`]. Output written before the
    /// abort is left in place.
    pub async fn build(&self) -> Result<BuildReport, PrerenderError> {
        let start = Instant::now();
        self.set_state(BuildState::Resolving);
        tracing::debug!(entries = self.config.entries.len(), "resolving route set");

        let entry_set = resolve_entries(&self.config.entries, &self.config.known_routes)?;
        let crawl = entry_set.crawl;

        let mut queue = RouteQueue::new();
        for route in entry_set.routes {
            queue.push(route);
        }

        self.set_state(BuildState::Rendering);
        tracing::debug!(initial_routes = queue.len(), crawl, "rendering");

        let mut report = BuildReport::default();
        let mut fallback_bytes: Option<Vec<u8>> = None;
        let mut abort: Option<RenderFailure> = None;
        let concurrency = self.config.concurrency.max(1);
        let mut tasks: JoinSet<(Route, Result<RenderedDoc, RenderError>)> = JoinSet::new();

        loop {
            if abort.is_none() {
                while tasks.len() < concurrency {
                    let Some(route) = queue.pop() else { break };
                    let renderer = Arc::clone(&self.renderer);
                    tasks.spawn_blocking(move || {
                        let result = renderer.render(&route.path);
                        (route, result)
                    });
                }
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let (route, result) = joined.map_err(|e| PrerenderError::Task(e.to_string()))?;

            // Results that complete after the abort are discarded.
            if abort.is_some() {
                continue;
            }

            match result {
                Ok(doc) => self.complete_route(
                    &route,
                    doc,
                    crawl,
                    &mut queue,
                    &mut report,
                    &mut fallback_bytes,
                )?,
                Err(err) => self.classify_failure(&route, err, &mut report, &mut abort),
            }
        }

        if let Some(failure) = abort {
            self.set_state(BuildState::Aborted);
            report.abort = Some(failure.clone());
            report.duration_ms = start.elapsed().as_millis() as u64;
            return Err(PrerenderError::Aborted { failure, report });
        }

        if let Some(name) = &self.config.fallback {
            match &fallback_bytes {
                Some(bytes) => {
                    let path = self.writer.write_fallback(name, bytes)?;
                    report.written += 1;
                    tracing::debug!(path = %path.display(), "wrote fallback document");
                }
                None => tracing::warn!(
                    source = %self.config.fallback_source,
                    "fallback source was never rendered; skipping fallback document"
                ),
            }
        }

        self.set_state(BuildState::Completed);
        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            rendered = report.rendered,
            written = report.written,
            warned = report.warned,
            ignored = report.ignored,
            duration_ms = report.duration_ms,
            "prerender finished"
        );
        Ok(report)
    }

    fn complete_route(
        &self,
        route: &Route,
        doc: RenderedDoc,
        crawl: bool,
        queue: &mut RouteQueue,
        report: &mut BuildReport,
        fallback_bytes: &mut Option<Vec<u8>>,
    ) -> Result<(), PrerenderError> {
        if crawl {
            for link in &doc.links {
                if let Some(path) = normalize_route(link) {
                    if queue.push(Route::crawled(path.clone(), route.path.clone())) {
                        tracing::debug!(route = %path, referrer = %route.path, "discovered route");
                    }
                }
            }
        }

        let path = self.writer.write_document(&route.path, &doc.bytes)?;
        if self.config.fallback.is_some() && route.path == self.config.fallback_source {
            *fallback_bytes = Some(doc.bytes);
        }

        report.rendered += 1;
        report.written += 1;
        tracing::debug!(route = %route.path, output = %path.display(), "rendered");
        Ok(())
    }

    fn classify_failure(
        &self,
        route: &Route,
        err: RenderError,
        report: &mut BuildReport,
        abort: &mut Option<RenderFailure>,
    ) {
        let failure = RenderFailure {
            kind: err.kind,
            message: err.message,
            path: route.path.clone(),
            referrer: route.referrer.clone(),
        };

        match self.policy.classify(&failure) {
            Decision::Ignore => {
                report.ignored += 1;
                tracing::debug!(route = %failure.path, "ignored render failure: {}", failure);
            }
            Decision::Warn => {
                report.warned += 1;
                tracing::warn!("{}", failure);
            }
            Decision::Abort => {
                tracing::error!("{}", failure);
                *abort = Some(failure);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::origin::StaticDirRenderer;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Origin with `/`, `/about`, and a dangling link to `/hidden`.
    fn seed_origin(root: &Path) {
        write(
            root,
            "index.html",
            r#"<html><a href="/about">about</a> <a href="/hidden">hidden</a></html>"#,
        );
        write(root, "about/index.html", "<html>about</html>");
    }

    fn config(origin: &Path, out: &Path) -> PrerenderConfig {
        PrerenderConfig {
            entries: vec!["/".to_string(), "/about".to_string(), "*".to_string()],
            output_dir: out.to_path_buf(),
            fallback: Some("fallback.html".to_string()),
            fallback_source: "/".to_string(),
            concurrency: 4,
            known_routes: StaticDirRenderer::new(origin).list_routes(),
        }
    }

    #[tokio::test]
    async fn lenient_build_completes_with_warning() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        let out = temp.path().join("build");
        seed_origin(&origin);

        let prerenderer = Prerenderer::new(
            config(&origin, &out),
            ErrorPolicy::lenient(),
            StaticDirRenderer::new(&origin),
        );
        let report = prerenderer.build().await.unwrap();

        assert_eq!(report.rendered, 2);
        assert_eq!(report.warned, 1);
        assert_eq!(report.ignored, 0);
        // Two documents plus the fallback.
        assert_eq!(report.written, 3);
        assert!(out.join("index.html").exists());
        assert!(out.join("about/index.html").exists());
        assert!(out.join("fallback.html").exists());
        assert!(!out.join("hidden/index.html").exists());
    }

    #[tokio::test]
    async fn strict_build_aborts_and_keeps_partial_output() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        let out = temp.path().join("build");
        seed_origin(&origin);

        let mut cfg = config(&origin, &out);
        cfg.concurrency = 1;

        let prerenderer =
            Prerenderer::new(cfg, ErrorPolicy::strict(), StaticDirRenderer::new(&origin));
        let err = prerenderer.build().await.unwrap_err();

        match err {
            PrerenderError::Aborted { failure, report } => {
                assert_eq!(failure.path, "/hidden");
                assert_eq!(failure.referrer.as_deref(), Some("/"));
                // The report accumulated before the abort survives.
                assert_eq!(report.rendered, 2);
                assert_eq!(
                    report.abort.as_ref().map(|f| f.path.as_str()),
                    Some("/hidden")
                );
            }
            other => panic!("expected abort, got {other:?}"),
        }

        // Successes before the abort stay in place; nothing rolled back.
        assert!(out.join("index.html").exists());
        assert!(!out.join("hidden/index.html").exists());
        assert!(!out.join("fallback.html").exists());
    }

    #[tokio::test]
    async fn ignore_rule_overrides_strict_default() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        let out = temp.path().join("build");
        write(
            &origin,
            "index.html",
            r#"<html><a href="/og-image.png">og</a></html>"#,
        );

        let policy =
            ErrorPolicy::new([("/og-image.png", Decision::Ignore)], Decision::Abort).unwrap();
        let mut cfg = config(&origin, &out);
        cfg.entries = vec!["*".to_string()];

        let prerenderer = Prerenderer::new(cfg, policy, StaticDirRenderer::new(&origin));
        let report = prerenderer.build().await.unwrap();

        assert_eq!(report.rendered, 1);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.warned, 0);
    }

    #[tokio::test]
    async fn crawl_handles_link_cycles() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        let out = temp.path().join("build");
        write(&origin, "index.html", r#"<a href="/a">a</a>"#);
        write(&origin, "a/index.html", r#"<a href="/">home</a> <a href="/a">self</a>"#);

        let mut cfg = config(&origin, &out);
        cfg.entries = vec!["*".to_string()];

        let prerenderer = Prerenderer::new(
            cfg,
            ErrorPolicy::lenient(),
            StaticDirRenderer::new(&origin),
        );
        let report = prerenderer.build().await.unwrap();

        assert_eq!(report.rendered, 2);
        assert_eq!(report.warned, 0);
    }

    #[tokio::test]
    async fn explicit_glob_entry_with_no_matches_fails_before_rendering() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        let out = temp.path().join("build");
        fs::create_dir_all(&origin).unwrap();

        let mut cfg = config(&origin, &out);
        cfg.entries = vec!["/docs/*".to_string()];
        cfg.known_routes = Vec::new();

        let prerenderer = Prerenderer::new(
            cfg,
            ErrorPolicy::lenient(),
            StaticDirRenderer::new(&origin),
        );
        let err = prerenderer.build().await.unwrap_err();

        assert!(matches!(err, PrerenderError::Config(_)));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn state_machine_reaches_terminal_states() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        let out = temp.path().join("build");
        seed_origin(&origin);

        let prerenderer = Prerenderer::new(
            config(&origin, &out),
            ErrorPolicy::lenient(),
            StaticDirRenderer::new(&origin),
        );
        assert_eq!(prerenderer.state(), BuildState::Idle);
        prerenderer.build().await.unwrap();
        assert_eq!(prerenderer.state(), BuildState::Completed);

        let strict = Prerenderer::new(
            config(&origin, &out),
            ErrorPolicy::strict(),
            StaticDirRenderer::new(&origin),
        );
        strict.build().await.unwrap_err();
        assert_eq!(strict.state(), BuildState::Aborted);
    }

    #[tokio::test]
    async fn rebuild_produces_identical_output() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        let out = temp.path().join("build");
        seed_origin(&origin);

        let prerenderer = Prerenderer::new(
            config(&origin, &out),
            ErrorPolicy::lenient(),
            StaticDirRenderer::new(&origin),
        );
        prerenderer.build().await.unwrap();
        let first = fs::read(out.join("index.html")).unwrap();

        prerenderer.build().await.unwrap();
        let second = fs::read(out.join("index.html")).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn sequential_build_conforms() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        let out = temp.path().join("build");
        seed_origin(&origin);

        let mut cfg = config(&origin, &out);
        cfg.concurrency = 1;

        let prerenderer = Prerenderer::new(
            cfg,
            ErrorPolicy::lenient(),
            StaticDirRenderer::new(&origin),
        );
        let report = prerenderer.build().await.unwrap();

        assert_eq!(report.rendered, 2);
        assert_eq!(report.warned, 1);
    }
}
