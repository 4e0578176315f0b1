//! Filesystem-backed origin renderer.
//!
//! Serves pre-rendered documents from an origin directory laid out with
//! the same convention the output writer uses, so a route maps to a file
//! directly. Used by the CLI and as the reference renderer in tests; any
//! other origin (an SSR process, an HTTP upstream) plugs in through the
//! same [`Renderer`] trait.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::render::{HttpErrorKind, RenderError, RenderedDoc, Renderer};
use crate::writer::{output_rel_path, route_for_output};

fn href_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"href=["']([^"']+)["']"#).expect("href pattern is valid"))
}

/// Renderer that reads documents from a directory tree.
#[derive(Debug, Clone)]
pub struct StaticDirRenderer {
    root: PathBuf,
}

impl StaticDirRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Origin file candidates for a route: the writer's convention first,
    /// then the opposite interpretation, so a dotted directory name
    /// (`/v1.0` backed by `v1.0/index.html`) or an extensionless literal
    /// file still resolves. Routes ending in `index.html` resolve only at
    /// their escaped location and never shadow the parent's index file.
    fn candidates(&self, path: &str) -> Vec<PathBuf> {
        let primary = self.root.join(output_rel_path(path));
        let trimmed = path.trim_matches('/');
        let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
        if trimmed.is_empty() || last == "index.html" {
            return vec![primary];
        }

        let alternate = if last.contains('.') {
            self.root.join(trimmed).join("index.html")
        } else {
            self.root.join(trimmed)
        };
        vec![primary, alternate]
    }

    /// List every route present in the origin tree, sorted.
    ///
    /// Feeds explicit-glob entry resolution; the crawl does not consult
    /// this listing.
    pub fn list_routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let rel = e.path().strip_prefix(&self.root).ok()?;
                route_for_output(rel)
            })
            .collect();
        routes.sort();
        routes
    }
}

impl Renderer for StaticDirRenderer {
    fn render(&self, path: &str) -> Result<RenderedDoc, RenderError> {
        if !path.starts_with('/') {
            return Err(RenderError::new(
                HttpErrorKind::Other,
                format!("route '{}' is not rooted", path),
            ));
        }

        let mut found: Option<(PathBuf, Vec<u8>)> = None;
        for file in self.candidates(path) {
            if !file.is_file() {
                continue;
            }
            match fs::read(&file) {
                Ok(bytes) => {
                    found = Some((file, bytes));
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(RenderError::new(
                        HttpErrorKind::ServerError,
                        format!("failed to read {}: {}", file.display(), e),
                    ));
                }
            }
        }

        let Some((file, bytes)) = found else {
            return Err(RenderError::new(
                HttpErrorKind::NotFound,
                format!("no document for '{}' in origin", path),
            ));
        };

        let is_html = file.extension().and_then(|e| e.to_str()) == Some("html");
        let links = if is_html { extract_links(&bytes) } else { Vec::new() };

        Ok(RenderedDoc { bytes, links })
    }
}

/// Extract `href` targets from an HTML document, preserving first-seen
/// order and dropping duplicates. Offsite links are filtered at the queue
/// boundary, not here.
fn extract_links(bytes: &[u8]) -> Vec<String> {
    let html = String::from_utf8_lossy(bytes);
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for captures in href_regex().captures_iter(&html) {
        if let Some(href) = captures.get(1) {
            let href = href.as_str().to_string();
            if seen.insert(href.clone()) {
                links.push(href);
            }
        }
    }
    links
}
