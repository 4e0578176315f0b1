//! Output tree writer.
//!
//! Maps route paths to output files with a convention that round-trips:
//! the originating route is always recoverable from the output path.
//!
//! ```text
//! /             -> index.html
//! /about        -> about/index.html
//! /docs/intro   -> docs/intro/index.html
//! /og-image.png -> og-image.png
//! /index.html   -> index.html/index.html
//! ```
//!
//! A route whose final segment is literally `index.html` gets the
//! directory treatment so it cannot collide with the directory-index
//! file of its parent route; the mapping stays injective.

use std::fs;
use std::path::{Path, PathBuf};

/// Derive the output path (relative to the output root) for a route.
///
/// Routes whose last segment carries a file extension are written at their
/// literal path; everything else becomes a directory with an `index.html`.
pub fn output_rel_path(route: &str) -> PathBuf {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        return PathBuf::from("index.html");
    }

    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if last.contains('.') && last != "index.html" {
        PathBuf::from(trimmed)
    } else {
        Path::new(trimmed).join("index.html")
    }
}

/// Recover the route path from an output path relative to the output root.
///
/// Inverse of [`output_rel_path`]; returns `None` for paths that are not
/// valid UTF-8.
pub fn route_for_output(rel: &Path) -> Option<String> {
    let s = rel.to_str()?.replace('\\', "/");
    if s == "index.html" {
        return Some("/".to_string());
    }
    if let Some(stripped) = s.strip_suffix("/index.html") {
        return Some(format!("/{}", stripped));
    }
    Some(format!("/{}", s))
}

/// Writes rendered documents and the SPA fallback under an output root.
///
/// Writes are plain `create_dir_all` + `write`, so re-running a build with
/// identical inputs produces a byte-identical tree.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a rendered document, creating parent directories as needed.
    pub fn write_document(&self, route: &str, bytes: &[u8]) -> Result<PathBuf, WriteError> {
        let path = self.root.join(output_rel_path(route));
        self.write_file(&path, bytes)?;
        Ok(path)
    }

    /// Write the fallback document at a fixed name under the output root,
    /// used by the hosting layer for client-side-routed paths with no
    /// static file.
    pub fn write_fallback(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, WriteError> {
        let path = self.root.join(name);
        self.write_file(&path, bytes)?;
        Ok(path)
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, bytes).map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Errors from writing the output tree.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
