//! Module alias table.
//!
//! Maps logical import prefixes (e.g. `$lib`) to physical directories.
//! Validated once at build start and handed read-only to the external
//! bundler's module-resolution step.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// One alias declaration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AliasEntry {
    pub prefix: String,
    pub target: PathBuf,
}

/// Validated alias table.
///
/// Prefixes are unique; nested prefixes (`$a` and `$a/b`) are legal and
/// resolve longest-prefix-first, so every specifier resolves unambiguously.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AliasTable {
    /// Entries sorted by descending prefix length for longest-match lookup.
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    /// Build and validate a table from `(prefix, target)` pairs.
    pub fn new<I, S, P>(pairs: I) -> Result<Self, AliasError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<PathBuf>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        for (prefix, target) in pairs {
            let prefix = prefix.into();
            if prefix.is_empty() {
                return Err(AliasError::EmptyPrefix);
            }
            if prefix.ends_with('/') {
                return Err(AliasError::TrailingSlash(prefix));
            }
            if !seen.insert(prefix.clone()) {
                return Err(AliasError::Duplicate(prefix));
            }
            entries.push(AliasEntry {
                prefix,
                target: target.into(),
            });
        }

        entries.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });

        Ok(Self { entries })
    }

    /// Resolve an import specifier against the table.
    ///
    /// A prefix matches only at a segment boundary: `$lib` resolves
    /// `$lib` and `$lib/util`, never `$library`. Returns `None` when no
    /// prefix applies; the bundler then falls back to its normal
    /// resolution.
    pub fn resolve(&self, specifier: &str) -> Option<PathBuf> {
        for entry in &self.entries {
            if specifier == entry.prefix {
                return Some(entry.target.clone());
            }
            if let Some(rest) = specifier.strip_prefix(&entry.prefix) {
                if let Some(rest) = rest.strip_prefix('/') {
                    return Some(entry.target.join(rest));
                }
            }
        }
        None
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate that every target exists under the given project root.
    pub fn check_targets(&self, root: &Path) -> Result<(), AliasError> {
        for entry in &self.entries {
            let target = root.join(&entry.target);
            if !target.exists() {
                return Err(AliasError::MissingTarget {
                    prefix: entry.prefix.clone(),
                    target: entry.target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Errors from validating an alias table.
#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    #[error("empty alias prefix")]
    EmptyPrefix,

    #[error("alias prefix '{0}' must not end with '/'")]
    TrailingSlash(String),

    #[error("duplicate alias prefix '{0}'")]
    Duplicate(String),

    #[error("alias '{prefix}' points at missing directory {target}")]
    MissingTarget { prefix: String, target: PathBuf },
}
