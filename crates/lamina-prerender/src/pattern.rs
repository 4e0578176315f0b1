//! Path patterns for entry declarations and error-policy rules.

use regex::Regex;

/// A path pattern, either an exact route or a glob containing `*`.
///
/// `*` matches any sequence of characters, including `/`, so `/docs/*`
/// covers the whole subtree under `/docs/`.
#[derive(Debug, Clone)]
pub enum PathPattern {
    Exact(String),
    Glob {
        raw: String,
        regex: Regex,
        /// Number of literal (non-wildcard) characters, used for specificity.
        literal: usize,
    },
}

impl PathPattern {
    /// Parse a pattern string.
    ///
    /// Patterns must be rooted (start with `/`); the bare `*` wildcard is
    /// also accepted and matches every route.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }

        if !raw.contains('*') {
            if !raw.starts_with('/') {
                return Err(PatternError::NotRooted(raw.to_string()));
            }
            return Ok(Self::Exact(raw.to_string()));
        }

        if raw != "*" && !raw.starts_with('/') {
            return Err(PatternError::NotRooted(raw.to_string()));
        }

        let mut source = String::from("^");
        let mut literal = 0;
        for (i, part) in raw.split('*').enumerate() {
            if i > 0 {
                source.push_str(".*");
            }
            source.push_str(&regex::escape(part));
            literal += part.len();
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| PatternError::Invalid {
            pattern: raw.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self::Glob {
            raw: raw.to_string(),
            regex,
            literal,
        })
    }

    /// Whether this pattern matches the given route path.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == path,
            Self::Glob { regex, .. } => regex.is_match(path),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }

    /// Specificity rank: exact patterns beat globs, longer literal text
    /// beats shorter. Compared lexicographically.
    pub fn specificity(&self) -> (usize, usize) {
        match self {
            Self::Exact(exact) => (1, exact.len()),
            Self::Glob { literal, .. } => (0, *literal),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(exact) => exact,
            Self::Glob { raw, .. } => raw,
        }
    }
}

/// Errors from parsing a path pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("empty path pattern")]
    Empty,

    #[error("pattern '{0}' must start with '/'")]
    NotRooted(String),

    #[error("invalid pattern '{pattern}': {message}")]
    Invalid { pattern: String, message: String },
}
