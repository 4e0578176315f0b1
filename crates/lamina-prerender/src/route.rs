//! Route set resolution and the crawl queue.

use std::collections::{HashSet, VecDeque};

use crate::pattern::{PathPattern, PatternError};

/// How a route entered the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOrigin {
    /// Declared in the entry list.
    Entry,
    /// Found as a link inside a rendered document.
    Crawled,
}

/// A statically renderable route.
///
/// Unique by `path` within a build; immutable once created.
#[derive(Debug, Clone)]
pub struct Route {
    /// URL path, rooted and without a trailing slash (except `/` itself).
    pub path: String,

    /// The path that linked to this route, when known.
    pub referrer: Option<String>,

    pub origin: DiscoveryOrigin,
}

impl Route {
    pub fn entry(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            referrer: None,
            origin: DiscoveryOrigin::Entry,
        }
    }

    pub fn crawled(path: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            referrer: Some(referrer.into()),
            origin: DiscoveryOrigin::Crawled,
        }
    }
}

/// Breadth-first route queue with a seen-set keyed by path.
///
/// Re-discovering a path is a no-op, so the first-seen referrer is the one
/// that sticks and crawl cycles terminate.
#[derive(Debug, Default)]
pub struct RouteQueue {
    queue: VecDeque<Route>,
    seen: HashSet<String>,
}

impl RouteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a route. Returns `false` if the path was already seen.
    pub fn push(&mut self, route: Route) -> bool {
        if !self.seen.insert(route.path.clone()) {
            return false;
        }
        self.queue.push_back(route);
        true
    }

    pub fn pop(&mut self) -> Option<Route> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// The result of resolving the declared entry patterns.
#[derive(Debug)]
pub struct EntrySet {
    /// Initial routes, in declaration order, deduplicated by path.
    pub routes: Vec<Route>,

    /// Whether a `*` entry was declared, enabling crawl discovery.
    pub crawl: bool,
}

/// Resolve entry patterns into the initial route set.
///
/// The bare `*` wildcard seeds the crawl from the site root. Explicit glob
/// patterns (e.g. `/docs/*`) are matched against `known_routes`, the
/// origin's listable routes; an explicit pattern matching nothing is a
/// configuration error, while an empty crawl is not.
pub fn resolve_entries(patterns: &[String], known_routes: &[String]) -> Result<EntrySet, EntryError> {
    if patterns.is_empty() {
        return Err(EntryError::NoEntries);
    }

    let mut routes = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut crawl = false;

    for raw in patterns {
        if raw == "*" {
            crawl = true;
            if seen.insert("/".to_string()) {
                routes.push(Route::entry("/"));
            }
            continue;
        }

        let pattern = PathPattern::parse(raw)?;
        if pattern.is_exact() {
            let path = normalize_route(raw).ok_or_else(|| EntryError::NoMatches(raw.clone()))?;
            if seen.insert(path.clone()) {
                routes.push(Route::entry(path));
            }
            continue;
        }

        let mut matched = false;
        for candidate in known_routes {
            if pattern.matches(candidate) {
                matched = true;
                if seen.insert(candidate.clone()) {
                    routes.push(Route::entry(candidate.clone()));
                }
            }
        }
        if !matched {
            return Err(EntryError::NoMatches(raw.clone()));
        }
    }

    Ok(EntrySet { routes, crawl })
}

/// Normalize a discovered link into a route path.
///
/// Returns `None` for links that leave the site (absolute URLs,
/// protocol-relative URLs, mail links) or that are not rooted. Query
/// strings and fragments are stripped; trailing slashes collapse so the
/// same document cannot be queued twice under two spellings.
pub fn normalize_route(link: &str) -> Option<String> {
    let link = link.split(['#', '?']).next().unwrap_or("");
    if link.is_empty() {
        return None;
    }
    if !link.starts_with('/') || link.starts_with("//") {
        return None;
    }

    let trimmed = link.trim_end_matches('/');
    if trimmed.is_empty() {
        Some("/".to_string())
    } else {
        Some(trimmed.to_string())
    }
}

/// Errors from resolving the entry declarations.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("no entry patterns declared")]
    NoEntries,

    #[error("entry pattern '{0}' matches zero routes")]
    NoMatches(String),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}
