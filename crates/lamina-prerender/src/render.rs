//! The render seam: an opaque per-route render call and its result types.

use std::fmt;

use serde::Serialize;

/// Broad classification of an HTTP-style render failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpErrorKind {
    NotFound,
    ServerError,
    Timeout,
    Other,
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::ServerError => "server error",
            Self::Timeout => "timeout",
            Self::Other => "error",
        };
        f.write_str(name)
    }
}

/// A successfully rendered document.
#[derive(Debug, Clone)]
pub struct RenderedDoc {
    /// Document bytes to persist.
    pub bytes: Vec<u8>,

    /// Outbound route links discovered in the document, as found
    /// (normalization happens at the queue boundary).
    pub links: Vec<String>,
}

/// A render failure as reported by the renderer itself.
///
/// The renderer knows what went wrong but not which route it was asked
/// about or why; the orchestrator attaches path and referrer to form a
/// [`RenderFailure`].
#[derive(Debug, Clone)]
pub struct RenderError {
    pub kind: HttpErrorKind,
    pub message: String,
}

impl RenderError {
    pub fn new(kind: HttpErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A render failure in build context: which route failed, and from where
/// it was discovered.
#[derive(Debug, Clone, Serialize)]
pub struct RenderFailure {
    pub kind: HttpErrorKind,
    pub message: String,
    pub path: String,
    pub referrer: Option<String>,
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.kind, self.message)?;
        if let Some(referrer) = &self.referrer {
            write!(f, " (linked from {})", referrer)?;
        }
        Ok(())
    }
}

/// External render function.
///
/// One call per route, single attempt, no retry: a broken render is a
/// build defect, not a transient condition. Implementations must be safe
/// to call from multiple worker threads.
pub trait Renderer: Send + Sync {
    fn render(&self, path: &str) -> Result<RenderedDoc, RenderError>;
}
