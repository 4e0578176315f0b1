//! Build report accumulated across all routes.

use serde::Serialize;

use crate::render::RenderFailure;

/// Aggregate counts for one build run.
///
/// `rendered` counts routes whose document exists in the output tree;
/// Ignore-classified failures count only toward `ignored`. `written`
/// additionally counts the fallback document.
#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    /// Routes rendered successfully.
    pub rendered: usize,

    /// Files written under the output root (documents plus fallback).
    pub written: usize,

    /// Failures classified Warn.
    pub warned: usize,

    /// Failures classified Ignore.
    pub ignored: usize,

    /// Total build time in milliseconds.
    pub duration_ms: u64,

    /// First Abort-classified failure, if the build was aborted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<RenderFailure>,
}

impl BuildReport {
    /// Whether the build finished without a fatal failure.
    pub fn is_clean(&self) -> bool {
        self.abort.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HttpErrorKind;

    #[test]
    fn serializes_without_abort_field_when_clean() {
        let report = BuildReport {
            rendered: 2,
            written: 3,
            warned: 1,
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"rendered\":2"));
        assert!(!json.contains("abort"));
    }

    #[test]
    fn serializes_abort_cause() {
        let report = BuildReport {
            abort: Some(RenderFailure {
                kind: HttpErrorKind::ServerError,
                message: "boom".to_string(),
                path: "/broken".to_string(),
                referrer: None,
            }),
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"path\":\"/broken\""));
        assert!(json.contains("server_error"));
    }
}
