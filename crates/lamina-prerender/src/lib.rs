//! Prerender orchestrator for static site builds.
//!
//! Discovers the set of statically renderable routes, invokes an opaque
//! render function per route, classifies failures against a declarative
//! policy, and writes the rendered documents (plus an SPA fallback) to an
//! output tree.

pub mod orchestrator;
pub mod origin;
pub mod pattern;
pub mod policy;
pub mod render;
pub mod report;
pub mod route;
pub mod writer;

pub use orchestrator::{BuildState, PrerenderConfig, PrerenderError, Prerenderer};
pub use origin::StaticDirRenderer;
pub use pattern::{PathPattern, PatternError};
pub use policy::{Decision, ErrorPolicy, PolicyRule};
pub use render::{HttpErrorKind, RenderError, RenderFailure, RenderedDoc, Renderer};
pub use report::BuildReport;
pub use route::{
    normalize_route, resolve_entries, DiscoveryOrigin, EntryError, EntrySet, Route, RouteQueue,
};
pub use writer::{output_rel_path, route_for_output, OutputWriter, WriteError};
