//! Build-time configuration consumed by the external bundler.
//!
//! The orchestrator validates and exposes this configuration; it never
//! executes module resolution, chunking, or minification itself.

pub mod alias;
pub mod policy;

pub use alias::{AliasEntry, AliasError, AliasTable};
pub use policy::{BundlePolicy, MinifyOptions, PolicyError, ProxyRule};
