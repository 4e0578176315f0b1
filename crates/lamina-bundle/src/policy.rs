//! Declarative bundle policy.
//!
//! Chunk grouping, minification, sourcemap emission, and dev-proxy rules.
//! The policy is validated here and serialized for the external bundler,
//! which is the only component that acts on it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Minifier settings, terser-style.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MinifyOptions {
    pub enabled: bool,
    /// Strip `console.*` calls from production output.
    pub drop_console: bool,
    /// Strip `debugger` statements from production output.
    pub drop_debugger: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            drop_console: true,
            drop_debugger: true,
        }
    }
}

/// One development-proxy rule: requests under `prefix` forward to
/// `target`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyRule {
    pub prefix: String,
    pub target: String,
    #[serde(default = "default_true")]
    pub change_origin: bool,
}

fn default_true() -> bool {
    true
}

/// Declarative bundler settings, passed through opaquely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BundlePolicy {
    pub minify: MinifyOptions,

    /// Emit sourcemaps alongside production output.
    pub sourcemap: bool,

    /// Browser target passed to the bundler (e.g. `es2020`).
    pub target: String,

    /// Precompress output for the hosting layer; opaque to this tool.
    pub precompress: bool,

    /// Named chunk groups: group name -> module identifiers. BTreeMap so
    /// the serialized policy is deterministic.
    pub manual_chunks: BTreeMap<String, Vec<String>>,

    /// Dev-server proxy rules, in declaration order.
    pub proxy: Vec<ProxyRule>,
}

impl Default for BundlePolicy {
    fn default() -> Self {
        Self {
            minify: MinifyOptions::default(),
            sourcemap: false,
            target: "es2020".to_string(),
            precompress: false,
            manual_chunks: BTreeMap::new(),
            proxy: Vec::new(),
        }
    }
}

impl BundlePolicy {
    /// Validate the policy before the build starts.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.target.is_empty() {
            return Err(PolicyError::EmptyTarget);
        }

        for (name, modules) in &self.manual_chunks {
            if name.is_empty() {
                return Err(PolicyError::EmptyChunkName);
            }
            if modules.is_empty() {
                return Err(PolicyError::EmptyChunk(name.clone()));
            }
        }

        for rule in &self.proxy {
            if !rule.prefix.starts_with('/') {
                return Err(PolicyError::ProxyPrefixNotRooted(rule.prefix.clone()));
            }
            if !rule.target.contains("://") {
                return Err(PolicyError::ProxyTargetInvalid {
                    prefix: rule.prefix.clone(),
                    target: rule.target.clone(),
                });
            }
        }

        Ok(())
    }

    /// Serialize the normalized policy for the external bundler.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Errors from validating a bundle policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("bundle target must not be empty")]
    EmptyTarget,

    #[error("chunk group with empty name")]
    EmptyChunkName,

    #[error("chunk group '{0}' lists no modules")]
    EmptyChunk(String),

    #[error("proxy prefix '{0}' must start with '/'")]
    ProxyPrefixNotRooted(String),

    #[error("proxy rule for '{prefix}' has invalid target '{target}'")]
    ProxyTargetInvalid { prefix: String, target: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vendor_policy() -> BundlePolicy {
        let mut chunks = BTreeMap::new();
        chunks.insert(
            "vendor".to_string(),
            vec!["svelte".to_string(), "@sveltejs/kit".to_string()],
        );
        BundlePolicy {
            manual_chunks: chunks,
            proxy: vec![ProxyRule {
                prefix: "/api".to_string(),
                target: "http://localhost:8080".to_string(),
                change_origin: true,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_production_settings() {
        let policy = BundlePolicy::default();
        assert!(policy.minify.enabled);
        assert!(policy.minify.drop_console);
        assert!(!policy.sourcemap);
        assert_eq!(policy.target, "es2020");
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn valid_policy_passes_validation() {
        assert!(vendor_policy().validate().is_ok());
    }

    #[test]
    fn empty_chunk_group_is_rejected() {
        let mut policy = BundlePolicy::default();
        policy.manual_chunks.insert("vendor".to_string(), vec![]);
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::EmptyChunk(name)) if name == "vendor"
        ));
    }

    #[test]
    fn unrooted_proxy_prefix_is_rejected() {
        let mut policy = BundlePolicy::default();
        policy.proxy.push(ProxyRule {
            prefix: "api".to_string(),
            target: "http://localhost:8080".to_string(),
            change_origin: true,
        });
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::ProxyPrefixNotRooted(_))
        ));
    }

    #[test]
    fn proxy_target_must_carry_a_scheme() {
        let mut policy = BundlePolicy::default();
        policy.proxy.push(ProxyRule {
            prefix: "/api".to_string(),
            target: "localhost:8080".to_string(),
            change_origin: true,
        });
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::ProxyTargetInvalid { .. })
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let policy = vendor_policy();
        let json = policy.to_json().unwrap();
        assert!(json.contains("\"vendor\""));
        assert!(json.contains("\"change_origin\": true"));

        let parsed: BundlePolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, policy);
    }
}
