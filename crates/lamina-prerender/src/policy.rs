//! Error classification policy.

use serde::{Deserialize, Serialize};

use crate::pattern::{PathPattern, PatternError};
use crate::render::RenderFailure;

/// What to do with a classified render failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Count the failure but stay silent.
    Ignore,
    /// Count the failure and emit a diagnostic; the build continues.
    Warn,
    /// Terminate the build with this failure as the cause.
    Abort,
}

/// A single path-pattern rule.
#[derive(Debug, Clone)]
pub struct PolicyRule {
    pattern: PathPattern,
    pub decision: Decision,
}

impl PolicyRule {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Declarative failure policy: an ordered rule list plus a fallback
/// decision for unmatched paths.
///
/// Rules are consulted most-specific-first (exact beats glob, longer
/// literal text beats shorter); among rules of equal specificity the
/// first-declared rule wins, so declaration order is part of the policy's
/// identity.
#[derive(Debug, Clone)]
pub struct ErrorPolicy {
    rules: Vec<PolicyRule>,
    default: Decision,
}

impl ErrorPolicy {
    pub fn new<I, S>(rules: I, default: Decision) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (S, Decision)>,
        S: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .map(|(pattern, decision)| {
                Ok(PolicyRule {
                    pattern: PathPattern::parse(pattern.as_ref())?,
                    decision,
                })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;
        Ok(Self { rules, default })
    }

    /// Lenient policy: no rules, unmatched failures warn and continue.
    pub fn lenient() -> Self {
        Self {
            rules: Vec::new(),
            default: Decision::Warn,
        }
    }

    /// Strict policy: no rules, unmatched failures abort the build.
    pub fn strict() -> Self {
        Self {
            rules: Vec::new(),
            default: Decision::Abort,
        }
    }

    pub fn default_decision(&self) -> Decision {
        self.default
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Classify a failure. Pure: same failure and policy, same decision.
    pub fn classify(&self, failure: &RenderFailure) -> Decision {
        let mut best: Option<(Decision, (usize, usize))> = None;
        for rule in &self.rules {
            if !rule.pattern.matches(&failure.path) {
                continue;
            }
            let specificity = rule.pattern.specificity();
            let better = match best {
                Some((_, current)) => specificity > current,
                None => true,
            };
            if better {
                best = Some((rule.decision, specificity));
            }
        }
        best.map(|(decision, _)| decision).unwrap_or(self.default)
    }
}
