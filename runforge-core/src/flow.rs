//! Flow descriptors — learner identity independent of any single run.

use crate::error::RunError;
use crate::learner::Learner;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// One entry of a flow's parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchemaEntry {
    pub name: String,
    #[serde(default)]
    pub default_value: Option<Value>,
}

/// Stable identity of a learner, used for cross-run grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDescriptor {
    pub name: String,
    pub implementation: Option<String>,
    pub parameters: Vec<ParameterSchemaEntry>,
    /// SHA-256 over the name, implementation reference, and parameter names.
    pub fingerprint: String,
}

impl FlowDescriptor {
    /// Derive a descriptor from a learner without executing it.
    pub fn from_learner(learner: &Learner) -> Result<Self, RunError> {
        if learner.name.trim().is_empty() {
            return Err(RunError::config("learner has no name"));
        }
        let parameters: Vec<ParameterSchemaEntry> = learner
            .params
            .iter()
            .map(|(name, value)| ParameterSchemaEntry {
                name: name.clone(),
                default_value: Some(value.clone()),
            })
            .collect();
        let fingerprint =
            compute_fingerprint(&learner.name, learner.implementation.as_deref(), &parameters);
        Ok(Self {
            name: learner.name.clone(),
            implementation: learner.implementation.clone(),
            parameters,
            fingerprint,
        })
    }
}

fn compute_fingerprint(
    name: &str,
    implementation: Option<&str>,
    parameters: &[ParameterSchemaEntry],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"\n");
    hasher.update(implementation.unwrap_or_default().as_bytes());
    for entry in parameters {
        hasher.update(b"\n");
        hasher.update(entry.name.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
