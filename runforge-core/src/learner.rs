//! Learner model — hyperparameter extraction and name resolution.

use crate::error::RunError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One named parameter setting attached to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSetting {
    pub name: String,
    pub value: Value,
}

impl ParameterSetting {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A configured learning algorithm with ordered hyperparameters.
///
/// The parameter list holds every explicitly-set hyperparameter in declaration
/// order; unset defaults are not materialized here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learner {
    pub name: String,
    /// Implementation reference, e.g. a crate or package version string.
    pub implementation: Option<String>,
    pub params: Vec<(String, Value)>,
}

impl Learner {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            implementation: None,
            params: Vec::new(),
        }
    }

    pub fn with_implementation(mut self, implementation: &str) -> Self {
        self.implementation = Some(implementation.to_string());
        self
    }

    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }
}

/// Learner supplied either by registry name or as a pre-built handle.
///
/// `Named` is normalized to a resolved [`Learner`] at the pipeline boundary.
#[derive(Debug, Clone)]
pub enum LearnerRef {
    Named(String),
    Resolved(Learner),
}

impl From<&str> for LearnerRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<Learner> for LearnerRef {
    fn from(learner: Learner) -> Self {
        Self::Resolved(learner)
    }
}

/// Extract the ordered parameter settings of a learner.
///
/// Pure; declaration order is preserved. Fails when the learner shape is
/// malformed (empty learner name or empty hyperparameter name).
pub fn extract_params(learner: &Learner) -> Result<Vec<ParameterSetting>, RunError> {
    if learner.name.trim().is_empty() {
        return Err(RunError::config("learner has no name"));
    }
    let mut settings = Vec::with_capacity(learner.params.len());
    for (name, value) in &learner.params {
        if name.trim().is_empty() {
            return Err(RunError::config(format!(
                "learner '{}' has a hyperparameter with an empty name",
                learner.name
            )));
        }
        settings.push(ParameterSetting::new(name.clone(), value.clone()));
    }
    Ok(settings)
}

type LearnerBuilder = Arc<dyn Fn() -> Learner + Send + Sync>;

/// Registry of learner constructors, looked up by name.
#[derive(Clone, Default)]
pub struct LearnerRegistry {
    builders: HashMap<String, LearnerBuilder>,
}

impl LearnerRegistry {
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Register a learner constructor. Fails if the name is already taken.
    pub fn register<F>(&mut self, name: &str, builder: F) -> Result<(), RunError>
    where
        F: Fn() -> Learner + Send + Sync + 'static,
    {
        if self.builders.contains_key(name) {
            return Err(RunError::config(format!(
                "learner '{name}' is already registered"
            )));
        }
        debug!(learner = %name, "Registering learner");
        self.builders.insert(name.to_string(), Arc::new(builder));
        Ok(())
    }

    /// Normalize a [`LearnerRef`] to a resolved learner.
    pub fn resolve(&self, learner: &LearnerRef) -> Result<Learner, RunError> {
        match learner {
            LearnerRef::Resolved(learner) => Ok(learner.clone()),
            LearnerRef::Named(name) => match self.builders.get(name) {
                Some(builder) => Ok(builder()),
                None => Err(RunError::config(format!("unknown learner '{name}'"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decision_tree() -> Learner {
        Learner::new("classif.rpart")
            .with_param("minsplit", 20)
            .with_param("cp", 0.01)
            .with_param("xval", 10)
    }

    #[test]
    fn test_extract_params_preserves_declaration_order() {
        let params = extract_params(&decision_tree()).unwrap();
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["minsplit", "cp", "xval"]);
        assert_eq!(params[1].value, json!(0.01));
    }

    #[test]
    fn test_extract_params_rejects_unnamed_learner() {
        let learner = Learner::new("  ");
        assert!(matches!(
            extract_params(&learner),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn test_extract_params_rejects_empty_param_name() {
        let learner = Learner::new("classif.rpart").with_param("", 1);
        assert!(matches!(
            extract_params(&learner),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn test_registry_resolves_named_learner() {
        let mut registry = LearnerRegistry::new();
        registry.register("classif.rpart", decision_tree).unwrap();
        let resolved = registry
            .resolve(&LearnerRef::Named("classif.rpart".to_string()))
            .unwrap();
        assert_eq!(resolved.name, "classif.rpart");
        assert_eq!(resolved.params.len(), 3);
    }

    #[test]
    fn test_registry_rejects_unknown_and_duplicate_names() {
        let mut registry = LearnerRegistry::new();
        registry.register("classif.rpart", decision_tree).unwrap();
        assert!(matches!(
            registry.register("classif.rpart", decision_tree),
            Err(RunError::Config(_))
        ));
        assert!(matches!(
            registry.resolve(&LearnerRef::from("classif.svm")),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn test_resolved_ref_passes_through() {
        let registry = LearnerRegistry::new();
        let resolved = registry
            .resolve(&LearnerRef::from(decision_tree()))
            .unwrap();
        assert_eq!(resolved, decision_tree());
    }
}
