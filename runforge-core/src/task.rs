//! Task model — prediction problems, resampling plans, and measure resolution.

use crate::config;
use crate::error::RunError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Task-type strings as declared by the experiment repository.
pub const WIRE_CLASSIFICATION: &str = "Supervised Classification";
pub const WIRE_REGRESSION: &str = "Supervised Regression";

/// Domain-default evaluation measures.
pub const MEASURE_ACCURACY: &str = "predictive_accuracy";
pub const MEASURE_RMSE: &str = "root_mean_squared_error";

/// Supported task types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Classification,
    Regression,
}

impl TaskType {
    /// Resolve a raw task-type string. Anything outside the supported set is
    /// rejected before any benchmark execution is attempted.
    pub fn parse(raw: &str) -> Result<Self, RunError> {
        match raw {
            WIRE_CLASSIFICATION => Ok(Self::Classification),
            WIRE_REGRESSION => Ok(Self::Regression),
            other => Err(RunError::unsupported_task(other)),
        }
    }

    /// Measure substituted when a task declares none.
    pub fn default_measure(self) -> &'static str {
        match self {
            Self::Classification => MEASURE_ACCURACY,
            Self::Regression => MEASURE_RMSE,
        }
    }
}

/// Predefined split of the data into train/test folds or repetitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResamplingPlan {
    CrossValidation { folds: usize, repeats: usize },
    Holdout { test_fraction: f64 },
}

impl Default for ResamplingPlan {
    fn default() -> Self {
        Self::CrossValidation {
            folds: 10,
            repeats: 1,
        }
    }
}

/// Handle to the dataset a task is defined over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_feature: Option<String>,
}

impl DatasetRef {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            target_feature: None,
        }
    }
}

/// Declarative description of a prediction problem. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Raw task-type string as declared by the repository; resolved to a
    /// [`TaskType`] at the pipeline boundary.
    pub task_type: String,
    /// Declared evaluation measure; empty means "use the domain default".
    #[serde(default)]
    pub evaluation_measure: String,
    pub dataset: DatasetRef,
    #[serde(default)]
    pub resampling: ResamplingPlan,
}

impl Task {
    pub fn new(id: &str, task_type: &str, dataset: DatasetRef) -> Self {
        Self {
            id: id.to_string(),
            task_type: task_type.to_string(),
            evaluation_measure: String::new(),
            dataset,
            resampling: ResamplingPlan::default(),
        }
    }

    pub fn with_measure(mut self, measure: &str) -> Self {
        self.evaluation_measure = measure.to_string();
        self
    }

    pub fn with_resampling(mut self, resampling: ResamplingPlan) -> Self {
        self.resampling = resampling;
        self
    }
}

/// Effective measure list for a task: the declared measure, or the domain
/// default when none is declared, unioned with caller-supplied extras.
///
/// The caller's task is never mutated; the result is a derived value.
pub fn resolve_measures(task: &Task, task_type: TaskType, extra: &[String]) -> Vec<String> {
    let mut measures = Vec::with_capacity(1 + extra.len());
    if task.evaluation_measure.trim().is_empty() {
        measures.push(task_type.default_measure().to_string());
    } else {
        measures.push(task.evaluation_measure.clone());
    }
    for measure in extra {
        if !measures.iter().any(|m| m == measure) {
            measures.push(measure.clone());
        }
    }
    measures
}

/// Executable bundle handed to the benchmark executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutableTask {
    pub task_id: String,
    pub task_type: TaskType,
    pub dataset: DatasetRef,
    pub resampling: ResamplingPlan,
    pub measures: Vec<String>,
    /// Pass-through diagnostic level; > 0 enables executor progress reporting.
    pub verbosity: i32,
}

/// Turn a task into an executable bundle.
///
/// Verbosity defaults from the process-wide configuration when unset.
pub fn build_executable(
    task: &Task,
    extra_measures: &[String],
    verbosity: Option<i32>,
) -> Result<ExecutableTask, RunError> {
    let task_type = TaskType::parse(&task.task_type)?;
    let verbosity = verbosity.unwrap_or_else(|| config::global().verbosity);
    let measures = resolve_measures(task, task_type, extra_measures);
    debug!(task_id = %task.id, ?task_type, ?measures, "Built executable task bundle");
    Ok(ExecutableTask {
        task_id: task.id.clone(),
        task_type,
        dataset: task.dataset.clone(),
        resampling: task.resampling.clone(),
        measures,
        verbosity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classification_task() -> Task {
        Task::new("task-59", WIRE_CLASSIFICATION, DatasetRef::new("iris"))
    }

    #[test]
    fn test_parse_supported_task_types() {
        assert_eq!(
            TaskType::parse(WIRE_CLASSIFICATION).unwrap(),
            TaskType::Classification
        );
        assert_eq!(
            TaskType::parse(WIRE_REGRESSION).unwrap(),
            TaskType::Regression
        );
    }

    #[test]
    fn test_parse_rejects_unsupported_task_type() {
        assert!(matches!(
            TaskType::parse("Clustering"),
            Err(RunError::UnsupportedTask(_))
        ));
    }

    #[test]
    fn test_empty_measure_resolves_to_domain_default() {
        let task = classification_task();
        assert_eq!(
            resolve_measures(&task, TaskType::Classification, &[]),
            vec![MEASURE_ACCURACY.to_string()]
        );

        let task = Task::new("task-2295", WIRE_REGRESSION, DatasetRef::new("cholesterol"));
        assert_eq!(
            resolve_measures(&task, TaskType::Regression, &[]),
            vec![MEASURE_RMSE.to_string()]
        );
    }

    #[test]
    fn test_declared_measure_wins_and_extras_are_deduped() {
        let task = classification_task().with_measure("area_under_roc_curve");
        let extra = vec![
            "area_under_roc_curve".to_string(),
            "f_measure".to_string(),
        ];
        assert_eq!(
            resolve_measures(&task, TaskType::Classification, &extra),
            vec!["area_under_roc_curve".to_string(), "f_measure".to_string()]
        );
    }

    #[test]
    fn test_resolution_never_mutates_the_task() {
        let task = classification_task();
        let before = task.clone();
        let _ = resolve_measures(&task, TaskType::Classification, &[]);
        let _ = build_executable(&task, &[], Some(0)).unwrap();
        assert_eq!(task, before);
        assert!(task.evaluation_measure.is_empty());
    }

    #[test]
    fn test_build_executable_carries_verbosity_through() {
        let bundle = build_executable(&classification_task(), &[], Some(2)).unwrap();
        assert_eq!(bundle.verbosity, 2);
        assert_eq!(bundle.task_type, TaskType::Classification);
        assert_eq!(bundle.resampling, ResamplingPlan::default());
    }

    #[test]
    fn test_verbosity_defaults_from_global_config() {
        crate::config::set_global(crate::config::RunConfig {
            verbosity: 3,
            store_models: false,
        });
        let bundle = build_executable(&classification_task(), &[], None).unwrap();
        assert_eq!(bundle.verbosity, 3);
    }
}
