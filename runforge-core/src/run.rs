//! Run assembly — orchestrates one learner against one task and packages the
//! outcome into a portable, validated, immutable run record.
//!
//! All input validation happens before the benchmark executor is invoked;
//! fold-level faults reported by the executor are folded into the record's
//! error-message field instead of failing the pipeline.

use crate::config;
use crate::error::RunError;
use crate::executor::{BenchmarkEntry, BenchmarkExecutor, ExecutorOptions, RawPrediction};
use crate::flow::FlowDescriptor;
use crate::learner::{LearnerRef, LearnerRegistry, ParameterSetting, extract_params};
use crate::seed::SeedArg;
use crate::task::{self, Task, TaskType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// Required length of the hardware-performance covariate vector.
pub const SCIMARK_VECTOR_LEN: usize = 6;

const TRAIN_ERROR_PREFIX: &str = "Error in training the model: \n ";
const PREDICT_ERROR_PREFIX: &str = "Error in predicting with the model: \n ";

/// One evaluated instance in the formatted prediction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub row_id: usize,
    pub repeat: usize,
    pub fold: usize,
    pub truth: Value,
    pub response: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub probabilities: BTreeMap<String, f64>,
}

/// Assembled record of one benchmark run. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub id: String,
    pub task_id: String,
    /// Combined unique training/prediction error text; `None` on clean runs.
    pub error_message: Option<String>,
    pub predictions: Vec<Prediction>,
    /// Learner parameters followed by seed components; names are unique.
    pub parameters: Vec<ParameterSetting>,
    /// Optional 6-element hardware-benchmark covariate vector.
    pub scimark_vector: Option<Vec<f64>>,
    pub created_at: DateTime<Utc>,
}

/// Full outcome of a pipeline invocation: the assembled run, the raw
/// benchmark entry it was built from, and the learner's flow descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    pub run: RunResult,
    pub raw: BenchmarkEntry,
    pub flow: FlowDescriptor,
}

/// Caller-facing knobs for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub seed: SeedArg,
    pub scimark_vector: Option<Vec<f64>>,
    /// Defaults from the process-wide configuration when unset.
    pub verbosity: Option<i32>,
    pub store_models: bool,
    pub extra_measures: Vec<String>,
}

impl RunOptions {
    pub fn new(seed: impl Into<SeedArg>) -> Self {
        Self {
            seed: seed.into(),
            scimark_vector: None,
            verbosity: None,
            store_models: false,
            extra_measures: Vec::new(),
        }
    }

    pub fn with_scimark_vector(mut self, vector: Vec<f64>) -> Self {
        self.scimark_vector = Some(vector);
        self
    }

    pub fn with_verbosity(mut self, verbosity: i32) -> Self {
        self.verbosity = Some(verbosity);
        self
    }

    pub fn with_extra_measure(mut self, measure: &str) -> Self {
        self.extra_measures.push(measure.to_string());
        self
    }
}

/// Run one learner against one task and assemble the run record.
///
/// Applies the seed process-wide immediately before execution; concurrent
/// invocations in the same process must be serialized by the caller.
pub fn run_task(
    registry: &LearnerRegistry,
    learner: &LearnerRef,
    task: &Task,
    options: RunOptions,
    executor: &dyn BenchmarkExecutor,
) -> Result<TaskRun, RunError> {
    let RunOptions {
        seed,
        scimark_vector,
        verbosity,
        store_models,
        extra_measures,
    } = options;

    // Fail-fast validation, all before any benchmark execution.
    let learner = registry.resolve(learner)?;
    TaskType::parse(&task.task_type)?;
    let seed_spec = seed.into_spec()?;
    if let Some(vector) = &scimark_vector {
        validate_scimark_vector(vector)?;
    }
    let learner_params = extract_params(&learner)?;
    let verbosity = verbosity.unwrap_or_else(|| config::global().verbosity);
    let parameters = merge_parameters(learner_params, seed_spec.as_parameter_settings())?;

    let flow = FlowDescriptor::from_learner(&learner)?;
    let bundle = task::build_executable(task, &extra_measures, Some(verbosity))?;

    // Side-effecting seed application, immediately before execution.
    seed_spec.apply()?;
    let result_set = executor.execute(
        &learner,
        &bundle,
        ExecutorOptions {
            show_progress: verbosity > 0,
            store_models,
        },
    )?;

    // One learner against one task per call: take the primary entry.
    let raw = result_set
        .entries
        .into_iter()
        .next()
        .ok_or_else(|| RunError::execution("benchmark executor returned an empty result set"))?;

    let error_message = merge_error_messages(&raw.train_errors, &raw.predict_errors);
    let predictions = raw.predictions.iter().map(format_prediction).collect();

    let run = RunResult {
        id: uuid::Uuid::new_v4().to_string(),
        task_id: task.id.clone(),
        error_message,
        predictions,
        parameters,
        scimark_vector,
        created_at: Utc::now(),
    };
    info!(
        run_id = %run.id,
        task_id = %run.task_id,
        flow = %flow.name,
        clean = run.error_message.is_none(),
        "Assembled run record"
    );
    Ok(TaskRun { run, raw, flow })
}

/// Check a scimark vector: exactly [`SCIMARK_VECTOR_LEN`] finite,
/// non-negative values.
pub fn validate_scimark_vector(vector: &[f64]) -> Result<(), RunError> {
    if vector.len() != SCIMARK_VECTOR_LEN {
        return Err(RunError::validation(format!(
            "scimark vector must have exactly {SCIMARK_VECTOR_LEN} entries, got {}",
            vector.len()
        )));
    }
    for value in vector {
        if !value.is_finite() || *value < 0.0 {
            return Err(RunError::validation(format!(
                "scimark vector entries must be finite and non-negative, got {value}"
            )));
        }
    }
    Ok(())
}

fn merge_parameters(
    learner_params: Vec<ParameterSetting>,
    seed_params: Vec<ParameterSetting>,
) -> Result<Vec<ParameterSetting>, RunError> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(learner_params.len() + seed_params.len());
    for setting in learner_params.into_iter().chain(seed_params) {
        if !seen.insert(setting.name.clone()) {
            return Err(RunError::validation(format!(
                "duplicate parameter name '{}'",
                setting.name
            )));
        }
        merged.push(setting);
    }
    Ok(merged)
}

fn unique_messages(errors: &[Option<String>]) -> Vec<&str> {
    let mut seen = HashSet::new();
    errors
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|msg| seen.insert(*msg))
        .collect()
}

/// Combine per-fold error lists into the run's error-message field:
/// unique training-error text first, unique prediction-error text second,
/// `None` when every fold was clean.
fn merge_error_messages(
    train_errors: &[Option<String>],
    predict_errors: &[Option<String>],
) -> Option<String> {
    let train = unique_messages(train_errors);
    let predict = unique_messages(predict_errors);
    let mut parts = Vec::new();
    if !train.is_empty() {
        parts.push(format!("{TRAIN_ERROR_PREFIX}{}", train.join("\n")));
    }
    if !predict.is_empty() {
        parts.push(format!("{PREDICT_ERROR_PREFIX}{}", predict.join("\n")));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn format_prediction(raw: &RawPrediction) -> Prediction {
    Prediction {
        row_id: raw.row_id,
        repeat: raw.repeat,
        fold: raw.fold,
        truth: raw.truth.clone(),
        response: raw.response.clone(),
        probabilities: raw.probabilities.clone(),
    }
}
