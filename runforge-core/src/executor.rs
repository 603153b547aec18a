//! Benchmark executor interface — the external fit/evaluate engine.
//!
//! The executor is not implemented in this crate; the pipeline only consumes
//! its result shape. Fold-level training and prediction failures are captured
//! inside the result set rather than surfaced as errors, so a partially
//! failed benchmark still yields a complete, inspectable run record.

use crate::error::RunError;
use crate::learner::Learner;
use crate::task::ExecutableTask;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flags passed through to the executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorOptions {
    pub show_progress: bool,
    pub store_models: bool,
}

/// One raw prediction row as emitted by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub row_id: usize,
    pub repeat: usize,
    pub fold: usize,
    pub truth: Value,
    pub response: Value,
    /// Per-class probabilities for classification tasks. BTreeMap keeps the
    /// serialized column order byte-stable.
    #[serde(default)]
    pub probabilities: BTreeMap<String, f64>,
}

/// Per-learner-per-task slice of a benchmark result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub learner_name: String,
    pub task_id: String,
    pub predictions: Vec<RawPrediction>,
    /// One entry per fold; `None` marks a fold that trained cleanly.
    pub train_errors: Vec<Option<String>>,
    /// One entry per fold; `None` marks a fold that predicted cleanly.
    pub predict_errors: Vec<Option<String>>,
}

impl BenchmarkEntry {
    pub fn new(learner_name: &str, task_id: &str) -> Self {
        Self {
            learner_name: learner_name.to_string(),
            task_id: task_id.to_string(),
            predictions: Vec::new(),
            train_errors: Vec::new(),
            predict_errors: Vec::new(),
        }
    }
}

/// Structured result set returned by the executor, one entry per
/// learner × task combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResultSet {
    pub entries: Vec<BenchmarkEntry>,
}

/// External benchmark engine consumed by the run pipeline.
pub trait BenchmarkExecutor {
    /// Fit and evaluate `learner` on `task` according to the bundle's
    /// resampling plan and measures.
    fn execute(
        &self,
        learner: &Learner,
        task: &ExecutableTask,
        options: ExecutorOptions,
    ) -> Result<BenchmarkResultSet, RunError>;
}
