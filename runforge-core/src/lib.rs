//! # runforge-core — ML task execution and run-record assembly
//!
//! Runs a machine-learning experiment described by an abstract task (dataset,
//! resampling plan, evaluation measure) against a pluggable learner and
//! packages the outcome into a portable, reproducible run record: parameters,
//! seed components, formatted predictions, captured fold errors, and optional
//! hardware-performance covariates.
//!
//! The learning algorithm itself, the resampling engine, and the benchmark
//! executor are external collaborators consumed through the
//! [`executor::BenchmarkExecutor`] trait; this crate owns the orchestration,
//! validation, and record-assembly logic around them.
//!
//! The pipeline is synchronous and single-threaded. Applying a seed mutates
//! process-wide RNG state, so concurrent invocations within one process must
//! be serialized by the caller.

// Foundation
pub mod config;
pub mod error;

// Domain model
pub mod flow;
pub mod learner;
pub mod seed;
pub mod task;

// Execution & assembly
pub mod executor;
pub mod run;
pub mod store;

// Re-exports
pub use config::RunConfig;
pub use error::RunError;
pub use executor::{BenchmarkExecutor, BenchmarkResultSet, ExecutorOptions};
pub use flow::FlowDescriptor;
pub use learner::{Learner, LearnerRef, LearnerRegistry, ParameterSetting};
pub use run::{RunOptions, RunResult, TaskRun, run_task};
pub use seed::{SeedArg, SeedSpec};
pub use store::RunArchive;
pub use task::{Task, TaskType};
