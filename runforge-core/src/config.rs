//! Configuration for the run pipeline.
//!
//! A process-wide config singleton supplies defaults (currently the verbosity
//! level) when a caller does not pass them explicitly.

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Diagnostic verbosity. Values > 0 enable executor progress reporting.
    #[serde(default = "default_verbosity")]
    pub verbosity: i32,
    /// Ask the executor to retain fitted models alongside predictions.
    #[serde(default)]
    pub store_models: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbosity: default_verbosity(),
            store_models: false,
        }
    }
}

fn default_verbosity() -> i32 {
    1
}

static GLOBAL: RwLock<Option<RunConfig>> = RwLock::new(None);

/// Snapshot of the process-wide configuration.
///
/// Returns [`RunConfig::default`] until [`set_global`] has been called.
pub fn global() -> RunConfig {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_default()
}

/// Install the process-wide configuration.
pub fn set_global(config: RunConfig) {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
}
