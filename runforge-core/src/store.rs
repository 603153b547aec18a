//! Run archive — JSON persistence of assembled runs.

use crate::error::RunError;
use crate::run::TaskRun;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk collection of assembled runs, suitable for later comparison or
/// upload. Runs are treated as read-only once added.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunArchive {
    pub runs: Vec<TaskRun>,
}

impl RunArchive {
    pub fn new() -> Self {
        Self { runs: Vec::new() }
    }

    pub fn add(&mut self, run: TaskRun) {
        self.runs.push(run);
    }

    pub fn find(&self, run_id: &str) -> Option<&TaskRun> {
        self.runs.iter().find(|r| r.run.id == run_id)
    }

    pub fn load(path: &Path) -> Result<Self, RunError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), RunError> {
        let content = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
