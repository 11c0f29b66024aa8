//! Run configuration.
use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// All knobs of one pipeline run. Serializable so a run can be described in
/// a JSON file; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Weight initialization seed.
    pub seed: u64,
    /// Log the training score every this many iterations.
    pub score_every: usize,
    /// Leading lines skipped in each CSV file.
    pub skip_lines: usize,
    /// Where to write the trained model, if anywhere.
    pub model_out: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("train.csv"),
            test_path: PathBuf::from("test.csv"),
            batch_size: 32,
            epochs: 100,
            learning_rate: 0.0003,
            seed: 123,
            score_every: 100,
            skip_lines: 1,
            model_out: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| DataError::Open { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DataError::InvalidConfig("batch_size must be positive".into()));
        }
        if self.score_every == 0 {
            return Err(DataError::InvalidConfig("score_every must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(DataError::InvalidConfig(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
