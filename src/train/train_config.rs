use serde::{Deserialize, Serialize};

/// Early stopping on validation loss (training loss when there is no
/// validation set).
///
/// - `patience`     — epochs without improvement before stopping
/// - `min_delta`    — smallest decrease that counts as an improvement
/// - `restore_best` — roll the network back to the best epoch's weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarlyStopping {
    pub patience: usize,
    #[serde(default)]
    pub min_delta: f64,
    #[serde(default = "default_restore_best")]
    pub restore_best: bool,
}

fn default_restore_best() -> bool {
    true
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        EarlyStopping { patience, min_delta: 0.0, restore_best: true }
    }
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`         — maximum number of full passes over the training data
/// - `batch_size`     — samples per mini-batch; use `1` for online SGD
/// - `shuffle_seed`   — seed for the per-epoch sample order
/// - `early_stopping` — optional early stopping policy
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle_seed: u64,
    pub early_stopping: Option<EarlyStopping>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` without early stopping.
    pub fn new(epochs: usize, batch_size: usize, shuffle_seed: u64) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            shuffle_seed,
            early_stopping: None,
        }
    }

    pub fn with_early_stopping(mut self, early_stopping: EarlyStopping) -> Self {
        self.early_stopping = Some(early_stopping);
        self
    }
}
