use serde::{Deserialize, Serialize};

use crate::train::epoch_stats::EpochStats;

/// Every epoch of one training run, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochStats>,
    /// Epoch whose weights the network ended with, when early stopping
    /// restored an earlier best.
    #[serde(default)]
    pub restored_epoch: Option<usize>,
}

impl TrainingHistory {
    pub fn push(&mut self, stats: EpochStats) {
        self.epochs.push(stats);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochStats> {
        self.epochs.last()
    }

    pub fn train_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.train_loss).collect()
    }

    pub fn val_losses(&self) -> Vec<f64> {
        self.epochs.iter().filter_map(|e| e.val_loss).collect()
    }

    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    pub fn load_json(path: &str) -> std::io::Result<TrainingHistory> {
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
