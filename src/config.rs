//! Immutable run configuration.
//!
//! One `HarnessConfig` value is handed to the harness and the pipeline at
//! construction; nothing reads hyperparameters from anywhere else.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::network::metadata::ModelMetadata;
use crate::network::spec::NetworkSpec;
use crate::train::train_config::{EarlyStopping, TrainConfig};

/// Hidden part of the classifier; input and softmax output widths come
/// from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    pub hidden_units: Vec<usize>,
    pub activation: ActivationFunction,
}

impl Default for Architecture {
    fn default() -> Self {
        Architecture {
            hidden_units: vec![128, 64],
            activation: ActivationFunction::ReLU,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Number of cross-validation folds.
    pub n_splits: usize,
    /// Shuffle within each class before dealing examples to folds.
    pub shuffle: bool,
    /// Seed for fold assignment, holdout split, weight init and batch order.
    pub seed: u64,
    /// Epoch budget for each cross-validation fold.
    pub cv_epochs: usize,
    /// Epoch budget for the final training run.
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    pub architecture: Architecture,
    /// Fit a standard scaler on each training partition.
    pub standardize: bool,
    /// Largest network (weights + biases) a training session may allocate.
    pub max_parameters: Option<usize>,
    /// Fraction of each class held out for validating the final model.
    pub holdout_fraction: f64,
    /// Early stopping for the final training run; folds always use the full
    /// `cv_epochs` budget.
    pub early_stopping: Option<EarlyStopping>,
    pub class_labels: Option<Vec<String>>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            n_splits: 5,
            shuffle: true,
            seed: 42,
            cv_epochs: 10,
            epochs: 50,
            batch_size: 32,
            learning_rate: 0.01,
            momentum: 0.9,
            architecture: Architecture::default(),
            standardize: true,
            max_parameters: None,
            holdout_fraction: 0.15,
            early_stopping: Some(EarlyStopping::new(10)),
            class_labels: None,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_splits < 2 {
            return Err(Error::Config(format!("n_splits must be at least 2, got {}", self.n_splits)));
        }
        if self.cv_epochs == 0 || self.epochs == 0 {
            return Err(Error::Config("epoch budgets must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::Config(format!("learning_rate must be positive, got {}", self.learning_rate)));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::Config(format!("momentum must be in [0, 1), got {}", self.momentum)));
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(Error::Config(format!(
                "holdout_fraction must be in (0, 1), got {}",
                self.holdout_fraction
            )));
        }
        if self.architecture.hidden_units.contains(&0) {
            return Err(Error::Config("hidden layers must have at least one unit".into()));
        }
        if self.architecture.activation == ActivationFunction::Softmax {
            return Err(Error::Config("Softmax is reserved for the output layer".into()));
        }
        Ok(())
    }

    /// Classifier spec for data of the given shape.
    pub fn network_spec(&self, n_features: usize, n_classes: usize) -> NetworkSpec {
        let mut spec = NetworkSpec::classifier(
            "classifier",
            n_features,
            &self.architecture.hidden_units,
            self.architecture.activation,
            n_classes,
        );
        if self.class_labels.is_some() {
            spec.metadata = Some(ModelMetadata {
                description: None,
                class_labels: self.class_labels.clone(),
            });
        }
        spec
    }

    /// Training settings for cross-validation fold `fold` (1-based).
    pub fn fold_train_config(&self, fold: usize) -> TrainConfig {
        TrainConfig::new(self.cv_epochs, self.batch_size, self.fold_seed(fold))
    }

    /// Training settings for the final run.
    pub fn final_train_config(&self) -> TrainConfig {
        let config = TrainConfig::new(self.epochs, self.batch_size, self.seed);
        match self.early_stopping {
            Some(es) => config.with_early_stopping(es),
            None => config,
        }
    }

    /// Seed for fold-specific randomness (weight init, batch order).
    pub fn fold_seed(&self, fold: usize) -> u64 {
        self.seed.wrapping_add(fold as u64)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: HarnessConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}
