//! Error types for skyacre-nn.

use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Dataset could not be built or parsed
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A class is too small to appear in every fold
    #[error("Dataset error: class {class} has {count} examples, fewer than the {n_splits} folds requested")]
    InsufficientClassMembers {
        class: usize,
        count: usize,
        n_splits: usize,
    },

    /// A cross-validation fold aborted; remaining folds were not run
    #[error("fold {fold} failed with a {} error: {source}", .source.category())]
    Fold {
        fold: usize,
        #[source]
        source: TrainError,
    },

    /// Training outside of cross-validation failed
    #[error("Training error: {0}")]
    Training(#[from] TrainError),

    /// History cannot be diagnosed
    #[error("Diagnosis error: {0}")]
    Diagnosis(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Failure of a single training run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    /// Model does not fit in the configured parameter budget
    #[error("model needs {required} parameters but the budget is {budget}")]
    Resource { required: usize, budget: usize },

    /// Loss became NaN or infinite
    #[error("non-finite {stage} loss at epoch {epoch}")]
    NonFinite { stage: &'static str, epoch: usize },

    /// Architecture does not match the data
    #[error("{0}")]
    Model(String),
}

impl TrainError {
    /// Short failure category used in fold error messages.
    pub fn category(&self) -> &'static str {
        match self {
            TrainError::Resource { .. } => "resource",
            TrainError::NonFinite { .. } => "numeric",
            TrainError::Model(_) => "model",
        }
    }
}

/// Specialized Result type for skyacre-nn operations.
pub type Result<T> = std::result::Result<T, Error>;
