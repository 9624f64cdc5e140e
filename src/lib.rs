//! Small dense classifiers trained from scratch, evaluated with stratified
//! k-fold cross-validation and an over/underfitting diagnosis.

pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod metrics;
pub mod cv;
pub mod diagnosis;
pub mod pipeline;
pub mod config;
pub mod error;
pub mod logging;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Network, NetworkSpec};
pub use loss::cross_entropy::CrossEntropyLoss;
pub use optim::sgd::Sgd;
pub use train::{train_loop, TrainConfig, TrainingHistory};
pub use data::{Dataset, StandardScaler};
pub use metrics::classification::ClassificationReport;
pub use cv::{CrossValidationHarness, CrossValidationReport, StratifiedKFold};
pub use diagnosis::{diagnose, OverfitDiagnosis, Verdict};
pub use pipeline::{Pipeline, PipelineReport};
pub use config::HarnessConfig;
pub use error::{Error, Result, TrainError};
