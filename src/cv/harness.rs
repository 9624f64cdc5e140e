use std::time::Instant;

use crate::config::HarnessConfig;
use crate::cv::session::FoldSession;
use crate::cv::stratified::{FoldSplit, StratifiedKFold};
use crate::cv::summary::{CrossValidationReport, FoldResult};
use crate::data::dataset::Dataset;
use crate::data::scaler::standardize_split;
use crate::error::{Error, Result, TrainError};
use crate::optim::sgd::Sgd;
use crate::train::evaluate::evaluate;
use crate::train::loop_fn::train_loop;

/// Stratified k-fold cross-validation of a freshly initialised classifier.
///
/// Folds run one after another. Each gets its own network, optimizer and
/// (when enabled) scaler fitted on that fold's training partition, and its
/// session is released before the next fold starts.
#[derive(Debug, Clone)]
pub struct CrossValidationHarness {
    config: HarnessConfig,
}

impl CrossValidationHarness {
    /// # Errors
    /// `Error::Config` if the configuration is invalid.
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(CrossValidationHarness { config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn splitter(&self) -> StratifiedKFold {
        StratifiedKFold::new(self.config.n_splits, self.config.shuffle, self.config.seed)
    }

    /// Runs every fold and aggregates the results.
    ///
    /// # Errors
    /// - `Error::InsufficientClassMembers` before any training if a class
    ///   cannot appear in every fold
    /// - `Error::Fold` for the first fold whose training fails; later folds
    ///   are not run
    pub fn run(&self, data: &Dataset) -> Result<CrossValidationReport> {
        let splits = self.splitter().split(data.labels())?;
        tracing::info!(
            n_splits = splits.len(),
            n_samples = data.len(),
            n_classes = data.n_classes(),
            "starting cross-validation"
        );

        let mut folds = Vec::with_capacity(splits.len());
        for split in &splits {
            let result = self.run_fold(data, split)?;
            tracing::info!(
                fold = result.fold,
                val_loss = result.val_loss,
                val_accuracy = result.val_accuracy,
                f1 = result.f1,
                "fold finished"
            );
            folds.push(result);
        }

        let report = CrossValidationReport::from_folds(folds);
        tracing::info!(
            accuracy_mean = report.aggregate.val_accuracy.mean,
            accuracy_std = report.aggregate.val_accuracy.std,
            "cross-validation finished"
        );
        Ok(report)
    }

    fn run_fold(&self, data: &Dataset, split: &FoldSplit) -> Result<FoldResult> {
        let fold = split.fold;
        let started = Instant::now();
        tracing::info!(
            fold,
            train_size = split.train_indices.len(),
            val_size = split.val_indices.len(),
            "starting fold"
        );

        let train = data.subset(&split.train_indices);
        let val = data.subset(&split.val_indices);
        let (train, val) = if self.config.standardize {
            let (train, val, _) = standardize_split(&train, &val)?;
            (train, val)
        } else {
            (train, val)
        };

        let spec = self.config.network_spec(data.n_features(), data.n_classes());
        let optimizer = Sgd::with_momentum(self.config.learning_rate, self.config.momentum);
        let mut session = FoldSession::acquire(
            fold,
            &spec,
            data.n_features(),
            data.n_classes(),
            self.config.fold_seed(fold),
            optimizer,
            self.config.max_parameters,
        )
        .map_err(|source| fold_error(fold, source))?;

        let history = train_loop(
            &mut session.network,
            &train,
            Some(&val),
            &mut session.optimizer,
            &self.config.fold_train_config(fold),
        )
        .map_err(|source| fold_error(fold, source))?;

        let eval = evaluate(&mut session.network, &val);
        drop(session);

        tracing::debug!(fold, elapsed_ms = started.elapsed().as_millis() as u64, "fold timing");
        Ok(FoldResult {
            fold,
            val_loss: eval.loss,
            val_accuracy: eval.report.accuracy,
            precision: eval.report.weighted.precision,
            recall: eval.report.weighted.recall,
            f1: eval.report.weighted.f1,
            train_size: train.len(),
            val_size: val.len(),
            history,
        })
    }
}

fn fold_error(fold: usize, source: TrainError) -> Error {
    tracing::error!(fold, category = source.category(), %source, "fold failed");
    Error::Fold { fold, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Architecture;
    use crate::data::synthetic::synthetic_blobs;

    fn small_config() -> HarnessConfig {
        HarnessConfig {
            n_splits: 3,
            cv_epochs: 5,
            batch_size: 8,
            learning_rate: 0.05,
            architecture: Architecture { hidden_units: vec![6], ..Architecture::default() },
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn test_folds_in_order_with_full_coverage() {
        let data = synthetic_blobs(12, 3, 2, 0.4, 5).unwrap();
        let report = CrossValidationHarness::new(small_config()).unwrap().run(&data).unwrap();

        assert_eq!(report.folds.len(), 3);
        assert_eq!(report.aggregate.n_folds, 3);
        for (i, f) in report.folds.iter().enumerate() {
            assert_eq!(f.fold, i + 1);
            assert_eq!(f.train_size + f.val_size, data.len());
            assert_eq!(f.history.len(), 5);
        }
        let val_total: usize = report.folds.iter().map(|f| f.val_size).sum();
        assert_eq!(val_total, data.len());
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = HarnessConfig { n_splits: 1, ..small_config() };
        assert!(matches!(CrossValidationHarness::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_resource_failure_names_first_fold() {
        let data = synthetic_blobs(12, 3, 2, 0.4, 5).unwrap();
        let config = HarnessConfig { max_parameters: Some(10), ..small_config() };
        let err = CrossValidationHarness::new(config).unwrap().run(&data).unwrap_err();

        assert!(matches!(err, Error::Fold { fold: 1, source: TrainError::Resource { .. } }));
        assert!(err.to_string().contains("fold 1"));
        assert!(err.to_string().contains("resource"));
    }
}
