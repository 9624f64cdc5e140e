//! End-to-end evaluation: optional cross-validation, then a final model
//! trained on a stratified split, diagnosed and scored on the held-out part.

use serde::{Deserialize, Serialize};

use crate::config::HarnessConfig;
use crate::cv::harness::CrossValidationHarness;
use crate::cv::session::FoldSession;
use crate::cv::stratified::stratified_holdout;
use crate::cv::summary::CrossValidationReport;
use crate::data::dataset::Dataset;
use crate::data::scaler::{standardize_split, StandardScaler};
use crate::diagnosis::overfit::{diagnose_history, OverfitDiagnosis};
use crate::error::Result;
use crate::metrics::classification::ClassificationReport;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::evaluate::evaluate;
use crate::train::history::TrainingHistory;
use crate::train::loop_fn::train_loop;

/// Everything produced by [`Pipeline::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub cross_validation: Option<CrossValidationReport>,
    pub history: TrainingHistory,
    pub diagnosis: OverfitDiagnosis,
    /// Metrics of the final model on the held-out split.
    pub holdout: ClassificationReport,
    pub holdout_loss: f64,
    pub train_size: usize,
    pub holdout_size: usize,
    #[serde(skip)]
    pub network: Option<Network>,
    pub scaler: Option<StandardScaler>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: HarnessConfig,
}

impl Pipeline {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Pipeline { config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn run(&self, data: &Dataset, with_cv: bool) -> Result<PipelineReport> {
        let cross_validation = if with_cv {
            Some(CrossValidationHarness::new(self.config.clone())?.run(data)?)
        } else {
            None
        };

        let (train_idx, holdout_idx) =
            stratified_holdout(data.labels(), self.config.holdout_fraction, self.config.seed)?;
        let train = data.subset(&train_idx);
        let holdout = data.subset(&holdout_idx);
        let (train, holdout, scaler) = if self.config.standardize {
            let (train, holdout, scaler) = standardize_split(&train, &holdout)?;
            (train, holdout, Some(scaler))
        } else {
            (train, holdout, None)
        };
        tracing::info!(train_size = train.len(), holdout_size = holdout.len(), "training final model");

        let spec = self.config.network_spec(data.n_features(), data.n_classes());
        let mut session = FoldSession::acquire(
            0,
            &spec,
            data.n_features(),
            data.n_classes(),
            self.config.seed,
            Sgd::with_momentum(self.config.learning_rate, self.config.momentum),
            self.config.max_parameters,
        )?;
        let history = train_loop(
            &mut session.network,
            &train,
            Some(&holdout),
            &mut session.optimizer,
            &self.config.final_train_config(),
        )?;

        let diagnosis = diagnose_history(&history)?;
        tracing::info!(
            verdict = %diagnosis.verdict,
            accuracy_gap = diagnosis.accuracy_gap,
            loss_gap = diagnosis.loss_gap,
            "fit diagnosis"
        );

        let eval = evaluate(&mut session.network, &holdout);
        tracing::info!(
            accuracy = eval.report.accuracy,
            f1 = eval.report.weighted.f1,
            "holdout evaluation"
        );

        Ok(PipelineReport {
            cross_validation,
            history,
            diagnosis,
            holdout_loss: eval.loss,
            holdout: eval.report,
            train_size: train.len(),
            holdout_size: holdout.len(),
            network: Some(session.into_network()),
            scaler,
        })
    }
}
