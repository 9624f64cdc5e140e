use serde::{Deserialize, Serialize};

use crate::train::history::TrainingHistory;

/// Metrics of one trained-and-validated fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    /// 1-based fold number.
    pub fold: usize,
    pub val_loss: f64,
    pub val_accuracy: f64,
    /// Support-weighted precision on the validation partition.
    pub precision: f64,
    /// Support-weighted recall on the validation partition.
    pub recall: f64,
    /// Support-weighted F1 on the validation partition.
    pub f1: f64,
    pub train_size: usize,
    pub val_size: usize,
    pub history: TrainingHistory,
}

/// Mean and population standard deviation of one metric across folds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std: f64,
}

impl MetricSummary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return MetricSummary::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        MetricSummary { mean, std: var.sqrt() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateResult {
    pub val_loss: MetricSummary,
    pub val_accuracy: MetricSummary,
    pub precision: MetricSummary,
    pub recall: MetricSummary,
    pub f1: MetricSummary,
    pub n_folds: usize,
}

impl AggregateResult {
    pub fn from_folds(folds: &[FoldResult]) -> Self {
        let summarize = |metric: fn(&FoldResult) -> f64| {
            MetricSummary::from_values(&folds.iter().map(metric).collect::<Vec<_>>())
        };
        AggregateResult {
            val_loss: summarize(|f| f.val_loss),
            val_accuracy: summarize(|f| f.val_accuracy),
            precision: summarize(|f| f.precision),
            recall: summarize(|f| f.recall),
            f1: summarize(|f| f.f1),
            n_folds: folds.len(),
        }
    }
}

/// Output of a full cross-validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    /// Ascending by fold number.
    pub folds: Vec<FoldResult>,
    pub aggregate: AggregateResult,
}

impl CrossValidationReport {
    pub fn from_folds(folds: Vec<FoldResult>) -> Self {
        let aggregate = AggregateResult::from_folds(&folds);
        CrossValidationReport { folds, aggregate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn fold(fold: usize, acc: f64, loss: f64) -> FoldResult {
        FoldResult {
            fold,
            val_loss: loss,
            val_accuracy: acc,
            precision: acc,
            recall: acc,
            f1: acc,
            train_size: 80,
            val_size: 20,
            history: TrainingHistory::default(),
        }
    }

    #[test]
    fn test_population_std() {
        let s = MetricSummary::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s.mean - 5.0).abs() < TOL);
        assert!((s.std - 2.0).abs() < TOL);
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let s = MetricSummary::from_values(&[0.7]);
        assert!((s.mean - 0.7).abs() < TOL);
        assert_eq!(s.std, 0.0);
    }

    #[test]
    fn test_aggregate_over_folds() {
        let folds = vec![fold(1, 0.8, 0.5), fold(2, 0.9, 0.3), fold(3, 0.7, 0.7)];
        let agg = AggregateResult::from_folds(&folds);

        assert_eq!(agg.n_folds, 3);
        assert!((agg.val_accuracy.mean - 0.8).abs() < TOL);
        assert!((agg.val_loss.mean - 0.5).abs() < TOL);
        let expected_std = (0.02f64 / 3.0).sqrt();
        assert!((agg.val_accuracy.std - expected_std).abs() < TOL);
        assert!((agg.f1.std - expected_std).abs() < TOL);
    }
}
