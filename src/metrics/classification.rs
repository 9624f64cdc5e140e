//! Classification metrics computed from a confusion matrix.
//!
//! Precision, recall and F1 for a class whose denominator is zero (no
//! predictions of it, no examples of it, or both scores zero) are defined as
//! `0.0`. Averages therefore never produce NaN.

use serde::{Deserialize, Serialize};

/// Confusion matrix indexed `[actual][predicted]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> Self {
        Self { counts: vec![vec![0; n_classes]; n_classes] }
    }

    /// Builds the matrix from paired labels. Pairs with an index outside
    /// `0..n_classes` are ignored.
    pub fn from_predictions(actual: &[usize], predicted: &[usize], n_classes: usize) -> Self {
        let mut cm = Self::new(n_classes);
        for (&a, &p) in actual.iter().zip(predicted) {
            cm.record(a, p);
        }
        cm
    }

    pub fn record(&mut self, actual: usize, predicted: usize) {
        if actual < self.n_classes() && predicted < self.n_classes() {
            self.counts[actual][predicted] += 1;
        }
    }

    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.n_classes()).map(|i| self.counts[i][i]).sum()
    }

    /// Examples whose true class is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Examples predicted as `class`.
    pub fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct() as f64, self.total() as f64)
    }
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Full report for one labeled evaluation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassMetrics>,
    /// Support-weighted average over classes.
    pub weighted: AveragedMetrics,
    /// Unweighted mean over classes.
    pub macro_avg: AveragedMetrics,
    pub confusion: ConfusionMatrix,
    pub n_samples: usize,
}

impl ClassificationReport {
    pub fn from_predictions(actual: &[usize], predicted: &[usize], n_classes: usize) -> Self {
        Self::from_confusion(ConfusionMatrix::from_predictions(actual, predicted, n_classes))
    }

    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        let per_class: Vec<ClassMetrics> = (0..confusion.n_classes())
            .map(|c| class_metrics(&confusion, c))
            .collect();

        let weighted = AveragedMetrics {
            precision: weighted_mean(&per_class, |m| m.precision),
            recall: weighted_mean(&per_class, |m| m.recall),
            f1: weighted_mean(&per_class, |m| m.f1),
        };
        let macro_avg = AveragedMetrics {
            precision: plain_mean(&per_class, |m| m.precision),
            recall: plain_mean(&per_class, |m| m.recall),
            f1: plain_mean(&per_class, |m| m.f1),
        };

        ClassificationReport {
            accuracy: confusion.accuracy(),
            n_samples: confusion.total(),
            per_class,
            weighted,
            macro_avg,
            confusion,
        }
    }
}

fn class_metrics(cm: &ConfusionMatrix, class: usize) -> ClassMetrics {
    let tp = cm.counts[class][class] as f64;
    let support = cm.support(class);
    let precision = ratio(tp, cm.predicted(class) as f64);
    let recall = ratio(tp, support as f64);
    let f1 = ratio(2.0 * precision * recall, precision + recall);
    ClassMetrics { precision, recall, f1, support }
}

fn weighted_mean(per_class: &[ClassMetrics], metric: impl Fn(&ClassMetrics) -> f64) -> f64 {
    let total_support: usize = per_class.iter().map(|m| m.support).sum();
    let sum: f64 = per_class.iter().map(|m| metric(m) * m.support as f64).sum();
    ratio(sum, total_support as f64)
}

fn plain_mean(per_class: &[ClassMetrics], metric: impl Fn(&ClassMetrics) -> f64) -> f64 {
    let sum: f64 = per_class.iter().map(metric).sum();
    ratio(sum, per_class.len() as f64)
}

/// `num / den`, or 0 when `den` is 0.
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_weighted_average_uses_support() {
        // class 0: 3 examples, 2 right; class 1: 1 example, right; one 0 predicted as 1.
        let actual = [0, 0, 0, 1];
        let predicted = [0, 0, 1, 1];
        let r = ClassificationReport::from_predictions(&actual, &predicted, 2);

        assert!((r.accuracy - 0.75).abs() < TOL);
        assert!((r.per_class[0].precision - 1.0).abs() < TOL);
        assert!((r.per_class[0].recall - 2.0 / 3.0).abs() < TOL);
        assert!((r.per_class[1].precision - 0.5).abs() < TOL);
        assert!((r.per_class[1].recall - 1.0).abs() < TOL);

        let expected_p = (1.0 * 3.0 + 0.5 * 1.0) / 4.0;
        assert!((r.weighted.precision - expected_p).abs() < TOL);
        assert!((r.weighted.recall - 0.75).abs() < TOL);
        assert!((r.macro_avg.precision - 0.75).abs() < TOL);
    }

    #[test]
    fn test_zero_support_class_scores_zero() {
        // Class 2 never appears and is never predicted.
        let r = ClassificationReport::from_predictions(&[0, 1], &[0, 1], 3);
        assert_eq!(r.per_class[2], ClassMetrics { precision: 0.0, recall: 0.0, f1: 0.0, support: 0 });
        assert!((r.weighted.f1 - 1.0).abs() < TOL);
        assert!(r.macro_avg.f1.is_finite());
    }

    #[test]
    fn test_predicted_but_absent_class_scores_zero() {
        // Class 1 has no examples but is predicted once.
        let r = ClassificationReport::from_predictions(&[0, 0], &[0, 1], 2);
        assert_eq!(r.per_class[1].precision, 0.0);
        assert_eq!(r.per_class[1].recall, 0.0);
        assert_eq!(r.per_class[1].f1, 0.0);
        assert!((r.weighted.precision - 1.0).abs() < TOL);
        assert!((r.weighted.recall - 0.5).abs() < TOL);
    }

    #[test]
    fn test_empty_input() {
        let r = ClassificationReport::from_predictions(&[], &[], 3);
        assert_eq!(r.accuracy, 0.0);
        assert_eq!(r.weighted, AveragedMetrics::default());
    }
}
