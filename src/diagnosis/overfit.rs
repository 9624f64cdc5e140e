//! Over/underfitting verdict from the last epoch of a training history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::train::history::TrainingHistory;

/// Train-minus-validation accuracy above which a run may be overfitting.
pub const OVERFIT_ACCURACY_GAP: f64 = 0.15;
/// Validation-minus-train loss above which a run may be overfitting.
pub const OVERFIT_LOSS_GAP: f64 = 0.10;
/// Train-minus-validation accuracy below which a run is underfitting.
pub const UNDERFIT_ACCURACY_GAP: f64 = -0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Overfitting,
    Underfitting,
    GoodFit,
}

impl Verdict {
    pub fn summary(&self) -> &'static str {
        match self {
            Verdict::Overfitting => "the model memorizes training data but does not generalize well",
            Verdict::Underfitting => "the model is not learning the training data well",
            Verdict::GoodFit => "training and validation metrics are reasonably close",
        }
    }

    /// Remediation hints; empty for a good fit.
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Verdict::Overfitting => &[
                "increase dropout rate",
                "add more regularization (L1/L2)",
                "use data augmentation",
                "reduce model complexity",
                "collect more training data",
            ],
            Verdict::Underfitting => &[
                "increase model complexity",
                "train for more epochs",
                "reduce regularization",
                "check data quality",
            ],
            Verdict::GoodFit => &[],
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Overfitting => "overfitting",
            Verdict::Underfitting => "underfitting",
            Verdict::GoodFit => "good_fit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverfitDiagnosis {
    pub verdict: Verdict,
    /// `final_train_accuracy - final_val_accuracy`
    pub accuracy_gap: f64,
    /// `final_val_loss - final_train_loss`
    pub loss_gap: f64,
    pub final_train_accuracy: f64,
    pub final_val_accuracy: f64,
    pub final_train_loss: f64,
    pub final_val_loss: f64,
}

/// Classifies a run from its final train/validation accuracy and loss.
/// The first matching rule wins: overfitting, then underfitting, else good fit.
pub fn diagnose(train_accuracy: f64, val_accuracy: f64, train_loss: f64, val_loss: f64) -> OverfitDiagnosis {
    let accuracy_gap = train_accuracy - val_accuracy;
    let loss_gap = val_loss - train_loss;

    let verdict = if accuracy_gap > OVERFIT_ACCURACY_GAP && loss_gap > OVERFIT_LOSS_GAP {
        Verdict::Overfitting
    } else if accuracy_gap < UNDERFIT_ACCURACY_GAP {
        Verdict::Underfitting
    } else {
        Verdict::GoodFit
    };

    OverfitDiagnosis {
        verdict,
        accuracy_gap,
        loss_gap,
        final_train_accuracy: train_accuracy,
        final_val_accuracy: val_accuracy,
        final_train_loss: train_loss,
        final_val_loss: val_loss,
    }
}

/// Diagnoses the last recorded epoch of `history`.
///
/// # Errors
/// `Error::Diagnosis` if the history is empty or its last epoch carries no
/// validation metrics.
pub fn diagnose_history(history: &TrainingHistory) -> Result<OverfitDiagnosis> {
    let last = history.last()
        .ok_or_else(|| Error::Diagnosis("training history has no epochs".into()))?;
    let (Some(val_accuracy), Some(val_loss)) = (last.val_accuracy, last.val_loss) else {
        return Err(Error::Diagnosis(format!(
            "epoch {} has no validation metrics",
            last.epoch
        )));
    };
    Ok(diagnose(last.train_accuracy, val_accuracy, last.train_loss, val_loss))
}
