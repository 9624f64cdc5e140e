use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::metrics::classification::ClassificationReport;
use crate::network::network::{argmax, Network};

/// Loss and classification metrics of a network on one labeled set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mean cross-entropy; 0 for an empty set.
    pub loss: f64,
    pub report: ClassificationReport,
    pub predictions: Vec<usize>,
}

/// Runs the network over `data` in eval mode (no gradient accumulation).
pub fn evaluate(network: &mut Network, data: &Dataset) -> Evaluation {
    let mut total_loss = 0.0;
    let mut predictions = Vec::with_capacity(data.len());

    for (input, &label) in data.features().iter().zip(data.labels()) {
        let output = network.forward(input.clone());
        total_loss += CrossEntropyLoss::sparse_loss(&output, label);
        predictions.push(argmax(&output));
    }

    let loss = if data.is_empty() { 0.0 } else { total_loss / data.len() as f64 };
    let report = ClassificationReport::from_predictions(data.labels(), &predictions, data.n_classes());

    Evaluation { loss, report, predictions }
}
