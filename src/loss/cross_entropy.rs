/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss:
    ///   L = -sum(expected[i] * log(predicted[i] + eps))
    ///
    /// `predicted` — softmax probabilities, shape [n_classes]
    /// `expected`  — one-hot target distribution, shape [n_classes]
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| -e * (p + EPS).ln())
            .sum()
    }

    /// Loss against an integer class label; same as `loss` with a one-hot target.
    pub fn sparse_loss(predicted: &[f64], class: usize) -> f64 {
        -(predicted.get(class).copied().unwrap_or(0.0) + EPS).ln()
    }

    /// Gradient of the combined Softmax + cross-entropy w.r.t. the logits:
    ///   ∂L/∂z_i = predicted[i] - expected[i]
    ///
    /// The Softmax layer's own derivative is identity (1.0) so this is not
    /// double-applied.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| p - e)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_matches_one_hot() {
        let p = [0.2, 0.7, 0.1];
        let dense = CrossEntropyLoss::loss(&p, &[0.0, 1.0, 0.0]);
        assert!((dense - CrossEntropyLoss::sparse_loss(&p, 1)).abs() < 1e-15);
        assert!((dense - (-(0.7f64 + EPS).ln())).abs() < 1e-15);
    }

    #[test]
    fn test_zero_probability_is_finite() {
        assert!(CrossEntropyLoss::sparse_loss(&[1.0, 0.0], 1).is_finite());
    }
}
