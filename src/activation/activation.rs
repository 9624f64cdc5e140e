use serde::{Serialize, Deserialize};
use std::f64::consts::E;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    /// Vector-valued; applied across the whole layer output by
    /// `ActivationFunction::apply`, never element-wise.
    Softmax,
    Tanh,
    LeakyReLU { alpha: f64 },
}

impl ActivationFunction {
    /// Applies the activation to one layer output.
    pub fn apply(&self, z: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Softmax => softmax(z),
            _ => z.iter().map(|&x| self.function(x)).collect(),
        }
    }

    /// Element-wise activation. `Softmax` returns `x` unchanged here; use
    /// `apply` for the real thing.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity | ActivationFunction::Softmax => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    /// Element-wise derivative of the activation.
    ///
    /// For `Softmax` the layer is always paired with cross-entropy, whose
    /// combined gradient `predicted - expected` is already the delta w.r.t.
    /// the logits. Returning `1.0` passes it through unchanged.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            },
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity | ActivationFunction::Softmax => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
        }
    }

    /// ReLU-family layers get He init, the rest Xavier.
    pub fn prefers_he_init(&self) -> bool {
        matches!(self, ActivationFunction::ReLU | ActivationFunction::LeakyReLU { .. })
    }
}

/// Max-shifted softmax.
fn softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
