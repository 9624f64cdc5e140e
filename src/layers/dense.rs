use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    #[serde(skip)]
    pub neurons: Matrix,
    #[serde(skip)]
    pre_neurons: Matrix,  // z = xW + b, needed for the activation derivative
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = if activation.prefers_he_init() {
            Matrix::he(input_size, size, rng)
        } else {
            Matrix::xavier(input_size, size, rng)
        };

        Layer {
            size,
            neurons: Matrix::zeros(1, size),
            pre_neurons: Matrix::zeros(1, size),
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// Trainable values held by this layer.
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    pub fn feed_from(&mut self, input: Vec<f64>) -> Vec<f64> {
        let z = Matrix::row(input) * self.weights.clone() + self.biases.clone();
        let a = self.activator.apply(&z.data[0]);
        self.pre_neurons = z;
        self.neurons = Matrix::row(a.clone());
        a
    }

    /// Computes gradient adjustments. Returns (weights_grad, biases_grad).
    /// `next_layer_delta` is ∂L/∂a for this layer (error in activation space).
    pub fn compute_gradients(
        &self,
        next_layer_delta: Matrix,
        inputs: &Matrix,
    ) -> (Matrix, Matrix) {
        let act_derivative = self.pre_neurons.map(|x| self.activator.derivative(x));
        // δ = error ⊙ σ'(z)
        let layer_delta = next_layer_delta.hadamard(&act_derivative);

        let weights_adjustment = inputs.transpose() * layer_delta.clone();
        let biases_adjustment = layer_delta;

        (weights_adjustment, biases_adjustment)
    }

    /// Applies pre-computed gradients scaled by lr.
    pub fn apply_gradients(&mut self, weights_grad: Matrix, biases_grad: Matrix, lr: f64) {
        self.weights = self.weights.clone() - weights_grad.map(|x| x * lr);
        self.biases = self.biases.clone() - biases_grad.map(|x| x * lr);
    }
}
