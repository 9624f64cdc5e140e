use crate::{math::matrix::Matrix, layers::dense::Layer};

/// Mini-batch SGD with optional classical momentum.
///
/// Velocity buffers are created lazily per layer index, so one `Sgd` must
/// only ever drive one network.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    velocity: Vec<Option<(Matrix, Matrix)>>,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd::with_momentum(learning_rate, 0.0)
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, momentum, velocity: Vec::new() }
    }

    /// Applies one update to `layer` (at position `index` in its network)
    /// given its pre-computed gradients.
    pub fn step(&mut self, index: usize, layer: &mut Layer, weights_grad: Matrix, biases_grad: Matrix) {
        if self.momentum == 0.0 {
            layer.apply_gradients(weights_grad, biases_grad, self.learning_rate);
            return;
        }

        if self.velocity.len() <= index {
            self.velocity.resize(index + 1, None);
        }
        let m = self.momentum;
        let (w_vel, b_vel) = match self.velocity[index].take() {
            Some((w, b)) => (w.map(|x| x * m) + weights_grad, b.map(|x| x * m) + biases_grad),
            None => (weights_grad, biases_grad),
        };
        layer.apply_gradients(w_vel.clone(), b_vel.clone(), self.learning_rate);
        self.velocity[index] = Some((w_vel, b_vel));
    }

    /// Number of values buffered as optimizer state.
    pub fn state_len(&self) -> usize {
        self.velocity.iter().flatten().map(|(w, b)| w.len() + b.len()).sum()
    }
}
