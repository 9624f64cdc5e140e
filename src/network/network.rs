use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Deserialize};

use crate::{layers::dense::Layer, network::metadata::ModelMetadata, network::spec::NetworkSpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    /// Builds an untrained network from `spec`; the same seed yields the
    /// same initial weights.
    pub fn from_spec(spec: &NetworkSpec, seed: u64) -> Network {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let layers = spec.layers.iter()
            .map(|l| Layer::new(l.size, l.input_size, l.activation, &mut rng))
            .collect();
        Network { layers, metadata: spec.metadata.clone() }
    }

    /// Forward pass; stores activations in each layer for backprop.
    pub fn forward(&mut self, input: Vec<f64>) -> Vec<f64> {
        let mut current = input;
        for layer in &mut self.layers {
            current = layer.feed_from(current);
        }
        current
    }

    /// Index of the most probable class.
    pub fn predict(&mut self, input: &[f64]) -> usize {
        argmax(&self.forward(input.to_vec()))
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> std::io::Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

/// Index of the maximum element in a slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;

    #[test]
    fn test_same_seed_same_output() {
        let spec = NetworkSpec::classifier("t", 3, &[5], ActivationFunction::ReLU, 3);
        let mut a = Network::from_spec(&spec, 11);
        let mut b = Network::from_spec(&spec, 11);
        let input = vec![0.2, -0.4, 1.0];
        assert_eq!(a.forward(input.clone()), b.forward(input));
        assert_eq!(a.parameter_count(), spec.parameter_count());
    }

    #[test]
    fn test_output_is_a_distribution() {
        let spec = NetworkSpec::classifier("t", 2, &[4], ActivationFunction::Tanh, 3);
        let mut net = Network::from_spec(&spec, 1);
        let out = net.forward(vec![0.5, 0.5]);
        assert_eq!(out.len(), 3);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_round_trip_keeps_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let path = path.to_str().unwrap();

        let spec = NetworkSpec::classifier("t", 2, &[4], ActivationFunction::ReLU, 3);
        let mut net = Network::from_spec(&spec, 5);
        net.save_json(path).unwrap();
        let mut loaded = Network::load_json(path).unwrap();
        let before = net.forward(vec![1.0, -1.0]);
        let after = loaded.forward(vec![1.0, -1.0]);
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_argmax_ties_and_empty() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}
