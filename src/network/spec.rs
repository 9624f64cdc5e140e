use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::TrainError;
use crate::network::metadata::ModelMetadata;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       — number of neurons in this layer
/// - `input_size` — number of neurons feeding into this layer (i.e. the output
///                  size of the previous layer, or the raw input dimension for
///                  the first layer)
/// - `activation` — activation function applied after the linear transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// A fully serializable description of a classifier architecture.
///
/// Every fold of a cross-validation run builds its network from the same
/// `NetworkSpec`, so the architecture is fixed while the weights are fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    /// Optional metadata (description, class labels).
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkSpec {
    /// Builds `n_features → hidden[0] → … → n_classes (Softmax)`.
    pub fn classifier(
        name: impl Into<String>,
        n_features: usize,
        hidden: &[usize],
        activation: ActivationFunction,
        n_classes: usize,
    ) -> NetworkSpec {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut input_size = n_features;
        for &size in hidden {
            layers.push(LayerSpec { size, input_size, activation });
            input_size = size;
        }
        layers.push(LayerSpec {
            size: n_classes,
            input_size,
            activation: ActivationFunction::Softmax,
        });

        NetworkSpec { name: name.into(), layers, metadata: None }
    }

    /// Number of weights and biases a network built from this spec holds.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter()
            .map(|l| l.input_size * l.size + l.size)
            .sum()
    }

    /// Checks that layers chain and that the ends match the data shape.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), TrainError> {
        let first = self.layers.first()
            .ok_or_else(|| TrainError::Model("network has no layers".into()))?;
        if first.input_size != n_features {
            return Err(TrainError::Model(format!(
                "first layer expects {} inputs but the data has {} features",
                first.input_size, n_features
            )));
        }

        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[1].input_size != pair[0].size {
                return Err(TrainError::Model(format!(
                    "layer {} expects {} inputs but layer {} outputs {}",
                    i + 1, pair[1].input_size, i, pair[0].size
                )));
            }
        }

        if let Some(l) = self.layers.iter().find(|l| l.size == 0) {
            return Err(TrainError::Model(format!("layer with input {} has zero neurons", l.input_size)));
        }

        // Checked above that layers is non-empty.
        let last = &self.layers[self.layers.len() - 1];
        if last.size != n_classes {
            return Err(TrainError::Model(format!(
                "output layer has {} neurons but there are {} classes",
                last.size, n_classes
            )));
        }
        if last.activation != ActivationFunction::Softmax {
            return Err(TrainError::Model("output layer must use Softmax".into()));
        }

        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_chains_layers() {
        let spec = NetworkSpec::classifier("cows", 4, &[8, 6], ActivationFunction::ReLU, 3);
        assert_eq!(spec.layers.len(), 3);
        assert_eq!(spec.layers[1].input_size, 8);
        assert_eq!(spec.layers[2].size, 3);
        assert!(spec.validate(4, 3).is_ok());
        assert_eq!(spec.parameter_count(), (4 * 8 + 8) + (8 * 6 + 6) + (6 * 3 + 3));
    }

    #[test]
    fn test_validate_rejects_wrong_feature_count() {
        let spec = NetworkSpec::classifier("cows", 4, &[8], ActivationFunction::ReLU, 3);
        assert!(matches!(spec.validate(5, 3), Err(TrainError::Model(_))));
        assert!(matches!(spec.validate(4, 2), Err(TrainError::Model(_))));
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        let path = path.to_str().unwrap();

        let spec = NetworkSpec::classifier("cows", 2, &[4], ActivationFunction::Tanh, 3);
        spec.save_json(path).unwrap();
        assert_eq!(NetworkSpec::load_json(path).unwrap(), spec);
    }
}
