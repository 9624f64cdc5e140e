use serde::{Deserialize, Serialize};

/// Optional annotations attached to a saved network.
/// All fields are Option<> so models saved without metadata deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelMetadata {
    pub description: Option<String>,
    /// Human-readable class names for the output layer
    /// (e.g. ["foot-and-mouth", "lumpy", "healthy"]).
    pub class_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    /// Name for `class`, falling back to its index.
    pub fn class_name(&self, class: usize) -> String {
        self.class_labels
            .as_ref()
            .and_then(|labels| labels.get(class).cloned())
            .unwrap_or_else(|| class.to_string())
    }
}
