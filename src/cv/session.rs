use crate::error::TrainError;
use crate::network::network::Network;
use crate::network::spec::NetworkSpec;
use crate::optim::sgd::Sgd;

/// Owns the network and optimizer of one training run.
///
/// Only one session is alive at a time; it is released (and logged as
/// released) when dropped, whether the run finished or failed.
#[derive(Debug)]
pub struct FoldSession {
    pub fold: usize,
    pub network: Network,
    pub optimizer: Sgd,
}

impl FoldSession {
    /// Builds an untrained network for `spec`.
    ///
    /// # Errors
    /// - `TrainError::Model` if `spec` does not match the data shape
    /// - `TrainError::Resource` if the network exceeds `max_parameters`
    pub fn acquire(
        fold: usize,
        spec: &NetworkSpec,
        n_features: usize,
        n_classes: usize,
        seed: u64,
        optimizer: Sgd,
        max_parameters: Option<usize>,
    ) -> Result<FoldSession, TrainError> {
        spec.validate(n_features, n_classes)?;
        check_budget(spec, max_parameters)?;

        let network = Network::from_spec(spec, seed);
        tracing::debug!(fold, parameters = network.parameter_count(), "session acquired");
        Ok(FoldSession { fold, network, optimizer })
    }

    /// Ends the session and keeps the trained network.
    pub fn into_network(mut self) -> Network {
        let placeholder = Network { layers: Vec::new(), metadata: None };
        std::mem::replace(&mut self.network, placeholder)
    }
}

impl Drop for FoldSession {
    fn drop(&mut self) {
        tracing::debug!(fold = self.fold, "session released");
    }
}

/// Fails when a network built from `spec` would hold more than `budget`
/// weights and biases.
pub fn check_budget(spec: &NetworkSpec, budget: Option<usize>) -> Result<(), TrainError> {
    match budget {
        Some(budget) if spec.parameter_count() > budget => Err(TrainError::Resource {
            required: spec.parameter_count(),
            budget,
        }),
        _ => Ok(()),
    }
}
