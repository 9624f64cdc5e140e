use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::data::dataset::Dataset;
use crate::error::TrainError;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::evaluate::evaluate;
use crate::train::history::TrainingHistory;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with mini-batch SGD on softmax cross-entropy and returns
/// the per-epoch history.
///
/// # Arguments
/// - `network`   — mutable reference to the network; modified in place
/// - `train`     — training set
/// - `val`       — optional validation set, evaluated after every epoch
/// - `optimizer` — SGD optimizer (carries learning rate and momentum state)
/// - `config`    — epoch budget, batch size, shuffle seed, early stopping
///
/// # Errors
/// - `TrainError::Model` if the training set is empty or `batch_size == 0`
/// - `TrainError::NonFinite` as soon as a training or validation loss is
///   NaN or infinite; the network is left in its diverged state
pub fn train_loop(
    network: &mut Network,
    train: &Dataset,
    val: Option<&Dataset>,
    optimizer: &mut Sgd,
    config: &TrainConfig,
) -> Result<TrainingHistory, TrainError> {
    if train.is_empty() {
        return Err(TrainError::Model("training set is empty".into()));
    }
    if config.batch_size == 0 {
        return Err(TrainError::Model("batch_size must be at least 1".into()));
    }

    let targets = train.one_hot_labels();
    let mut rng = ChaCha8Rng::seed_from_u64(config.shuffle_seed);
    let mut history = TrainingHistory::default();

    let mut best: Option<(f64, usize)> = None;
    let mut best_network: Option<Network> = None;
    let mut epochs_without_improvement = 0;

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let train_loss = run_one_epoch(
            network,
            train.features(),
            &targets,
            optimizer,
            config.batch_size,
            &mut rng,
        );
        if !train_loss.is_finite() {
            return Err(TrainError::NonFinite { stage: "train", epoch });
        }

        let train_accuracy = evaluate(network, train).report.accuracy;

        // ── Validation ────────────────────────────────────────────────────
        let (val_loss, val_accuracy) = match val {
            Some(v) if !v.is_empty() => {
                let e = evaluate(network, v);
                if !e.loss.is_finite() {
                    return Err(TrainError::NonFinite { stage: "validation", epoch });
                }
                (Some(e.loss), Some(e.report.accuracy))
            }
            _ => (None, None),
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            train_accuracy,
            val_loss,
            val_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        tracing::debug!(
            epoch,
            train_loss,
            train_accuracy,
            val_loss = ?stats.val_loss,
            val_accuracy = ?stats.val_accuracy,
            "epoch finished"
        );
        history.push(stats);

        // ── Early stopping ────────────────────────────────────────────────
        let Some(policy) = config.early_stopping else {
            continue;
        };
        let monitored = val_loss.unwrap_or(train_loss);
        let improved = best.map_or(true, |(b, _)| monitored < b - policy.min_delta);
        if improved {
            best = Some((monitored, epoch));
            epochs_without_improvement = 0;
            if policy.restore_best {
                best_network = Some(network.clone());
            }
        } else {
            epochs_without_improvement += 1;
            if epochs_without_improvement >= policy.patience {
                tracing::info!(epoch, patience = policy.patience, "early stopping");
                break;
            }
        }
    }

    if let (Some((_, best_epoch)), Some(best_net)) = (best, best_network) {
        if history.last().map(|s| s.epoch) != Some(best_epoch) {
            tracing::info!(best_epoch, "restoring best weights");
            *network = best_net;
            history.restored_epoch = Some(best_epoch);
        }
    }

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs one full epoch of mini-batch SGD over the training data.
/// Returns the mean loss over all samples, measured before each batch's update.
fn run_one_epoch(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    optimizer: &mut Sgd,
    batch_size: usize,
    rng: &mut ChaCha8Rng,
) -> f64 {
    let n = inputs.len();
    let mut total_loss = 0.0;

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    for batch in indices.chunks(batch_size) {
        let mut acc_grads: Vec<(Matrix, Matrix)> = network.layers.iter()
            .map(|layer| (
                Matrix::zeros(layer.weights.rows, layer.weights.cols),
                Matrix::zeros(layer.biases.rows, layer.biases.cols),
            ))
            .collect();

        for &idx in batch {
            let input    = &inputs[idx];
            let expected = &targets[idx];

            let output = network.forward(input.clone());
            total_loss += CrossEntropyLoss::loss(&output, expected);

            let mut delta = Matrix::row(CrossEntropyLoss::derivative(&output, expected));

            // Backward pass.
            for i in (0..network.layers.len()).rev() {
                let input_for_layer = if i == 0 {
                    Matrix::row(input.clone())
                } else {
                    network.layers[i - 1].neurons.clone()
                };

                let (w_grad, b_grad) = network.layers[i].compute_gradients(delta.clone(), &input_for_layer);

                if i > 0 {
                    delta = b_grad.clone() * network.layers[i].weights.transpose();
                }

                let (w_acc, b_acc) = std::mem::take(&mut acc_grads[i]);
                acc_grads[i] = (w_acc + w_grad, b_acc + b_grad);
            }
        }

        // Average and apply.
        let inv_batch = 1.0 / batch.len() as f64;
        for (i, (w_acc, b_acc)) in acc_grads.into_iter().enumerate() {
            let w_avg = w_acc.map(|x| x * inv_batch);
            let b_avg = b_acc.map(|x| x * inv_batch);
            optimizer.step(i, &mut network.layers[i], w_avg, b_avg);
        }
    }

    total_loss / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::data::synthetic::synthetic_blobs;
    use crate::network::spec::NetworkSpec;
    use crate::train::train_config::EarlyStopping;

    fn setup() -> (Network, Dataset) {
        let data = synthetic_blobs(20, 3, 2, 0.3, 1).unwrap();
        let spec = NetworkSpec::classifier("blobs", 2, &[8], ActivationFunction::Tanh, 3);
        (Network::from_spec(&spec, 3), data)
    }

    #[test]
    fn test_loss_decreases_on_separable_data() {
        let (mut net, data) = setup();
        let mut sgd = Sgd::new(0.1);
        let history = train_loop(&mut net, &data, Some(&data), &mut sgd, &TrainConfig::new(30, 8, 0)).unwrap();

        assert_eq!(history.len(), 30);
        let losses = history.train_losses();
        assert!(losses[29] < losses[0]);
        assert!(history.last().unwrap().val_accuracy.is_some());
    }

    #[test]
    fn test_same_seeds_same_history_losses() {
        let run = || {
            let (mut net, data) = setup();
            let mut sgd = Sgd::new(0.05);
            train_loop(&mut net, &data, None, &mut sgd, &TrainConfig::new(5, 4, 9)).unwrap().train_losses()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_early_stopping_stops_before_budget() {
        let (mut net, data) = setup();
        // A zero learning rate never improves after the first epoch.
        let mut sgd = Sgd::new(0.0);
        let config = TrainConfig::new(50, 8, 0).with_early_stopping(EarlyStopping::new(3));
        let history = train_loop(&mut net, &data, Some(&data), &mut sgd, &config).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.restored_epoch, Some(1));
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        let (mut net, data) = setup();
        let empty = data.subset(&[]);
        let mut sgd = Sgd::new(0.1);
        let err = train_loop(&mut net, &empty, None, &mut sgd, &TrainConfig::new(1, 1, 0)).unwrap_err();
        assert!(matches!(err, TrainError::Model(_)));
    }
}
