use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

use crate::data::dataset::Dataset;
use crate::error::Result;

/// Generates `n_per_class` points per class around well-separated centres
/// on a circle of radius 3 in the first two dimensions, with N(0, spread²)
/// noise on every feature. Rows are interleaved by class.
pub fn synthetic_blobs(
    n_per_class: usize,
    n_classes: usize,
    n_features: usize,
    spread: f64,
    seed: u64,
) -> Result<Dataset> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_per_class * n_classes);
    let mut labels = Vec::with_capacity(n_per_class * n_classes);

    for _ in 0..n_per_class {
        for class in 0..n_classes {
            let angle = 2.0 * PI * class as f64 / n_classes.max(1) as f64;
            let row = (0..n_features)
                .map(|f| {
                    let centre = match f {
                        0 => 3.0 * angle.cos(),
                        1 => 3.0 * angle.sin(),
                        _ => 0.0,
                    };
                    centre + spread * gaussian(&mut rng)
                })
                .collect();
            features.push(row);
            labels.push(class);
        }
    }

    Dataset::new(features, labels, n_classes)
}

fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
