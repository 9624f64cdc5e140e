use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};

/// Per-feature standardization `(x - mean) / std`.
///
/// Fit on training rows only; the same statistics are then applied to
/// validation and inference rows. A constant feature gets `std = 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first()
            .map(Vec::len)
            .ok_or_else(|| Error::Dataset("cannot fit a scaler on zero rows".into()))?;
        let n = rows.len() as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; width];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }
        let std = var.into_iter()
            .map(|v| {
                let s = (v / n).sqrt();
                if s > f64::EPSILON { s } else { 1.0 }
            })
            .collect();

        Ok(StandardScaler { mean, std })
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter().zip(&self.mean).zip(&self.std)
            .map(|((x, m), s)| (x - m) / s)
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

/// Fits a scaler on `train` and applies it to both partitions.
pub fn standardize_split(train: &Dataset, val: &Dataset) -> Result<(Dataset, Dataset, StandardScaler)> {
    let scaler = StandardScaler::fit(train.features())?;
    let train = train.with_features(scaler.transform(train.features()))?;
    let val = val.with_features(scaler.transform(val.features()))?;
    Ok((train, val, scaler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_transform_centres_and_scales() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.mean, vec![2.0, 5.0]);
        assert_eq!(scaler.std, vec![1.0, 1.0]);
        assert_eq!(scaler.transform(&rows), vec![vec![-1.0, 0.0], vec![1.0, 0.0]]);
    }

    #[test]
    fn test_split_uses_training_statistics_only() {
        let train = Dataset::new(vec![vec![0.0], vec![2.0]], vec![0, 1], 2).unwrap();
        let val = Dataset::new(vec![vec![100.0]], vec![1], 2).unwrap();
        let (train, val, scaler) = standardize_split(&train, &val).unwrap();
        assert_eq!(scaler.mean, vec![1.0]);
        assert_eq!(train.features(), &[vec![-1.0], vec![1.0]]);
        assert_eq!(val.features(), &[vec![99.0]]);
    }

    #[test]
    fn test_empty_rows_rejected() {
        assert!(StandardScaler::fit(&[]).is_err());
    }
}
