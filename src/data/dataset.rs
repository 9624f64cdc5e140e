use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A labeled, in-memory classification dataset.
///
/// Rows are feature vectors of identical width; labels are class indices in
/// `0..n_classes`. Built once and then only read: every split produces new
/// `Dataset`s through [`Dataset::subset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    n_classes: usize,
}

impl Dataset {
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>, n_classes: usize) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::Dataset("dataset has no rows".into()));
        }
        if features.len() != labels.len() {
            return Err(Error::Dataset(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if n_classes == 0 {
            return Err(Error::Dataset("n_classes must be at least 1".into()));
        }

        let width = features[0].len();
        if width == 0 {
            return Err(Error::Dataset("rows have no features".into()));
        }
        for (i, row) in features.iter().enumerate() {
            if row.len() != width {
                return Err(Error::Dataset(format!(
                    "row {} has {} features, expected {}",
                    i, row.len(), width
                )));
            }
            if let Some(x) = row.iter().find(|x| !x.is_finite()) {
                return Err(Error::Dataset(format!("row {} contains non-finite value {}", i, x)));
            }
        }
        if let Some((i, &label)) = labels.iter().enumerate().find(|&(_, &l)| l >= n_classes) {
            return Err(Error::Dataset(format!(
                "row {} has label {} but n_classes is {}",
                i, label, n_classes
            )));
        }

        Ok(Dataset { features, labels, n_classes })
    }

    /// Like [`Dataset::new`], with `n_classes` taken as `max(label) + 1`.
    pub fn with_inferred_classes(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self> {
        let n_classes = labels.iter().max().map_or(0, |m| m + 1);
        Dataset::new(features, labels, n_classes)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Examples per class, indexed by class.
    pub fn class_counts(&self) -> Vec<usize> {
        class_counts(&self.labels, self.n_classes)
    }

    /// Rows at `indices`, in that order. Keeps `n_classes` even when some
    /// class is absent from the subset.
    ///
    /// Panics if an index is out of bounds.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            n_classes: self.n_classes,
        }
    }

    /// Copy with features replaced, e.g. after scaling. Shape must match.
    pub fn with_features(&self, features: Vec<Vec<f64>>) -> Result<Dataset> {
        if features.len() != self.len() {
            return Err(Error::Dataset(format!(
                "replacement has {} rows, expected {}",
                features.len(),
                self.len()
            )));
        }
        Dataset::new(features, self.labels.clone(), self.n_classes)
    }

    /// Labels as one-hot target vectors.
    pub fn one_hot_labels(&self) -> Vec<Vec<f64>> {
        self.labels.iter()
            .map(|&l| {
                let mut v = vec![0.0; self.n_classes];
                v[l] = 1.0;
                v
            })
            .collect()
    }
}

pub(crate) fn class_counts(labels: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &l in labels {
        if l < n_classes {
            counts[l] += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Dataset {
        Dataset::new(
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]],
            vec![0, 2, 2],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_class_counts_include_absent_classes() {
        assert_eq!(tiny().class_counts(), vec![1, 0, 2]);
    }

    #[test]
    fn test_rejects_bad_rows() {
        assert!(Dataset::new(vec![], vec![], 3).is_err());
        assert!(Dataset::new(vec![vec![1.0], vec![1.0, 2.0]], vec![0, 1], 2).is_err());
        assert!(Dataset::new(vec![vec![f64::NAN]], vec![0], 1).is_err());
        assert!(Dataset::new(vec![vec![1.0]], vec![3], 3).is_err());
        assert!(Dataset::new(vec![vec![1.0]], vec![0, 1], 3).is_err());
    }

    #[test]
    fn test_subset_and_one_hot() {
        let sub = tiny().subset(&[2, 0]);
        assert_eq!(sub.labels(), &[2, 0]);
        assert_eq!(sub.n_classes(), 3);
        assert_eq!(sub.one_hot_labels(), vec![vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_inferred_classes() {
        let ds = Dataset::with_inferred_classes(vec![vec![1.0], vec![2.0]], vec![0, 4]).unwrap();
        assert_eq!(ds.n_classes(), 5);
    }
}
