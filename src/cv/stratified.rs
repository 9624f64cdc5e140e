//! Stratified partitioning.
//!
//! Examples of each class are (optionally) shuffled with a seeded RNG and
//! then dealt to the folds round-robin. The dealing position carries over
//! from one class to the next, so fold sizes differ by at most one overall
//! and each class's count per fold differs by at most one.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One cross-validation split. Both index lists are ascending and disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldSplit {
    /// 1-based fold number.
    pub fold: usize,
    pub train_indices: Vec<usize>,
    pub val_indices: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        StratifiedKFold { n_splits: 5, shuffle: true, seed: 42 }
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, shuffle: bool, seed: u64) -> Self {
        StratifiedKFold { n_splits, shuffle, seed }
    }

    /// Splits `labels` into `n_splits` folds, in ascending fold order.
    ///
    /// # Errors
    /// - `Error::Config` if `n_splits < 2`
    /// - `Error::InsufficientClassMembers` if a class that occurs at all
    ///   has fewer than `n_splits` examples
    pub fn split(&self, labels: &[usize]) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(Error::Config(format!("n_splits must be at least 2, got {}", self.n_splits)));
        }

        let by_class = group_by_class(labels);
        for (class, members) in by_class.iter().enumerate() {
            if !members.is_empty() && members.len() < self.n_splits {
                return Err(Error::InsufficientClassMembers {
                    class,
                    count: members.len(),
                    n_splits: self.n_splits,
                });
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut assignment = vec![0usize; labels.len()];
        let mut next = 0usize;
        for mut members in by_class {
            if self.shuffle {
                members.shuffle(&mut rng);
            }
            for idx in members {
                assignment[idx] = next % self.n_splits;
                next += 1;
            }
        }

        Ok((0..self.n_splits)
            .map(|k| {
                let (val_indices, train_indices) = (0..labels.len()).partition(|&i| assignment[i] == k);
                FoldSplit { fold: k + 1, train_indices, val_indices }
            })
            .collect())
    }
}

/// Stratified two-way split: from each class, `round(count * fraction)`
/// examples (at least one when the class has two or more) go to the
/// held-out side. Returns `(train_indices, holdout_indices)`, both ascending.
pub fn stratified_holdout(labels: &[usize], fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(Error::Config(format!("holdout fraction must be in (0, 1), got {}", fraction)));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut held_out = vec![false; labels.len()];
    for (class, mut members) in group_by_class(labels).into_iter().enumerate() {
        if members.is_empty() {
            continue;
        }
        if members.len() < 2 {
            return Err(Error::InsufficientClassMembers { class, count: members.len(), n_splits: 2 });
        }
        members.shuffle(&mut rng);
        let take = ((members.len() as f64 * fraction).round() as usize).clamp(1, members.len() - 1);
        for &idx in &members[..take] {
            held_out[idx] = true;
        }
    }

    Ok((0..labels.len()).partition(|&i| !held_out[i]))
}

/// Indices per class, in ascending index order.
fn group_by_class(labels: &[usize]) -> Vec<Vec<usize>> {
    let n_classes = labels.iter().max().map_or(0, |m| m + 1);
    let mut by_class = vec![Vec::new(); n_classes];
    for (i, &l) in labels.iter().enumerate() {
        by_class[l].push(i);
    }
    by_class
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(counts: &[usize]) -> Vec<usize> {
        // Interleave classes so positions are not grouped by label.
        let mut out = Vec::new();
        let max = counts.iter().copied().max().unwrap_or(0);
        for i in 0..max {
            for (class, &n) in counts.iter().enumerate() {
                if i < n {
                    out.push(class);
                }
            }
        }
        out
    }

    #[test]
    fn test_every_example_validated_exactly_once() {
        for k in 2..=6 {
            let y = labels(&[13, 9, 6]);
            let folds = StratifiedKFold::new(k, true, 42).split(&y).unwrap();
            assert_eq!(folds.len(), k);

            let mut seen = vec![0; y.len()];
            for (i, f) in folds.iter().enumerate() {
                assert_eq!(f.fold, i + 1);
                assert_eq!(f.train_indices.len() + f.val_indices.len(), y.len());
                for &v in &f.val_indices {
                    seen[v] += 1;
                    assert!(f.train_indices.binary_search(&v).is_err());
                }
            }
            assert!(seen.iter().all(|&c| c == 1));
        }
    }

    #[test]
    fn test_class_balance_per_fold() {
        let y = labels(&[20, 11, 7]);
        let folds = StratifiedKFold::new(5, true, 1).split(&y).unwrap();
        for class in 0..3 {
            let per_fold: Vec<usize> = folds.iter()
                .map(|f| f.val_indices.iter().filter(|&&i| y[i] == class).count())
                .collect();
            let min = *per_fold.iter().min().unwrap();
            let max = *per_fold.iter().max().unwrap();
            assert!(max - min <= 1, "class {} spread {:?}", class, per_fold);
        }
        let sizes: Vec<usize> = folds.iter().map(|f| f.val_indices.len()).collect();
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let y = labels(&[10, 10, 10]);
        let a = StratifiedKFold::new(5, true, 42).split(&y).unwrap();
        let b = StratifiedKFold::new(5, true, 42).split(&y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unshuffled_deals_in_index_order() {
        let y = vec![0, 0, 1, 1];
        let folds = StratifiedKFold::new(2, false, 0).split(&y).unwrap();
        assert_eq!(folds[0].val_indices, vec![0, 2]);
        assert_eq!(folds[1].val_indices, vec![1, 3]);
    }

    #[test]
    fn test_small_class_is_rejected() {
        let y = labels(&[10, 4, 10]);
        let err = StratifiedKFold::new(5, true, 42).split(&y).unwrap_err();
        assert!(matches!(err, Error::InsufficientClassMembers { class: 1, count: 4, n_splits: 5 }));
    }

    #[test]
    fn test_single_fold_is_rejected() {
        assert!(matches!(StratifiedKFold::new(1, true, 0).split(&[0, 1]), Err(Error::Config(_))));
    }

    #[test]
    fn test_holdout_keeps_class_ratio() {
        let y = labels(&[20, 40]);
        let (train, held) = stratified_holdout(&y, 0.25, 7).unwrap();
        assert_eq!(train.len() + held.len(), 60);
        assert_eq!(held.iter().filter(|&&i| y[i] == 0).count(), 5);
        assert_eq!(held.iter().filter(|&&i| y[i] == 1).count(), 10);
    }
}
