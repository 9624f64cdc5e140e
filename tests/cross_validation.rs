use skyacre_nn::config::{Architecture, HarnessConfig};
use skyacre_nn::cv::{CrossValidationHarness, StratifiedKFold};
use skyacre_nn::data::{synthetic_blobs, Dataset};
use skyacre_nn::diagnosis::{diagnose_history, Verdict};
use skyacre_nn::error::{Error, TrainError};
use skyacre_nn::pipeline::Pipeline;
use skyacre_nn::TrainingHistory;

fn config() -> HarnessConfig {
    HarnessConfig {
        n_splits: 5,
        cv_epochs: 4,
        epochs: 15,
        batch_size: 16,
        learning_rate: 0.05,
        architecture: Architecture { hidden_units: vec![12, 6], ..Architecture::default() },
        ..HarnessConfig::default()
    }
}

fn blobs() -> Dataset {
    synthetic_blobs(20, 3, 4, 0.5, 42).unwrap()
}

#[test]
fn five_folds_ascending_with_consistent_aggregate() {
    let data = blobs();
    let report = CrossValidationHarness::new(config()).unwrap().run(&data).unwrap();

    assert_eq!(report.folds.len(), 5);
    let numbers: Vec<usize> = report.folds.iter().map(|f| f.fold).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);

    let mean_acc = report.folds.iter().map(|f| f.val_accuracy).sum::<f64>() / 5.0;
    assert!((report.aggregate.val_accuracy.mean - mean_acc).abs() < 1e-9);

    let var_f1 = report.folds.iter()
        .map(|f| (f.f1 - report.aggregate.f1.mean).powi(2))
        .sum::<f64>() / 5.0;
    assert!((report.aggregate.f1.std - var_f1.sqrt()).abs() < 1e-9);

    for f in &report.folds {
        assert_eq!(f.val_size, 12);
        assert_eq!(f.train_size, 48);
        assert!((0.0..=1.0).contains(&f.val_accuracy));
        assert!(f.val_loss.is_finite());
    }
}

#[test]
fn validation_sets_partition_the_dataset() {
    let data = blobs();
    let splits = StratifiedKFold::new(5, true, 42).split(data.labels()).unwrap();

    let mut all: Vec<usize> = splits.iter().flat_map(|s| s.val_indices.clone()).collect();
    all.sort_unstable();
    assert_eq!(all, (0..data.len()).collect::<Vec<_>>());

    // 20 per class over 5 folds: exactly 4 of each class in every fold.
    for s in &splits {
        let mut per_class = [0usize; 3];
        for &i in &s.val_indices {
            per_class[data.labels()[i]] += 1;
        }
        assert_eq!(per_class, [4, 4, 4]);
    }
}

#[test]
fn same_seed_reproduces_the_run() {
    let data = blobs();
    let a = CrossValidationHarness::new(config()).unwrap().run(&data).unwrap();
    let b = CrossValidationHarness::new(config()).unwrap().run(&data).unwrap();

    // Timings differ between runs; everything numeric must not.
    for (fa, fb) in a.folds.iter().zip(&b.folds) {
        assert_eq!(fa.val_loss, fb.val_loss);
        assert_eq!(fa.f1, fb.f1);
        assert_eq!(fa.history.train_losses(), fb.history.train_losses());
    }
    assert_eq!(a.aggregate, b.aggregate);
}

#[test]
fn class_smaller_than_fold_count_is_rejected() {
    let features: Vec<Vec<f64>> = (0..14).map(|i| vec![i as f64]).collect();
    let mut labels = vec![0; 10];
    labels.extend([1, 1, 1, 1]);
    let data = Dataset::new(features, labels, 2).unwrap();

    let err = CrossValidationHarness::new(config()).unwrap().run(&data).unwrap_err();
    assert!(matches!(err, Error::InsufficientClassMembers { class: 1, count: 4, n_splits: 5 }));
}

#[test]
fn budget_failure_aborts_at_fold_one() {
    let data = blobs();
    let config = HarnessConfig { max_parameters: Some(50), ..config() };
    let err = CrossValidationHarness::new(config).unwrap().run(&data).unwrap_err();

    match err {
        Error::Fold { fold, source: TrainError::Resource { required, budget } } => {
            assert_eq!(fold, 1);
            assert_eq!(budget, 50);
            // 4*12+12 + 12*6+6 + 6*3+3
            assert_eq!(required, 159);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn pipeline_history_round_trips_into_diagnosis() {
    let data = blobs();
    let report = Pipeline::new(config()).unwrap().run(&data, false).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let path = path.to_str().unwrap();
    report.history.save_json(path).unwrap();

    let loaded = TrainingHistory::load_json(path).unwrap();
    let diagnosis = diagnose_history(&loaded).unwrap();
    assert_eq!(diagnosis.verdict, report.diagnosis.verdict);
    assert!(matches!(
        diagnosis.verdict,
        Verdict::Overfitting | Verdict::Underfitting | Verdict::GoodFit
    ));
    assert!((diagnosis.accuracy_gap - report.diagnosis.accuracy_gap).abs() < 1e-9);
}
