pub mod classification;

pub use classification::{AveragedMetrics, ClassMetrics, ClassificationReport, ConfusionMatrix};
