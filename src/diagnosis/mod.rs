pub mod overfit;

pub use overfit::{diagnose, diagnose_history, OverfitDiagnosis, Verdict};
