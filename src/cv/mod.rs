pub mod harness;
pub mod session;
pub mod stratified;
pub mod summary;

pub use harness::CrossValidationHarness;
pub use session::FoldSession;
pub use stratified::{stratified_holdout, FoldSplit, StratifiedKFold};
pub use summary::{AggregateResult, CrossValidationReport, FoldResult, MetricSummary};
