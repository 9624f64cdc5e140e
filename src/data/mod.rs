pub mod csv;
pub mod dataset;
pub mod scaler;
pub mod synthetic;

pub use csv::{load_csv, parse_csv};
pub use dataset::Dataset;
pub use scaler::{standardize_split, StandardScaler};
pub use synthetic::synthetic_blobs;
