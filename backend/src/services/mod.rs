//! Cross-model computations layered on top of the data types.

pub mod aggregation;

pub use aggregation::{compare, compute_expected, Discrepancy, ExpectedStats, DEFAULT_EPSILON};
