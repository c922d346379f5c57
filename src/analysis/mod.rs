//! Analysis modules
//!
//! Builds on the key estimator:
//! - Relative mode (two configurations of the same audio)
//! - Relative mode across time (windowed estimation)
//! - Distances between windows
//! - Result types

pub mod across_time;
pub mod distance;
pub mod relative_mode;
pub mod result;

pub use across_time::{rme_across_time, rme_across_time_file, rme_across_time_with, windowed_estimates};
pub use distance::DistanceMetric;
pub use relative_mode::{relative_mode, relative_mode_with};
