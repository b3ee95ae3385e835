//! Sequencing coverage estimation from uniquely mappable segments.
//!
//! - [`segments`]: sentinel-run discovery and the adaptive length search
//! - [`estimator`]: per-segment depth, per-chromosome and genome-wide means
//! - [`report`]: text, JSON and TSV rendering

pub mod estimator;
pub mod report;
pub mod segments;
