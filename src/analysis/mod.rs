//! Analysis modules.
//!
//! This module turns a loaded record snapshot into the derived data
//! behind every dashboard chart.

pub mod aggregator;

pub use aggregator::*;
