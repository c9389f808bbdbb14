//! Car profile assembly.
//!
//! This module provides the aggregator behind `/api/car/profile`.

pub mod aggregator;

pub use aggregator::{ProfileAggregator, ProfileError, SearchSettings};
