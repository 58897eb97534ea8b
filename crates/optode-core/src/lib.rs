//! Optode Core - probe geometry and payload types for fNIRS processing
//!
//! This crate provides the foundational value types shared across the Optode
//! toolkit: probe link tables, the payload shapes computed over them, and
//! column statistics used during aggregation.
//!
//! # Modules
//!
//! - [`probe`]: Channel and ROI probe link tables, signal types, hyperscan tags
//! - [`data`]: Payload shapes (time series, regression stats, connectivity stats)
//! - [`stats`]: Column statistics (z-scoring)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod data;
pub mod probe;
pub mod stats;

// Re-export commonly used types at crate root
pub use data::{ConnectivityStats, Payload, RegressionStats, TimeSeries, VariableRow};
pub use probe::{Channel, ChannelProbe, HyperscanTag, Probe, RoiLinkRow, RoiProbe, SignalType};
