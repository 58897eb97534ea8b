//! Optode ROI - region-of-interest aggregation for channel-level fNIRS data
//!
//! This crate aggregates channel-level measurements into user-defined
//! regions of interest and propagates the aggregation through every
//! downstream data shape: raw time series, regression statistics (beta and
//! covariance), and connectivity matrices.
//!
//! # Modules
//!
//! - [`registry`]: The ROI registry and ROI-probe derivation
//! - [`projection`]: Channel-to-ROI averaging matrices
//! - [`apply`]: Payload transforms into ROI space
//! - [`estimator`]: The upstream connectivity-estimator seam
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use optode_core::probe::{Channel, ChannelProbe, Probe};
//! use optode_core::data::{Payload, TimeSeries};
//! use optode_roi::{RoiRegistry, RoiSpec};
//!
//! let probe = Probe::Channel(ChannelProbe::new(vec![
//!     Channel::new(1, 1, "hbo"),
//!     Channel::new(1, 2, "hbo"),
//!     Channel::new(2, 1, "hbo"),
//! ]));
//!
//! let mut registry = RoiRegistry::new();
//! registry.set_channel_probe(probe.clone()).unwrap();
//! registry
//!     .add_roi(RoiSpec::new(vec![1, 1], vec![1, 2]).named("left"))
//!     .unwrap();
//!
//! let data = DMatrix::from_fn(20, 3, |i, j| ((i + 1) as f64 * 0.4 + j as f64).sin());
//! let series = TimeSeries::new(probe, data, 10.0);
//! let projected = registry.apply(&Payload::Series(series)).unwrap();
//! assert_eq!(projected.kind_name(), "time series");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod apply;
pub mod error;
pub mod estimator;
pub mod projection;
pub mod registry;

// Re-export commonly used types at crate root
pub use error::RoiError;
pub use estimator::{stats_from_estimates, ConnectivityEstimate, ConnectivityEstimator, ModelOrder};
pub use registry::{Roi, RoiRegistry, RoiSpec};
