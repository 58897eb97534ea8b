//! Connectivity estimator interface
//!
//! The partial-correlation estimator that produces connectivity statistics
//! runs upstream of the ROI engine and is consumed as a black box: given a
//! multichannel time series, an autoregressive model order, and a robustness
//! flag, it returns a correlation matrix, an associated structure matrix,
//! and degrees of freedom. The engine itself only ever sees the assembled
//! [`ConnectivityStats`] payload.

use core::str::FromStr;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use optode_core::data::{ConnectivityStats, TimeSeries};
use optode_core::probe::Probe;

// ============================================================================
// Model Order
// ============================================================================

/// Autoregressive model order for the connectivity estimator.
///
/// Given either as an absolute number of samples, or as a multiple of the
/// sampling rate written `"<multiplier>x"` (so `"4x"` at 10 Hz resolves to
/// an order of 40).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModelOrder {
    /// Absolute order in samples
    Fixed(usize),
    /// Multiplier on the sampling rate
    RateMultiple(f64),
}

impl ModelOrder {
    /// Resolve to an absolute order for data at the given sampling rate.
    #[must_use]
    pub fn resolve(self, sample_rate_hz: f64) -> usize {
        match self {
            Self::Fixed(order) => order,
            Self::RateMultiple(multiplier) => (multiplier * sample_rate_hz).round() as usize,
        }
    }
}

/// Failure to parse a [`ModelOrder`] string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid model order '{0}': expected an integer or '<multiplier>x'")]
pub struct ParseModelOrderError(pub String);

impl FromStr for ModelOrder {
    type Err = ParseModelOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(multiplier) = trimmed.strip_suffix('x') {
            return multiplier
                .parse::<f64>()
                .map(Self::RateMultiple)
                .map_err(|_| ParseModelOrderError(s.to_string()));
        }
        trimmed
            .parse::<usize>()
            .map(Self::Fixed)
            .map_err(|_| ParseModelOrderError(s.to_string()))
    }
}

// ============================================================================
// Estimator Interface
// ============================================================================

/// Output of one estimator run over one condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityEstimate {
    /// Channel-by-channel correlation matrix
    pub r: DMatrix<f64>,
    /// Significance/structure matrix associated with `r`
    pub structure: DMatrix<f64>,
    /// Degrees of freedom of the estimate
    pub dfe: f64,
}

/// Upstream partial-correlation estimator.
///
/// `robust` selects the robust variant over the ordinary one.
pub trait ConnectivityEstimator {
    /// Estimate connectivity for one condition's time series.
    fn estimate(&self, series: &TimeSeries, order: ModelOrder, robust: bool)
        -> ConnectivityEstimate;
}

/// Assemble a connectivity payload from per-condition estimator outputs.
///
/// Correlation matrices and degrees of freedom are taken from the estimates
/// in order; the structure matrices stay with the estimator.
#[must_use]
pub fn stats_from_estimates(
    probe: Probe,
    estimates: Vec<(String, ConnectivityEstimate)>,
) -> ConnectivityStats {
    let mut conditions = Vec::with_capacity(estimates.len());
    let mut r = Vec::with_capacity(estimates.len());
    let mut dfe = Vec::with_capacity(estimates.len());
    for (condition, estimate) in estimates {
        conditions.push(condition);
        r.push(estimate.r);
        dfe.push(estimate.dfe);
    }
    ConnectivityStats::new(probe, conditions, r).with_dfe(dfe)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use optode_core::probe::{Channel, ChannelProbe};

    #[test]
    fn test_model_order_parse_fixed() {
        let order: ModelOrder = "7".parse().unwrap();
        assert_eq!(order, ModelOrder::Fixed(7));
        assert_eq!(order.resolve(10.0), 7);
    }

    #[test]
    fn test_model_order_parse_rate_multiple() {
        let order: ModelOrder = "4x".parse().unwrap();
        assert_eq!(order, ModelOrder::RateMultiple(4.0));
        assert_eq!(order.resolve(10.0), 40);
        assert_eq!(ModelOrder::RateMultiple(0.5).resolve(25.0), 13); // rounded
    }

    #[test]
    fn test_model_order_parse_failure() {
        assert!("4y".parse::<ModelOrder>().is_err());
        assert!("".parse::<ModelOrder>().is_err());
        assert!("x".parse::<ModelOrder>().is_err());
    }

    /// Estimator stand-in returning a constant correlation.
    struct ConstantEstimator(f64);

    impl ConnectivityEstimator for ConstantEstimator {
        fn estimate(
            &self,
            series: &TimeSeries,
            order: ModelOrder,
            _robust: bool,
        ) -> ConnectivityEstimate {
            let n = series.data.ncols();
            let samples = series.n_samples() as f64;
            ConnectivityEstimate {
                r: DMatrix::from_element(n, n, self.0),
                structure: DMatrix::zeros(n, n),
                dfe: samples - order.resolve(series.sample_rate_hz) as f64,
            }
        }
    }

    #[test]
    fn test_from_estimates_assembles_payload() {
        let probe = Probe::Channel(ChannelProbe::new(vec![
            Channel::new(1, 1, "hbo"),
            Channel::new(1, 2, "hbo"),
        ]));
        let series = TimeSeries::new(probe.clone(), DMatrix::zeros(100, 2), 10.0);

        let estimator = ConstantEstimator(0.3);
        let order: ModelOrder = "2x".parse().unwrap();
        let estimates = vec![
            ("rest".to_string(), estimator.estimate(&series, order, false)),
            ("task".to_string(), estimator.estimate(&series, order, true)),
        ];

        let stats = stats_from_estimates(probe, estimates);
        assert_eq!(stats.conditions, vec!["rest".to_string(), "task".to_string()]);
        assert_eq!(stats.r.len(), 2);
        assert!((stats.r[0][(0, 1)] - 0.3).abs() < 1e-12);
        assert_eq!(stats.dfe, Some(vec![80.0, 80.0]));
        assert!(stats.std_err.is_none());
    }
}
