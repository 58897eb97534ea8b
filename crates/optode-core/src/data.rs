//! Payload types consumed and produced by the ROI engine
//!
//! Three payload shapes share one contract: each carries the [`Probe`] it was
//! computed against, and its channel axis follows the probe's link row order.
//!
//! - [`TimeSeries`]: raw per-sample data
//! - [`RegressionStats`]: per-(channel, condition) estimates with covariance
//! - [`ConnectivityStats`]: per-condition correlation matrices
//!
//! Payloads are value types; transforms produce new instances and never
//! mutate their input.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::probe::{Probe, SignalType};

// ============================================================================
// Time Series
// ============================================================================

/// Raw multichannel time series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Probe the data was recorded against
    pub probe: Probe,
    /// Sample matrix, one row per sample, one column per probe link row
    pub data: DMatrix<f64>,
    /// Sampling rate in Hz
    pub sample_rate_hz: f64,
}

impl TimeSeries {
    /// Create a time series.
    ///
    /// `data` must have one column per link row of `probe`.
    #[must_use]
    pub fn new(probe: Probe, data: DMatrix<f64>, sample_rate_hz: f64) -> Self {
        Self {
            probe,
            data,
            sample_rate_hz,
        }
    }

    /// Number of samples (rows).
    #[inline]
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }
}

// ============================================================================
// Regression Statistics
// ============================================================================

/// Row label of a regression estimate: which link row, at which condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRow {
    /// Link row label: `"S{source}D{detector}"` for channel probes, the ROI
    /// name for ROI probes
    pub label: String,
    /// Signal type of the link row
    pub signal_type: SignalType,
    /// Condition name
    pub condition: String,
}

/// Regression estimates over a probe: one beta per (link row, condition),
/// with the joint covariance of all estimates.
///
/// Estimates are stacked condition-major: all link rows of the first
/// condition, then all link rows of the second, and so on. `beta` has length
/// `probe.len() * conditions.len()` and `covariance` is square of the same
/// dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionStats {
    /// Probe the estimates were computed against
    pub probe: Probe,
    /// Condition names, in order of first appearance in the design
    pub conditions: Vec<String>,
    /// Stacked estimates, condition-major
    pub beta: DVector<f64>,
    /// Covariance of the stacked estimates
    pub covariance: DMatrix<f64>,
}

impl RegressionStats {
    /// Create regression statistics.
    #[must_use]
    pub fn new(
        probe: Probe,
        conditions: Vec<String>,
        beta: DVector<f64>,
        covariance: DMatrix<f64>,
    ) -> Self {
        Self {
            probe,
            conditions,
            beta,
            covariance,
        }
    }

    /// Row labels of `beta`, in stacking order.
    ///
    /// Derived from the probe and condition list, so the table cannot drift
    /// out of sync with the estimates.
    #[must_use]
    pub fn variables(&self) -> Vec<VariableRow> {
        let mut rows = Vec::with_capacity(self.probe.len() * self.conditions.len());
        for condition in &self.conditions {
            match &self.probe {
                Probe::Channel(p) => {
                    for ch in p.channels() {
                        rows.push(VariableRow {
                            label: format!("S{}D{}", ch.source, ch.detector),
                            signal_type: ch.signal_type.clone(),
                            condition: condition.clone(),
                        });
                    }
                }
                Probe::Roi(p) => {
                    for row in p.rows() {
                        rows.push(VariableRow {
                            label: row.name.clone(),
                            signal_type: row.signal_type.clone(),
                            condition: condition.clone(),
                        });
                    }
                }
            }
        }
        rows
    }
}

// ============================================================================
// Connectivity Statistics
// ============================================================================

/// Per-condition connectivity (correlation) matrices over a probe.
///
/// Each matrix in `r` is square over the probe's link rows. Entries may be
/// NaN where no valid estimate exists for a channel pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityStats {
    /// Probe the matrices were computed against
    pub probe: Probe,
    /// Condition names, one per matrix in `r`
    pub conditions: Vec<String>,
    /// Correlation matrix per condition
    pub r: Vec<DMatrix<f64>>,
    /// Standard-error matrix per condition, if available
    pub std_err: Option<Vec<DMatrix<f64>>>,
    /// Degrees of freedom per condition, if available
    pub dfe: Option<Vec<f64>>,
}

impl ConnectivityStats {
    /// Create connectivity statistics.
    #[must_use]
    pub fn new(probe: Probe, conditions: Vec<String>, r: Vec<DMatrix<f64>>) -> Self {
        Self {
            probe,
            conditions,
            r,
            std_err: None,
            dfe: None,
        }
    }

    /// Attach a standard-error matrix per condition.
    #[must_use]
    pub fn with_std_err(mut self, std_err: Vec<DMatrix<f64>>) -> Self {
        self.std_err = Some(std_err);
        self
    }

    /// Attach degrees of freedom per condition.
    #[must_use]
    pub fn with_dfe(mut self, dfe: Vec<f64>) -> Self {
        self.dfe = Some(dfe);
        self
    }
}

// ============================================================================
// Payload Sum Type
// ============================================================================

/// A payload of any supported shape.
///
/// The ROI engine dispatches on this; new shapes may appear, so consumers
/// must handle unknown variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Payload {
    /// Raw time series
    Series(TimeSeries),
    /// Regression estimates with covariance
    Regression(RegressionStats),
    /// Per-condition connectivity matrices
    Connectivity(ConnectivityStats),
}

impl Payload {
    /// The probe this payload was computed against.
    #[must_use]
    pub fn probe(&self) -> &Probe {
        match self {
            Self::Series(s) => &s.probe,
            Self::Regression(s) => &s.probe,
            Self::Connectivity(s) => &s.probe,
        }
    }

    /// Shape name, for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Series(_) => "time series",
            Self::Regression(_) => "regression statistics",
            Self::Connectivity(_) => "connectivity statistics",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Channel, ChannelProbe};

    fn two_channel_probe() -> Probe {
        Probe::Channel(ChannelProbe::new(vec![
            Channel::new(1, 1, "hbo"),
            Channel::new(1, 2, "hbo"),
        ]))
    }

    #[test]
    fn test_variables_condition_major() {
        let stats = RegressionStats::new(
            two_channel_probe(),
            vec!["taskA".into(), "taskB".into()],
            DVector::zeros(4),
            DMatrix::zeros(4, 4),
        );

        let vars = stats.variables();
        assert_eq!(vars.len(), 4);
        assert_eq!(vars[0].label, "S1D1");
        assert_eq!(vars[0].condition, "taskA");
        assert_eq!(vars[1].label, "S1D2");
        assert_eq!(vars[2].condition, "taskB");
    }

    #[test]
    fn test_payload_probe_accessor() {
        let series = Payload::Series(TimeSeries::new(
            two_channel_probe(),
            DMatrix::zeros(10, 2),
            10.0,
        ));
        assert_eq!(series.probe(), &two_channel_probe());
        assert_eq!(series.kind_name(), "time series");
    }

    #[test]
    fn test_payload_serde_round_trip() {
        let payload = Payload::Connectivity(
            ConnectivityStats::new(
                two_channel_probe(),
                vec!["rest".into()],
                vec![DMatrix::identity(2, 2)],
            )
            .with_dfe(vec![120.0]),
        );
        let json = serde_json::to_string(&payload).unwrap();
        let back: Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(payload, back);
    }
}
