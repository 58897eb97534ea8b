//! Applying the ROI projection to payloads
//!
//! [`RoiRegistry::apply`] dispatches on the payload shape and produces a new
//! payload of the same shape over the derived ROI probe. The input payload
//! is never mutated.
//!
//! Transforms per shape:
//!
//! - Time series: channel columns are z-scored, then projected. Raw channel
//!   amplitudes are not comparable across the channels being averaged, so
//!   normalization precedes the average.
//! - Regression statistics: the projection is expanded to all conditions via
//!   a Kronecker product with the identity, then applied to the mean and the
//!   covariance under the same linear map.
//! - Connectivity statistics: each condition slice gets the bilinear
//!   transform `P' * R * P` with NaN entries contributing zero. An ROI pair
//!   is numeric when at least one contributing channel pair was valid;
//!   invalid pairs dilute the average rather than being renormalized away,
//!   so downstream consumers must not read the value as a mean of only the
//!   valid pairs.

use nalgebra::DMatrix;

use optode_core::data::{ConnectivityStats, Payload, RegressionStats, TimeSeries};
use optode_core::probe::{ChannelProbe, Probe, RoiProbe};
use optode_core::stats::zscore_columns;

use crate::error::RoiError;
use crate::projection::build_projection;
use crate::registry::RoiRegistry;

impl RoiRegistry {
    /// Project a channel-space payload into ROI space.
    ///
    /// Preconditions, checked for every shape: the registry is configured
    /// and holds at least one ROI, and the payload's recorded probe is
    /// value-equal to the registry's channel probe.
    ///
    /// # Errors
    ///
    /// [`RoiError::Precondition`] without a probe or without ROIs,
    /// [`RoiError::ProbeMismatch`] when the payload was computed against a
    /// different probe, [`RoiError::ShapeMismatch`] when the payload's
    /// dimensions disagree with its probe, and
    /// [`RoiError::UnsupportedPayload`] for payload shapes the engine does
    /// not know.
    pub fn apply(&self, payload: &Payload) -> Result<Payload, RoiError> {
        let probe = self.channel_probe().ok_or(RoiError::Precondition {
            what: "channel probe not set",
        })?;
        let roi_probe = self.roi_probe().unwrap_or_default();
        if roi_probe.is_empty() {
            return Err(RoiError::Precondition {
                what: "registry holds no ROIs",
            });
        }

        match payload.probe() {
            Probe::Channel(recorded) if recorded == probe => {}
            _ => return Err(RoiError::ProbeMismatch),
        }

        let projection = build_projection(probe, &roi_probe);
        tracing::debug!(
            kind = payload.kind_name(),
            channels = probe.len(),
            roi_rows = roi_probe.len(),
            "projecting payload into ROI space"
        );

        match payload {
            Payload::Series(series) => {
                apply_series(series, probe, &roi_probe, &projection).map(Payload::Series)
            }
            Payload::Regression(stats) => {
                apply_regression(stats, probe, &roi_probe, &projection).map(Payload::Regression)
            }
            Payload::Connectivity(stats) => {
                apply_connectivity(stats, probe, &roi_probe, &projection).map(Payload::Connectivity)
            }
            other => Err(RoiError::UnsupportedPayload {
                kind: other.kind_name(),
            }),
        }
    }
}

// ============================================================================
// Per-Shape Transforms
// ============================================================================

fn apply_series(
    series: &TimeSeries,
    probe: &ChannelProbe,
    roi_probe: &RoiProbe,
    projection: &DMatrix<f64>,
) -> Result<TimeSeries, RoiError> {
    if series.data.ncols() != probe.len() {
        return Err(RoiError::ShapeMismatch {
            what: "time series channel columns",
            expected: probe.len(),
            got: series.data.ncols(),
        });
    }

    let data = zscore_columns(&series.data) * projection;
    Ok(TimeSeries::new(
        Probe::Roi(roi_probe.clone()),
        data,
        series.sample_rate_hz,
    ))
}

fn apply_regression(
    stats: &RegressionStats,
    probe: &ChannelProbe,
    roi_probe: &RoiProbe,
    projection: &DMatrix<f64>,
) -> Result<RegressionStats, RoiError> {
    let rows = probe.len() * stats.conditions.len();
    if stats.beta.len() != rows {
        return Err(RoiError::ShapeMismatch {
            what: "beta length",
            expected: rows,
            got: stats.beta.len(),
        });
    }
    if stats.covariance.nrows() != rows || stats.covariance.ncols() != rows {
        return Err(RoiError::ShapeMismatch {
            what: "covariance dimension",
            expected: rows,
            got: stats.covariance.nrows(),
        });
    }

    // Expand to all conditions: block-diagonal with one projection per
    // condition, matching the condition-major stacking of beta.
    let identity = DMatrix::<f64>::identity(stats.conditions.len(), stats.conditions.len());
    let expanded = identity.kronecker(projection);
    let expanded_t = expanded.transpose();

    let beta = &expanded_t * &stats.beta;
    let covariance = &expanded_t * &stats.covariance * &expanded;

    Ok(RegressionStats::new(
        Probe::Roi(roi_probe.clone()),
        stats.conditions.clone(),
        beta,
        covariance,
    ))
}

fn apply_connectivity(
    stats: &ConnectivityStats,
    probe: &ChannelProbe,
    roi_probe: &RoiProbe,
    projection: &DMatrix<f64>,
) -> Result<ConnectivityStats, RoiError> {
    if stats.r.len() != stats.conditions.len() {
        return Err(RoiError::ShapeMismatch {
            what: "correlation matrices per condition",
            expected: stats.conditions.len(),
            got: stats.r.len(),
        });
    }
    for slice in &stats.r {
        if slice.nrows() != probe.len() || slice.ncols() != probe.len() {
            return Err(RoiError::ShapeMismatch {
                what: "correlation matrix dimension",
                expected: probe.len(),
                got: slice.nrows(),
            });
        }
    }

    let r = stats
        .r
        .iter()
        .map(|slice| project_masked(slice, projection))
        .collect();

    let std_err = stats.std_err.as_ref().map(|slices| {
        slices
            .iter()
            .map(|slice| project_masked(slice, projection))
            .collect()
    });

    let mut out = ConnectivityStats::new(
        Probe::Roi(roi_probe.clone()),
        stats.conditions.clone(),
        r,
    );
    out.std_err = std_err;
    out.dfe = stats.dfe.clone();
    Ok(out)
}

/// NaN-aware bilinear projection of one square channel matrix.
///
/// NaN entries are zeroed before computing `P' * M * P`, and a parallel
/// validity mask is projected the same way. Output entries with no valid
/// contributing channel pair (including pairs touching an ROI that matched
/// no channels) are NaN.
fn project_masked(matrix: &DMatrix<f64>, projection: &DMatrix<f64>) -> DMatrix<f64> {
    let n = matrix.nrows();
    let mut zeroed = matrix.clone();
    let mut valid = DMatrix::<f64>::zeros(n, n);

    for i in 0..n {
        for j in 0..n {
            if matrix[(i, j)].is_nan() {
                zeroed[(i, j)] = 0.0;
            } else {
                valid[(i, j)] = 1.0;
            }
        }
    }

    let projection_t = projection.transpose();
    let mut out = &projection_t * &zeroed * projection;
    let weight = &projection_t * &valid * projection;

    for i in 0..out.nrows() {
        for j in 0..out.ncols() {
            if weight[(i, j)] == 0.0 {
                out[(i, j)] = f64::NAN;
            }
        }
    }

    out
}

// ============================================================================
// Tests
// ============================================================================
