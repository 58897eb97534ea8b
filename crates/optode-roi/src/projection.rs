//! Channel-to-ROI projection matrices
//!
//! The projection matrix is the linear operator that averages channel-space
//! values into ROI space. It has one row per channel-probe link row and one
//! column per ROI-probe link row; column j holds 1/k at the k channels
//! grouped by ROI row j and zeros elsewhere, so each populated column sums
//! to one and projects to a plain average.
//!
//! An ROI row that matches no channel yields an all-zero column. That is a
//! degenerate average, not an error: downstream values for that row come out
//! as zero or NaN.

use nalgebra::DMatrix;

use optode_core::probe::{ChannelProbe, RoiProbe, SignalType};

/// Indices of channel-probe rows matching any of the given source-detector
/// pairs at the given signal type.
///
/// Matching is exact on source and detector ids and case-insensitive on the
/// type label, with union semantics across the pair list.
#[must_use]
pub fn channel_indices(
    probe: &ChannelProbe,
    sources: &[u32],
    detectors: &[u32],
    signal_type: &SignalType,
) -> Vec<usize> {
    probe
        .channels()
        .iter()
        .enumerate()
        .filter(|(_, ch)| {
            ch.signal_type == *signal_type
                && sources
                    .iter()
                    .zip(detectors.iter())
                    .any(|(&s, &d)| ch.source == s && ch.detector == d)
        })
        .map(|(index, _)| index)
        .collect()
}

/// Build the (#channels x #ROI-rows) averaging matrix.
#[must_use]
pub fn build_projection(probe: &ChannelProbe, roi_probe: &RoiProbe) -> DMatrix<f64> {
    let mut projection = DMatrix::zeros(probe.len(), roi_probe.len());

    for (col, row) in roi_probe.rows().iter().enumerate() {
        let matched = channel_indices(probe, &row.sources, &row.detectors, &row.signal_type);
        if matched.is_empty() {
            continue;
        }
        let weight = 1.0 / matched.len() as f64;
        for index in matched {
            projection[(index, col)] = weight;
        }
    }

    projection
}

// ============================================================================
// Tests
// ============================================================================
