//! ROI registry
//!
//! Holds the immutable channel probe and the user-built list of named ROIs,
//! and derives the ROI probe from them on demand. The registry has exactly
//! two states: unconfigured (no channel probe) and configured (probe set,
//! zero or more ROIs). [`RoiRegistry::reset`] is the only way back to
//! unconfigured.
//!
//! Derivations are pure functions of the registry snapshot; nothing is
//! cached. When shared across threads the registry must be externally
//! synchronized (one exclusive lock around mutators and reads).

use serde::{Deserialize, Serialize};

use optode_core::probe::{ChannelProbe, HyperscanTag, Probe, RoiLinkRow, RoiProbe, SignalType};

use crate::error::RoiError;

// ============================================================================
// ROI Specification
// ============================================================================

/// A requested ROI: paired source/detector lists and an optional name.
///
/// Unnamed specs are assigned `"ROI {index}"` when added, indexed 1-based
/// over the registry's insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiSpec {
    /// Source ids, paired positionally with `detectors`
    pub sources: Vec<u32>,
    /// Detector ids, paired positionally with `sources`
    pub detectors: Vec<u32>,
    /// Optional ROI name
    pub name: Option<String>,
}

impl RoiSpec {
    /// Create a spec from source and detector lists.
    #[must_use]
    pub fn new(sources: impl Into<Vec<u32>>, detectors: impl Into<Vec<u32>>) -> Self {
        Self {
            sources: sources.into(),
            detectors: detectors.into(),
            name: None,
        }
    }

    /// Create a spec from a single source-detector pair.
    #[must_use]
    pub fn single(source: u32, detector: u32) -> Self {
        Self::new(vec![source], vec![detector])
    }

    /// Set the ROI name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A validated ROI held by the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    /// Source ids, paired positionally with `detectors`
    pub sources: Vec<u32>,
    /// Detector ids, paired positionally with `sources`
    pub detectors: Vec<u32>,
    /// Unique ROI name
    pub name: String,
}

// ============================================================================
// Registry
// ============================================================================

/// Registry of ROIs over a channel probe.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoiRegistry {
    probe: Option<ChannelProbe>,
    rois: Vec<Roi>,
}

impl RoiRegistry {
    /// Create an unconfigured registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the channel probe.
    ///
    /// Accepts only the channel flavor of [`Probe`]. Once a probe is set it
    /// cannot be replaced by a different one: call [`reset`](Self::reset)
    /// first. Re-setting a value-equal probe is a no-op.
    pub fn set_channel_probe(&mut self, probe: Probe) -> Result<(), RoiError> {
        let channel_probe = match probe {
            Probe::Channel(p) => p,
            other => {
                return Err(RoiError::ProbeType {
                    got: other.kind_name(),
                })
            }
        };

        if let Some(existing) = &self.probe {
            if *existing != channel_probe {
                return Err(RoiError::Precondition {
                    what: "registry already holds a different channel probe; call reset() first",
                });
            }
            return Ok(());
        }

        tracing::debug!(channels = channel_probe.len(), "channel probe set");
        self.probe = Some(channel_probe);
        Ok(())
    }

    /// Add one ROI.
    ///
    /// Validates that the probe is set, that source and detector lists pair
    /// up, that every pair exists in the channel probe at some signal type,
    /// and that the name (given or auto-generated) is unused. On failure
    /// nothing is appended.
    pub fn add_roi(&mut self, spec: RoiSpec) -> Result<(), RoiError> {
        self.add_rois(vec![spec])
    }

    /// Add a batch of ROIs, all-or-nothing.
    ///
    /// Either every spec validates and all are appended in order, or none
    /// are.
    pub fn add_rois(&mut self, specs: Vec<RoiSpec>) -> Result<(), RoiError> {
        let probe = self.probe.as_ref().ok_or(RoiError::Precondition {
            what: "channel probe not set",
        })?;

        let mut validated = Vec::with_capacity(specs.len());
        for (offset, spec) in specs.into_iter().enumerate() {
            let name = match spec.name {
                Some(name) => name,
                None => format!("ROI {}", self.rois.len() + offset + 1),
            };

            if spec.sources.len() != spec.detectors.len() {
                return Err(RoiError::PairedListMismatch {
                    roi: name,
                    sources: spec.sources.len(),
                    detectors: spec.detectors.len(),
                });
            }

            for (&source, &detector) in spec.sources.iter().zip(spec.detectors.iter()) {
                if !probe.contains_pair(source, detector) {
                    return Err(RoiError::UnknownChannel {
                        roi: name,
                        source,
                        detector,
                    });
                }
            }

            if self
                .rois
                .iter()
                .chain(validated.iter())
                .any(|r| r.name == name)
            {
                return Err(RoiError::DuplicateName { name });
            }

            validated.push(Roi {
                sources: spec.sources,
                detectors: spec.detectors,
                name,
            });
        }

        tracing::debug!(added = validated.len(), total = self.rois.len() + validated.len(), "ROIs added");
        self.rois.append(&mut validated);
        Ok(())
    }

    /// Clear the probe and ROI list. Idempotent.
    pub fn reset(&mut self) {
        tracing::debug!("registry reset");
        self.probe = None;
        self.rois.clear();
    }

    /// The channel probe, if configured.
    #[inline]
    #[must_use]
    pub fn channel_probe(&self) -> Option<&ChannelProbe> {
        self.probe.as_ref()
    }

    /// The ROIs added so far, in insertion order.
    #[inline]
    #[must_use]
    pub fn rois(&self) -> &[Roi] {
        &self.rois
    }

    /// Derive the ROI probe from the current snapshot.
    ///
    /// Rows are the ROIs (insertion order) crossed with the distinct signal
    /// types of the channel probe (first-appearance order). Hyperscan probes
    /// emit the whole block twice: subject A with the ids as given, then
    /// subject B with ids shifted by the offset between the two subjects'
    /// minimum source and detector ids.
    ///
    /// Returns `None` while unconfigured.
    #[must_use]
    pub fn roi_probe(&self) -> Option<RoiProbe> {
        let probe = self.probe.as_ref()?;
        let types = probe.distinct_types();

        let mut link = Vec::new();
        match hyperscan_offsets(probe) {
            None => {
                self.push_block(&mut link, &types, None, 0, 0);
            }
            Some((source_offset, detector_offset)) => {
                self.push_block(&mut link, &types, Some(HyperscanTag::A), 0, 0);
                self.push_block(
                    &mut link,
                    &types,
                    Some(HyperscanTag::B),
                    source_offset,
                    detector_offset,
                );
            }
        }

        Some(RoiProbe::new(link))
    }

    fn push_block(
        &self,
        link: &mut Vec<RoiLinkRow>,
        types: &[SignalType],
        tag: Option<HyperscanTag>,
        source_offset: i64,
        detector_offset: i64,
    ) {
        for roi in &self.rois {
            for signal_type in types {
                link.push(RoiLinkRow {
                    sources: roi.sources.iter().map(|&id| shift_id(id, source_offset)).collect(),
                    detectors: roi
                        .detectors
                        .iter()
                        .map(|&id| shift_id(id, detector_offset))
                        .collect(),
                    signal_type: signal_type.clone(),
                    name: roi.name.clone(),
                    hyperscan: tag,
                });
            }
        }
    }
}

/// Source and detector id offsets from the subject-A block to the subject-B
/// block, or `None` when the probe is not a hyperscan layout.
///
/// The offset is the difference of the minimum ids within each tagged block.
/// A probe missing either tag is treated as not hyperscan.
fn hyperscan_offsets(probe: &ChannelProbe) -> Option<(i64, i64)> {
    let (a_source, a_detector) = probe.min_ids_for_tag(HyperscanTag::A)?;
    let (b_source, b_detector) = probe.min_ids_for_tag(HyperscanTag::B)?;
    Some((
        i64::from(b_source) - i64::from(a_source),
        i64::from(b_detector) - i64::from(a_detector),
    ))
}

fn shift_id(id: u32, offset: i64) -> u32 {
    (i64::from(id) + offset).max(0) as u32
}

// ============================================================================
// Tests
// ============================================================================
