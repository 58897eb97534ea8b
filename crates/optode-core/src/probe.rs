//! Probe geometry types
//!
//! A probe describes the measurement layout of an fNIRS recording as a link
//! table. Two flavors exist:
//!
//! - [`ChannelProbe`]: one row per measurement channel, i.e. one
//!   (source, detector, signal type) triple
//! - [`RoiProbe`]: one row per region of interest and signal type, where each
//!   row groups several source-detector pairs under a name
//!
//! Both are plain value types with value equality. Hyperscan (dual-subject)
//! layouts tag each row with the subject it belongs to.

use serde::{Deserialize, Serialize};

// ============================================================================
// Signal Types
// ============================================================================

/// Signal type label for a channel (e.g. `"hbo"`, `"hbr"`, `"760nm"`).
///
/// Labels are normalized to ASCII lowercase at construction, so equality and
/// hashing are case-insensitive: `SignalType::new("HbO") == SignalType::new("hbo")`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalType(String);

impl SignalType {
    /// Create a signal type from a label, normalizing case.
    #[must_use]
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().to_ascii_lowercase())
    }

    /// Get the normalized label.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SignalType {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl core::fmt::Display for SignalType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Hyperscan Tags
// ============================================================================

/// Subject tag for hyperscan (dual-subject) probe layouts.
///
/// A hyperscan probe covers two simultaneously recorded subjects sharing one
/// channel-numbering scheme, with subject B's source/detector ids offset from
/// subject A's by a constant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HyperscanTag {
    /// First subject
    A,
    /// Second subject
    B,
}

impl HyperscanTag {
    /// Get the tag name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

// ============================================================================
// Channel Probe
// ============================================================================

/// One measurement channel: a source-detector pair at a signal type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    /// Source id (positive)
    pub source: u32,
    /// Detector id (positive)
    pub detector: u32,
    /// Signal type of this channel
    pub signal_type: SignalType,
    /// Subject tag for hyperscan layouts, `None` otherwise
    pub hyperscan: Option<HyperscanTag>,
}

impl Channel {
    /// Create a single-subject channel.
    #[must_use]
    pub fn new(source: u32, detector: u32, signal_type: impl Into<SignalType>) -> Self {
        Self {
            source,
            detector,
            signal_type: signal_type.into(),
            hyperscan: None,
        }
    }

    /// Create a hyperscan-tagged channel.
    #[must_use]
    pub fn tagged(
        source: u32,
        detector: u32,
        signal_type: impl Into<SignalType>,
        tag: HyperscanTag,
    ) -> Self {
        Self {
            source,
            detector,
            signal_type: signal_type.into(),
            hyperscan: Some(tag),
        }
    }
}

/// Channel-level probe: an ordered link table of measurement channels.
///
/// Row order is significant: payload column order follows link row order.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelProbe {
    link: Vec<Channel>,
}

impl ChannelProbe {
    /// Create a probe from its link table rows.
    #[must_use]
    pub fn new(link: Vec<Channel>) -> Self {
        Self { link }
    }

    /// Number of channels (link rows).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.link.len()
    }

    /// Check whether the probe has no channels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.link.is_empty()
    }

    /// The link table rows, in order.
    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.link
    }

    /// Distinct signal types, in order of first appearance.
    #[must_use]
    pub fn distinct_types(&self) -> Vec<SignalType> {
        let mut types: Vec<SignalType> = Vec::new();
        for ch in &self.link {
            if !types.contains(&ch.signal_type) {
                types.push(ch.signal_type.clone());
            }
        }
        types
    }

    /// Check whether any row carries a hyperscan tag.
    #[must_use]
    pub fn is_hyperscan(&self) -> bool {
        self.link.iter().any(|ch| ch.hyperscan.is_some())
    }

    /// Check whether a (source, detector) pair exists at any signal type.
    #[must_use]
    pub fn contains_pair(&self, source: u32, detector: u32) -> bool {
        self.link
            .iter()
            .any(|ch| ch.source == source && ch.detector == detector)
    }

    /// Minimum source and detector ids among rows with the given tag.
    ///
    /// Returns `None` if no row carries the tag.
    #[must_use]
    pub fn min_ids_for_tag(&self, tag: HyperscanTag) -> Option<(u32, u32)> {
        let mut min_source: Option<u32> = None;
        let mut min_detector: Option<u32> = None;
        for ch in self.link.iter().filter(|ch| ch.hyperscan == Some(tag)) {
            min_source = Some(min_source.map_or(ch.source, |m| m.min(ch.source)));
            min_detector = Some(min_detector.map_or(ch.detector, |m| m.min(ch.detector)));
        }
        Some((min_source?, min_detector?))
    }
}

// ============================================================================
// ROI Probe
// ============================================================================

/// One ROI-probe link row: a named group of source-detector pairs at a
/// signal type.
///
/// `sources` and `detectors` have the same length and are paired
/// positionally: the i-th pair is `(sources[i], detectors[i])`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiLinkRow {
    /// Source ids of the grouped pairs
    pub sources: Vec<u32>,
    /// Detector ids of the grouped pairs
    pub detectors: Vec<u32>,
    /// Signal type of this row
    pub signal_type: SignalType,
    /// ROI name
    pub name: String,
    /// Subject tag for hyperscan layouts, `None` otherwise
    pub hyperscan: Option<HyperscanTag>,
}

/// ROI-level probe derived from a [`ChannelProbe`] and a set of ROIs.
///
/// Rows are ordered ROI-major: each ROI appears once per distinct signal
/// type of the originating channel probe. For hyperscan layouts the whole
/// block appears twice, subject A first, then subject B with shifted ids.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoiProbe {
    link: Vec<RoiLinkRow>,
}

impl RoiProbe {
    /// Create an ROI probe from its link table rows.
    #[must_use]
    pub fn new(link: Vec<RoiLinkRow>) -> Self {
        Self { link }
    }

    /// Number of link rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.link.len()
    }

    /// Check whether the probe has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.link.is_empty()
    }

    /// The link table rows, in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[RoiLinkRow] {
        &self.link
    }
}

// ============================================================================
// Probe Sum Type
// ============================================================================

/// A probe of either flavor, as recorded on payloads.
///
/// Payloads enter the ROI engine with a [`Probe::Channel`] and leave with a
/// [`Probe::Roi`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Probe {
    /// Channel-level probe
    Channel(ChannelProbe),
    /// ROI-level probe
    Roi(RoiProbe),
}

impl Probe {
    /// Flavor name, for error messages.
    #[inline]
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Channel(_) => "channel probe",
            Self::Roi(_) => "ROI probe",
        }
    }

    /// Number of link rows, either flavor.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Channel(p) => p.len(),
            Self::Roi(p) => p.len(),
        }
    }

    /// Check whether the link table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_type_case_insensitive() {
        assert_eq!(SignalType::new("HbO"), SignalType::new("hbo"));
        assert_eq!(SignalType::new("HBR").as_str(), "hbr");
    }

    #[test]
    fn test_distinct_types_first_appearance_order() {
        let probe = ChannelProbe::new(vec![
            Channel::new(1, 1, "hbr"),
            Channel::new(1, 1, "hbo"),
            Channel::new(1, 2, "HBR"),
        ]);
        let types = probe.distinct_types();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].as_str(), "hbr");
        assert_eq!(types[1].as_str(), "hbo");
    }

    #[test]
    fn test_contains_pair_any_type() {
        let probe = ChannelProbe::new(vec![
            Channel::new(1, 1, "hbo"),
            Channel::new(2, 3, "hbr"),
        ]);
        assert!(probe.contains_pair(2, 3));
        assert!(!probe.contains_pair(3, 2));
    }

    #[test]
    fn test_min_ids_for_tag() {
        let probe = ChannelProbe::new(vec![
            Channel::tagged(1, 2, "hbo", HyperscanTag::A),
            Channel::tagged(3, 1, "hbo", HyperscanTag::A),
            Channel::tagged(11, 12, "hbo", HyperscanTag::B),
            Channel::tagged(13, 11, "hbo", HyperscanTag::B),
        ]);
        assert_eq!(probe.min_ids_for_tag(HyperscanTag::A), Some((1, 1)));
        assert_eq!(probe.min_ids_for_tag(HyperscanTag::B), Some((11, 11)));
        assert!(probe.is_hyperscan());
    }

    #[test]
    fn test_untagged_probe_is_not_hyperscan() {
        let probe = ChannelProbe::new(vec![Channel::new(1, 1, "hbo")]);
        assert!(!probe.is_hyperscan());
        assert_eq!(probe.min_ids_for_tag(HyperscanTag::A), None);
    }

    #[test]
    fn test_probe_value_equality() {
        let a = ChannelProbe::new(vec![Channel::new(1, 1, "hbo")]);
        let b = ChannelProbe::new(vec![Channel::new(1, 1, "HBO")]);
        assert_eq!(Probe::Channel(a), Probe::Channel(b));
    }

    #[test]
    fn test_probe_serde_round_trip() {
        let probe = Probe::Channel(ChannelProbe::new(vec![
            Channel::new(1, 1, "hbo"),
            Channel::tagged(2, 2, "hbr", HyperscanTag::B),
        ]));
        let json = serde_json::to_string(&probe).unwrap();
        let back: Probe = serde_json::from_str(&json).unwrap();
        assert_eq!(probe, back);
    }
}
