//! Error types for the ROI aggregation engine
//!
//! Every failure is reported synchronously as the direct result of the
//! offending call, with no partial mutation: registry mutators are
//! all-or-nothing, and `apply` never alters its input payload.

use std::fmt;

/// Errors from the ROI registry and apply engine.
//
// NOTE: `Display`/`Error` are implemented by hand rather than via
// `thiserror::Error`. `UnknownChannel` carries a field named `source`
// (a source *id*, a `u32`), and `thiserror` unconditionally treats any
// field named `source` as the error's `std::error::Error` source — which
// a `u32` is not. The spec fixes the field name, so the derive cannot be
// used here. The messages below reproduce the intended `#[error(...)]`
// strings exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoiError {
    /// A probe of the wrong flavor was supplied
    ProbeType {
        /// Flavor that was supplied
        got: &'static str,
    },

    /// Operation attempted before required setup
    Precondition {
        /// What was missing
        what: &'static str,
    },

    /// ROI references a source-detector pair absent from the channel probe
    UnknownChannel {
        /// Name of the offending ROI
        roi: String,
        /// Source id not found
        source: u32,
        /// Detector id not found
        detector: u32,
    },

    /// ROI source and detector lists differ in length
    PairedListMismatch {
        /// Name of the offending ROI
        roi: String,
        /// Number of sources given
        sources: usize,
        /// Number of detectors given
        detectors: usize,
    },

    /// ROI name already in use within the registry
    DuplicateName {
        /// The colliding name
        name: String,
    },

    /// Payload's recorded probe differs from the registry's channel probe
    ProbeMismatch,

    /// Payload shape not supported by the engine
    UnsupportedPayload {
        /// Shape name of the offending payload
        kind: &'static str,
    },

    /// Payload internal dimensions disagree with its recorded probe
    ShapeMismatch {
        /// Which dimension is wrong
        what: &'static str,
        /// Dimension implied by the probe
        expected: usize,
        /// Dimension found in the payload
        got: usize,
    },
}

impl fmt::Display for RoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoiError::ProbeType { got } => {
                write!(f, "expected a channel probe, got {got}")
            }
            RoiError::Precondition { what } => {
                write!(f, "precondition not met: {what}")
            }
            RoiError::UnknownChannel {
                roi,
                source,
                detector,
            } => write!(
                f,
                "ROI '{roi}' references unknown channel S{source}D{detector}"
            ),
            RoiError::PairedListMismatch {
                roi,
                sources,
                detectors,
            } => write!(
                f,
                "ROI '{roi}' pairs {sources} sources with {detectors} detectors"
            ),
            RoiError::DuplicateName { name } => {
                write!(f, "ROI name '{name}' already in use")
            }
            RoiError::ProbeMismatch => {
                write!(f, "payload probe does not match the registry channel probe")
            }
            RoiError::UnsupportedPayload { kind } => {
                write!(f, "unsupported payload kind: {kind}")
            }
            RoiError::ShapeMismatch {
                what,
                expected,
                got,
            } => write!(f, "{what}: expected {expected}, got {got}"),
        }
    }
}

impl std::error::Error for RoiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoiError::UnknownChannel {
            roi: "L1".into(),
            source: 4,
            detector: 7,
        };
        assert_eq!(
            err.to_string(),
            "ROI 'L1' references unknown channel S4D7"
        );

        let err = RoiError::DuplicateName { name: "L1".into() };
        assert_eq!(err.to_string(), "ROI name 'L1' already in use");
    }
}
