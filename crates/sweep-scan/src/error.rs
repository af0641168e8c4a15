//! Registration errors.

use std::fmt;

use thiserror::Error;

/// Radius axis named in a [`ScanError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// Reasons a request is rejected at registration. Nothing fails once a step is walking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// The radius exceeds the configured maximum.
    #[error("{axis} radius {radius} exceeds the maximum of {max}")]
    RadiusTooLarge { axis: Axis, radius: u32, max: u32 },
    /// Requests are always measured from the step's observer.
    #[error("requests must be relative to the observer")]
    DetachedRequest,
}
