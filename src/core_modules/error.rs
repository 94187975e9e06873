// THEORY:
// Two things can go wrong while scanning an image. Either the caller asked for
// something that cannot produce a finite, well-formed scan (bad scale, zero stride,
// zero window), or the injected resize capability failed. Parameter problems are
// reported by the constructors before a single element is produced; resize problems
// surface mid-pyramid as the final element of that pyramid.

use thiserror::Error;

/// Error type any resize capability may return.
pub type ResizeError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("resize to {width}x{height} (w x h) failed while building pyramid level {level}")]
    ResizeFailure {
        level: usize,
        width: u32,
        height: u32,
        #[source]
        source: ResizeError,
    },
}

impl ScanError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    pub fn is_resize_failure(&self) -> bool {
        matches!(self, Self::ResizeFailure { .. })
    }
}
