//! Domain errors for the legacy PolyData codec
//!
//! Everything public returns an [anyhow::Result], but the failures that are
//! part of the file format contract are raised as a [PolyDataError] so they can
//! be recovered with `downcast_ref` and matched on.
//!
//! ```rust
//! # use vtkpoly::error::PolyDataError;
//! let error = anyhow::Error::new(PolyDataError::UnsupportedCellKind { tag: 7 });
//! assert!(matches!(
//!     error.downcast_ref::<PolyDataError>(),
//!     Some(PolyDataError::UnsupportedCellKind { tag: 7 })
//! ));
//! ```

// internal modules
use crate::mesh::{ComponentType, PixelKind};

// standard library
use std::path::PathBuf;

// external crates
use thiserror::Error;

/// Failures defined by the legacy PolyData grammar
#[derive(Debug, Error)]
pub enum PolyDataError {
    /// A connectivity record carries a kind tag outside of the four known kinds
    #[error("unsupported cell kind tag {tag}, expected VERTEX (0), TRIANGLE (2), POLYGON (4) or POLYLINE (9)")]
    UnsupportedCellKind {
        /// The offending tag value
        tag: u32,
    },

    /// A required line or payload is missing or does not match the grammar
    #[error("malformed {section} section: {reason}")]
    MalformedSection {
        /// Keyword of the section being read
        section: String,
        /// What was wrong with it
        reason: String,
    },

    /// The declared pixel kind has no keyword in the legacy format
    #[error("unknown {context} pixel type {pixel:?}")]
    UnknownPixelKind {
        /// Either "point" or "cell"
        context: &'static str,
        /// The pixel kind that could not be written
        pixel: PixelKind,
    },

    /// A caller buffer does not match the counts declared for it
    #[error("{what} buffer holds {actual} values, expected {expected}")]
    SizeMismatch {
        /// Buffer description
        what: &'static str,
        /// Length implied by the declared counts
        expected: usize,
        /// Length actually provided
        actual: usize,
    },

    /// A binary block declared a different element type than the caller buffer
    #[error("{section} data is declared as {declared} but the buffer holds {requested}")]
    TypeMismatch {
        /// Keyword of the section being read
        section: String,
        /// Element type written in the file
        declared: ComponentType,
        /// Element type of the caller buffer
        requested: ComponentType,
    },

    /// The preamble does not describe a legacy PolyData file
    #[error("{path} is not a legacy VTK PolyData file: {reason}")]
    UnsupportedFile {
        /// File that was opened
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },
}

impl PolyDataError {
    /// Shorthand for a [PolyDataError::MalformedSection]
    pub fn malformed(section: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSection {
            section: section.to_string(),
            reason: reason.into(),
        }
    }
}
