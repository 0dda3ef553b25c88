//! Error types for the triangulation library.
//!
//! The taxonomy keeps the three failure classes distinct: malformed input
//! (rejected before triangulation starts), mesh consistency violations
//! (fatal, the run cannot continue), and runaway legalization (fatal).
//! Degenerate geometry is absorbed by the geometry layer and never
//! surfaces here.

use std::path::PathBuf;

/// Main error type for triangulation operations.
#[derive(Debug, thiserror::Error)]
pub enum TriangulationError {
    /// Configuration rejected before the run started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path of the file being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line of the input file failed to parse.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number in the input file.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A point id was declared more than once.
    #[error("duplicate point id {id} at line {line}")]
    DuplicatePointId {
        /// The repeated id.
        id: i64,
        /// 1-based line number of the second declaration.
        line: usize,
    },

    /// An insertion triple referenced an undeclared point id.
    #[error("unknown point id {id} referenced at line {line}")]
    UnknownPointId {
        /// The unresolved id.
        id: i64,
        /// 1-based line number of the reference.
        line: usize,
    },

    /// An internal mesh invariant was violated; the mesh is corrupt.
    #[error("mesh invariant violated: {0}")]
    MeshInvariant(String),

    /// Point location found no triangle containing an inserted point.
    #[error("no triangle contains point {id} at ({x}, {y})")]
    NoContainingTriangle {
        /// Id of the point being inserted.
        id: i64,
        /// X coordinate of the point.
        x: f64,
        /// Y coordinate of the point.
        y: f64,
    },

    /// Legalization exceeded its conservative step bound.
    #[error("legalization processed {processed} edges, exceeding the bound of {bound}")]
    UnboundedLegalization {
        /// Number of worklist entries processed so far.
        processed: usize,
        /// The bound that was exceeded.
        bound: usize,
    },
}

impl TriangulationError {
    /// True for errors that signal a corrupted mesh or a runaway
    /// algorithm rather than bad input.
    #[must_use]
    pub const fn is_fatal_invariant(&self) -> bool {
        matches!(
            self,
            Self::MeshInvariant(_)
                | Self::NoContainingTriangle { .. }
                | Self::UnboundedLegalization { .. }
        )
    }
}

/// Result type for triangulation operations.
pub type TriangulationResult<T> = Result<T, TriangulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_not_fatal_invariants() {
        let err = TriangulationError::MalformedInput {
            line: 3,
            reason: "expected 3 fields".to_string(),
        };
        assert!(!err.is_fatal_invariant());

        let err = TriangulationError::DuplicatePointId { id: 7, line: 9 };
        assert!(!err.is_fatal_invariant());
    }

    #[test]
    fn mesh_errors_are_fatal_invariants() {
        let err = TriangulationError::MeshInvariant("edge with three triangles".to_string());
        assert!(err.is_fatal_invariant());

        let err = TriangulationError::NoContainingTriangle {
            id: 4,
            x: 1.0,
            y: 2.0,
        };
        assert!(err.is_fatal_invariant());

        let err = TriangulationError::UnboundedLegalization {
            processed: 5000,
            bound: 4096,
        };
        assert!(err.is_fatal_invariant());
    }

    #[test]
    fn display_includes_line_numbers() {
        let err = TriangulationError::MalformedInput {
            line: 12,
            reason: "unparsable coordinate".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed input at line 12: unparsable coordinate"
        );
    }
}
