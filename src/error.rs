// SPDX-License-Identifier: MIT OR Apache-2.0
//! Crate-wide error taxonomy.
//!
//! Every error is raised synchronously at the point the precondition is
//! violated; nothing is retried or recovered internally, and no rollback is
//! provided for compound writes.

use thiserror::Error;

/// Errors for manifold operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifoldError {
    /// Coordinate length incompatible with the manifold it addresses, a
    /// coordinate tagged to a different handle, or an append of manifolds
    /// with differing dimensions.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the operation required.
        expected: usize,
        /// Dimension actually supplied.
        actual: usize,
    },

    /// A leaf-only accessor was given a coordinate that does not address a
    /// scalar.
    #[error("not a leaf coordinate: dimension {dimension} in a manifold of dimension {manifold_dimension}")]
    NotALeafCoordinate {
        /// Dimension of the offending coordinate.
        dimension: usize,
        /// Dimension of the manifold it was used against.
        manifold_dimension: usize,
    },

    /// A stem-only accessor was given a coordinate that does not address a
    /// nested sub-structure.
    #[error("not a stem coordinate: dimension {dimension} in a manifold of dimension {manifold_dimension}")]
    NotAStemCoordinate {
        /// Dimension of the offending coordinate.
        dimension: usize,
        /// Dimension of the manifold it was used against.
        manifold_dimension: usize,
    },

    /// A coordinate value exceeds the bounds of the underlying sequence at
    /// some depth.
    #[error("index {index} out of range at depth {depth}: length is {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the sequence at that depth.
        len: usize,
        /// Nesting depth at which the bound was exceeded.
        depth: usize,
    },

    /// A write or removal would leave sequences of differing shape at the
    /// same nesting depth. Detected before commit for whole-value checks;
    /// see `ManifoldBase::set_stem` for the per-child graft hazard.
    #[error("irregular structure at depth {depth}: expected shape {expected:?}, found {actual:?}")]
    IrregularStructure {
        /// Shape the surrounding structure requires.
        expected: Vec<usize>,
        /// Shape that was found or would be produced.
        actual: Vec<usize>,
        /// Nesting depth of the disagreement.
        depth: usize,
    },

    /// A sub-manifold's addressed region no longer exists in its parent.
    #[error("invalid view: region at {path:?} no longer exists")]
    InvalidView {
        /// Absolute path of the vanished region.
        path: Vec<usize>,
    },
}

/// Result type for manifold operations.
pub type ManifoldResult<T> = Result<T, ManifoldError>;
