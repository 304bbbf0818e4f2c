//! Integer-path coordinates, tagged to the handle that minted them.
//!
//! A coordinate is only meaningful against one specific manifold handle;
//! the tag is checked on every use, so a coordinate minted by one view can
//! never silently address another. `LeafCoordinate` and `StemCoordinate`
//! commit to a coordinate kind up front and fail fast on mismatch.

use std::{
    fmt,
    ops::Deref,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    base::ManifoldBase,
    error::{ManifoldError, ManifoldResult},
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a manifold handle.
///
/// Every root [`crate::Manifold`] and every [`crate::SubManifold`] view gets
/// its own id; ids are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifoldId(u64);

impl ManifoldId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ManifoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// An immutable integer path addressing a location inside one specific
/// manifold handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    manifold: ManifoldId,
    path: Vec<usize>,
}

impl Coordinate {
    pub(crate) fn new(manifold: ManifoldId, path: Vec<usize>) -> Self {
        Self { manifold, path }
    }

    /// Id of the handle this coordinate was minted against.
    #[must_use]
    pub const fn manifold_id(&self) -> ManifoldId {
        self.manifold
    }

    /// The integer path.
    #[must_use]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Length of the path.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.path.len()
    }

    /// New coordinate extending the path, still tagged to the same handle.
    #[must_use]
    pub fn append(&self, values: &[usize]) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + values.len());
        path.extend_from_slice(&self.path);
        path.extend_from_slice(values);
        Self {
            manifold: self.manifold,
            path,
        }
    }

    /// Whether this coordinate is valid against `manifold`: same tag, and
    /// no longer than the manifold's dimension.
    pub fn is_in<T, M>(&self, manifold: &M) -> bool
    where
        T: Clone,
        M: ManifoldBase<T>,
    {
        self.assert_in(manifold).is_ok()
    }

    /// Like [`Coordinate::is_in`], failing with `DimensionMismatch`.
    pub fn assert_in<T, M>(&self, manifold: &M) -> ManifoldResult<()>
    where
        T: Clone,
        M: ManifoldBase<T>,
    {
        let dimension = manifold.dimension()?;
        if self.manifold != manifold.id() || self.dimension() > dimension {
            return Err(ManifoldError::DimensionMismatch {
                expected: dimension,
                actual: self.dimension(),
            });
        }
        Ok(())
    }
}

/// A coordinate proven to address a scalar: its dimension equals the
/// manifold's dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCoordinate(Coordinate);

impl LeafCoordinate {
    /// Check `coordinate` against `manifold`, failing with
    /// `NotALeafCoordinate` when it addresses a nested sub-structure.
    pub fn assert<T, M>(coordinate: Coordinate, manifold: &M) -> ManifoldResult<Self>
    where
        T: Clone,
        M: ManifoldBase<T>,
    {
        coordinate.assert_in(manifold)?;
        let dimension = manifold.dimension()?;
        if coordinate.dimension() != dimension {
            return Err(ManifoldError::NotALeafCoordinate {
                dimension: coordinate.dimension(),
                manifold_dimension: dimension,
            });
        }
        Ok(Self(coordinate))
    }

    /// Unwrap back into the plain coordinate.
    #[must_use]
    pub fn into_inner(self) -> Coordinate {
        self.0
    }
}

impl Deref for LeafCoordinate {
    type Target = Coordinate;

    fn deref(&self) -> &Coordinate {
        &self.0
    }
}

/// A coordinate proven to address a nested sub-structure: its dimension is
/// strictly less than the manifold's dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemCoordinate(Coordinate);

impl StemCoordinate {
    /// Check `coordinate` against `manifold`, failing with
    /// `NotAStemCoordinate` when it addresses a scalar.
    pub fn assert<T, M>(coordinate: Coordinate, manifold: &M) -> ManifoldResult<Self>
    where
        T: Clone,
        M: ManifoldBase<T>,
    {
        coordinate.assert_in(manifold)?;
        let dimension = manifold.dimension()?;
        if coordinate.dimension() >= dimension {
            return Err(ManifoldError::NotAStemCoordinate {
                dimension: coordinate.dimension(),
                manifold_dimension: dimension,
            });
        }
        Ok(Self(coordinate))
    }

    /// Unwrap back into the plain coordinate.
    #[must_use]
    pub fn into_inner(self) -> Coordinate {
        self.0
    }
}

impl Deref for StemCoordinate {
    type Target = Coordinate;

    fn deref(&self) -> &Coordinate {
        &self.0
    }
}
