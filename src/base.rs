// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared manifold contract.
//!
//! [`ManifoldBase`] implements every algorithm once — addressing, mutation,
//! and the functional operations — over three primitives a handle must
//! supply: its identity, the root manifold owning the backing storage, and
//! the absolute path of its region. The root [`Manifold`] and the aliased
//! [`SubManifold`] view both implement it, which declares the mutually
//! recursive relationship between the two types directly.
//!
//! Mutating operations work in place on the shared tree. Functional
//! operations (`map`, `bind`, `traverse`, `join`, `append`) take a snapshot
//! at entry and construct new root manifolds.

use crate::{
    coordinate::{Coordinate, LeafCoordinate, ManifoldId, StemCoordinate},
    error::{ManifoldError, ManifoldResult},
    manifold::Manifold,
    node::Node,
    submanifold::SubManifold,
};

/// Result of a shape-dispatched [`ManifoldBase::get`]: a scalar at a leaf
/// coordinate, an aliased view at a stem coordinate.
#[derive(Debug, Clone)]
pub enum Entry<T> {
    /// The coordinate addressed a scalar.
    Leaf(T),
    /// The coordinate addressed a nested sub-structure.
    Stem(SubManifold<T>),
}

impl<T> Entry<T> {
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    #[must_use]
    pub const fn is_stem(&self) -> bool {
        matches!(self, Self::Stem(_))
    }

    #[must_use]
    pub fn into_leaf(self) -> Option<T> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Stem(_) => None,
        }
    }

    #[must_use]
    pub fn into_stem(self) -> Option<SubManifold<T>> {
        match self {
            Self::Leaf(_) => None,
            Self::Stem(view) => Some(view),
        }
    }
}

/// Shared contract of the root container and its aliased views.
pub trait ManifoldBase<T: Clone>: Sized {
    /// Identity used to tag coordinates minted by this handle.
    fn id(&self) -> ManifoldId;

    /// Root manifold owning the backing storage.
    fn root(&self) -> &Manifold<T>;

    /// Absolute path from the root to this handle's region; empty for the
    /// root itself.
    fn base_path(&self) -> &[usize];

    /// Mint a coordinate tagged to this handle.
    fn coordinate<P: Into<Vec<usize>>>(&self, path: P) -> Coordinate {
        Coordinate::new(self.id(), path.into())
    }

    /// Compose a coordinate local to this handle into an absolute path
    /// from the root.
    fn absolute_path(&self, coordinate: &Coordinate) -> Vec<usize> {
        let mut absolute = self.base_path().to_vec();
        absolute.extend_from_slice(coordinate.path());
        absolute
    }

    /// Nesting depth of the live addressed content, recomputed on every
    /// call. Dimension 0 means the manifold is empty.
    fn dimension(&self) -> ManifoldResult<usize> {
        self.root()
            .read_at(self.base_path(), &[], |node| Ok(node.depth()))
    }

    /// Clone of the live addressed content.
    fn snapshot(&self) -> ManifoldResult<Node<T>> {
        self.root()
            .read_at(self.base_path(), &[], |node| Ok(node.clone()))
    }

    /// Extraction contract: the raw nested-sequence shape, suitable for
    /// consumption or serialization by collaborators.
    fn to_node(&self) -> ManifoldResult<Node<T>> {
        self.snapshot()
    }

    /// Every `(coordinate_path, value)` pair, in coordinate order.
    fn enumerate_leaves(&self) -> ManifoldResult<Vec<(Vec<usize>, T)>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .leaves()
            .map(|(path, value)| (path, value.clone()))
            .collect())
    }

    /// Read the addressed location, deciding leaf vs stem by the shape of
    /// the content — never by annotation.
    fn get(&self, coordinate: &Coordinate) -> ManifoldResult<Entry<T>> {
        coordinate.assert_in(self)?;
        let addressed_branch = self
            .root()
            .read_at(self.base_path(), coordinate.path(), |node| {
                Ok(node.is_branch())
            })?;
        if addressed_branch {
            Ok(Entry::Stem(self.get_stem(coordinate)?))
        } else {
            Ok(Entry::Leaf(self.get_leaf(coordinate)?))
        }
    }

    /// Scalar at a leaf coordinate.
    fn get_leaf(&self, coordinate: &Coordinate) -> ManifoldResult<T> {
        let leaf = LeafCoordinate::assert(coordinate.clone(), self)?;
        self.root()
            .read_at(self.base_path(), leaf.path(), |node| match node {
                Node::Leaf(value) => Ok(value.clone()),
                Node::Branch(_) => Err(ManifoldError::NotALeafCoordinate {
                    dimension: leaf.dimension(),
                    manifold_dimension: leaf.dimension(),
                }),
            })
    }

    /// Write the scalar at a leaf coordinate in place.
    fn set_leaf(&self, coordinate: &Coordinate, value: T) -> ManifoldResult<()> {
        let leaf = LeafCoordinate::assert(coordinate.clone(), self)?;
        self.root()
            .write_at(self.base_path(), leaf.path(), |node| match node {
                Node::Leaf(slot) => {
                    *slot = value;
                    Ok(())
                },
                Node::Branch(_) => Err(ManifoldError::NotALeafCoordinate {
                    dimension: leaf.dimension(),
                    manifold_dimension: leaf.dimension(),
                }),
            })
    }

    /// Aliased view of the region at a stem coordinate.
    fn get_stem(&self, coordinate: &Coordinate) -> ManifoldResult<SubManifold<T>> {
        let stem = StemCoordinate::assert(coordinate.clone(), self)?;
        // The region must exist right now; staleness later is the view's
        // problem.
        self.root()
            .read_at(self.base_path(), stem.path(), |_| Ok(()))?;
        Ok(SubManifold::new(
            self.root().clone(),
            self.id(),
            self.base_path().to_vec(),
            stem.into_inner().path().to_vec(),
        ))
    }

    /// Alias for [`ManifoldBase::get_stem`].
    fn sub_manifold(&self, coordinate: &Coordinate) -> ManifoldResult<SubManifold<T>> {
        self.get_stem(coordinate)
    }

    /// Replace the region at a stem coordinate, shape-preserving.
    ///
    /// NOT transactional: the value's length and the coordinate kind are
    /// validated before commit, but children are grafted one at a time,
    /// each checked against the expected inner shape at graft time. A
    /// mixed-shape value fails partway and leaves the earlier grafts in
    /// place.
    fn set_stem(&self, coordinate: &Coordinate, value: Node<T>) -> ManifoldResult<()> {
        let stem = StemCoordinate::assert(coordinate.clone(), self)?;
        let children = match value {
            Node::Branch(children) => children,
            Node::Leaf(_) => {
                // A bare scalar cannot fill a nested region.
                return Err(ManifoldError::DimensionMismatch {
                    expected: 1,
                    actual: 0,
                });
            },
        };
        let stem_dimension = stem.dimension();
        self.root()
            .write_at(self.base_path(), stem.path(), |region| {
                let slots = match region {
                    Node::Branch(slots) => slots,
                    Node::Leaf(_) => {
                        return Err(ManifoldError::NotAStemCoordinate {
                            dimension: stem_dimension,
                            manifold_dimension: stem_dimension,
                        });
                    },
                };
                if children.len() != slots.len() {
                    return Err(ManifoldError::IrregularStructure {
                        expected: vec![slots.len()],
                        actual: vec![children.len()],
                        depth: stem_dimension,
                    });
                }
                for (slot, child) in slots.iter_mut().zip(children) {
                    let expected = slot.shape()?;
                    let actual = child.shape()?;
                    if actual != expected {
                        return Err(ManifoldError::IrregularStructure {
                            expected,
                            actual,
                            depth: stem_dimension + 1,
                        });
                    }
                    // Committed; a later child failing leaves this in place.
                    *slot = child;
                }
                Ok(())
            })
    }

    /// Write dispatching on the value's shape: a branch goes through
    /// [`ManifoldBase::set_stem`], a scalar through
    /// [`ManifoldBase::set_leaf`].
    fn set(&self, coordinate: &Coordinate, value: Node<T>) -> ManifoldResult<()> {
        match value {
            branch @ Node::Branch(_) => self.set_stem(coordinate, branch),
            Node::Leaf(scalar) => self.set_leaf(coordinate, scalar),
        }
    }

    /// The entire addressed region as one unit.
    fn get_root(&self) -> ManifoldResult<Node<T>> {
        self.snapshot()
    }

    /// Replace the entire addressed region as one unit.
    ///
    /// On the root manifold any regular sequence is accepted (the manifold
    /// may be reshaped). On a view the new content must preserve the
    /// region's shape, or sibling regularity would break.
    fn set_root(&self, value: Node<T>) -> ManifoldResult<()> {
        if value.is_leaf() {
            return Err(ManifoldError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        let new_shape = value.shape()?;
        let reshape_allowed = self.base_path().is_empty();
        self.root().write_at(self.base_path(), &[], move |region| {
            if !reshape_allowed {
                let current = region.shape()?;
                if new_shape != current {
                    return Err(ManifoldError::IrregularStructure {
                        expected: current,
                        actual: new_shape,
                        depth: 0,
                    });
                }
            }
            *region = value;
            Ok(())
        })
    }

    /// Splice out the addressed leaf or stem, shifting later siblings down.
    ///
    /// The regularity precheck runs against the whole tree, so a removal
    /// through a view cannot break an ancestor's shape.
    fn delete(&self, coordinate: &Coordinate) -> ManifoldResult<()> {
        coordinate.assert_in(self)?;
        if coordinate.path().is_empty() {
            return Err(ManifoldError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        let base = self.base_path().to_vec();
        let absolute = self.absolute_path(coordinate);
        self.root().write_tree(|tree| {
            if tree.node_at(&base).is_err() {
                tracing::warn!(path = ?base, "stale sub-manifold view");
                return Err(ManifoldError::InvalidView { path: base.clone() });
            }
            tree.remove_at(&absolute)?;
            Ok(())
        })
    }

    /// One-level left fold over the immediate children, on a snapshot
    /// taken at entry. Children are not flattened.
    fn fold<A, F>(&self, init: A, mut f: F) -> ManifoldResult<A>
    where
        F: FnMut(A, &Node<T>, &[usize], &Self) -> ManifoldResult<A>,
    {
        let snapshot = self.snapshot()?;
        let mut acc = init;
        for (index, child) in snapshot.children().iter().enumerate() {
            acc = f(acc, child, &[index], self)?;
        }
        Ok(acc)
    }

    /// [`ManifoldBase::fold`] starting from the empty manifold.
    fn reduce<F>(&self, mut f: F) -> ManifoldResult<Manifold<T>>
    where
        F: FnMut(Manifold<T>, &Node<T>, &[usize]) -> ManifoldResult<Manifold<T>>,
    {
        self.fold(Manifold::zero(), |acc, child, path, _| f(acc, child, path))
    }

    /// New root manifold whose top-level children are `self ++ other`.
    /// The empty manifold is the identity on either side.
    fn append<M>(&self, other: &M) -> ManifoldResult<Manifold<T>>
    where
        M: ManifoldBase<T>,
    {
        let left = self.snapshot()?;
        let right = other.snapshot()?;
        Manifold::lift(left.append_nodes(&right)?)
    }

    /// Flatten exactly one level: nested children are spliced into the top
    /// level, scalar children are wrapped as singletons first. Implemented
    /// as a reduce whose append step branches on child shape; on a
    /// one-dimensional manifold this is the identity.
    fn join(&self) -> ManifoldResult<Manifold<T>> {
        self.reduce(|acc, child, _| {
            let wrapped = match child {
                branch @ Node::Branch(_) => branch.clone(),
                leaf @ Node::Leaf(_) => Node::Branch(vec![leaf.clone()]),
            };
            acc.append(&Manifold::lift(wrapped)?)
        })
    }

    /// One-level map: rebuild the top level from `f` applied to each
    /// immediate child. May change the element type. Not a deep map — see
    /// [`ManifoldBase::traverse`] for that.
    fn map<U, F>(&self, f: F) -> ManifoldResult<Manifold<U>>
    where
        U: Clone,
        F: FnMut(&Node<T>, &[usize]) -> ManifoldResult<Node<U>>,
    {
        let snapshot = self.snapshot()?;
        Manifold::lift(snapshot.map_children(f)?)
    }

    /// Map then flatten one level, for functions whose results are
    /// themselves nested.
    fn bind<U, F>(&self, f: F) -> ManifoldResult<Manifold<U>>
    where
        U: Clone,
        F: FnMut(&Node<T>, &[usize]) -> ManifoldResult<Node<U>>,
    {
        self.map(f)?.join()
    }

    /// Deep traversal: apply `f` to every scalar, preserving the overall
    /// shape. Visits leaves in coordinate order.
    fn traverse<U, F>(&self, f: F) -> ManifoldResult<Manifold<U>>
    where
        U: Clone,
        F: FnMut(&T, &[usize]) -> ManifoldResult<U>,
    {
        let snapshot = self.snapshot()?;
        Manifold::lift(snapshot.traverse_leaves(f)?)
    }
}
