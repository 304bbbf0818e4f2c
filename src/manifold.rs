// SPDX-License-Identifier: MIT OR Apache-2.0
//! Root container owning the backing tree.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    base::ManifoldBase,
    coordinate::ManifoldId,
    error::{ManifoldError, ManifoldResult},
    node::Node,
};

/// The owning n-dimensional recursive container.
///
/// A `Manifold` is a handle onto a shared tree: cloning it shares the
/// backing storage, and every [`crate::SubManifold`] carved out of it
/// aliases the same tree. Writes through any alias are immediately visible
/// through all others; a view is never a snapshot.
///
/// Structural regularity — all sequences at the same nesting depth have
/// equal length — is enforced eagerly: every constructor and mutation
/// validates what it writes.
#[derive(Debug)]
pub struct Manifold<T> {
    tree: Arc<RwLock<Node<T>>>,
    id: ManifoldId,
}

impl<T> Clone for Manifold<T> {
    /// Clones share the backing storage and the handle identity.
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            id: self.id,
        }
    }
}

impl<T: Clone> Manifold<T> {
    fn from_node(node: Node<T>) -> Self {
        Self {
            tree: Arc::new(RwLock::new(node)),
            id: ManifoldId::next(),
        }
    }

    /// New empty manifold; `dimension() == 0`.
    #[must_use]
    pub fn zero() -> Self {
        Self::from_node(Node::Branch(Vec::new()))
    }

    /// Wrap raw nested content as a manifold, validating regularity.
    ///
    /// A bare scalar is wrapped as the singleton sequence `[x]`; jagged
    /// input fails with `IrregularStructure`.
    pub fn lift(node: Node<T>) -> ManifoldResult<Self> {
        let node = match node {
            leaf @ Node::Leaf(_) => Node::Branch(vec![leaf]),
            branch => branch,
        };
        node.shape()?;
        Ok(Self::from_node(node))
    }

    /// One-dimensional manifold from a sequence of scalars.
    #[must_use]
    pub fn from_vec(values: Vec<T>) -> Self {
        Self::from_node(Node::row(values))
    }

    /// Two-dimensional manifold from rows, validating regularity.
    pub fn from_grid(rows: Vec<Vec<T>>) -> ManifoldResult<Self> {
        Self::lift(Node::grid(rows))
    }

    /// Read the node at `base` (a view's region), then at `local` below it.
    ///
    /// Failure to resolve `base` means the view's region vanished and maps
    /// to `InvalidView`; failures below keep their own error kinds.
    pub(crate) fn read_at<R>(
        &self,
        base: &[usize],
        local: &[usize],
        f: impl FnOnce(&Node<T>) -> ManifoldResult<R>,
    ) -> ManifoldResult<R> {
        let tree = self.tree.read();
        let region = match tree.node_at(base) {
            Ok(region) => region,
            Err(_) => {
                tracing::warn!(path = ?base, "stale sub-manifold view");
                return Err(ManifoldError::InvalidView {
                    path: base.to_vec(),
                });
            },
        };
        f(region.node_at(local)?)
    }

    /// Mutable variant of [`Manifold::read_at`].
    pub(crate) fn write_at<R>(
        &self,
        base: &[usize],
        local: &[usize],
        f: impl FnOnce(&mut Node<T>) -> ManifoldResult<R>,
    ) -> ManifoldResult<R> {
        let mut tree = self.tree.write();
        let region = match tree.node_at_mut(base) {
            Ok(region) => region,
            Err(_) => {
                tracing::warn!(path = ?base, "stale sub-manifold view");
                return Err(ManifoldError::InvalidView {
                    path: base.to_vec(),
                });
            },
        };
        f(region.node_at_mut(local)?)
    }

    /// Exclusive access to the whole tree, for operations whose validity
    /// depends on more than one region (deletion's regularity precheck).
    pub(crate) fn write_tree<R>(
        &self,
        f: impl FnOnce(&mut Node<T>) -> ManifoldResult<R>,
    ) -> ManifoldResult<R> {
        f(&mut self.tree.write())
    }
}

impl<T: Clone> ManifoldBase<T> for Manifold<T> {
    fn id(&self) -> ManifoldId {
        self.id
    }

    fn root(&self) -> &Manifold<T> {
        self
    }

    fn base_path(&self) -> &[usize] {
        &[]
    }
}

impl<T: Clone + PartialEq> PartialEq for Manifold<T> {
    /// Compares live content; two handles over the same storage are always
    /// equal.
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.tree, &other.tree) {
            return true;
        }
        *self.tree.read() == *other.tree.read()
    }
}

impl<T: Clone> Default for Manifold<T> {
    fn default() -> Self {
        Self::zero()
    }
}
