// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tagged tree backing every manifold.
//!
//! The untyped ancestor of this design decided "nested sequence or scalar"
//! with a runtime array-ness check. Here that becomes an explicit tagged
//! variant: a [`Node`] is either a `Leaf` scalar or a `Branch` of child
//! nodes, so the question is never ambiguous even when the element type
//! itself happens to be sequence-like.
//!
//! This module also carries the low-level counterparts of the shared
//! manifold algorithms (`fold_children`, `map_children`, `join_once`,
//! `traverse_leaves`, `append_nodes`). They operate directly on the raw
//! tree; the trait-level forms in [`crate::base`] are built on them and must
//! stay observably equivalent.

use serde::{Deserialize, Serialize};

use crate::error::{ManifoldError, ManifoldResult};

/// A single cell of the nested structure: a scalar, or a sequence of
/// equal-shaped children.
///
/// `Node<T>` is both the construction input and the extraction output of a
/// manifold — the "raw nested sequence" contract consumed by collaborators.
/// It serializes with serde for exactly that reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node<T> {
    /// A scalar value.
    Leaf(T),
    /// A sequence of nodes one level further down.
    Branch(Vec<Node<T>>),
}

impl<T> Node<T> {
    /// Wrap a scalar.
    pub fn leaf(value: T) -> Self {
        Self::Leaf(value)
    }

    /// Wrap a sequence of child nodes.
    pub fn branch(children: Vec<Node<T>>) -> Self {
        Self::Branch(children)
    }

    /// One-dimensional content: a sequence of scalars.
    pub fn row(values: Vec<T>) -> Self {
        Self::Branch(values.into_iter().map(Self::Leaf).collect())
    }

    /// Two-dimensional content: a sequence of rows. Regularity is not
    /// checked here; [`crate::Manifold::lift`] validates on construction.
    pub fn grid(rows: Vec<Vec<T>>) -> Self {
        Self::Branch(rows.into_iter().map(Self::row).collect())
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    /// Immediate children. A leaf has none.
    #[must_use]
    pub fn children(&self) -> &[Node<T>] {
        match self {
            Self::Leaf(_) => &[],
            Self::Branch(children) => children,
        }
    }

    /// Number of immediate children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Nesting depth, counted down the first-element spine.
    ///
    /// A leaf is depth 0. An empty branch terminates the descent and
    /// contributes nothing, so `depth(Branch([])) == 0` — the empty manifold
    /// has dimension 0, and empty sequences below the top make the reported
    /// depth a lower bound (there is nothing left to descend).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Branch(children) => match children.first() {
                Some(first) => 1 + first.depth(),
                None => 0,
            },
        }
    }

    /// Per-level lengths of a regular tree.
    ///
    /// Fails with `IrregularStructure` as soon as two siblings at any depth
    /// disagree in shape. This is the regularity oracle every mutation
    /// consults before committing.
    pub fn shape(&self) -> ManifoldResult<Vec<usize>> {
        self.shape_at(0)
    }

    fn shape_at(&self, depth: usize) -> ManifoldResult<Vec<usize>> {
        match self {
            Self::Leaf(_) => Ok(Vec::new()),
            Self::Branch(children) => {
                let Some((first, rest)) = children.split_first() else {
                    return Ok(vec![0]);
                };
                let inner = first.shape_at(depth + 1)?;
                for sibling in rest {
                    let other = sibling.shape_at(depth + 1)?;
                    if other != inner {
                        return Err(ManifoldError::IrregularStructure {
                            expected: inner,
                            actual: other,
                            depth: depth + 1,
                        });
                    }
                }
                let mut shape = Vec::with_capacity(inner.len() + 1);
                shape.push(children.len());
                shape.extend(inner);
                Ok(shape)
            },
        }
    }

    /// Descend by integer path.
    ///
    /// `IndexOutOfRange` when an index exceeds a branch; `DimensionMismatch`
    /// when the path tries to descend through a leaf.
    pub fn node_at(&self, path: &[usize]) -> ManifoldResult<&Node<T>> {
        let mut current = self;
        for (depth, &index) in path.iter().enumerate() {
            match current {
                Self::Leaf(_) => {
                    return Err(ManifoldError::DimensionMismatch {
                        expected: depth,
                        actual: path.len(),
                    });
                },
                Self::Branch(children) => {
                    let len = children.len();
                    current = children
                        .get(index)
                        .ok_or(ManifoldError::IndexOutOfRange { index, len, depth })?;
                },
            }
        }
        Ok(current)
    }

    /// Mutable variant of [`Node::node_at`].
    pub fn node_at_mut(&mut self, path: &[usize]) -> ManifoldResult<&mut Node<T>> {
        let mut current = self;
        for (depth, &index) in path.iter().enumerate() {
            match current {
                Self::Leaf(_) => {
                    return Err(ManifoldError::DimensionMismatch {
                        expected: depth,
                        actual: path.len(),
                    });
                },
                Self::Branch(children) => {
                    let len = children.len();
                    current = children
                        .get_mut(index)
                        .ok_or(ManifoldError::IndexOutOfRange { index, len, depth })?;
                },
            }
        }
        Ok(current)
    }

    /// Splice out the node at `path`, shifting later siblings down.
    ///
    /// Removal is rejected with `IrregularStructure` *before any mutation*
    /// when shortening one branch would leave siblings at the same depth
    /// with a different length — allowed exactly when the shortened branch
    /// is the only branch at its depth.
    pub fn remove_at(&mut self, path: &[usize]) -> ManifoldResult<Node<T>> {
        let Some((&last, parent_path)) = path.split_last() else {
            return Err(ManifoldError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        };

        let shape = self.shape()?;
        let parent_depth = parent_path.len();
        let branches_at_depth: usize = shape[..parent_depth.min(shape.len())].iter().product();

        let parent = self.node_at_mut(parent_path)?;
        let children = match parent {
            Self::Leaf(_) => {
                return Err(ManifoldError::DimensionMismatch {
                    expected: parent_depth,
                    actual: path.len(),
                });
            },
            Self::Branch(children) => children,
        };
        if last >= children.len() {
            return Err(ManifoldError::IndexOutOfRange {
                index: last,
                len: children.len(),
                depth: parent_depth,
            });
        }
        if branches_at_depth > 1 {
            let mut after = shape.clone();
            after[parent_depth] -= 1;
            return Err(ManifoldError::IrregularStructure {
                expected: shape,
                actual: after,
                depth: parent_depth,
            });
        }
        Ok(children.remove(last))
    }

    /// One-level left fold over the immediate children. Children are not
    /// flattened; this is the shallow building block of the recursive
    /// operations.
    pub fn fold_children<A, F>(&self, init: A, mut f: F) -> ManifoldResult<A>
    where
        F: FnMut(A, &Node<T>, &[usize]) -> ManifoldResult<A>,
    {
        let mut acc = init;
        for (index, child) in self.children().iter().enumerate() {
            acc = f(acc, child, &[index])?;
        }
        Ok(acc)
    }

    /// One-level map over the immediate children.
    pub fn map_children<U, F>(&self, mut f: F) -> ManifoldResult<Node<U>>
    where
        F: FnMut(&Node<T>, &[usize]) -> ManifoldResult<Node<U>>,
    {
        let mut mapped = Vec::with_capacity(self.child_count());
        for (index, child) in self.children().iter().enumerate() {
            mapped.push(f(child, &[index])?);
        }
        Ok(Node::Branch(mapped))
    }

    /// Deep traversal: recurse into nested children, apply `f` at every
    /// scalar, preserve the overall shape. Visits leaves in coordinate
    /// order.
    pub fn traverse_leaves<U, F>(&self, mut f: F) -> ManifoldResult<Node<U>>
    where
        F: FnMut(&T, &[usize]) -> ManifoldResult<U>,
    {
        let mut path = Vec::new();
        self.traverse_inner(&mut path, &mut f)
    }

    fn traverse_inner<U, F>(&self, path: &mut Vec<usize>, f: &mut F) -> ManifoldResult<Node<U>>
    where
        F: FnMut(&T, &[usize]) -> ManifoldResult<U>,
    {
        match self {
            Self::Leaf(value) => Ok(Node::Leaf(f(value, path)?)),
            Self::Branch(children) => {
                let mut out = Vec::with_capacity(children.len());
                for (index, child) in children.iter().enumerate() {
                    path.push(index);
                    let node = child.traverse_inner(path, f);
                    path.pop();
                    out.push(node?);
                }
                Ok(Node::Branch(out))
            },
        }
    }

    /// Iterator over `(coordinate_path, value)` for every leaf, in
    /// coordinate order.
    #[must_use]
    pub fn leaves(&self) -> Leaves<'_, T> {
        Leaves {
            stack: vec![(Vec::new(), self)],
        }
    }
}

impl<T: Clone> Node<T> {
    /// Flatten exactly one level: branch children are spliced into the top
    /// level, leaf children pass through as singletons.
    ///
    /// On a regular one-dimensional tree this is the identity.
    #[must_use]
    pub fn join_once(&self) -> Node<T> {
        let mut flat = Vec::new();
        for child in self.children() {
            match child {
                Self::Branch(grand) => flat.extend(grand.iter().cloned()),
                leaf @ Self::Leaf(_) => flat.push(leaf.clone()),
            }
        }
        Self::Branch(flat)
    }

    /// Concatenate the top-level children of two trees.
    ///
    /// The empty branch is the identity on either side. Differing depths
    /// fail with `DimensionMismatch`; equal depths with differing inner
    /// shapes fail with `IrregularStructure`.
    pub fn append_nodes(&self, other: &Node<T>) -> ManifoldResult<Node<T>> {
        if matches!(self, Self::Branch(c) if c.is_empty()) {
            return Ok(other.clone());
        }
        if matches!(other, Self::Branch(c) if c.is_empty()) {
            return Ok(self.clone());
        }
        let left_depth = self.depth();
        let right_depth = other.depth();
        if left_depth != right_depth {
            return Err(ManifoldError::DimensionMismatch {
                expected: left_depth,
                actual: right_depth,
            });
        }
        match (self, other) {
            (Self::Branch(left), Self::Branch(right)) => {
                let mut children = Vec::with_capacity(left.len() + right.len());
                children.extend(left.iter().cloned());
                children.extend(right.iter().cloned());
                let combined = Self::Branch(children);
                combined.shape()?;
                Ok(combined)
            },
            // Two bare scalars; appending is defined on sequences only.
            _ => Err(ManifoldError::DimensionMismatch {
                expected: 1,
                actual: 0,
            }),
        }
    }
}

/// Depth-first leaf iterator, see [`Node::leaves`].
#[derive(Debug)]
pub struct Leaves<'a, T> {
    stack: Vec<(Vec<usize>, &'a Node<T>)>,
}

impl<'a, T> Iterator for Leaves<'a, T> {
    type Item = (Vec<usize>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, node)) = self.stack.pop() {
            match node {
                Node::Leaf(value) => return Some((path, value)),
                Node::Branch(children) => {
                    for (index, child) in children.iter().enumerate().rev() {
                        let mut child_path = path.clone();
                        child_path.push(index);
                        self.stack.push((child_path, child));
                    }
                },
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x2() -> Node<i64> {
        Node::grid(vec![vec![1, 2], vec![3, 4]])
    }

    #[test]
    fn depth_counts_levels() {
        assert_eq!(Node::leaf(1).depth(), 0);
        assert_eq!(Node::row(vec![1, 2, 3]).depth(), 1);
        assert_eq!(grid_2x2().depth(), 2);
    }

    #[test]
    fn depth_of_empty_branch_is_zero() {
        assert_eq!(Node::<i64>::Branch(Vec::new()).depth(), 0);
    }

    #[test]
    fn shape_of_regular_grid() {
        assert_eq!(grid_2x2().shape().unwrap(), vec![2, 2]);
        assert_eq!(Node::row(vec![1, 2, 3]).shape().unwrap(), vec![3]);
        assert_eq!(Node::leaf(1).shape().unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn shape_rejects_jagged_rows() {
        let jagged = Node::grid(vec![vec![1, 2], vec![3]]);
        let err = jagged.shape().unwrap_err();
        assert_eq!(
            err,
            ManifoldError::IrregularStructure {
                expected: vec![2],
                actual: vec![1],
                depth: 1,
            }
        );
    }

    #[test]
    fn shape_rejects_mixed_leaf_and_branch_siblings() {
        let mixed = Node::branch(vec![Node::leaf(1), Node::row(vec![2, 3])]);
        assert!(matches!(
            mixed.shape(),
            Err(ManifoldError::IrregularStructure { .. })
        ));
    }

    #[test]
    fn node_at_descends_by_path() {
        let grid = grid_2x2();
        assert_eq!(grid.node_at(&[1, 0]).unwrap(), &Node::leaf(3));
        assert_eq!(grid.node_at(&[0]).unwrap(), &Node::row(vec![1, 2]));
        assert_eq!(grid.node_at(&[]).unwrap(), &grid);
    }

    #[test]
    fn node_at_reports_out_of_range_with_depth() {
        let grid = grid_2x2();
        assert_eq!(
            grid.node_at(&[0, 5]).unwrap_err(),
            ManifoldError::IndexOutOfRange {
                index: 5,
                len: 2,
                depth: 1,
            }
        );
    }

    #[test]
    fn node_at_rejects_descent_through_leaf() {
        let grid = grid_2x2();
        assert!(matches!(
            grid.node_at(&[0, 0, 0]),
            Err(ManifoldError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn remove_at_splices_a_row() {
        let mut grid = grid_2x2();
        let removed = grid.remove_at(&[0]).unwrap();
        assert_eq!(removed, Node::row(vec![1, 2]));
        assert_eq!(grid, Node::grid(vec![vec![3, 4]]));
    }

    #[test]
    fn remove_at_rejects_leaf_removal_that_breaks_regularity() {
        let mut grid = grid_2x2();
        let err = grid.remove_at(&[0, 1]).unwrap_err();
        assert!(matches!(err, ManifoldError::IrregularStructure { .. }));
        // Nothing committed.
        assert_eq!(grid, grid_2x2());
    }

    #[test]
    fn remove_at_allows_leaf_removal_in_sole_branch() {
        let mut single = Node::grid(vec![vec![1, 2]]);
        single.remove_at(&[0, 1]).unwrap();
        assert_eq!(single, Node::grid(vec![vec![1]]));
    }

    #[test]
    fn remove_at_out_of_range() {
        let mut row = Node::row(vec![1, 2, 3]);
        assert_eq!(
            row.remove_at(&[3]).unwrap_err(),
            ManifoldError::IndexOutOfRange {
                index: 3,
                len: 3,
                depth: 0,
            }
        );
    }

    #[test]
    fn remove_at_rejects_empty_path() {
        let mut row = Node::row(vec![1]);
        assert!(matches!(
            row.remove_at(&[]),
            Err(ManifoldError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn fold_children_is_shallow() {
        let grid = grid_2x2();
        let count = grid
            .fold_children(0usize, |acc, child, path| {
                assert!(child.is_branch());
                assert_eq!(path.len(), 1);
                Ok(acc + 1)
            })
            .unwrap();
        // Two rows, not four scalars.
        assert_eq!(count, 2);
    }

    #[test]
    fn map_children_maps_one_level() {
        let row = Node::row(vec![1, 2]);
        let doubled = row
            .map_children(|child, _| match child {
                Node::Leaf(v) => Ok(Node::leaf(v * 2)),
                Node::Branch(_) => unreachable!(),
            })
            .unwrap();
        assert_eq!(doubled, Node::row(vec![2, 4]));
    }

    #[test]
    fn join_once_flattens_one_level() {
        assert_eq!(grid_2x2().join_once(), Node::row(vec![1, 2, 3, 4]));
    }

    #[test]
    fn join_once_is_identity_on_one_dimension() {
        let row = Node::row(vec![1, 2, 3]);
        assert_eq!(row.join_once(), row);
    }

    #[test]
    fn traverse_leaves_preserves_shape() {
        let doubled = grid_2x2()
            .traverse_leaves(|v, _| Ok(v * 2))
            .unwrap();
        assert_eq!(doubled, Node::grid(vec![vec![2, 4], vec![6, 8]]));
    }

    #[test]
    fn traverse_leaves_sees_full_paths() {
        let mut seen = Vec::new();
        grid_2x2()
            .traverse_leaves(|v, path| {
                seen.push((path.to_vec(), *v));
                Ok(*v)
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (vec![0, 0], 1),
                (vec![0, 1], 2),
                (vec![1, 0], 3),
                (vec![1, 1], 4),
            ]
        );
    }

    #[test]
    fn leaves_iterates_in_coordinate_order() {
        let collected: Vec<_> = grid_2x2()
            .leaves()
            .map(|(path, v)| (path, *v))
            .collect();
        assert_eq!(
            collected,
            vec![
                (vec![0, 0], 1),
                (vec![0, 1], 2),
                (vec![1, 0], 3),
                (vec![1, 1], 4),
            ]
        );
    }

    #[test]
    fn append_nodes_concatenates_rows() {
        let a = Node::row(vec![1, 2]);
        let b = Node::row(vec![3, 4]);
        assert_eq!(a.append_nodes(&b).unwrap(), Node::row(vec![1, 2, 3, 4]));
    }

    #[test]
    fn append_nodes_empty_is_identity() {
        let empty = Node::<i64>::Branch(Vec::new());
        let row = Node::row(vec![1, 2]);
        assert_eq!(empty.append_nodes(&row).unwrap(), row);
        assert_eq!(row.append_nodes(&empty).unwrap(), row);
    }

    #[test]
    fn append_nodes_rejects_dimension_mismatch() {
        let row = Node::row(vec![1, 2]);
        let grid = grid_2x2();
        assert!(matches!(
            row.append_nodes(&grid),
            Err(ManifoldError::DimensionMismatch {
                expected: 1,
                actual: 2,
            })
        ));
    }

    #[test]
    fn append_nodes_rejects_irregular_result() {
        let a = Node::grid(vec![vec![1, 2]]);
        let b = Node::grid(vec![vec![3]]);
        assert!(matches!(
            a.append_nodes(&b),
            Err(ManifoldError::IrregularStructure { .. })
        ));
    }
}
