// SPDX-License-Identifier: MIT OR Apache-2.0
//! Aliased view onto a rectangular region of a parent manifold.

use crate::{
    base::ManifoldBase,
    coordinate::{Coordinate, ManifoldId},
    error::{ManifoldError, ManifoldResult},
    manifold::Manifold,
};

/// A view onto a region of a parent [`Manifold`] (or of another
/// `SubManifold`). Owns no storage: every read and write goes through the
/// shared root tree, so mutating through a view *is* mutating the parent,
/// and the view's content always reflects the live parent state.
///
/// A view records the handle it was carved from (`coordinate_in_parent` is
/// tagged to that parent) and the composed absolute path used for access.
/// Paths are positional, so the absolute path stays correct for as long as
/// the region exists; once a structural mutation at an ancestor removes the
/// region, every subsequent operation fails with `InvalidView`.
#[derive(Debug, Clone)]
pub struct SubManifold<T> {
    root: Manifold<T>,
    parent_id: ManifoldId,
    coordinate_in_parent: Vec<usize>,
    absolute: Vec<usize>,
    id: ManifoldId,
}

impl<T: Clone> SubManifold<T> {
    pub(crate) fn new(
        root: Manifold<T>,
        parent_id: ManifoldId,
        parent_base: Vec<usize>,
        local: Vec<usize>,
    ) -> Self {
        let mut absolute = parent_base;
        absolute.extend_from_slice(&local);
        Self {
            root,
            parent_id,
            coordinate_in_parent: local,
            absolute,
            id: ManifoldId::next(),
        }
    }

    /// The coordinate this view addresses, tagged to its parent.
    #[must_use]
    pub fn coordinate_in_parent(&self) -> Coordinate {
        Coordinate::new(self.parent_id, self.coordinate_in_parent.clone())
    }

    /// Compose a view-local coordinate into one valid against the parent,
    /// by prefixing with the view's own coordinate.
    pub fn project(&self, coordinate: &Coordinate) -> ManifoldResult<Coordinate> {
        if coordinate.manifold_id() != self.id {
            return Err(ManifoldError::DimensionMismatch {
                expected: self.dimension()?,
                actual: coordinate.dimension(),
            });
        }
        let mut path =
            Vec::with_capacity(self.coordinate_in_parent.len() + coordinate.path().len());
        path.extend_from_slice(&self.coordinate_in_parent);
        path.extend_from_slice(coordinate.path());
        Ok(Coordinate::new(self.parent_id, path))
    }
}

impl<T: Clone> ManifoldBase<T> for SubManifold<T> {
    fn id(&self) -> ManifoldId {
        self.id
    }

    fn root(&self) -> &Manifold<T> {
        &self.root
    }

    fn base_path(&self) -> &[usize] {
        &self.absolute
    }
}

impl<T: Clone + PartialEq> PartialEq for SubManifold<T> {
    /// Compares live content; stale views compare unequal to everything.
    fn eq(&self, other: &Self) -> bool {
        match (self.snapshot(), other.snapshot()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Manifold, Node};

    fn grid() -> Manifold<i64> {
        Manifold::from_grid(vec![vec![1, 2], vec![3, 4]]).unwrap()
    }

    #[test]
    fn view_reads_the_addressed_region() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![1])).unwrap();
        assert_eq!(row.dimension().unwrap(), 1);
        assert_eq!(row.to_node().unwrap(), Node::row(vec![3, 4]));
        assert_eq!(row.get_leaf(&row.coordinate(vec![0])).unwrap(), 3);
    }

    #[test]
    fn writes_through_a_view_hit_the_parent() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![1])).unwrap();
        row.set_leaf(&row.coordinate(vec![0]), 7).unwrap();
        assert_eq!(grid.get_leaf(&grid.coordinate(vec![1, 0])).unwrap(), 7);
    }

    #[test]
    fn writes_through_the_parent_are_visible_in_the_view() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![0])).unwrap();
        grid.set_leaf(&grid.coordinate(vec![0, 1]), 42).unwrap();
        // Never a snapshot: the view reflects the live parent.
        assert_eq!(row.get_leaf(&row.coordinate(vec![1])).unwrap(), 42);
    }

    #[test]
    fn project_composes_into_the_parent() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![1])).unwrap();
        let projected = row.project(&row.coordinate(vec![0])).unwrap();
        assert_eq!(projected.path(), &[1, 0]);
        assert_eq!(projected.manifold_id(), grid.id());
        assert_eq!(grid.get_leaf(&projected).unwrap(), 3);
    }

    #[test]
    fn project_rejects_foreign_coordinates() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![1])).unwrap();
        assert!(matches!(
            row.project(&grid.coordinate(vec![0])),
            Err(ManifoldError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn view_of_a_view_aliases_the_same_storage() {
        let cube = Manifold::lift(Node::branch(vec![
            Node::grid(vec![vec![1, 2], vec![3, 4]]),
            Node::grid(vec![vec![5, 6], vec![7, 8]]),
        ]))
        .unwrap();
        assert_eq!(cube.dimension().unwrap(), 3);

        let plane = cube.sub_manifold(&cube.coordinate(vec![1])).unwrap();
        let row = plane.sub_manifold(&plane.coordinate(vec![0])).unwrap();
        assert_eq!(row.to_node().unwrap(), Node::row(vec![5, 6]));

        row.set_leaf(&row.coordinate(vec![1]), 60).unwrap();
        assert_eq!(cube.get_leaf(&cube.coordinate(vec![1, 0, 1])).unwrap(), 60);

        let projected = row.project(&row.coordinate(vec![1])).unwrap();
        assert_eq!(projected.manifold_id(), plane.id());
        assert_eq!(projected.path(), &[0, 1]);
    }

    #[test]
    fn set_root_replaces_the_region_as_one_unit() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![0])).unwrap();
        row.set_root(Node::row(vec![9, 8])).unwrap();
        assert_eq!(
            grid.to_node().unwrap(),
            Node::grid(vec![vec![9, 8], vec![3, 4]])
        );
    }

    #[test]
    fn set_root_on_a_view_must_preserve_shape() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![0])).unwrap();
        assert!(matches!(
            row.set_root(Node::row(vec![9, 8, 7])),
            Err(ManifoldError::IrregularStructure { .. })
        ));
    }

    #[test]
    fn stale_view_fails_with_invalid_view() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![1])).unwrap();

        // Removing the addressed row invalidates the view.
        grid.delete(&grid.coordinate(vec![1])).unwrap();

        assert_eq!(
            row.to_node().unwrap_err(),
            ManifoldError::InvalidView { path: vec![1] }
        );
        assert!(matches!(
            row.get_leaf(&row.coordinate(vec![0])),
            Err(ManifoldError::InvalidView { .. })
        ));
        assert!(matches!(
            row.set_leaf(&row.coordinate(vec![0]), 1),
            Err(ManifoldError::InvalidView { .. })
        ));
        assert!(matches!(
            row.dimension(),
            Err(ManifoldError::InvalidView { .. })
        ));
    }

    #[test]
    fn views_are_never_snapshots() {
        let grid = grid();
        let row = grid.sub_manifold(&grid.coordinate(vec![0])).unwrap();
        let before = row.to_node().unwrap();
        grid.set_leaf(&grid.coordinate(vec![0, 0]), 100).unwrap();
        let after = row.to_node().unwrap();
        assert_ne!(before, after);
    }
}
