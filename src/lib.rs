// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recursive n-dimensional container with coordinate addressing and aliased
//! sub-region views.
//!
//! A [`Manifold`] owns an arbitrarily deeply nested sequence of values,
//! regular at every depth (all sequences at the same nesting level have
//! equal length). Locations are addressed by [`Coordinate`] integer paths:
//! a path as long as the manifold's dimension addresses a scalar (a *leaf*
//! coordinate), a shorter path addresses a nested sub-structure (a *stem*
//! coordinate). A [`SubManifold`] is an aliased view onto such a
//! sub-structure — it owns no storage, so writes through a view are writes
//! to the parent, and vice versa.
//!
//! The shared algorithms — `get`/`set`/`delete` plus the functional
//! operations `fold`, `map`, `bind`, `traverse`, `join`, and `append` —
//! live in the [`ManifoldBase`] trait, implemented once for both the root
//! container and its views. Raw nested content is exchanged as [`Node`]
//! trees, which serialize with serde.
//!
//! # Example
//!
//! ```
//! use manifold_tree::{Manifold, ManifoldBase, Node};
//!
//! let grid = Manifold::from_grid(vec![vec![1, 2], vec![3, 4]]).unwrap();
//! assert_eq!(grid.dimension().unwrap(), 2);
//! assert_eq!(grid.get_leaf(&grid.coordinate(vec![1, 0])).unwrap(), 3);
//!
//! // Aliased view: writing through it mutates the parent.
//! let row = grid.sub_manifold(&grid.coordinate(vec![1])).unwrap();
//! row.set_leaf(&row.coordinate(vec![0]), 7).unwrap();
//! assert_eq!(grid.get_leaf(&grid.coordinate(vec![1, 0])).unwrap(), 7);
//!
//! // Shape-preserving deep traversal builds a new manifold.
//! let doubled = grid.traverse(|v, _| Ok(v * 2)).unwrap();
//! assert_eq!(
//!     doubled.to_node().unwrap(),
//!     Node::grid(vec![vec![2, 4], vec![14, 8]])
//! );
//! ```

pub mod base;
pub mod coordinate;
pub mod error;
pub mod manifold;
pub mod node;
pub mod submanifold;

pub use base::{Entry, ManifoldBase};
pub use coordinate::{Coordinate, LeafCoordinate, ManifoldId, StemCoordinate};
pub use error::{ManifoldError, ManifoldResult};
pub use manifold::Manifold;
pub use node::{Leaves, Node};
pub use submanifold::SubManifold;
