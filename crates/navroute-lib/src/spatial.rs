//! KD-tree backed spatial index over position-bearing items.
//!
//! # Overview
//!
//! [`SpatialIndex`] owns a collection of items implementing [`Positioned`]
//! together with a parallel cache of their earth-centred coordinates and a
//! KD-tree (k=3) built from that cache. Queries use chord (straight line)
//! distances in meters.
//!
//! Items sharing exactly the same coordinates occupy a single tree entry that
//! maps back to all of them, since the tree cannot split a bucket of identical
//! points.
//!
//! The tree reflects the snapshot taken by the last call to
//! [`SpatialIndex::update_index`]. Mutating the collection through
//! [`SpatialIndex::push`], [`SpatialIndex::items_mut`] or
//! [`SpatialIndex::clear`] leaves the tree stale until the index is updated
//! again; this is not tracked.
//!
//! # Example
//!
//! ```
//! use navroute_lib::{Point3D, Pos, Positioned, SpatialIndex};
//!
//! struct Fix(Point3D);
//!
//! impl Positioned for Fix {
//!     fn position(&self) -> Point3D {
//!         self.0
//!     }
//! }
//!
//! let mut index = SpatialIndex::new();
//! index.push(Fix(Pos::new(8.0, 47.0).into()));
//! index.push(Fix(Pos::new(9.0, 47.0).into()));
//! index.update_index();
//!
//! let query = Point3D::from(Pos::new(8.9, 47.0));
//! assert_eq!(index.nearest_index(&query), Some(1));
//! ```

use std::collections::HashMap;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::geo::Point3D;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

type Tree = KdTree<f32, usize, 3, BUCKET_SIZE, u32>;

/// Anything that can be placed into a [`SpatialIndex`].
pub trait Positioned {
    fn position(&self) -> Point3D;
}

impl Positioned for Point3D {
    fn position(&self) -> Point3D {
        *self
    }
}

/// Spatial index for nearest-neighbour and radius queries.
pub struct SpatialIndex<T> {
    items: Vec<T>,
    /// Coordinates captured at the last index update, parallel to `items`.
    points: Vec<Point3D>,
    /// Item indexes per distinct position. The tree stores positions in this list.
    groups: Vec<Vec<usize>>,
    tree: Tree,
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            points: Vec::new(),
            groups: Vec::new(),
            tree: Tree::new(),
        }
    }
}

impl<T: Positioned> SpatialIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a collection and update it right away.
    pub fn from_items(items: Vec<T>) -> Self {
        let mut index = Self {
            items,
            ..Self::default()
        };
        index.update_index();
        index
    }

    /// Rebuild the KD-tree from the current state of the collection.
    pub fn update_index(&mut self) {
        self.points = self.items.iter().map(Positioned::position).collect();

        let mut by_position: HashMap<[u32; 3], usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut tree = Tree::with_capacity(self.points.len().max(1));
        for (index, point) in self.points.iter().enumerate() {
            let coords = point.coords();
            // + 0.0 folds -0.0 into 0.0
            let key = coords.map(|c| (c + 0.0).to_bits());
            match by_position.get(&key) {
                Some(&group) => groups[group].push(index),
                None => {
                    by_position.insert(key, groups.len());
                    tree.add(&coords, groups.len());
                    groups.push(vec![index]);
                }
            }
        }
        self.groups = groups;
        self.tree = tree;

        debug!(
            items = self.points.len(),
            positions = self.groups.len(),
            "rebuilt spatial index"
        );
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Mutable access to the collection. Call [`Self::update_index`] afterwards.
    pub fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Append an item. Call [`Self::update_index`] afterwards.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Remove all items and reset the tree.
    pub fn clear(&mut self) {
        self.items.clear();
        self.points.clear();
        self.groups.clear();
        self.tree = Tree::new();
    }

    /// Nearest item by chord distance.
    pub fn nearest(&self, pos: &Point3D) -> Option<&T> {
        self.nearest_index(pos).and_then(|index| self.items.get(index))
    }

    /// Index of the nearest item by chord distance.
    pub fn nearest_index(&self, pos: &Point3D) -> Option<usize> {
        if self.groups.is_empty() {
            return None;
        }
        let neighbour = self.tree.nearest_one::<SquaredEuclidean>(&pos.coords());
        self.groups
            .get(neighbour.item)
            .and_then(|group| group.first().copied())
    }

    /// Indexes of the `k` nearest items sorted by distance.
    pub fn nearest_n(&self, pos: &Point3D, k: usize) -> Vec<usize> {
        if k == 0 || self.groups.is_empty() {
            return Vec::new();
        }
        let mut found: Vec<usize> = self
            .tree
            .nearest_n::<SquaredEuclidean>(&pos.coords(), k)
            .into_iter()
            .flat_map(|neighbour| self.group(neighbour.item).iter().copied())
            .collect();
        found.truncate(k);
        found
    }

    /// All items within `max_radius_meter`, returned as `(index, chord distance)`
    /// pairs sorted by distance.
    pub fn radius(&self, pos: &Point3D, max_radius_meter: f32) -> Vec<(usize, f32)> {
        self.radius_filtered(pos, max_radius_meter, |_, _| true)
    }

    /// Radius query with a secondary filter.
    ///
    /// `keep` receives the chord distance and the item index and returns
    /// `true` for candidates that should be part of the result.
    pub fn radius_filtered<F>(
        &self,
        pos: &Point3D,
        max_radius_meter: f32,
        mut keep: F,
    ) -> Vec<(usize, f32)>
    where
        F: FnMut(f32, usize) -> bool,
    {
        if self.groups.is_empty() || max_radius_meter.is_nan() || max_radius_meter < 0.0 {
            return Vec::new();
        }

        let squared_radius = max_radius_meter * max_radius_meter;
        self.tree
            .within::<SquaredEuclidean>(&pos.coords(), squared_radius)
            .into_iter()
            .flat_map(|neighbour| {
                let distance = neighbour.distance.sqrt();
                self.group(neighbour.item)
                    .iter()
                    .map(move |&index| (index, distance))
            })
            .filter(|&(index, distance)| keep(distance, index))
            .collect()
    }

    fn group(&self, position: usize) -> &[usize] {
        self.groups
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Position captured for an item at the last index update.
    pub fn point(&self, index: usize) -> Option<Point3D> {
        self.points.get(index).copied()
    }
}

impl<T> std::fmt::Debug for SpatialIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("items", &self.items.len())
            .field("indexed", &self.points.len())
            .field("positions", &self.groups.len())
            .finish()
    }
}
