//! Spatial indexing for neighbor and docking-candidate queries.
//!
//! Indices return a superset of the voxels within range; the swarm filters
//! by exact distance and sorts by traversal rank, so every backend yields
//! the same neighbor lists.

use std::collections::HashMap;

use glam::DVec2;

use crate::config::SpatialBackend;

/// Common behaviour exposed by neighborhood indices.
pub trait SpatialIndex: std::fmt::Debug {
    /// Rebuild internal structures from the positions of every voxel.
    fn rebuild(&mut self, positions: &[DVec2]);

    /// Record that voxel `index` moved within the current tick.
    fn relocate(&mut self, index: usize, from: DVec2, to: DVec2);

    /// Push every index that may lie within `radius` of `center`.
    ///
    /// May report extra indices; never omits one that is in range.
    fn candidates(&self, center: DVec2, radius: f64, out: &mut Vec<usize>);
}

/// Create the index selected by `backend`.
pub fn build_index(backend: SpatialBackend, cell_size: f64) -> Box<dyn SpatialIndex> {
    match backend {
        SpatialBackend::BruteForce => Box::new(BruteForce::default()),
        SpatialBackend::Grid => Box::new(UniformGrid::new(cell_size)),
    }
}

/// Reports every voxel for every query.
#[derive(Debug, Clone, Default)]
pub struct BruteForce {
    len: usize,
}

impl SpatialIndex for BruteForce {
    fn rebuild(&mut self, positions: &[DVec2]) {
        self.len = positions.len();
    }

    fn relocate(&mut self, _index: usize, _from: DVec2, _to: DVec2) {}

    fn candidates(&self, _center: DVec2, _radius: f64, out: &mut Vec<usize>) {
        out.extend(0..self.len);
    }
}

type Cell = (i64, i64);

/// Square buckets of edge `cell_size`, kept current as voxels move.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f64,
    cells: HashMap<Cell, Vec<usize>>,
}

impl UniformGrid {
    /// Create an empty grid with square cells of edge `cell_size`.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(f64::EPSILON),
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, p: DVec2) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    fn insert(&mut self, index: usize, p: DVec2) {
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(index);
    }

    fn remove(&mut self, index: usize, p: DVec2) {
        let cell = self.cell_of(p);
        if let Some(bucket) = self.cells.get_mut(&cell) {
            if let Some(slot) = bucket.iter().position(|&i| i == index) {
                bucket.swap_remove(slot);
            }
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }
}

impl SpatialIndex for UniformGrid {
    fn rebuild(&mut self, positions: &[DVec2]) {
        self.cells.clear();
        for (index, &p) in positions.iter().enumerate() {
            self.insert(index, p);
        }
    }

    fn relocate(&mut self, index: usize, from: DVec2, to: DVec2) {
        if self.cell_of(from) == self.cell_of(to) {
            return;
        }
        self.remove(index, from);
        self.insert(index, to);
    }

    fn candidates(&self, center: DVec2, radius: f64, out: &mut Vec<usize>) {
        let radius = radius.max(0.0);
        let (min_x, min_y) = self.cell_of(center - DVec2::splat(radius));
        let (max_x, max_y) = self.cell_of(center + DVec2::splat(radius));

        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }
}
