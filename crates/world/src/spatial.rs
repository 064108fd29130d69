//! Uniform-grid spatial index over object handles.
//!
//! Buckets hold [`ObjectHandle`]s only; the arena stays the single source of
//! truth for object fields. Each handle remembers the cell it was filed under,
//! so removal and reindexing never depend on the object's current position.

use std::collections::HashMap;

use glam::Vec3;
use tracing::warn;

use crate::ObjectHandle;

/// Default edge length of a grid cell in world units.
pub const DEFAULT_CELL_SIZE: f32 = 10.0;

/// Integer coordinates of a grid cell: `floor(position / cell_size)` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    /// Cell x coordinate.
    pub x: i32,
    /// Cell y coordinate.
    pub y: i32,
    /// Cell z coordinate.
    pub z: i32,
}

impl CellKey {
    /// Create a key from cell coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell containing `position`. Non-finite inputs saturate instead of panicking.
    pub fn from_position(position: Vec3, cell_size: f32) -> Self {
        let cell = (position / cell_size).floor();
        Self {
            x: cell.x as i32,
            y: cell.y as i32,
            z: cell.z as i32,
        }
    }

    /// Key shifted by a cell offset, or `None` past the grid edge.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            z: self.z.checked_add(dz)?,
        })
    }

    fn within(self, center: Self, radius: i64) -> bool {
        (i64::from(self.x) - i64::from(center.x)).abs() <= radius
            && (i64::from(self.y) - i64::from(center.y)).abs() <= radius
            && (i64::from(self.z) - i64::from(center.z)).abs() <= radius
    }
}

/// Uniform grid bucketing object handles by cell.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<ObjectHandle>>,
    indexed: HashMap<ObjectHandle, CellKey>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialGrid {
    /// Create an empty grid. Cell size is fixed for the grid's lifetime;
    /// invalid sizes fall back to [`DEFAULT_CELL_SIZE`].
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            warn!(cell_size, "invalid spatial grid cell size, using default");
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            indexed: HashMap::new(),
        }
    }

    /// Edge length of a cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell key for a world position under this grid's cell size.
    pub fn cell_key(&self, position: Vec3) -> CellKey {
        CellKey::from_position(position, self.cell_size)
    }

    /// Number of indexed handles.
    pub fn len(&self) -> usize {
        self.indexed.len()
    }

    /// Returns true when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty()
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Whether `handle` is indexed.
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.indexed.contains_key(&handle)
    }

    /// Cell `handle` is currently filed under.
    pub fn indexed_cell(&self, handle: ObjectHandle) -> Option<CellKey> {
        self.indexed.get(&handle).copied()
    }

    /// File `handle` under the cell containing `position`.
    ///
    /// A handle that is already indexed is moved to the new cell, never duplicated.
    pub fn insert(&mut self, handle: ObjectHandle, position: Vec3) {
        let key = self.cell_key(position);
        if let Some(previous) = self.indexed.insert(handle, key) {
            if previous == key {
                return;
            }
            self.detach(handle, previous);
        }
        self.cells.entry(key).or_default().push(handle);
    }

    /// Remove `handle`. Returns false if it was not indexed.
    pub fn remove(&mut self, handle: ObjectHandle) -> bool {
        match self.indexed.remove(&handle) {
            Some(key) => {
                self.detach(handle, key);
                true
            }
            None => false,
        }
    }

    /// Refile an indexed handle after its object moved. Returns false if it was not indexed.
    pub fn reindex(&mut self, handle: ObjectHandle, position: Vec3) -> bool {
        if !self.contains(handle) {
            return false;
        }
        self.insert(handle, position);
        true
    }

    /// Candidates filed in the cube of cells within `ceil(radius / cell_size)`
    /// of the cell containing `center`.
    ///
    /// Over-approximates: callers apply their own exact distance test. Order is
    /// cell order (x, then y, then z), then insertion order within a cell.
    pub fn query(&self, center: Vec3, radius: f32) -> Vec<ObjectHandle> {
        let mut result = Vec::new();
        if self.cells.is_empty() || !center.is_finite() || radius.is_nan() || radius < 0.0 {
            return result;
        }

        let center_key = self.cell_key(center);
        let cell_radius = (radius / self.cell_size).ceil();
        let span = 2.0 * f64::from(cell_radius) + 1.0;

        if span * span * span > self.cells.len() as f64 {
            // Visiting every cell of the cube would cost more than scanning the
            // occupied ones; filter occupied keys instead and keep cube order.
            let reach = if cell_radius >= i32::MAX as f32 {
                i64::MAX
            } else {
                cell_radius as i64
            };
            let mut keys: Vec<CellKey> = self
                .cells
                .keys()
                .copied()
                .filter(|key| key.within(center_key, reach))
                .collect();
            keys.sort_unstable();
            for key in keys {
                result.extend_from_slice(&self.cells[&key]);
            }
            return result;
        }

        let r = cell_radius as i32;
        for dx in -r..=r {
            for dy in -r..=r {
                for dz in -r..=r {
                    let Some(key) = center_key.offset(dx, dy, dz) else {
                        continue;
                    };
                    if let Some(bucket) = self.cells.get(&key) {
                        result.extend_from_slice(bucket);
                    }
                }
            }
        }
        result
    }

    fn detach(&mut self, handle: ObjectHandle, key: CellKey) {
        if let Some(bucket) = self.cells.get_mut(&key) {
            if let Some(index) = bucket.iter().position(|h| *h == handle) {
                bucket.remove(index);
            }
            if bucket.is_empty() {
                self.cells.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::collections::HashSet;

    fn handles(n: usize) -> Vec<ObjectHandle> {
        let mut map: SlotMap<ObjectHandle, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn cell_key_floors_negative_coordinates() {
        assert_eq!(
            CellKey::from_position(Vec3::new(-0.1, 9.99, 10.0), 10.0),
            CellKey::new(-1, 0, 1)
        );
    }

    #[test]
    fn empty_grid_returns_no_candidates() {
        let grid = SpatialGrid::new(10.0);
        assert!(grid.query(Vec3::ZERO, 100.0).is_empty());
    }

    #[test]
    fn invalid_cell_size_falls_back_to_default() {
        assert_eq!(SpatialGrid::new(0.0).cell_size(), DEFAULT_CELL_SIZE);
        assert_eq!(SpatialGrid::new(f32::NAN).cell_size(), DEFAULT_CELL_SIZE);
        assert_eq!(SpatialGrid::new(2.5).cell_size(), 2.5);
    }

    #[test]
    fn query_visits_neighbor_cells_only() {
        let hs = handles(3);
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(hs[0], Vec3::new(1.0, 0.0, 1.0));
        grid.insert(hs[1], Vec3::new(19.0, 0.0, 1.0));
        grid.insert(hs[2], Vec3::new(35.0, 0.0, 1.0));

        let near: HashSet<_> = grid.query(Vec3::new(5.0, 0.0, 5.0), 5.0).into_iter().collect();
        assert_eq!(near, HashSet::from([hs[0], hs[1]]));
    }

    #[test]
    fn query_over_approximates_radius() {
        let hs = handles(1);
        let mut grid = SpatialGrid::new(10.0);
        // Same cell as the query center but 12 units away.
        grid.insert(hs[0], Vec3::new(9.9, 9.9, 0.0));
        assert_eq!(grid.query(Vec3::new(0.1, 0.1, 0.0), 1.0), vec![hs[0]]);
    }

    #[test]
    fn remove_uses_recorded_cell() {
        let hs = handles(2);
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(hs[0], Vec3::new(1.0, 0.0, 0.0));
        grid.insert(hs[1], Vec3::new(2.0, 0.0, 0.0));

        assert!(grid.remove(hs[0]));
        assert!(!grid.remove(hs[0]));
        assert_eq!(grid.query(Vec3::ZERO, 1.0), vec![hs[1]]);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn reinsert_moves_instead_of_duplicating() {
        let hs = handles(1);
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(hs[0], Vec3::new(1.0, 0.0, 0.0));
        grid.insert(hs[0], Vec3::new(101.0, 0.0, 0.0));

        assert!(grid.query(Vec3::ZERO, 1.0).is_empty());
        assert_eq!(grid.query(Vec3::new(100.0, 0.0, 0.0), 1.0), vec![hs[0]]);
        assert_eq!(grid.occupied_cells(), 1);
        assert_eq!(grid.indexed_cell(hs[0]), Some(CellKey::new(10, 0, 0)));
    }

    #[test]
    fn reindex_requires_prior_insert() {
        let hs = handles(1);
        let mut grid = SpatialGrid::new(10.0);
        assert!(!grid.reindex(hs[0], Vec3::ZERO));
        grid.insert(hs[0], Vec3::ZERO);
        assert!(grid.reindex(hs[0], Vec3::new(50.0, 0.0, 0.0)));
        assert_eq!(grid.indexed_cell(hs[0]), Some(CellKey::new(5, 0, 0)));
    }

    #[test]
    fn huge_radius_matches_cube_walk() {
        let hs = handles(34);
        let mut grid = SpatialGrid::new(10.0);
        // Far-away fillers occupy enough cells that a radius-10 query walks the cube.
        for (i, h) in hs[4..].iter().enumerate() {
            grid.insert(*h, Vec3::new(5_000.0 + i as f32 * 10.0, 0.0, 0.0));
        }
        let positions = [
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 5.0),
            Vec3::new(3.0, 0.0, 8.0),
            Vec3::new(-4.0, 2.0, 3.0),
        ];
        for (h, p) in hs.iter().zip(positions) {
            grid.insert(*h, p);
        }
        // Small radius walks the cube; huge radius filters occupied cells.
        let walked = grid.query(Vec3::new(5.0, 0.0, 5.0), 10.0);
        let filtered = grid.query(Vec3::new(5.0, 0.0, 5.0), 1000.0);
        assert_eq!(walked, filtered);
        assert_eq!(walked.len(), 4);
        assert_eq!(grid.query(Vec3::ZERO, f32::INFINITY).len(), 34);
    }

    #[test]
    fn cube_walk_at_grid_edge_returns_each_handle_once() {
        let hs = handles(31);
        let mut grid = SpatialGrid::new(1.0);
        for (i, h) in hs[1..].iter().enumerate() {
            grid.insert(*h, Vec3::new(i as f32 * 10.0, 0.0, 0.0));
        }
        // Far beyond i32 cells: the key clamps to i32::MAX.
        let edge = Vec3::new(3.0e9, 0.0, 0.0);
        grid.insert(hs[0], edge);
        assert_eq!(grid.indexed_cell(hs[0]).map(|key| key.x), Some(i32::MAX));

        assert_eq!(grid.query(edge, 1.0), vec![hs[0]]);
        assert_eq!(CellKey::new(i32::MAX, 0, 0).offset(1, 0, 0), None);
        assert_eq!(
            CellKey::new(1, 2, 3).offset(-1, 0, 1),
            Some(CellKey::new(0, 2, 4))
        );
    }

    #[test]
    fn degenerate_query_inputs_return_empty() {
        let hs = handles(1);
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(hs[0], Vec3::ZERO);
        assert!(grid.query(Vec3::ZERO, -1.0).is_empty());
        assert!(grid.query(Vec3::ZERO, f32::NAN).is_empty());
        assert!(grid.query(Vec3::splat(f32::NAN), 5.0).is_empty());
    }
}
