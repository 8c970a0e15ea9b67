//! Uniform-grid broad phase for projectile-vs-player checks
//!
//! Rebuilt from scratch every tick after all position updates; cells hold
//! indices into the live projectile list, so the grid must never outlive a
//! compaction pass. Queries return a candidate superset — callers still run
//! the exact narrow-phase distance test.

use std::collections::HashMap;

use glam::Vec2;

use super::projectile::Projectile;
use crate::consts::GRID_CELL_SIZE;

#[derive(Debug, Default)]
pub struct SpatialIndex {
    cells: HashMap<(i32, i32), Vec<u32>>,
    /// Scratch buffer reused across queries; not reentrant.
    scratch: Vec<u32>,
}

#[inline]
fn cell_of(pos: Vec2) -> (i32, i32) {
    (
        (pos.x / GRID_CELL_SIZE).floor() as i32,
        (pos.y / GRID_CELL_SIZE).floor() as i32,
    )
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear and reinsert every collision-eligible projectile. O(n).
    pub fn rebuild(&mut self, projectiles: &[Projectile]) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for (index, projectile) in projectiles.iter().enumerate() {
            if !projectile.is_active() {
                continue;
            }
            self.cells
                .entry(cell_of(projectile.pos))
                .or_default()
                .push(index as u32);
        }
    }

    /// Union of the 3x3 cell block around `point`, as projectile indices.
    ///
    /// The returned slice aliases an internal buffer; it is invalidated by
    /// the next query or rebuild.
    pub fn query_neighborhood(&mut self, point: Vec2) -> &[u32] {
        self.scratch.clear();
        let (base_x, base_y) = cell_of(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.cells.get(&(base_x + dx, base_y + dy)) {
                    self.scratch.extend_from_slice(bucket);
                }
            }
        }
        &self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::projectile::ProjectileKind;
    use proptest::prelude::*;

    fn active_projectile(x: f32, y: f32) -> Projectile {
        let mut p = Projectile::spawn(Vec2::new(x, y), Vec2::new(1.0, 0.0), ProjectileKind::Normal);
        p.force_active();
        p
    }

    #[test]
    fn test_query_finds_same_and_adjacent_cells() {
        let mut grid = SpatialIndex::new();
        let projectiles = vec![
            active_projectile(100.0, 100.0), // same cell as query point
            active_projectile(130.0, 80.0),  // adjacent cell
            active_projectile(900.0, 900.0), // far away
        ];
        grid.rebuild(&projectiles);

        let hits = grid.query_neighborhood(Vec2::new(110.0, 95.0));
        assert!(hits.contains(&0));
        assert!(hits.contains(&1));
        assert!(!hits.contains(&2));
    }

    #[test]
    fn test_warning_projectiles_excluded() {
        let mut grid = SpatialIndex::new();
        let projectiles = vec![Projectile::spawn(
            Vec2::new(50.0, 50.0),
            Vec2::ZERO,
            ProjectileKind::Normal,
        )];
        grid.rebuild(&projectiles);
        assert!(grid.query_neighborhood(Vec2::new(50.0, 50.0)).is_empty());
    }

    #[test]
    fn test_rebuild_discards_previous_tick() {
        let mut grid = SpatialIndex::new();
        grid.rebuild(&[active_projectile(10.0, 10.0)]);
        grid.rebuild(&[]);
        assert!(grid.query_neighborhood(Vec2::new(10.0, 10.0)).is_empty());
    }

    proptest! {
        /// Broad phase never produces false negatives: every active
        /// projectile within one cell length of the query point is returned.
        #[test]
        fn prop_superset_of_in_range(
            px in -2000.0f32..2000.0,
            py in -2000.0f32..2000.0,
            coords in prop::collection::vec((-2000.0f32..2000.0, -2000.0f32..2000.0), 0..64),
        ) {
            let projectiles: Vec<Projectile> = coords
                .iter()
                .map(|&(x, y)| active_projectile(x, y))
                .collect();
            let mut grid = SpatialIndex::new();
            grid.rebuild(&projectiles);
            let hits: Vec<u32> = grid.query_neighborhood(Vec2::new(px, py)).to_vec();

            for (index, projectile) in projectiles.iter().enumerate() {
                let delta = projectile.pos - Vec2::new(px, py);
                if delta.x.abs() < GRID_CELL_SIZE && delta.y.abs() < GRID_CELL_SIZE {
                    prop_assert!(
                        hits.contains(&(index as u32)),
                        "missed projectile at {:?}", projectile.pos
                    );
                }
            }
        }
    }
}
