//! In-memory owner for all loaded columns, keyed by [`ColumnPos`].
//!
//! [`VoxelWorld`] provides O(1) column lookup, insert, and removal using an
//! [`FxHashMap`](rustc_hash::FxHashMap) for fast hashing of small fixed-size
//! keys, and implements [`VoxelStore`] for scanners.

use rustc_hash::FxHashMap;

use crate::column::Column;
use crate::pos::{BlockPos, ColumnPos};
use crate::section::SECTION_SIZE;
use crate::state::BlockState;
use crate::store::VoxelStore;

/// Owns every loaded column of one world. All columns share the same vertical extent.
pub struct VoxelWorld {
    columns: FxHashMap<ColumnPos, Column>,
    min_section: i32,
    section_count: usize,
}

impl VoxelWorld {
    /// Creates an empty world whose columns span `section_count` sections from `min_section`.
    pub fn new(min_section: i32, section_count: usize) -> Self {
        Self {
            columns: FxHashMap::default(),
            min_section,
            section_count,
        }
    }

    /// Inserts a column at the given address, replacing any previous one.
    ///
    /// Columns with a different vertical extent than the world are rejected
    /// with a warning and `false`.
    pub fn load_column(&mut self, pos: ColumnPos, column: Column) -> bool {
        if column.min_section() != self.min_section || column.section_count() != self.section_count
        {
            tracing::warn!(
                "VoxelWorld::load_column extent mismatch at ({}, {})",
                pos.x,
                pos.z
            );
            return false;
        }
        self.columns.insert(pos, column);
        true
    }

    /// Removes and returns the column at the given address.
    pub fn unload_column(&mut self, pos: ColumnPos) -> Option<Column> {
        self.columns.remove(&pos)
    }

    /// Mutable access to a loaded column.
    pub fn column_mut(&mut self, pos: ColumnPos) -> Option<&mut Column> {
        self.columns.get_mut(&pos)
    }

    /// Returns the column at `pos`, creating an empty one if it is not loaded.
    pub fn column_or_insert(&mut self, pos: ColumnPos) -> &mut Column {
        let (min_section, count) = (self.min_section, self.section_count);
        self.columns
            .entry(pos)
            .or_insert_with(|| Column::new(min_section, count))
    }

    /// Sets a single voxel, loading an empty column first if needed.
    ///
    /// Positions outside the vertical extent are ignored with a warning.
    pub fn set_block_state(&mut self, pos: BlockPos, state: BlockState) {
        if pos.y < self.min_y() || pos.y > self.max_y() {
            tracing::warn!("VoxelWorld::set_block_state outside world: y={}", pos.y);
            return;
        }
        self.column_or_insert(pos.column())
            .set_block_state(pos.x, pos.y, pos.z, state);
    }

    /// Number of currently loaded columns.
    pub fn loaded_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterates over all loaded column addresses.
    pub fn loaded_columns(&self) -> impl Iterator<Item = &ColumnPos> {
        self.columns.keys()
    }
}

impl VoxelStore for VoxelWorld {
    fn column(&self, pos: ColumnPos) -> Option<&Column> {
        self.columns.get(&pos)
    }

    fn min_y(&self) -> i32 {
        self.min_section * SECTION_SIZE as i32
    }

    fn max_y(&self) -> i32 {
        (self.min_section + self.section_count as i32) * SECTION_SIZE as i32 - 1
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_range_from_sections() {
        let world = VoxelWorld::new(-4, 24);
        assert_eq!(world.min_y(), -64);
        assert_eq!(world.max_y(), 319);
    }

    #[test]
    fn test_set_then_query_through_store() {
        let mut world = VoxelWorld::new(0, 16);
        world.set_block_state(BlockPos::new(-20, 70, 5), BlockState(4));
        assert_eq!(world.loaded_count(), 1);
        assert_eq!(world.block_state(-20, 70, 5), BlockState(4));
        assert_eq!(world.block_state(-21, 70, 5), BlockState::AIR);
        assert!(world.column(ColumnPos::new(-2, 0)).is_some());
    }

    #[test]
    fn test_unloaded_and_out_of_range_read_air() {
        let mut world = VoxelWorld::new(0, 1);
        world.set_block_state(BlockPos::new(0, 0, 0), BlockState(1));
        assert_eq!(world.block_state(0, -1, 0), BlockState::AIR);
        assert_eq!(world.block_state(0, 16, 0), BlockState::AIR);
        assert_eq!(world.block_state(100, 0, 0), BlockState::AIR);
        // Writes outside the extent are dropped.
        world.set_block_state(BlockPos::new(0, 16, 0), BlockState(1));
        assert_eq!(world.block_state(0, 16, 0), BlockState::AIR);
    }

    #[test]
    fn test_load_rejects_mismatched_extent() {
        let mut world = VoxelWorld::new(0, 4);
        assert!(!world.load_column(ColumnPos::new(0, 0), Column::new(0, 8)));
        assert!(world.load_column(ColumnPos::new(0, 0), Column::new(0, 4)));
        assert!(world.unload_column(ColumnPos::new(0, 0)).is_some());
        assert_eq!(world.loaded_count(), 0);
    }
}
