//! The read contract a voxel world offers to scanners.

use crate::column::Column;
use crate::pos::{BlockPos, ColumnPos};
use crate::state::BlockState;

/// Read-only access to loaded columns and their sections.
///
/// Implementors own the world data; consumers of this trait never mutate it.
pub trait VoxelStore {
    /// Returns the loaded column at `pos`, or `None` if it is not loaded.
    fn column(&self, pos: ColumnPos) -> Option<&Column>;

    /// Lowest valid world Y (inclusive).
    fn min_y(&self) -> i32;

    /// Highest valid world Y (inclusive).
    fn max_y(&self) -> i32;

    /// Uncached point query. Unloaded or out-of-range positions read as air.
    fn block_state(&self, x: i32, y: i32, z: i32) -> BlockState {
        if y < self.min_y() || y > self.max_y() {
            return BlockState::AIR;
        }
        self.column(ColumnPos::containing(x, z))
            .map_or(BlockState::AIR, |column| column.block_state(x, y, z))
    }

    /// [`block_state`](Self::block_state) for a [`BlockPos`].
    fn block_state_at(&self, pos: BlockPos) -> BlockState {
        self.block_state(pos.x, pos.y, pos.z)
    }
}
