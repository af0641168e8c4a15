//! Walks one section box voxel by voxel and exposes neighbor lookups to callbacks.

use std::ops::ControlFlow;

use sweep_voxel::{BlockPos, BlockState, Column, ColumnPos, SECTION_SIZE, VoxelStore, section_index};

use crate::decode::SectionSource;
use crate::region::SectionBox;

/// Per-axis absolute distance from the observer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Distance {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Distance {
    /// Chebyshev distance on the horizontal plane.
    #[inline]
    pub fn horizontal(&self) -> u32 {
        self.x.max(self.z)
    }

    /// Returns `true` if this offset lies within a request's radii.
    #[inline]
    pub fn within(&self, horizontal_radius: u32, vertical_radius: u32) -> bool {
        self.y <= vertical_radius && self.horizontal() <= horizontal_radius
    }
}

/// Point lookups for callbacks, bound to the section box being walked.
///
/// Positions inside the box are answered from the already-prepared decode
/// source. Anything else goes through the current column when it owns the
/// position, or the store's uncached lookup otherwise.
#[derive(Clone, Copy)]
pub struct BlockAccess<'w> {
    bounds: SectionBox,
    source: SectionSource<'w>,
    column: &'w Column,
    store: &'w dyn VoxelStore,
}

impl<'w> BlockAccess<'w> {
    pub(crate) fn new(
        bounds: SectionBox,
        source: SectionSource<'w>,
        column: &'w Column,
        store: &'w dyn VoxelStore,
    ) -> Self {
        Self {
            bounds,
            source,
            column,
            store,
        }
    }

    /// The section box this accessor answers from its decode source.
    pub fn bounds(&self) -> &SectionBox {
        &self.bounds
    }

    /// State at world coordinates.
    pub fn block_state(&self, x: i32, y: i32, z: i32) -> BlockState {
        if self.bounds.contains(x, y, z) {
            self.source.state(local_index(x, y, z))
        } else if ColumnPos::containing(x, z) == self.bounds.column {
            if y < self.store.min_y() || y > self.store.max_y() {
                return BlockState::AIR;
            }
            self.column.block_state(x, y, z)
        } else {
            self.store.block_state(x, y, z)
        }
    }

    /// State at a [`BlockPos`].
    pub fn block_state_at(&self, pos: BlockPos) -> BlockState {
        self.block_state(pos.x, pos.y, pos.z)
    }
}

#[inline]
fn local(coord: i32) -> usize {
    (coord & (SECTION_SIZE as i32 - 1)) as usize
}

#[inline]
fn local_index(x: i32, y: i32, z: i32) -> usize {
    section_index(local(x), local(y), local(z))
}

/// Visits every voxel of `access.bounds()` in X, Z, Y order.
///
/// Stops as soon as `on_voxel` breaks and reports that to the caller.
pub(crate) fn walk_section<F>(access: &BlockAccess<'_>, observer: BlockPos, mut on_voxel: F) -> ControlFlow<()>
where
    F: FnMut(&BlockAccess<'_>, BlockPos, Distance, BlockState) -> ControlFlow<()>,
{
    let SectionBox { min, max, .. } = access.bounds;

    for x in min.x..=max.x {
        let lx = local(x);
        let dx = x.abs_diff(observer.x);

        for z in min.z..=max.z {
            let lz = local(z);
            let dz = z.abs_diff(observer.z);

            for y in min.y..=max.y {
                let state = access.source.state(section_index(lx, local(y), lz));
                let distance = Distance {
                    x: dx,
                    y: y.abs_diff(observer.y),
                    z: dz,
                };

                if on_voxel(access, BlockPos::new(x, y, z), distance, state).is_break() {
                    return ControlFlow::Break(());
                }
            }
        }
    }

    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_voxel::VoxelWorld;

    fn world_with_marker() -> VoxelWorld {
        let mut world = VoxelWorld::new(0, 4);
        world.set_block_state(BlockPos::new(3, 20, 3), BlockState(5));
        world.set_block_state(BlockPos::new(3, 19, 3), BlockState(6));
        world.set_block_state(BlockPos::new(16, 20, 3), BlockState(7));
        world
    }

    fn box_around(center: BlockPos) -> SectionBox {
        SectionBox {
            column: center.column(),
            section_y: center.section_y(),
            min: center,
            max: center,
        }
    }

    #[test]
    fn test_distance_tests_are_chebyshev() {
        let d = Distance { x: 2, y: 1, z: 3 };
        assert_eq!(d.horizontal(), 3);
        assert!(d.within(3, 1));
        assert!(!d.within(2, 1));
        assert!(!d.within(3, 0));
    }

    #[test]
    fn test_access_falls_back_outside_box() {
        let world = world_with_marker();
        let column = world.column(ColumnPos::new(0, 0)).unwrap();
        let center = BlockPos::new(3, 20, 3);
        let section = column.section(1).unwrap();
        let access = BlockAccess::new(
            box_around(center),
            SectionSource::Immediate(section),
            column,
            &world,
        );

        assert_eq!(access.block_state_at(center), BlockState(5));
        // Same column, neighboring voxel outside the box.
        assert_eq!(access.block_state_at(center.down()), BlockState(6));
        // Different column goes through the store.
        assert_eq!(access.block_state(16, 20, 3), BlockState(7));
        // Below the world reads as air.
        assert_eq!(access.block_state(3, -1, 3), BlockState::AIR);
        // Unloaded column reads as air.
        assert_eq!(access.block_state(500, 20, 3), BlockState::AIR);
    }

    #[test]
    fn test_walk_visits_each_voxel_once_in_order() {
        let world = VoxelWorld::new(0, 1);
        let column = Column::new(0, 1);
        let sbox = SectionBox {
            column: ColumnPos::new(0, 0),
            section_y: 0,
            min: BlockPos::new(1, 2, 3),
            max: BlockPos::new(2, 3, 4),
        };
        let access = BlockAccess::new(sbox, SectionSource::Uniform(BlockState(2)), &column, &world);

        let mut seen = Vec::new();
        let flow = walk_section(&access, BlockPos::new(0, 0, 0), |_, pos, distance, state| {
            assert_eq!(state, BlockState(2));
            assert_eq!(distance.x, pos.x.unsigned_abs());
            seen.push(pos);
            ControlFlow::Continue(())
        });

        assert!(flow.is_continue());
        assert_eq!(seen.len(), 8);
        assert_eq!(seen[0], BlockPos::new(1, 2, 3));
        assert_eq!(seen[1], BlockPos::new(1, 3, 3));
        assert_eq!(seen[2], BlockPos::new(1, 2, 4));
        assert_eq!(seen[7], BlockPos::new(2, 3, 4));
    }

    #[test]
    fn test_walk_stops_on_break() {
        let world = VoxelWorld::new(0, 1);
        let column = Column::new(0, 1);
        let sbox = SectionBox {
            column: ColumnPos::new(0, 0),
            section_y: 0,
            min: BlockPos::new(0, 0, 0),
            max: BlockPos::new(15, 15, 15),
        };
        let access = BlockAccess::new(sbox, SectionSource::Uniform(BlockState::AIR), &column, &world);

        let mut count = 0;
        let flow = walk_section(&access, BlockPos::new(0, 0, 0), |_, _, _, _| {
            count += 1;
            if count == 10 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(flow.is_break());
        assert_eq!(count, 10);
    }
}
