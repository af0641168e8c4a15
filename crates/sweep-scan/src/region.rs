//! Merges pending request radii into one traversal plan.
//!
//! The merged box is the observer expanded by the largest horizontal and
//! vertical radius of any pending request, clamped to the store's vertical
//! range. It is then cut along column and section boundaries so every inner
//! loop touches exactly one column and one section.

use sweep_voxel::{BlockPos, ColumnPos, SECTION_SIZE, section_index};

const EDGE: i32 = SECTION_SIZE as i32 - 1;

/// How the merged box lies relative to column and section boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionShape {
    /// One column, one section.
    SingleSection,
    /// One column, several sections stacked vertically.
    SingleColumn,
    /// Several columns.
    MultiColumn,
}

/// The part of one section covered by the merged box. Bounds are inclusive world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionBox {
    pub column: ColumnPos,
    pub section_y: i32,
    pub min: BlockPos,
    pub max: BlockPos,
}

impl SectionBox {
    /// Number of voxels in the box.
    pub fn volume(&self) -> u32 {
        let dx = self.max.x.abs_diff(self.min.x) + 1;
        let dy = self.max.y.abs_diff(self.min.y) + 1;
        let dz = self.max.z.abs_diff(self.min.z) + 1;
        dx * dy * dz
    }

    /// Returns `true` if the world position lies inside the box.
    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= self.min.x
            && x <= self.max.x
            && y >= self.min.y
            && y <= self.max.y
            && z >= self.min.z
            && z <= self.max.z
    }

    /// First and last index-array positions the box touches.
    pub fn index_range(&self) -> (usize, usize) {
        let local = |pos: BlockPos| {
            section_index(
                (pos.x & EDGE) as usize,
                (pos.y & EDGE) as usize,
                (pos.z & EDGE) as usize,
            )
        };
        (local(self.min), local(self.max))
    }
}

/// The part of one column covered by the merged box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSlice {
    pub pos: ColumnPos,
    pub min: BlockPos,
    pub max: BlockPos,
}

impl ColumnSlice {
    /// Splits the slice into per-section boxes, bottom to top.
    pub fn sections(&self) -> impl Iterator<Item = SectionBox> + use<> {
        let (min, max, column) = (self.min, self.max, self.pos);
        ((min.y >> 4)..=(max.y >> 4)).map(move |section_y| {
            let edge = section_y << 4;
            SectionBox {
                column,
                section_y,
                min: BlockPos::new(min.x, min.y.max(edge), min.z),
                max: BlockPos::new(max.x, max.y.min(edge + EDGE), max.z),
            }
        })
    }
}

/// One step's merged scan region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraversalPlan {
    min: BlockPos,
    max: BlockPos,
    shape: RegionShape,
}

impl TraversalPlan {
    /// Builds the plan for radii around `observer`, clamped to `min_y..=max_y`.
    ///
    /// Returns `None` when nothing of the box lies inside the vertical range.
    pub fn compute(
        observer: BlockPos,
        horizontal_radius: u32,
        vertical_radius: u32,
        min_y: i32,
        max_y: i32,
    ) -> Option<Self> {
        let min = BlockPos::new(
            observer.x.saturating_sub_unsigned(horizontal_radius),
            observer.y.saturating_sub_unsigned(vertical_radius).max(min_y),
            observer.z.saturating_sub_unsigned(horizontal_radius),
        );
        let max = BlockPos::new(
            observer.x.saturating_add_unsigned(horizontal_radius),
            observer.y.saturating_add_unsigned(vertical_radius).min(max_y),
            observer.z.saturating_add_unsigned(horizontal_radius),
        );
        if min.y > max.y {
            return None;
        }

        let single_column = min.column() == max.column();
        let shape = if !single_column {
            RegionShape::MultiColumn
        } else if min.section_y() == max.section_y() {
            RegionShape::SingleSection
        } else {
            RegionShape::SingleColumn
        };

        Some(Self { min, max, shape })
    }

    /// Lowest corner of the merged box.
    pub fn min(&self) -> BlockPos {
        self.min
    }

    /// Highest corner of the merged box.
    pub fn max(&self) -> BlockPos {
        self.max
    }

    /// How the box lies on the column/section grid.
    pub fn shape(&self) -> RegionShape {
        self.shape
    }

    /// Total voxels in the merged box.
    pub fn volume(&self) -> u64 {
        let dx = u64::from(self.max.x.abs_diff(self.min.x)) + 1;
        let dy = u64::from(self.max.y.abs_diff(self.min.y)) + 1;
        let dz = u64::from(self.max.z.abs_diff(self.min.z)) + 1;
        dx * dy * dz
    }

    /// Clips the box to each column it overlaps, X-major then Z.
    pub fn columns(&self) -> impl Iterator<Item = ColumnSlice> + use<> {
        let (min, max) = (self.min, self.max);
        let (min_column, max_column) = (min.column(), max.column());
        (min_column.x..=max_column.x).flat_map(move |cx| {
            (min_column.z..=max_column.z).map(move |cz| {
                let pos = ColumnPos::new(cx, cz);
                let (edge_x, edge_z) = (pos.min_block_x(), pos.min_block_z());
                ColumnSlice {
                    pos,
                    min: BlockPos::new(min.x.max(edge_x), min.y, min.z.max(edge_z)),
                    max: BlockPos::new(max.x.min(edge_x + EDGE), max.y, max.z.min(edge_z + EDGE)),
                }
            })
        })
    }

    /// Every section box of the plan, in walk order.
    pub fn section_boxes(&self) -> impl Iterator<Item = SectionBox> + use<> {
        self.columns().flat_map(|slice| slice.sections())
    }
}
