//! World-space block positions and column addresses.

/// Integer world coordinate of a single voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    /// Creates a new block position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the column containing this position.
    pub fn column(self) -> ColumnPos {
        ColumnPos::containing(self.x, self.z)
    }

    /// Returns the vertical section coordinate (`y >> 4`).
    pub fn section_y(self) -> i32 {
        self.y >> 4
    }

    /// Returns the position offset by `(dx, dy, dz)`.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Position directly below.
    pub fn down(self) -> Self {
        self.offset(0, -1, 0)
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// Identifies a column by its horizontal grid cell (block coordinates `>> 4`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnPos {
    pub x: i32,
    pub z: i32,
}

impl ColumnPos {
    /// Creates a new column address.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the column containing world block coordinates `(x, z)`.
    pub fn containing(x: i32, z: i32) -> Self {
        Self::new(x >> 4, z >> 4)
    }

    /// Lowest world X coordinate covered by this column.
    pub fn min_block_x(self) -> i32 {
        self.x << 4
    }

    /// Lowest world Z coordinate covered by this column.
    pub fn min_block_z(self) -> i32 {
        self.z << 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_coordinates_floor_to_column() {
        assert_eq!(ColumnPos::containing(-1, -16), ColumnPos::new(-1, -1));
        assert_eq!(ColumnPos::containing(-17, 15), ColumnPos::new(-2, 0));
        assert_eq!(BlockPos::new(0, -1, 0).section_y(), -1);
    }

    #[test]
    fn test_column_footprint() {
        let column = ColumnPos::new(-2, 3);
        assert_eq!(column.min_block_x(), -32);
        assert_eq!(column.min_block_z(), 48);
        assert_eq!(BlockPos::new(-32, 0, 63).column(), column);
    }
}
