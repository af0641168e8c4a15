//! Palette-compressed voxel section storage and the read contract consumed by the scanner.
//!
//! A world is a map of [`Column`]s, each an ordered stack of 16³ [`Section`]s.
//! Sections are stored as a palette of [`BlockState`]s plus a bit-packed index
//! array, with zero-cost representations for empty and uniform sections.

pub mod bit_packed;
pub mod column;
pub mod pos;
pub mod section;
pub mod state;
pub mod store;
pub mod world;

pub use bit_packed::BitPackedArray;
pub use column::Column;
pub use pos::{BlockPos, ColumnPos};
pub use section::{
    EDGE_BITS, SECTION_SIZE, SECTION_VOLUME, Section, SectionError, SectionKind, section_index,
};
pub use state::{BlockState, RegistryError, StateDef, StateRegistry};
pub use store::VoxelStore;
pub use world::VoxelWorld;
