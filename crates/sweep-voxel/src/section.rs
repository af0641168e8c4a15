//! Palette-compressed storage for 16×16×16 voxel sections.
//!
//! Each section keeps a palette of distinct [`BlockState`] values and a
//! bit-packed index array. The bit width scales with the number of palette
//! entries; a single-entry palette needs no index storage at all, which is
//! how empty and uniform sections stay free to read.

use thiserror::Error;

use crate::bit_packed::BitPackedArray;
use crate::state::BlockState;

/// Side length of a section in voxels.
pub const SECTION_SIZE: usize = 16;

/// Bits per axis in a section index (`log2(SECTION_SIZE)`).
pub const EDGE_BITS: u32 = 4;

/// Total number of voxels in a section (16³).
pub const SECTION_VOLUME: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

/// Interleaves local coordinates into an index-array position: `(y << 4 | z) << 4 | x`.
///
/// Each coordinate must be in `0..16`.
#[inline]
pub fn section_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(x < SECTION_SIZE && y < SECTION_SIZE && z < SECTION_SIZE);
    (((y << EDGE_BITS) | z) << EDGE_BITS) | x
}

/// How a section's voxels are represented, which decides how cheap it is to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Every voxel is air.
    Empty,
    /// Every voxel is the same non-air state.
    Uniform,
    /// Per-voxel indices into a palette.
    Packed,
}

/// Errors returned when assembling a section from raw parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionError {
    #[error("palette must contain at least one state")]
    EmptyPalette,
    #[error("index storage holds {0} entries, expected 4096")]
    WrongLength(usize),
    #[error("packed sections need a non-zero index width")]
    ZeroWidth,
    #[error("palette of {palette_len} states does not fit in {bits}-bit indices")]
    PaletteTooLarge { palette_len: usize, bits: u8 },
    #[error("index {value} at position {position} is outside the palette of {palette_len}")]
    IndexOutOfPalette {
        position: usize,
        value: u32,
        palette_len: usize,
    },
}

/// Palette-compressed voxel storage for a 16×16×16 section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// Palette mapping local indices to global [`BlockState`] values.
    palette: Vec<BlockState>,
    /// Bit-packed voxel indices into the palette.
    storage: BitPackedArray,
}

impl Section {
    /// Creates a new section filled entirely with the given state.
    ///
    /// The resulting section is uniform (bit width 0, zero index storage).
    pub fn new(fill: BlockState) -> Self {
        Self {
            palette: vec![fill],
            storage: BitPackedArray::new(0, SECTION_VOLUME),
        }
    }

    /// Creates a new section filled with air.
    pub fn empty() -> Self {
        Self::new(BlockState::AIR)
    }

    /// Assembles a packed section from a palette and index storage.
    ///
    /// A single-entry palette is accepted, which yields a section that is
    /// logically uniform but must be decoded through its index array.
    ///
    /// # Errors
    ///
    /// Fails if the palette is empty, the storage is not 4096 entries wide,
    /// the width is zero or too narrow for the palette, or any stored index
    /// points past the end of the palette.
    pub fn packed(
        palette: Vec<BlockState>,
        storage: BitPackedArray,
    ) -> Result<Self, SectionError> {
        if palette.is_empty() {
            return Err(SectionError::EmptyPalette);
        }
        if storage.len() != SECTION_VOLUME {
            return Err(SectionError::WrongLength(storage.len()));
        }
        let bits = storage.bits();
        if bits == 0 {
            return Err(SectionError::ZeroWidth);
        }
        if palette.len() > 1usize << bits {
            return Err(SectionError::PaletteTooLarge {
                palette_len: palette.len(),
                bits,
            });
        }

        let mut indices = vec![0u32; SECTION_VOLUME];
        storage.unpack_all(&mut indices);
        if let Some((position, &value)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &value)| value as usize >= palette.len())
        {
            return Err(SectionError::IndexOutOfPalette {
                position,
                value,
                palette_len: palette.len(),
            });
        }

        Ok(Self { palette, storage })
    }

    /// Returns how this section is represented.
    pub fn kind(&self) -> SectionKind {
        if self.storage.bits() > 0 {
            SectionKind::Packed
        } else if self.palette[0].is_air() {
            SectionKind::Empty
        } else {
            SectionKind::Uniform
        }
    }

    /// Returns the single state of an empty or uniform section.
    pub fn uniform_state(&self) -> Option<BlockState> {
        (self.storage.bits() == 0).then_some(self.palette[0])
    }

    /// Returns the state at local position `(x, y, z)`.
    ///
    /// Each coordinate must be in `0..16`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockState {
        self.state_at(section_index(x, y, z))
    }

    /// Returns the state stored at an index-array position.
    #[inline]
    pub fn state_at(&self, index: usize) -> BlockState {
        if self.storage.bits() == 0 {
            return self.palette[0];
        }
        self.palette[self.storage.get(index) as usize]
    }

    /// Unpacks the palette index stored at one index-array position.
    #[inline]
    pub fn unpack_one(&self, index: usize) -> u32 {
        self.storage.get(index)
    }

    /// Unpacks the whole index array.
    pub fn unpack_all(&self, out: &mut [u32; SECTION_VOLUME]) {
        self.storage.unpack_all(out);
    }

    /// Unpacks at least the index-array positions `start..=end`.
    ///
    /// See [`BitPackedArray::unpack_range`].
    pub fn unpack_range(&self, out: &mut [u32; SECTION_VOLUME], start: usize, end: usize) {
        self.storage.unpack_range(out, start, end);
    }

    /// Sets the state at local position `(x, y, z)`.
    ///
    /// If the new state is not in the palette, it is added. If the palette
    /// grows past the current bit-width capacity, the storage is widened.
    pub fn set(&mut self, x: usize, y: usize, z: usize, state: BlockState) {
        let palette_idx = self.palette_index_or_insert(state);
        if self.storage.bits() == 0 {
            // Uniform and setting to the same state.
            return;
        }
        self.storage.set(section_index(x, y, z), palette_idx as u32);
    }

    /// Resets the section to a uniform fill of the given state.
    pub fn fill(&mut self, state: BlockState) {
        *self = Self::new(state);
    }

    /// Returns the number of entries in the palette.
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    /// Returns the current bit width per voxel index.
    pub fn bit_width(&self) -> u8 {
        self.storage.bits()
    }

    /// Returns a reference to the palette.
    pub fn palette(&self) -> &[BlockState] {
        &self.palette
    }

    /// Returns a reference to the underlying bit-packed storage.
    pub fn storage(&self) -> &BitPackedArray {
        &self.storage
    }

    /// Compacts the palette by removing unused entries and potentially
    /// narrowing the bit width.
    ///
    /// Scans all voxels; call sparingly (e.g. after a batch of edits).
    pub fn compact(&mut self) {
        if self.storage.bits() == 0 {
            return;
        }

        let mut indices = vec![0u32; SECTION_VOLUME];
        self.storage.unpack_all(&mut indices);

        let mut used = vec![false; self.palette.len()];
        for &index in &indices {
            used[index as usize] = true;
        }
        let used_count = used.iter().filter(|&&u| u).count();

        if used_count <= 1 {
            let single = used
                .iter()
                .position(|&u| u)
                .map_or(self.palette[0], |i| self.palette[i]);
            self.fill(single);
            return;
        }

        let mut old_to_new = vec![0u32; self.palette.len()];
        let mut new_palette = Vec::with_capacity(used_count);
        for (old_idx, &is_used) in used.iter().enumerate() {
            if is_used {
                old_to_new[old_idx] = new_palette.len() as u32;
                new_palette.push(self.palette[old_idx]);
            }
        }

        let mut new_storage =
            BitPackedArray::new(Self::bits_for_palette_size(new_palette.len()), SECTION_VOLUME);
        for (i, &old_idx) in indices.iter().enumerate() {
            new_storage.set(i, old_to_new[old_idx as usize]);
        }

        self.palette = new_palette;
        self.storage = new_storage;
    }

    /// Returns the index width required for a palette of the given size.
    pub fn bits_for_palette_size(size: usize) -> u8 {
        match size {
            0 | 1 => 0,
            2..=4 => 2,
            5..=16 => 4,
            17..=256 => 8,
            _ => 16,
        }
    }

    /// Finds or inserts a state in the palette, widening storage if needed.
    fn palette_index_or_insert(&mut self, state: BlockState) -> usize {
        if let Some(idx) = self.palette.iter().position(|&s| s == state) {
            return idx;
        }

        let new_bits = Self::bits_for_palette_size(self.palette.len() + 1);
        if new_bits > self.storage.bits() {
            self.widen_storage(new_bits);
        }

        self.palette.push(state);
        self.palette.len() - 1
    }

    /// Rebuilds the storage array at a wider bit width, preserving existing data.
    fn widen_storage(&mut self, new_bits: u8) {
        let mut new_storage = BitPackedArray::new(new_bits, SECTION_VOLUME);
        if self.storage.bits() > 0 {
            let mut indices = vec![0u32; SECTION_VOLUME];
            self.storage.unpack_all(&mut indices);
            for (i, &index) in indices.iter().enumerate() {
                new_storage.set(i, index);
            }
        }
        // A zero-width source means every index is 0, which the new storage already holds.
        self.storage = new_storage;
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
