//! A vertical stack of sections at one horizontal grid cell.

use crate::section::{SECTION_SIZE, Section};
use crate::state::BlockState;

/// Ordered sections covering section coordinates `min_section .. min_section + len`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    sections: Vec<Section>,
    min_section: i32,
}

impl Column {
    /// Creates a column of `count` empty sections starting at section coordinate `min_section`.
    pub fn new(min_section: i32, count: usize) -> Self {
        Self {
            sections: vec![Section::empty(); count],
            min_section,
        }
    }

    /// Lowest section coordinate held by this column.
    pub fn min_section(&self) -> i32 {
        self.min_section
    }

    /// Number of sections in the column.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Converts a section coordinate to an index into the section list.
    ///
    /// Returns `None` if the coordinate lies outside the column.
    pub fn section_index(&self, section_y: i32) -> Option<usize> {
        let index = usize::try_from(section_y.checked_sub(self.min_section)?).ok()?;
        (index < self.sections.len()).then_some(index)
    }

    /// Returns the section at a section coordinate (`y >> 4`).
    pub fn section(&self, section_y: i32) -> Option<&Section> {
        self.section_index(section_y).map(|i| &self.sections[i])
    }

    /// Mutable access to the section at a section coordinate.
    pub fn section_mut(&mut self, section_y: i32) -> Option<&mut Section> {
        self.section_index(section_y)
            .map(move |i| &mut self.sections[i])
    }

    /// Replaces the section at a section coordinate. Returns `false` if out of range.
    pub fn set_section(&mut self, section_y: i32, section: Section) -> bool {
        match self.section_mut(section_y) {
            Some(slot) => {
                *slot = section;
                true
            }
            None => false,
        }
    }

    /// Iterates `(section_y, section)` pairs from bottom to top.
    pub fn sections(&self) -> impl Iterator<Item = (i32, &Section)> {
        let min = self.min_section;
        self.sections
            .iter()
            .enumerate()
            .map(move |(i, s)| (min + i as i32, s))
    }

    /// Returns the state at world coordinates; only the low four bits of `x` and `z` are used.
    ///
    /// Air is returned when `y` is outside the column.
    pub fn block_state(&self, x: i32, y: i32, z: i32) -> BlockState {
        match self.section(y >> 4) {
            Some(section) => section.get(Self::local(x), Self::local(y), Self::local(z)),
            None => BlockState::AIR,
        }
    }

    /// Sets the state at world coordinates. No-op with a warning if `y` is outside the column.
    pub fn set_block_state(&mut self, x: i32, y: i32, z: i32, state: BlockState) {
        match self.section_mut(y >> 4) {
            Some(section) => section.set(Self::local(x), Self::local(y), Self::local(z), state),
            None => tracing::warn!("Column::set_block_state outside column: y={}", y),
        }
    }

    fn local(coord: i32) -> usize {
        (coord & (SECTION_SIZE as i32 - 1)) as usize
    }
}
