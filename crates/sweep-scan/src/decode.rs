//! Per-section choice of how voxels are decoded during a walk.
//!
//! All strategies return the same states; they only differ in cost. Empty and
//! uniform sections never touch index storage. Packed sections either unpack
//! one index per voxel, or bulk-unpack into a scratch buffer first when the
//! walked sub-box is large enough to amortize it.

use sweep_voxel::{BlockState, SECTION_VOLUME, Section, SectionKind};

use crate::region::SectionBox;

/// How a section's voxels are read during a walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecodeStrategy {
    /// Empty or uniform section: one state for every voxel.
    Uniform,
    /// Bulk-unpack indices into a scratch buffer, then index it directly.
    PreDecode,
    /// Unpack a single index per voxel on demand.
    Immediate,
}

/// Picks the strategy for a section of `kind` whose walked sub-box holds `volume` voxels.
pub fn select_strategy(kind: SectionKind, volume: u32, threshold: u32) -> DecodeStrategy {
    match kind {
        SectionKind::Empty | SectionKind::Uniform => DecodeStrategy::Uniform,
        SectionKind::Packed if volume >= threshold => DecodeStrategy::PreDecode,
        SectionKind::Packed => DecodeStrategy::Immediate,
    }
}

/// Where in-box states come from for the section currently being walked.
#[derive(Clone, Copy, Debug)]
pub(crate) enum SectionSource<'s> {
    Uniform(BlockState),
    PreDecoded {
        palette: &'s [BlockState],
        indices: &'s [u32; SECTION_VOLUME],
    },
    Immediate(&'s Section),
}

impl<'s> SectionSource<'s> {
    /// Readies `section` for walking `sbox` with `strategy`.
    ///
    /// The pre-decode path fills `scratch`; with `partial` set only the index
    /// range spanned by `sbox` is unpacked.
    pub(crate) fn prepare(
        section: &'s Section,
        sbox: &SectionBox,
        strategy: DecodeStrategy,
        scratch: &'s mut [u32; SECTION_VOLUME],
        partial: bool,
    ) -> Self {
        match strategy {
            DecodeStrategy::Uniform => match section.uniform_state() {
                Some(state) => SectionSource::Uniform(state),
                // A packed section routed here still decodes correctly.
                None => SectionSource::Immediate(section),
            },
            DecodeStrategy::PreDecode => {
                if partial {
                    let (start, end) = sbox.index_range();
                    section.unpack_range(scratch, start, end);
                } else {
                    section.unpack_all(scratch);
                }
                SectionSource::PreDecoded {
                    palette: section.palette(),
                    indices: scratch,
                }
            }
            DecodeStrategy::Immediate => SectionSource::Immediate(section),
        }
    }

    /// State at an index-array position inside the prepared sub-box.
    #[inline]
    pub(crate) fn state(&self, index: usize) -> BlockState {
        match *self {
            SectionSource::Uniform(state) => state,
            SectionSource::PreDecoded { palette, indices } => palette[indices[index] as usize],
            SectionSource::Immediate(section) => section.palette()[section.unpack_one(index) as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;
    use sweep_voxel::{BitPackedArray, BlockPos, ColumnPos, SECTION_SIZE, section_index};

    fn full_box() -> SectionBox {
        SectionBox {
            column: ColumnPos::new(0, 0),
            section_y: 0,
            min: BlockPos::new(0, 0, 0),
            max: BlockPos::new(15, 15, 15),
        }
    }

    fn noisy_section(seed: u64) -> Section {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let mut section = Section::empty();
        for y in 0..SECTION_SIZE {
            for z in 0..SECTION_SIZE {
                for x in 0..SECTION_SIZE {
                    section.set(x, y, z, BlockState(rng.gen_range(0..40)));
                }
            }
        }
        section
    }

    #[test]
    fn test_uniform_kinds_skip_storage() {
        assert_eq!(
            select_strategy(SectionKind::Empty, 4096, 512),
            DecodeStrategy::Uniform
        );
        assert_eq!(
            select_strategy(SectionKind::Uniform, 1, 512),
            DecodeStrategy::Uniform
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(
            select_strategy(SectionKind::Packed, 512, 512),
            DecodeStrategy::PreDecode
        );
        assert_eq!(
            select_strategy(SectionKind::Packed, 511, 512),
            DecodeStrategy::Immediate
        );
    }

    #[test]
    fn test_strategies_agree_on_packed_section() {
        let section = noisy_section(5);
        let sbox = full_box();
        let mut scratch = [0u32; SECTION_VOLUME];

        let immediate: Vec<_> = {
            let source = SectionSource::prepare(
                &section,
                &sbox,
                DecodeStrategy::Immediate,
                &mut scratch,
                false,
            );
            (0..SECTION_VOLUME).map(|i| source.state(i)).collect()
        };
        let predecoded: Vec<_> = {
            let source = SectionSource::prepare(
                &section,
                &sbox,
                DecodeStrategy::PreDecode,
                &mut scratch,
                false,
            );
            (0..SECTION_VOLUME).map(|i| source.state(i)).collect()
        };
        let direct: Vec<_> = (0..SECTION_VOLUME).map(|i| section.state_at(i)).collect();

        assert_eq!(immediate, direct);
        assert_eq!(predecoded, direct);
    }

    #[test]
    fn test_partial_predecode_matches_inside_box() {
        let section = noisy_section(9);
        let sbox = SectionBox {
            column: ColumnPos::new(0, 0),
            section_y: 0,
            min: BlockPos::new(3, 4, 5),
            max: BlockPos::new(12, 9, 10),
        };
        let mut scratch = [u32::MAX; SECTION_VOLUME];
        let source =
            SectionSource::prepare(&section, &sbox, DecodeStrategy::PreDecode, &mut scratch, true);

        for y in 4..=9 {
            for z in 5..=10 {
                for x in 3..=12 {
                    assert_eq!(
                        source.state(section_index(x, y, z)),
                        section.get(x, y, z),
                        "({x}, {y}, {z})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_forced_packed_single_entry_matches_uniform() {
        let stone = BlockState(1);
        let uniform = Section::new(stone);
        let forced = Section::packed(vec![stone], BitPackedArray::new(2, SECTION_VOLUME)).unwrap();
        let sbox = full_box();
        let mut scratch = [0u32; SECTION_VOLUME];

        let expected = {
            let source =
                SectionSource::prepare(&uniform, &sbox, DecodeStrategy::Uniform, &mut scratch, true);
            (0..SECTION_VOLUME).map(|i| source.state(i)).collect::<Vec<_>>()
        };
        for strategy in [DecodeStrategy::PreDecode, DecodeStrategy::Immediate] {
            let source = SectionSource::prepare(&forced, &sbox, strategy, &mut scratch, true);
            let got: Vec<_> = (0..SECTION_VOLUME).map(|i| source.state(i)).collect();
            assert_eq!(got, expected, "{strategy:?}");
        }
        assert!(expected.iter().all(|&s| s == stone));
    }
}
