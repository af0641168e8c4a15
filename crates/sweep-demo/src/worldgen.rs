//! Seeded terrain for the demo: layered columns, scattered ores, and a few
//! deliberately unloaded columns.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use sweep_config::DemoConfig;
use sweep_voxel::{
    BlockState, Column, ColumnPos, RegistryError, SECTION_SIZE, Section, SectionKind, StateDef,
    StateRegistry, VoxelStore, VoxelWorld,
};

/// Lowest section of every demo column (y = -64).
pub(crate) const MIN_SECTION: i32 = -4;
/// Sections per demo column (up to y = 319).
pub(crate) const SECTION_COUNT: usize = 24;

const SEA_LEVEL: i32 = 62;
const BASE_HEIGHT: i32 = 64;

/// Ids of the states the generator places.
pub(crate) struct DemoStates {
    pub(crate) bedrock: BlockState,
    pub(crate) stone: BlockState,
    pub(crate) dirt: BlockState,
    pub(crate) grass: BlockState,
    pub(crate) water: BlockState,
    pub(crate) coal_ore: BlockState,
    pub(crate) iron_ore: BlockState,
    pub(crate) diamond_ore: BlockState,
}

impl DemoStates {
    pub(crate) fn register(registry: &mut StateRegistry) -> Result<Self, RegistryError> {
        Ok(Self {
            bedrock: registry.register(StateDef::solid("bedrock"))?,
            stone: registry.register(StateDef::solid("stone"))?,
            dirt: registry.register(StateDef::solid("dirt"))?,
            grass: registry.register(StateDef::solid("grass"))?,
            water: registry.register(StateDef {
                name: "water".to_string(),
                solid: false,
            })?,
            coal_ore: registry.register(StateDef::solid("coal_ore"))?,
            iron_ore: registry.register(StateDef::solid("iron_ore"))?,
            diamond_ore: registry.register(StateDef::solid("diamond_ore"))?,
        })
    }

    pub(crate) fn is_ore(&self, state: BlockState) -> bool {
        state == self.coal_ore || state == self.iron_ore || state == self.diamond_ore
    }
}

/// Generates every column within `world_radius_columns` of the origin.
///
/// Roughly one column in ten is left unloaded so scans cross holes.
pub(crate) fn generate(config: &DemoConfig, states: &DemoStates) -> VoxelWorld {
    let mut world = VoxelWorld::new(MIN_SECTION, SECTION_COUNT);
    let r = config.world_radius_columns;

    for cx in -r..=r {
        for cz in -r..=r {
            let column_seed = config
                .seed
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .wrapping_add(((cx as u64) << 32) ^ (cz as u32 as u64));
            let mut rng = Xoshiro256StarStar::seed_from_u64(column_seed);
            if (cx, cz) != (0, 0) && rng.gen_ratio(1, 10) {
                continue;
            }
            let pos = ColumnPos::new(cx, cz);
            world.load_column(pos, generate_column(pos, &mut rng, states));
        }
    }

    let (packed, bytes) = storage_summary(&world);
    tracing::info!(
        "Generated {} columns ({} requested), {} packed sections in {} bytes of index storage",
        world.loaded_count(),
        (2 * r + 1) * (2 * r + 1),
        packed,
        bytes
    );
    world
}

/// Packed section count and total index-storage bytes across loaded columns.
pub(crate) fn storage_summary(world: &VoxelWorld) -> (usize, usize) {
    world
        .loaded_columns()
        .filter_map(|&pos| world.column(pos))
        .flat_map(|column| column.sections())
        .fold((0, 0), |(packed, bytes), (_, section)| {
            let packed = packed + usize::from(section.kind() == SectionKind::Packed);
            (packed, bytes + section.storage().storage_bytes())
        })
}

fn surface_height(x: i32, z: i32) -> i32 {
    let (fx, fz) = (x as f64 / 23.0, z as f64 / 31.0);
    BASE_HEIGHT + (6.0 * fx.sin() + 4.0 * fz.cos() + 2.0 * (fx + fz).sin()) as i32
}

fn generate_column(pos: ColumnPos, rng: &mut Xoshiro256StarStar, states: &DemoStates) -> Column {
    let mut column = Column::new(MIN_SECTION, SECTION_COUNT);
    let (x0, z0) = (pos.min_block_x(), pos.min_block_z());
    let size = SECTION_SIZE as i32;

    let mut heights = [[0i32; SECTION_SIZE]; SECTION_SIZE];
    for (lx, row) in heights.iter_mut().enumerate() {
        for (lz, h) in row.iter_mut().enumerate() {
            *h = surface_height(x0 + lx as i32, z0 + lz as i32);
        }
    }
    let lowest = heights.iter().flatten().copied().min().unwrap_or(BASE_HEIGHT);
    let top = heights
        .iter()
        .flatten()
        .copied()
        .max()
        .unwrap_or(BASE_HEIGHT)
        .max(SEA_LEVEL);

    let min_y = MIN_SECTION * size;
    for section_y in MIN_SECTION..MIN_SECTION + SECTION_COUNT as i32 {
        let (bottom, ceiling) = (section_y * size, section_y * size + size - 1);
        if bottom > top {
            break;
        }
        // Entirely below every surface voxel of the column.
        if bottom > min_y && ceiling < lowest - 4 {
            let mut section = Section::new(states.stone);
            sprinkle_ores(&mut section, bottom, rng, states);
            column.set_section(section_y, section);
            continue;
        }

        for lx in 0..SECTION_SIZE {
            for lz in 0..SECTION_SIZE {
                let height = heights[lx][lz];
                for y in bottom..=ceiling {
                    let state = if y == min_y {
                        states.bedrock
                    } else if y < height - 3 {
                        states.stone
                    } else if y < height {
                        states.dirt
                    } else if y == height {
                        if height < SEA_LEVEL { states.dirt } else { states.grass }
                    } else if y <= SEA_LEVEL {
                        states.water
                    } else {
                        continue;
                    };
                    column.set_block_state(x0 + lx as i32, y, z0 + lz as i32, state);
                }
            }
        }
        if let Some(section) = column.section_mut(section_y) {
            if bottom < lowest - 4 {
                sprinkle_ores(section, bottom, rng, states);
            }
            section.compact();
        }
    }

    column
}

fn sprinkle_ores(section: &mut Section, bottom: i32, rng: &mut Xoshiro256StarStar, states: &DemoStates) {
    let veins = rng.gen_range(0..6);
    for _ in 0..veins {
        let ore = match rng.gen_range(0..100) {
            0..=59 => states.coal_ore,
            60..=91 => states.iron_ore,
            _ if bottom < 16 => states.diamond_ore,
            _ => states.iron_ore,
        };
        let (x, y, z) = (
            rng.gen_range(0..SECTION_SIZE - 1),
            rng.gen_range(0..SECTION_SIZE - 1),
            rng.gen_range(0..SECTION_SIZE - 1),
        );
        for (dx, dy, dz) in [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)] {
            if section.get(x + dx, y + dy, z + dz) == states.stone {
                section.set(x + dx, y + dy, z + dz, ore);
            }
        }
    }
}
