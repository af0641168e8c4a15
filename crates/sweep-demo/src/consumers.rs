//! Independent systems that share one scanner walk per step.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use sweep_config::DemoConfig;
use sweep_scan::{BlockScanner, Dispatch, ScanError};
use sweep_voxel::{BlockPos, BlockState, StateRegistry};
use tracing::{debug, info};

use crate::worldgen::DemoStates;

/// Results the demo consumers write into during a step.
#[derive(Default)]
pub(crate) struct Sinks {
    /// Ore state → count within the census radius.
    pub(crate) ore_census: RefCell<BTreeMap<BlockState, u32>>,
    /// First diamond ore met by the prospector.
    pub(crate) diamond: Cell<Option<BlockPos>>,
    /// Solid voxels with air directly beneath.
    pub(crate) overhangs: Cell<u32>,
    /// Steps whose deferred summary has run.
    pub(crate) summaries: Cell<u32>,
}

impl Sinks {
    /// Clears per-step results.
    pub(crate) fn reset(&self) {
        self.ore_census.borrow_mut().clear();
        self.diamond.set(None);
        self.overhangs.set(0);
    }
}

/// Registers the demo consumers for the next step.
///
/// * ore census: counts every ore within the configured radius
/// * prospector: stops at the first diamond within half that radius
/// * overhang finder: small radius, inspects the voxel below each solid one
pub(crate) fn register_all<'a>(
    scanner: &mut BlockScanner<'a>,
    registry: &'a StateRegistry,
    states: &'a DemoStates,
    sinks: &'a Sinks,
    demo: &DemoConfig,
) -> Result<(), ScanError> {
    scanner.register(true, demo.horizontal_radius, demo.vertical_radius, move |visit| {
        let state = visit.state();
        if states.is_ore(state) {
            *sinks.ore_census.borrow_mut().entry(state).or_insert(0) += 1;
        }
        Dispatch::Continue
    })?;

    scanner.register(
        true,
        demo.horizontal_radius / 2,
        demo.vertical_radius,
        move |visit| {
            if visit.state() != states.diamond_ore {
                return Dispatch::Continue;
            }
            let pos = visit.pos();
            sinks.diamond.set(Some(pos));
            debug!("Prospector found diamond at ({}, {}, {})", pos.x, pos.y, pos.z);
            Dispatch::StopThisRequest
        },
    )?;

    let mut queued_summary = false;
    scanner.register(true, 8, 4, move |visit| {
        if !registry.is_solid(visit.state()) {
            return Dispatch::Continue;
        }
        let pos = visit.pos();
        if visit.block_state(pos.x, pos.y - 1, pos.z).is_air() {
            sinks.overhangs.set(sinks.overhangs.get() + 1);
            if !queued_summary {
                queued_summary = true;
                visit.after(move || {
                    info!("Overhang finder: {} solid voxels over air", sinks.overhangs.get());
                });
            }
        }
        Dispatch::Continue
    })?;

    scanner.after(move || sinks.summaries.set(sinks.summaries.get() + 1));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_voxel::VoxelWorld;

    #[test]
    fn test_consumers_share_one_step() {
        let mut registry = StateRegistry::new();
        let states = DemoStates::register(&mut registry).unwrap();
        let sinks = Sinks::default();

        let mut world = VoxelWorld::new(0, 8);
        world.set_block_state(BlockPos::new(2, 40, 2), states.diamond_ore);
        world.set_block_state(BlockPos::new(-3, 40, 1), states.coal_ore);
        world.set_block_state(BlockPos::new(1, 43, 1), states.stone);
        world.set_block_state(BlockPos::new(-1, 42, -1), states.water);

        let demo = DemoConfig {
            horizontal_radius: 8,
            vertical_radius: 4,
            ..DemoConfig::default()
        };
        let mut scanner = BlockScanner::new();
        register_all(&mut scanner, &registry, &states, &sinks, &demo).unwrap();
        let report = scanner.begin_step(&world, BlockPos::new(0, 40, 0));

        assert_eq!(report.requests, 3);
        assert_eq!(sinks.diamond.get(), Some(BlockPos::new(2, 40, 2)));
        assert_eq!(sinks.ore_census.borrow().get(&states.coal_ore), Some(&1));
        assert_eq!(sinks.ore_census.borrow().get(&states.diamond_ore), Some(&1));
        // Diamond, coal, and the floating stone sit over air; the water does not count.
        assert_eq!(sinks.overhangs.get(), 3);
        assert_eq!(sinks.summaries.get(), 1);

        sinks.reset();
        assert!(sinks.ore_census.borrow().is_empty());
        assert_eq!(sinks.diamond.get(), None);
    }
}
