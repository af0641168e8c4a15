//! Per-step request collection, the single merged walk, and dispatch.
//!
//! ```text
//! register / after ... register / after    (any order, any count)
//!        │
//! begin_step(store, observer)
//!        ├─ plan merged box from the largest radii
//!        ├─ walk each column → section → voxel once
//!        │     └─ dispatch voxel to every active request covering it
//!        ├─ run deferred callbacks in queue order
//!        └─ free requests, clear queues, reset radii
//! ```

use std::ops::ControlFlow;

use sweep_config::ScanConfig;
use sweep_voxel::{BlockPos, BlockState, SECTION_VOLUME, VoxelStore};

use crate::decode::{DecodeStrategy, SectionSource, select_strategy};
use crate::error::{Axis, ScanError};
use crate::region::{RegionShape, TraversalPlan};
use crate::request::{Request, RequestArena, RequestId};
use crate::walker::{BlockAccess, Distance, walk_section};

type Deferred<'a> = Box<dyn FnOnce() + 'a>;

/// What a callback wants after seeing a voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Keep receiving voxels.
    Continue,
    /// Receive nothing more this step.
    StopThisRequest,
}

/// A decoded voxel handed to a request's callback.
pub struct Visit<'v, 'a> {
    pos: BlockPos,
    state: BlockState,
    distance: Distance,
    blocks: &'v BlockAccess<'v>,
    deferred: &'v mut Vec<Deferred<'a>>,
    disabled: bool,
}

impl<'v, 'a> Visit<'v, 'a> {
    /// World position of the voxel.
    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    /// Decoded state of the voxel.
    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Per-axis distance from the observer.
    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// Neighbor lookups around the voxel.
    pub fn blocks(&self) -> &BlockAccess<'v> {
        self.blocks
    }

    /// Shorthand for `self.blocks().block_state(x, y, z)`.
    pub fn block_state(&self, x: i32, y: i32, z: i32) -> BlockState {
        self.blocks.block_state(x, y, z)
    }

    /// Stops this request after the current voxel, same as returning
    /// [`Dispatch::StopThisRequest`].
    pub fn disable_current(&mut self) {
        self.disabled = true;
    }

    /// Queues `callback` to run once after the walk finishes.
    pub fn after(&mut self, callback: impl FnOnce() + 'a) {
        self.deferred.push(Box::new(callback));
    }
}

/// Counters describing one step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Requests pending when the step began.
    pub requests: usize,
    /// Shape of the merged region, `None` if nothing was walked.
    pub shape: Option<RegionShape>,
    /// Columns in the plan that were not loaded.
    pub missing_columns: u32,
    /// Sections walked, by decode strategy.
    pub uniform_sections: u32,
    pub predecoded_sections: u32,
    pub immediate_sections: u32,
    /// Voxels decoded.
    pub voxels: u64,
    /// Callback invocations.
    pub dispatched: u64,
    /// Requests that cancelled themselves.
    pub requests_stopped: u32,
    /// The walk ended early because every request cancelled.
    pub short_circuited: bool,
    /// Deferred callbacks run after the walk.
    pub deferred_run: usize,
}

impl StepReport {
    /// Total sections walked.
    pub fn sections(&self) -> u32 {
        self.uniform_sections + self.predecoded_sections + self.immediate_sections
    }

    fn count_section(&mut self, strategy: DecodeStrategy) {
        match strategy {
            DecodeStrategy::Uniform => self.uniform_sections += 1,
            DecodeStrategy::PreDecode => self.predecoded_sections += 1,
            DecodeStrategy::Immediate => self.immediate_sections += 1,
        }
    }
}

/// Collects radius requests during a step and resolves them in one walk.
///
/// `'a` bounds what callbacks may borrow. The scanner is meant to live for
/// many steps: request slots, queues, and the decode scratch buffer are all
/// reused.
pub struct BlockScanner<'a> {
    config: ScanConfig,
    requests: RequestArena<'a>,
    /// Live requests in registration order.
    active: Vec<RequestId>,
    deferred: Vec<Deferred<'a>>,
    horizontal_radius: u32,
    vertical_radius: u32,
    scratch: Box<[u32; SECTION_VOLUME]>,
}

impl<'a> BlockScanner<'a> {
    /// Creates a scanner with default settings.
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Creates a scanner with the given settings.
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            config,
            requests: RequestArena::new(),
            active: Vec::new(),
            deferred: Vec::new(),
            horizontal_radius: 0,
            vertical_radius: 0,
            scratch: Box::new([0; SECTION_VOLUME]),
        }
    }

    /// Current settings.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Replaces the settings. Takes effect for the next registration and step.
    pub fn set_config(&mut self, config: ScanConfig) {
        self.config = config;
    }

    /// Registers a request for every voxel within the given radii of the
    /// next step's observer.
    ///
    /// A voxel at offset `(dx, dy, dz)` matches when `|dy| <= vertical_radius`
    /// and `max(|dx|, |dz|) <= horizontal_radius`.
    ///
    /// # Errors
    ///
    /// [`ScanError::DetachedRequest`] if `observer_relative` is false, and
    /// [`ScanError::RadiusTooLarge`] if either radius exceeds the configured
    /// maximum.
    pub fn register<F>(
        &mut self,
        observer_relative: bool,
        horizontal_radius: u32,
        vertical_radius: u32,
        callback: F,
    ) -> Result<RequestId, ScanError>
    where
        F: for<'v> FnMut(&mut Visit<'v, 'a>) -> Dispatch + 'a,
    {
        if !observer_relative {
            return Err(ScanError::DetachedRequest);
        }
        let max = self.config.max_radius;
        if horizontal_radius > max {
            return Err(ScanError::RadiusTooLarge {
                axis: Axis::Horizontal,
                radius: horizontal_radius,
                max,
            });
        }
        if vertical_radius > max {
            return Err(ScanError::RadiusTooLarge {
                axis: Axis::Vertical,
                radius: vertical_radius,
                max,
            });
        }

        self.horizontal_radius = self.horizontal_radius.max(horizontal_radius);
        self.vertical_radius = self.vertical_radius.max(vertical_radius);

        let id = self.requests.insert(Request {
            horizontal_radius,
            vertical_radius,
            callback: Box::new(callback),
        });
        self.active.push(id);
        Ok(id)
    }

    /// Withdraws a pending request before the step runs.
    ///
    /// Returns `false` if the handle is stale (already cancelled, or from an
    /// earlier step).
    pub fn cancel(&mut self, id: RequestId) -> bool {
        if self.requests.remove(id).is_none() {
            return false;
        }
        self.active.retain(|&other| other != id);

        let requests = &self.requests;
        let (h, v) = self
            .active
            .iter()
            .filter_map(|&other| requests.get(other))
            .fold((0, 0), |(h, v), r| {
                (h.max(r.horizontal_radius), v.max(r.vertical_radius))
            });
        self.horizontal_radius = h;
        self.vertical_radius = v;
        true
    }

    /// Queues `callback` to run once after the next walk.
    pub fn after(&mut self, callback: impl FnOnce() + 'a) {
        self.deferred.push(Box::new(callback));
    }

    /// Number of requests waiting for the next step.
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Number of deferred callbacks waiting for the next step.
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Largest pending `(horizontal, vertical)` radii.
    pub fn merged_radius(&self) -> (u32, u32) {
        (self.horizontal_radius, self.vertical_radius)
    }

    /// Request slots allocated so far.
    pub fn pool_capacity(&self) -> usize {
        self.requests.capacity()
    }

    /// Resolves every pending request around `observer`, runs deferred
    /// callbacks, and resets for the next step.
    pub fn begin_step(&mut self, store: &dyn VoxelStore, observer: BlockPos) -> StepReport {
        let mut report = StepReport {
            requests: self.active.len(),
            ..StepReport::default()
        };

        if !self.active.is_empty()
            && let Some(plan) = TraversalPlan::compute(
                observer,
                self.horizontal_radius,
                self.vertical_radius,
                store.min_y(),
                store.max_y(),
            )
        {
            report.shape = Some(plan.shape());
            self.walk(store, observer, &plan, &mut report);
        }

        report.deferred_run = self.deferred.len();
        for callback in self.deferred.drain(..) {
            callback();
        }

        self.requests.clear();
        self.active.clear();
        self.horizontal_radius = 0;
        self.vertical_radius = 0;

        tracing::debug!(
            requests = report.requests,
            sections = report.sections(),
            voxels = report.voxels,
            dispatched = report.dispatched,
            stopped = report.requests_stopped,
            short_circuited = report.short_circuited,
            "scan step complete"
        );
        report
    }

    fn walk(
        &mut self,
        store: &dyn VoxelStore,
        observer: BlockPos,
        plan: &TraversalPlan,
        report: &mut StepReport,
    ) {
        let Self {
            config,
            requests,
            active,
            deferred,
            scratch,
            ..
        } = self;

        for slice in plan.columns() {
            let Some(column) = store.column(slice.pos) else {
                report.missing_columns += 1;
                continue;
            };

            for sbox in slice.sections() {
                let Some(section) = column.section(sbox.section_y) else {
                    continue;
                };
                let strategy =
                    select_strategy(section.kind(), sbox.volume(), config.predecode_threshold);
                report.count_section(strategy);
                tracing::trace!(
                    column_x = sbox.column.x,
                    column_z = sbox.column.z,
                    section_y = sbox.section_y,
                    volume = sbox.volume(),
                    ?strategy,
                    "walking section"
                );

                let source = SectionSource::prepare(
                    section,
                    &sbox,
                    strategy,
                    &mut **scratch,
                    config.partial_unpack,
                );
                let access = BlockAccess::new(sbox, source, column, store);

                let flow = walk_section(&access, observer, |access, pos, distance, state| {
                    dispatch(requests, active, deferred, access, pos, distance, state, report)
                });
                if flow.is_break() {
                    report.short_circuited = true;
                    return;
                }
            }
        }
    }
}

impl Default for BlockScanner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Offers one voxel to every active request, in registration order.
///
/// Breaks once the last active request has cancelled itself.
#[allow(clippy::too_many_arguments)]
fn dispatch<'a>(
    requests: &mut RequestArena<'a>,
    active: &mut Vec<RequestId>,
    deferred: &mut Vec<Deferred<'a>>,
    access: &BlockAccess<'_>,
    pos: BlockPos,
    distance: Distance,
    state: BlockState,
    report: &mut StepReport,
) -> ControlFlow<()> {
    report.voxels += 1;

    let mut i = 0;
    while i < active.len() {
        let id = active[i];
        let Some(request) = requests.get_mut(id) else {
            active.remove(i);
            continue;
        };
        if !distance.within(request.horizontal_radius, request.vertical_radius) {
            i += 1;
            continue;
        }

        let mut visit = Visit {
            pos,
            state,
            distance,
            blocks: access,
            deferred: &mut *deferred,
            disabled: false,
        };
        let verdict = (request.callback)(&mut visit);
        report.dispatched += 1;

        if verdict == Dispatch::StopThisRequest || visit.disabled {
            active.remove(i);
            requests.remove(id);
            report.requests_stopped += 1;
            if active.is_empty() {
                return ControlFlow::Break(());
            }
        } else {
            i += 1;
        }
    }

    ControlFlow::Continue(())
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
