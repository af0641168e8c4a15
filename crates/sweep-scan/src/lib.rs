//! Merged per-step radius scanning over a palette-compressed voxel world.
//!
//! Consumers [`register`](BlockScanner::register) radius requests during a
//! step. At step begin the [`BlockScanner`] merges every pending radius into
//! one bounding box, walks the affected sections once, and hands each decoded
//! voxel to every request whose radius covers it.

pub mod decode;
pub mod error;
pub mod region;
pub mod request;
pub mod scanner;
pub mod walker;

pub use decode::{DecodeStrategy, select_strategy};
pub use error::{Axis, ScanError};
pub use region::{ColumnSlice, RegionShape, SectionBox, TraversalPlan};
pub use request::RequestId;
pub use scanner::{BlockScanner, Dispatch, StepReport, Visit};
pub use walker::{BlockAccess, Distance};
