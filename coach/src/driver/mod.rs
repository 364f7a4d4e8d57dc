//! Drivers — where observations come from and what paces them.
//!
//! Provides:
//! - `script`: replay of recorded observations from an s-expression file
//! - `demo`: synthetic two-hand rubbing session with scripted occlusion
//! - `scheduler`: calloop tick/render timers wiring a source, the coach,
//!   a speech sink, and the snapshot publisher

pub mod demo;
pub mod scheduler;
pub mod script;

pub use demo::DemoSource;
pub use scheduler::{Pipeline, RunSummary, SchedulerConfig};
pub use script::ScriptSource;

use crate::hand::Observation;

/// A producer of one observation per tick.
pub trait ObservationSource {
    /// Observation for the tick at `now_ms` (milliseconds since the run
    /// started), or `None` once the source is exhausted.  Sources with
    /// their own timeline may stamp observations with their own times.
    fn next_observation(&mut self, now_ms: u64) -> Option<Observation>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
