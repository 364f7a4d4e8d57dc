//! Hand-wash coach — streaming technique classifier and coaching session.
//!
//! Provides:
//! - `hand`: landmark frames, observations, presence validation, overlay
//! - `criteria`: contact, circular-motion, and palm-orientation evaluators
//! - `stabilizer`: slow-arm/instant-disarm debouncing of raw verdicts
//! - `session`: Idle/Arming/Timing/Complete washing timer
//! - `guidance`: prioritized, deduplicated spoken prompts
//! - `coach`: the per-tick classifier context tying them together
//! - `driver`: observation sources and the calloop tick scheduler

pub mod coach;
pub mod config;
pub mod criteria;
pub mod driver;
pub mod guidance;
pub mod hand;
pub mod progress;
pub mod session;
pub mod sexp;
pub mod snapshot;
pub mod speech;
pub mod stabilizer;

pub use coach::{Coach, CoachEvent, ResetReason, TickOutput};
pub use config::CoachConfig;
pub use guidance::{AnnounceRequest, GuidanceMessage, SpeechDone};
pub use hand::{HandFrame, Landmark, Observation};
pub use session::SessionPhase;
pub use snapshot::{RenderFrame, Snapshot, SnapshotPublisher};
