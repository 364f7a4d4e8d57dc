//! Hand input — landmark frames, presence validation, and overlay projection.
//!
//! Provides:
//! - `landmarks`: 21-point hand frames and per-tick observations
//! - `validator`: no/one/two-hand gating with the occlusion latch
//! - `overlay`: pixel-space landmark projection for the render sink
//! - `synthetic`: generated hand poses for the demo source and tests

pub mod landmarks;
pub mod overlay;
pub mod synthetic;
pub mod validator;

pub use landmarks::{
    FrameError, HandFrame, HandLandmark, HandSlot, Landmark, Observation, LANDMARK_COUNT,
};
pub use validator::{FrameValidator, Presence, PresenceKind, ValidatorConfig, ValidatorSignal};
