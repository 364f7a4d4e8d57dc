//! Progress emitter — elapsed washing time as percent and time remaining.

use crate::session::SessionPhase;

/// Progress toward the washing target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 0.0–100.0
    pub percent_complete: f32,
    pub seconds_remaining: f32,
}

impl Progress {
    /// Progress for `elapsed_ms` of a `target_ms` run, clamped to the
    /// target.
    pub fn from_elapsed(elapsed_ms: u64, target_ms: u64) -> Self {
        if target_ms == 0 {
            return Self {
                percent_complete: 100.0,
                seconds_remaining: 0.0,
            };
        }
        let elapsed = elapsed_ms.min(target_ms);
        Self {
            percent_complete: elapsed as f32 / target_ms as f32 * 100.0,
            seconds_remaining: (target_ms - elapsed) as f32 / 1000.0,
        }
    }

    /// Progress as displayed for a session phase: a full bar once
    /// complete, an empty one while no timer runs.
    pub fn for_phase(phase: SessionPhase, elapsed_ms: u64, target_ms: u64) -> Self {
        match phase {
            SessionPhase::Timing => Self::from_elapsed(elapsed_ms, target_ms),
            SessionPhase::Complete => Self::from_elapsed(target_ms, target_ms),
            SessionPhase::Idle | SessionPhase::Arming => Self::from_elapsed(0, target_ms),
        }
    }
}
