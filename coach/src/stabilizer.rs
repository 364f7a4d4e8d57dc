//! Hysteresis stabilizer — debounces raw per-frame criterion verdicts.
//!
//! A criterion becomes stable only after more than `stable_frames`
//! consecutive raw affirmations, and drops on the first raw negative.
//! Slow to arm, instant to disarm.

use tracing::debug;

use crate::criteria::{CriteriaFlags, Criterion};

/// Configuration for criterion debouncing.
#[derive(Debug, Clone)]
pub struct StabilizerConfig {
    /// Consecutive raw-true frames that must be exceeded to arm.
    pub stable_frames: u32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self { stable_frames: 15 }
    }
}

/// Debounce state for one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CriterionState {
    /// Most recent raw verdict.
    pub raw: bool,
    /// Consecutive raw-true frames up to and including the latest.
    pub consecutive: u32,
    pub stable: bool,
}

impl CriterionState {
    fn update(&mut self, raw: bool, stable_frames: u32) {
        self.raw = raw;
        if raw {
            self.consecutive = self.consecutive.saturating_add(1);
            self.stable = self.consecutive > stable_frames;
        } else {
            self.consecutive = 0;
            self.stable = false;
        }
    }
}

/// Per-criterion hysteresis over raw flags.
#[derive(Debug)]
pub struct Stabilizer {
    pub config: StabilizerConfig,
    contact: CriterionState,
    circular_motion: CriterionState,
    orientation: CriterionState,
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            contact: CriterionState::default(),
            circular_motion: CriterionState::default(),
            orientation: CriterionState::default(),
        }
    }

    /// Feed one frame of raw flags and return the stabilized flags.
    pub fn update(&mut self, raw: CriteriaFlags) -> CriteriaFlags {
        let frames = self.config.stable_frames;
        for criterion in Criterion::PRIORITY {
            let state = self.state_mut(criterion);
            let was = state.stable;
            state.update(raw.get(criterion), frames);
            if state.stable != was {
                debug!(
                    "Criterion {} {}",
                    criterion.as_str(),
                    if state.stable { "stable" } else { "dropped" }
                );
            }
        }
        self.stable()
    }

    pub fn state(&self, criterion: Criterion) -> CriterionState {
        match criterion {
            Criterion::Contact => self.contact,
            Criterion::CircularMotion => self.circular_motion,
            Criterion::Orientation => self.orientation,
        }
    }

    fn state_mut(&mut self, criterion: Criterion) -> &mut CriterionState {
        match criterion {
            Criterion::Contact => &mut self.contact,
            Criterion::CircularMotion => &mut self.circular_motion,
            Criterion::Orientation => &mut self.orientation,
        }
    }

    /// Current stabilized flags.
    pub fn stable(&self) -> CriteriaFlags {
        CriteriaFlags {
            contact: self.contact.stable,
            circular_motion: self.circular_motion.stable,
            orientation: self.orientation.stable,
        }
    }

    pub fn reset(&mut self) {
        self.contact = CriterionState::default();
        self.circular_motion = CriterionState::default();
        self.orientation = CriterionState::default();
    }
}

// ── Tests ──────────────────────────────────────────────────
