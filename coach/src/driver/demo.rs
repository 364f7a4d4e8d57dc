//! Synthetic demo source — a full washing session without a detector.
//!
//! Plays a repeating cycle: an empty frame, one hand entering, two hands
//! rubbing palm to palm in small circles long enough to complete, then
//! the hands leaving long enough to trip the occlusion timeout.

use std::f32::consts::TAU;

use super::ObservationSource;
use crate::hand::synthetic::{hand, palms_together};
use crate::hand::Observation;

/// Demo timeline segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoStage {
    Empty,
    OneHand,
    Rubbing,
    HandsGone,
}

/// Stage lengths and rubbing motion.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub empty_ms: u64,
    pub one_hand_ms: u64,
    pub rubbing_ms: u64,
    pub gone_ms: u64,
    /// Radius of the rubbing circle (normalized units).
    pub radius: f32,
    /// Time for one full rubbing circle (ms).
    pub circle_period_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            empty_ms: 1000,
            one_hand_ms: 1000,
            rubbing_ms: 24_000,
            gone_ms: 2500,
            radius: 0.03,
            circle_period_ms: 250,
        }
    }
}

impl DemoConfig {
    pub fn cycle_ms(&self) -> u64 {
        self.empty_ms + self.one_hand_ms + self.rubbing_ms + self.gone_ms
    }

    /// Stage and time into that stage at `t` ms into a run.
    pub fn stage_at(&self, t: u64) -> (DemoStage, u64) {
        let cycle = self.cycle_ms().max(1);
        let mut offset = t % cycle;
        let stages = [
            (DemoStage::Empty, self.empty_ms),
            (DemoStage::OneHand, self.one_hand_ms),
            (DemoStage::Rubbing, self.rubbing_ms),
            (DemoStage::HandsGone, self.gone_ms),
        ];
        for (stage, len) in stages {
            if offset < len {
                return (stage, offset);
            }
            offset -= len;
        }
        (DemoStage::HandsGone, offset)
    }
}

/// Endless synthetic observation stream.
#[derive(Debug, Default)]
pub struct DemoSource {
    pub config: DemoConfig,
}

impl DemoSource {
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }

    /// Observation at `t` ms into the run.
    pub fn observation_at(&self, t: u64) -> Observation {
        let (stage, into) = self.config.stage_at(t);
        match stage {
            DemoStage::Empty | DemoStage::HandsGone => Observation::empty(t),
            DemoStage::OneHand => {
                // Slides in from the right edge
                let slide = 0.3 * (1.0 - into as f32 / self.config.one_hand_ms.max(1) as f32);
                let h = hand(0.5, 0.5, false).translated(slide, 0.0, 0.0);
                Observation::with_hands(t, vec![h])
            }
            DemoStage::Rubbing => {
                let period = self.config.circle_period_ms.max(1);
                let phase = (into % period) as f32 / period as f32 * TAU;
                let r = self.config.radius;
                let (a, b) = palms_together(0.5 + r * phase.cos(), 0.5 + r * phase.sin());
                Observation::with_hands(t, vec![a, b])
            }
        }
    }
}

impl ObservationSource for DemoSource {
    fn next_observation(&mut self, now_ms: u64) -> Option<Observation> {
        Some(self.observation_at(now_ms))
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::Coach;
    use crate::config::CoachConfig;
    use crate::session::SessionPhase;

    #[test]
    fn test_stage_timeline() {
        let c = DemoConfig::default();
        assert_eq!(c.stage_at(0).0, DemoStage::Empty);
        assert_eq!(c.stage_at(1500), (DemoStage::OneHand, 500));
        assert_eq!(c.stage_at(2000).0, DemoStage::Rubbing);
        assert_eq!(c.stage_at(26_000).0, DemoStage::HandsGone);
        assert_eq!(c.stage_at(c.cycle_ms()).0, DemoStage::Empty);
    }

    #[test]
    fn test_hand_counts() {
        let d = DemoSource::default();
        assert_eq!(d.observation_at(500).hand_count(), 0);
        assert_eq!(d.observation_at(1500).hand_count(), 1);
        assert_eq!(d.observation_at(5000).hand_count(), 2);
        assert_eq!(d.observation_at(27_000).hand_count(), 0);
    }

    #[test]
    fn test_demo_cycle_completes_then_resets() {
        let mut source = DemoSource::default();
        let mut coach = Coach::new(CoachConfig::default());
        let mut phases = Vec::new();
        let mut t = 0;
        while t < source.config.cycle_ms() {
            let obs = source.next_observation(t).unwrap();
            let out = coach.tick(&obs);
            if let Some(req) = out.announce {
                coach.speech_finished(req.done());
            }
            if phases.last() != Some(&out.snapshot.phase) {
                phases.push(out.snapshot.phase);
            }
            t += 66;
        }
        assert!(phases.contains(&SessionPhase::Timing));
        assert!(phases.contains(&SessionPhase::Complete));
        assert_eq!(phases.last(), Some(&SessionPhase::Idle));
        assert!(coach.generation() >= 1);
    }
}
