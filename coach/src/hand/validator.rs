//! Landmark frame validator — hand presence gating and occlusion latch.
//!
//! Classifies each observation as no hands, one hand, or two hands, and
//! tracks how long it has been since both hands were last visible.  When
//! that gap exceeds the occlusion timeout a single latched signal is
//! raised; it clears when both hands come back.

use tracing::{debug, info};

use super::landmarks::{HandFrame, Observation};

// ── Presence ───────────────────────────────────────────────

/// Hand presence for one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence<'a> {
    NoHands,
    OneHand(&'a HandFrame),
    TwoHands(&'a HandFrame, &'a HandFrame),
}

impl<'a> Presence<'a> {
    /// Classify an observation by hand count.
    pub fn of(obs: &'a Observation) -> Self {
        match obs.hands() {
            [] => Self::NoHands,
            [one] => Self::OneHand(one),
            [a, b, ..] => Self::TwoHands(a, b),
        }
    }

    pub fn kind(&self) -> PresenceKind {
        match self {
            Self::NoHands => PresenceKind::NoHands,
            Self::OneHand(_) => PresenceKind::OneHand,
            Self::TwoHands(..) => PresenceKind::TwoHands,
        }
    }
}

/// Data-free form of [`Presence`] for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceKind {
    NoHands,
    OneHand,
    TwoHands,
}

impl PresenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoHands => "no-hands",
            Self::OneHand => "one-hand",
            Self::TwoHands => "two-hands",
        }
    }
}

// ── Signals ────────────────────────────────────────────────

/// Latched transitions raised by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorSignal {
    /// No hands visible and both hands have been missing past the timeout.
    HandsLost { gap_ms: u64 },
    /// Only one hand visible past the timeout.
    PartialTimeout { gap_ms: u64 },
    /// Both hands visible again after a latched lapse.
    HandsReturned { gap_ms: u64 },
}

impl ValidatorSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandsLost { .. } => "hands-lost",
            Self::PartialTimeout { .. } => "partial-timeout",
            Self::HandsReturned { .. } => "hands-returned",
        }
    }
}

/// Occlusion latch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lapse {
    /// Both hands seen within the timeout.
    None,
    /// Timed out while one hand was still visible.
    Partial,
    /// Timed out with no hands visible; the hands-lost prompt has fired.
    Full,
}

// ── Config ─────────────────────────────────────────────────

/// Configuration for presence gating.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Gap since the last two-hand observation before tracking is
    /// considered lost (ms).
    pub occlusion_timeout_ms: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            occlusion_timeout_ms: 2000,
        }
    }
}

// ── Validator ──────────────────────────────────────────────

/// Result of validating one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validated<'a> {
    pub presence: Presence<'a>,
    pub signal: Option<ValidatorSignal>,
}

/// Presence gate with occlusion tracking.
#[derive(Debug)]
pub struct FrameValidator {
    pub config: ValidatorConfig,
    /// Timestamp of the last two-hand observation, or of the first
    /// observation ever seen if both hands have not appeared yet.
    last_seen_ms: Option<u64>,
    lapse: Lapse,
}

impl FrameValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            last_seen_ms: None,
            lapse: Lapse::None,
        }
    }

    /// Classify an observation and update the occlusion latch.
    pub fn validate<'a>(&mut self, obs: &'a Observation) -> Validated<'a> {
        let now = obs.timestamp_ms;
        let presence = Presence::of(obs);
        let last_seen = *self.last_seen_ms.get_or_insert(now);
        let gap_ms = now.saturating_sub(last_seen);

        let signal = match presence {
            Presence::TwoHands(..) => {
                self.last_seen_ms = Some(now);
                if self.lapse != Lapse::None {
                    self.lapse = Lapse::None;
                    info!("Both hands back after {}ms", gap_ms);
                    Some(ValidatorSignal::HandsReturned { gap_ms })
                } else {
                    None
                }
            }
            _ if gap_ms <= self.config.occlusion_timeout_ms => None,
            Presence::NoHands => {
                if self.lapse == Lapse::Full {
                    None
                } else {
                    self.lapse = Lapse::Full;
                    info!("Hands lost for {}ms", gap_ms);
                    Some(ValidatorSignal::HandsLost { gap_ms })
                }
            }
            Presence::OneHand(_) => {
                if self.lapse == Lapse::None {
                    self.lapse = Lapse::Partial;
                    debug!("Only one hand visible for {}ms", gap_ms);
                    Some(ValidatorSignal::PartialTimeout { gap_ms })
                } else {
                    None
                }
            }
        };

        Validated { presence, signal }
    }

    /// Whether tracking is currently latched as lost.
    pub fn is_lapsed(&self) -> bool {
        self.lapse != Lapse::None
    }

    /// Forget all presence history.
    pub fn reset(&mut self) {
        self.last_seen_ms = None;
        self.lapse = Lapse::None;
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::synthetic::{hand, palms_together};

    fn two(t: u64) -> Observation {
        let (a, b) = palms_together(0.5, 0.5);
        Observation::with_hands(t, vec![a, b])
    }

    fn one(t: u64) -> Observation {
        Observation::with_hands(t, vec![hand(0.5, 0.5, false)])
    }

    #[test]
    fn test_presence_kinds() {
        assert_eq!(Presence::of(&Observation::empty(0)).kind(), PresenceKind::NoHands);
        assert_eq!(Presence::of(&one(0)).kind(), PresenceKind::OneHand);
        assert_eq!(Presence::of(&two(0)).kind(), PresenceKind::TwoHands);
    }

    #[test]
    fn test_no_signal_within_timeout() {
        let mut v = FrameValidator::new(ValidatorConfig::default());
        assert!(v.validate(&two(0)).signal.is_none());
        assert!(v.validate(&Observation::empty(1000)).signal.is_none());
        assert!(v.validate(&Observation::empty(2000)).signal.is_none());
        assert!(!v.is_lapsed());
    }

    #[test]
    fn test_hands_lost_fires_once() {
        let mut v = FrameValidator::new(ValidatorConfig::default());
        v.validate(&two(0));
        let s = v.validate(&Observation::empty(2001)).signal;
        assert_eq!(s, Some(ValidatorSignal::HandsLost { gap_ms: 2001 }));
        assert!(v.validate(&Observation::empty(2100)).signal.is_none());
        assert!(v.validate(&Observation::empty(9000)).signal.is_none());
        assert!(v.is_lapsed());
    }

    #[test]
    fn test_hands_returned_clears_latch() {
        let mut v = FrameValidator::new(ValidatorConfig::default());
        v.validate(&two(0));
        v.validate(&Observation::empty(3000));
        let s = v.validate(&two(3100)).signal;
        assert_eq!(s, Some(ValidatorSignal::HandsReturned { gap_ms: 3100 }));
        assert!(!v.is_lapsed());

        // A second occlusion fires again
        let s = v.validate(&Observation::empty(5200)).signal;
        assert!(matches!(s, Some(ValidatorSignal::HandsLost { .. })));
    }

    #[test]
    fn test_one_hand_does_not_refresh_last_seen() {
        let mut v = FrameValidator::new(ValidatorConfig::default());
        v.validate(&two(0));
        v.validate(&one(1500));
        let s = v.validate(&Observation::empty(2500)).signal;
        assert!(matches!(s, Some(ValidatorSignal::HandsLost { .. })));
    }

    #[test]
    fn test_partial_timeout_then_hands_lost() {
        let mut v = FrameValidator::new(ValidatorConfig::default());
        v.validate(&two(0));
        let s = v.validate(&one(2500)).signal;
        assert_eq!(s, Some(ValidatorSignal::PartialTimeout { gap_ms: 2500 }));
        assert!(v.validate(&one(2600)).signal.is_none());

        // Losing the last hand still raises the hands-lost prompt once
        let s = v.validate(&Observation::empty(2700)).signal;
        assert!(matches!(s, Some(ValidatorSignal::HandsLost { .. })));
        assert!(v.validate(&one(2800)).signal.is_none());
        assert!(v.validate(&Observation::empty(2900)).signal.is_none());
    }

    #[test]
    fn test_gap_measured_from_first_observation() {
        let mut v = FrameValidator::new(ValidatorConfig::default());
        assert!(v.validate(&Observation::empty(10_000)).signal.is_none());
        let s = v.validate(&Observation::empty(12_500)).signal;
        assert_eq!(s, Some(ValidatorSignal::HandsLost { gap_ms: 2500 }));
    }

    #[test]
    fn test_reset() {
        let mut v = FrameValidator::new(ValidatorConfig::default());
        v.validate(&two(0));
        v.validate(&Observation::empty(3000));
        v.reset();
        assert!(!v.is_lapsed());
        assert!(v.validate(&Observation::empty(4000)).signal.is_none());
    }
}
