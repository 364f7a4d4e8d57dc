//! Technique criteria — per-frame evaluators for two tracked hands.
//!
//! Three independent signals feed the stabilizer each two-hand tick:
//! palm contact, circular rubbing motion, and palms facing each other.

pub mod contact;
pub mod motion;
pub mod orientation;

pub use contact::{ContactConfig, ContactScorer};
pub use motion::{CircularMotionDetector, MotionConfig, MotionSample};
pub use orientation::{OrientationConfig, OrientationDetector};

use crate::hand::HandFrame;

// ── Criterion ──────────────────────────────────────────────

/// One independently evaluated technique signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Contact,
    CircularMotion,
    Orientation,
}

impl Criterion {
    /// All criteria in guidance priority order (highest first).
    pub const PRIORITY: [Criterion; 3] = [
        Criterion::Contact,
        Criterion::CircularMotion,
        Criterion::Orientation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::CircularMotion => "circular-motion",
            Self::Orientation => "orientation",
        }
    }
}

// ── Flags ──────────────────────────────────────────────────

/// One boolean per criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CriteriaFlags {
    pub contact: bool,
    pub circular_motion: bool,
    pub orientation: bool,
}

impl CriteriaFlags {
    pub fn get(&self, criterion: Criterion) -> bool {
        match criterion {
            Criterion::Contact => self.contact,
            Criterion::CircularMotion => self.circular_motion,
            Criterion::Orientation => self.orientation,
        }
    }

    /// Number of criteria currently met.
    pub fn passed_count(&self) -> usize {
        Criterion::PRIORITY.iter().filter(|c| self.get(**c)).count()
    }

    /// Highest-priority criterion that is not met, if any.
    pub fn first_unmet(&self) -> Option<Criterion> {
        Criterion::PRIORITY.iter().copied().find(|c| !self.get(*c))
    }

    pub fn to_sexp(&self) -> String {
        format!(
            "(:contact {} :circular-motion {} :orientation {})",
            crate::sexp::bool_sexp(self.contact),
            crate::sexp::bool_sexp(self.circular_motion),
            crate::sexp::bool_sexp(self.orientation),
        )
    }
}

// ── Confidence ─────────────────────────────────────────────

/// Per-criterion weights of the technique confidence readout (0-100).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfidenceConfig {
    pub contact_weight: u32,
    pub motion_weight: u32,
    pub orientation_weight: u32,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            contact_weight: 40,
            motion_weight: 35,
            orientation_weight: 25,
        }
    }
}

impl ConfidenceConfig {
    pub fn weight(&self, criterion: Criterion) -> u32 {
        match criterion {
            Criterion::Contact => self.contact_weight,
            Criterion::CircularMotion => self.motion_weight,
            Criterion::Orientation => self.orientation_weight,
        }
    }

    /// Sum of the weights of met criteria, capped at 100.
    pub fn confidence(&self, flags: &CriteriaFlags) -> u32 {
        Criterion::PRIORITY
            .iter()
            .filter(|c| flags.get(**c))
            .map(|c| self.weight(*c))
            .sum::<u32>()
            .min(100)
    }
}

// ── Evaluators ─────────────────────────────────────────────

/// Raw per-frame verdict from all evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawVerdict {
    /// Number of landmark pairs in contact.
    pub contact_score: u32,
    /// Weighted technique confidence of the raw flags (0-100).
    pub confidence: u32,
    pub flags: CriteriaFlags,
}

/// The three criterion evaluators, run together on each two-hand tick.
#[derive(Debug)]
pub struct Evaluators {
    pub contact: ContactScorer,
    pub motion: CircularMotionDetector,
    pub orientation: OrientationDetector,
    pub confidence: ConfidenceConfig,
}

impl Evaluators {
    pub fn new(contact: ContactConfig, motion: MotionConfig, orientation: OrientationConfig) -> Self {
        Self {
            contact: ContactScorer::new(contact),
            motion: CircularMotionDetector::new(motion),
            orientation: OrientationDetector::new(orientation),
            confidence: ConfidenceConfig::default(),
        }
    }

    pub fn with_confidence(mut self, confidence: ConfidenceConfig) -> Self {
        self.confidence = confidence;
        self
    }

    /// Evaluate one two-hand frame at `now_ms`.
    pub fn evaluate(&mut self, a: &HandFrame, b: &HandFrame, now_ms: u64) -> RawVerdict {
        let contact_score = self.contact.score(a, b);
        let flags = CriteriaFlags {
            contact: self.contact.is_contact(contact_score),
            circular_motion: self.motion.update(a, b, now_ms),
            orientation: self.orientation.palms_facing(a, b),
        };
        RawVerdict {
            contact_score,
            confidence: self.confidence.confidence(&flags),
            flags,
        }
    }

    /// Drop motion history.  Contact and orientation are stateless.
    pub fn reset(&mut self) {
        self.motion.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::synthetic::{palms_apart, palms_together};

    #[test]
    fn test_passed_count() {
        let mut f = CriteriaFlags::default();
        assert_eq!(f.passed_count(), 0);
        f.contact = true;
        f.orientation = true;
        assert_eq!(f.passed_count(), 2);
    }

    #[test]
    fn test_first_unmet_follows_priority() {
        let mut f = CriteriaFlags::default();
        assert_eq!(f.first_unmet(), Some(Criterion::Contact));
        f.contact = true;
        assert_eq!(f.first_unmet(), Some(Criterion::CircularMotion));
        f.circular_motion = true;
        assert_eq!(f.first_unmet(), Some(Criterion::Orientation));
        f.orientation = true;
        assert_eq!(f.first_unmet(), None);

        // Orientation alone met still reports contact first
        let f = CriteriaFlags {
            orientation: true,
            ..Default::default()
        };
        assert_eq!(f.first_unmet(), Some(Criterion::Contact));
    }

    #[test]
    fn test_evaluate_palms_together() {
        let mut ev = Evaluators::new(
            ContactConfig::default(),
            MotionConfig::default(),
            OrientationConfig::default(),
        );
        let (a, b) = palms_together(0.5, 0.5);
        let v = ev.evaluate(&a, &b, 0);
        assert!(v.contact_score >= 3);
        assert!(v.flags.contact);
        assert!(v.flags.orientation);
        assert!(!v.flags.circular_motion);
        assert_eq!(v.confidence, 65);
    }

    #[test]
    fn test_evaluate_hands_apart() {
        let mut ev = Evaluators::new(
            ContactConfig::default(),
            MotionConfig::default(),
            OrientationConfig::default(),
        );
        let (a, b) = palms_apart(0.5, 0.5, 0.6);
        let v = ev.evaluate(&a, &b, 0);
        assert_eq!(v.contact_score, 0);
        assert!(!v.flags.contact);
        assert!(v.confidence <= 25);
    }

    #[test]
    fn test_confidence_weights() {
        let w = ConfidenceConfig::default();
        assert_eq!(w.confidence(&CriteriaFlags::default()), 0);
        let mut f = CriteriaFlags {
            contact: true,
            ..Default::default()
        };
        assert_eq!(w.confidence(&f), 40);
        f.circular_motion = true;
        assert_eq!(w.confidence(&f), 75);
        f.orientation = true;
        assert_eq!(w.confidence(&f), 100);

        let heavy = ConfidenceConfig {
            contact_weight: 80,
            motion_weight: 80,
            orientation_weight: 0,
        };
        assert_eq!(heavy.confidence(&f), 100);
        assert_eq!(heavy.weight(Criterion::Orientation), 0);
    }

    #[test]
    fn test_evaluators_use_custom_weights() {
        let mut ev = Evaluators::new(
            ContactConfig::default(),
            MotionConfig::default(),
            OrientationConfig::default(),
        )
        .with_confidence(ConfidenceConfig {
            contact_weight: 50,
            motion_weight: 30,
            orientation_weight: 20,
        });
        let (a, b) = palms_together(0.5, 0.5);
        assert_eq!(ev.evaluate(&a, &b, 0).confidence, 70);
    }

    #[test]
    fn test_criterion_as_str() {
        assert_eq!(Criterion::Contact.as_str(), "contact");
        assert_eq!(Criterion::CircularMotion.as_str(), "circular-motion");
        assert_eq!(Criterion::Orientation.as_str(), "orientation");
    }

    #[test]
    fn test_flags_sexp() {
        let f = CriteriaFlags {
            contact: true,
            ..Default::default()
        };
        assert_eq!(
            f.to_sexp(),
            "(:contact t :circular-motion nil :orientation nil)"
        );
    }
}
