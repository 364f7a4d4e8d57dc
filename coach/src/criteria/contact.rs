//! Contact scoring — how closely the two hands are interlocked.
//!
//! Counts landmark pairs (one landmark on each hand) that lie within a
//! proximity threshold.  Several independent pairs tolerate partial
//! occlusion and rotation better than a single hand-centre distance.

use tracing::trace;

use crate::hand::{HandFrame, HandLandmark};

/// Default landmark pairs `(hand A index, hand B index)`: wrist-wrist,
/// knuckle-knuckle, fingertip-to-opposite-wrist, and cross knuckles.
pub const DEFAULT_CONTACT_PAIRS: [(HandLandmark, HandLandmark); 7] = [
    (HandLandmark::Wrist, HandLandmark::Wrist),
    (HandLandmark::IndexMcp, HandLandmark::IndexMcp),
    (HandLandmark::MiddleMcp, HandLandmark::MiddleMcp),
    (HandLandmark::IndexTip, HandLandmark::Wrist),
    (HandLandmark::Wrist, HandLandmark::IndexTip),
    (HandLandmark::IndexMcp, HandLandmark::PinkyMcp),
    (HandLandmark::PinkyMcp, HandLandmark::IndexMcp),
];

/// Configuration for contact scoring.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Landmark index pairs `(hand A, hand B)` to test.
    pub pairs: Vec<(usize, usize)>,
    /// Maximum 3D distance (normalized units) for a pair to count.
    pub distance_threshold: f32,
    /// Minimum pairs in contact for the contact criterion.
    pub min_contacts: u32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_CONTACT_PAIRS
                .iter()
                .map(|(a, b)| (a.index(), b.index()))
                .collect(),
            distance_threshold: 0.15,
            min_contacts: 3,
        }
    }
}

/// Stateless contact scorer.
#[derive(Debug, Clone)]
pub struct ContactScorer {
    pub config: ContactConfig,
}

impl ContactScorer {
    pub fn new(config: ContactConfig) -> Self {
        Self { config }
    }

    /// Number of configured pairs in contact.  A pair naming a landmark
    /// the frame does not have never counts.
    pub fn score(&self, a: &HandFrame, b: &HandFrame) -> u32 {
        let count = self
            .config
            .pairs
            .iter()
            .filter(|(ia, ib)| self.pair_in_contact(a, b, *ia, *ib))
            .count() as u32;
        trace!("Contact score {}/{}", count, self.config.pairs.len());
        count
    }

    /// Whether a score satisfies the contact criterion.
    pub fn is_contact(&self, score: u32) -> bool {
        score >= self.config.min_contacts
    }

    fn pair_in_contact(&self, a: &HandFrame, b: &HandFrame, ia: usize, ib: usize) -> bool {
        match (a.get(ia), b.get(ib)) {
            (Some(pa), Some(pb)) => pa.distance(&pb) < self.config.distance_threshold,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::synthetic::{palms_apart, palms_together};
    use crate::hand::{Landmark, LANDMARK_COUNT};

    /// Two hands with every landmark far apart except pair `k`, which is
    /// placed `dist` apart.
    fn single_pair_hands(k: usize, dist: f32) -> (HandFrame, HandFrame) {
        let (ia, ib) = ContactConfig::default().pairs[k];
        let mut a: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|_| Landmark::new(0.0, 0.0, 0.0))
            .collect();
        let mut b: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|_| Landmark::new(1.0, 1.0, 0.0))
            .collect();
        a[ia] = Landmark::new(0.5, 0.5, 0.0);
        b[ib] = Landmark::new(0.5 + dist, 0.5, 0.0);
        (
            HandFrame::from_landmarks(&a).unwrap(),
            HandFrame::from_landmarks(&b).unwrap(),
        )
    }

    #[test]
    fn test_default_pairs() {
        let c = ContactConfig::default();
        assert_eq!(
            c.pairs,
            vec![(0, 0), (5, 5), (9, 9), (8, 0), (0, 8), (5, 17), (17, 5)]
        );
        assert!((c.distance_threshold - 0.15).abs() < f32::EPSILON);
        assert_eq!(c.min_contacts, 3);
    }

    #[test]
    fn test_palms_together_score() {
        let scorer = ContactScorer::new(ContactConfig::default());
        let (a, b) = palms_together(0.5, 0.5);
        let score = scorer.score(&a, &b);
        assert_eq!(score, 5);
        assert!(scorer.is_contact(score));
    }

    #[test]
    fn test_hands_apart_score_zero() {
        let scorer = ContactScorer::new(ContactConfig::default());
        let (a, b) = palms_apart(0.5, 0.5, 0.5);
        assert_eq!(scorer.score(&a, &b), 0);
        assert!(!scorer.is_contact(0));
    }

    #[test]
    fn test_each_pair_counts_below_threshold() {
        let scorer = ContactScorer::new(ContactConfig::default());
        for k in 0..7 {
            let (a, b) = single_pair_hands(k, 0.20);
            let far = scorer.score(&a, &b);
            let (a, b) = single_pair_hands(k, 0.14);
            let near = scorer.score(&a, &b);
            let (a, b) = single_pair_hands(k, 0.01);
            let closer = scorer.score(&a, &b);
            assert!(near > far, "pair {} did not count below threshold", k);
            assert!(closer >= near, "pair {} score decreased as distance shrank", k);
        }
    }

    #[test]
    fn test_just_outside_threshold() {
        let scorer = ContactScorer::new(ContactConfig::default());
        let (a, b) = single_pair_hands(0, 0.151);
        assert_eq!(scorer.score(&a, &b), 0);
    }

    #[test]
    fn test_out_of_range_pair_is_unmet() {
        let mut config = ContactConfig::default();
        config.pairs = vec![(0, 0), (0, 42)];
        let scorer = ContactScorer::new(config);
        let (a, b) = palms_together(0.5, 0.5);
        assert_eq!(scorer.score(&a, &b), 1);
    }
}
