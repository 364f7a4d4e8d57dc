//! Per-tick state snapshot for the UI sink, and the publisher the render
//! loop reads it from.
//!
//! The classifier publishes once per tick; the renderer runs on its own
//! cadence and only ever clones the latest `Arc`, so neither side waits on
//! the other beyond a pointer swap.

use std::sync::{Arc, Mutex};

use crate::criteria::CriteriaFlags;
use crate::guidance::GuidanceMessage;
use crate::hand::overlay::OverlayPoint;
use crate::hand::PresenceKind;
use crate::session::SessionPhase;
use crate::sexp::quote;

/// Everything the UI needs to draw one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp_ms: u64,
    /// Session generation the snapshot was taken in.
    pub generation: u64,
    pub presence: PresenceKind,
    /// Contact pairs in contact this tick; zero without two hands.
    pub contact_score: u32,
    /// Weighted confidence of this tick's raw criteria (0-100).
    pub confidence: u32,
    /// Stabilized criteria.
    pub criteria: CriteriaFlags,
    pub phase: SessionPhase,
    pub elapsed_ms: u64,
    pub percent_complete: f32,
    pub seconds_remaining: f32,
    /// Current guidance topic.
    pub guidance: Option<GuidanceMessage>,
}

impl Snapshot {
    pub fn to_sexp(&self) -> String {
        let guidance = self
            .guidance
            .map(|g| quote(&g.text()))
            .unwrap_or_else(|| "nil".to_string());
        format!(
            "(:t {} :generation {} :presence :{} :contact-score {} :confidence {} :criteria {} :phase :{} :elapsed-ms {} :percent {:.1} :remaining-s {:.1} :guidance {})",
            self.timestamp_ms,
            self.generation,
            self.presence.as_str(),
            self.contact_score,
            self.confidence,
            self.criteria.to_sexp(),
            self.phase.as_str(),
            self.elapsed_ms,
            self.percent_complete,
            self.seconds_remaining,
            guidance,
        )
    }
}

/// A snapshot plus the overlay points for the same tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub snapshot: Snapshot,
    pub overlay: Vec<OverlayPoint>,
}

/// Latest-value slot shared between the classifier and the renderer.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPublisher {
    latest: Arc<Mutex<Option<Arc<RenderFrame>>>>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published frame.
    pub fn publish(&self, frame: RenderFrame) {
        let frame = Arc::new(frame);
        let mut slot = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(frame);
    }

    /// The most recently published frame, if any.
    pub fn latest(&self) -> Option<Arc<RenderFrame>> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
