//! Guidance prioritizer — one spoken prompt at a time, never repeated.
//!
//! Each tick the coach sets the current topic: the highest-priority unmet
//! criterion, a presence prompt, or praise.  A topic change becomes an
//! announce request once the speech collaborator is idle.  Speech
//! completions arrive through a single-slot inbox tagged with the session
//! generation; completions from an earlier generation are dropped.

use tracing::{debug, info};

use crate::criteria::Criterion;

/// Everything the coach can say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidanceMessage {
    ShowHandsToCamera,
    ShowBothHands,
    RubHandsTogether,
    MakeCircularMotions,
    FacePalmsTogether,
    GreatTechnique,
    Completed { target_secs: u64 },
}

impl GuidanceMessage {
    /// Prompt for the highest-priority unmet criterion, or praise when
    /// none is unmet.
    pub fn for_unmet(unmet: Option<Criterion>) -> Self {
        match unmet {
            Some(Criterion::Contact) => Self::RubHandsTogether,
            Some(Criterion::CircularMotion) => Self::MakeCircularMotions,
            Some(Criterion::Orientation) => Self::FacePalmsTogether,
            None => Self::GreatTechnique,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::ShowHandsToCamera => "Show both hands to the camera".into(),
            Self::ShowBothHands => "Please show both hands".into(),
            Self::RubHandsTogether => "Rub your hands together".into(),
            Self::MakeCircularMotions => "Make circular motions".into(),
            Self::FacePalmsTogether => "Turn your palms to face each other".into(),
            Self::GreatTechnique => "Great technique, keep going".into(),
            Self::Completed { target_secs } => format!(
                "Excellent! You have completed {} seconds of proper hand washing",
                target_secs
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShowHandsToCamera => "show-hands-to-camera",
            Self::ShowBothHands => "show-both-hands",
            Self::RubHandsTogether => "rub-hands-together",
            Self::MakeCircularMotions => "make-circular-motions",
            Self::FacePalmsTogether => "face-palms-together",
            Self::GreatTechnique => "great-technique",
            Self::Completed { .. } => "completed",
        }
    }
}

/// A request for the speech collaborator to say something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub message: GuidanceMessage,
    /// Session generation the request belongs to.
    pub generation: u64,
}

impl AnnounceRequest {
    pub fn text(&self) -> String {
        self.message.text()
    }

    /// The completion message to hand back once playback ends.
    pub fn done(&self) -> SpeechDone {
        SpeechDone {
            generation: self.generation,
        }
    }
}

/// Playback-finished notification from the speech collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechDone {
    pub generation: u64,
}

/// Guidance state for one session generation.
#[derive(Debug)]
pub struct GuidancePrioritizer {
    /// Topic as of the latest tick.
    current: Option<GuidanceMessage>,
    /// Last message handed to the speech collaborator.
    last_announced: Option<GuidanceMessage>,
    /// Topic change waiting for the speaker.
    pending: Option<GuidanceMessage>,
    is_speaking: bool,
    generation: u64,
    inbox: Option<SpeechDone>,
}

impl GuidancePrioritizer {
    pub fn new(generation: u64) -> Self {
        Self {
            current: None,
            last_announced: None,
            pending: None,
            is_speaking: false,
            generation,
            inbox: None,
        }
    }

    pub fn current(&self) -> Option<GuidanceMessage> {
        self.current
    }

    pub fn last_announced(&self) -> Option<GuidanceMessage> {
        self.last_announced
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record this tick's topic.  Only a change queues an announcement.
    pub fn set_topic(&mut self, message: GuidanceMessage) {
        if self.current == Some(message) {
            return;
        }
        debug!("Guidance topic -> {}", message.as_str());
        self.current = Some(message);
        self.pending = Some(message);
    }

    /// Queue the completion announcement.
    pub fn announce_completion(&mut self, target_ms: u64) {
        self.set_topic(GuidanceMessage::Completed {
            target_secs: target_ms / 1000,
        });
    }

    /// Place a speech completion in the inbox; consumed on the next poll.
    pub fn deliver(&mut self, done: SpeechDone) {
        self.inbox = Some(done);
    }

    /// Consume the inbox and, if the speaker is free, return the next
    /// announcement.
    pub fn poll(&mut self) -> Option<AnnounceRequest> {
        if let Some(done) = self.inbox.take() {
            if done.generation == self.generation {
                self.is_speaking = false;
            } else {
                debug!(
                    generation = done.generation,
                    current = self.generation,
                    "Dropping stale speech completion"
                );
            }
        }

        if self.is_speaking {
            return None;
        }

        let message = self.pending.take()?;
        if self.last_announced == Some(message) {
            return None;
        }

        info!(generation = self.generation, "Announce: {}", message.text());
        self.last_announced = Some(message);
        self.is_speaking = true;
        Some(AnnounceRequest {
            message,
            generation: self.generation,
        })
    }

    /// Forget all guidance state and adopt a new generation.
    pub fn reset(&mut self, generation: u64) {
        *self = Self::new(generation);
    }

    /// Adopt a new generation but keep the topic and the dedup record, so
    /// an unchanged prompt is not said again.  Any utterance in flight
    /// belongs to the old generation, so the speaker is released.
    pub fn carry_over(&mut self, generation: u64) {
        self.generation = generation;
        self.is_speaking = false;
        self.inbox = None;
    }
}

// ── Tests ──────────────────────────────────────────────────
