//! Speech collaborator boundary.
//!
//! The coach hands over announce requests fire-and-forget; the sink reports
//! playback completion later as a [`SpeechDone`] carrying the request's
//! generation.

use tracing::{debug, info};

use crate::guidance::{AnnounceRequest, SpeechDone};

/// Something that can voice announcements.
pub trait SpeechSink {
    /// Start speaking.  Must not block on playback.
    fn announce(&mut self, request: &AnnounceRequest, now_ms: u64);

    /// Completion of the utterance in flight, once it has finished.
    fn poll_finished(&mut self, now_ms: u64) -> Option<SpeechDone>;
}

/// Speech sink that logs utterances and simulates their duration.
#[derive(Debug)]
pub struct LoggingSpeech {
    /// Fixed overhead per utterance (ms).
    pub base_ms: u64,
    /// Estimated speaking time per word (ms).
    pub per_word_ms: u64,
    in_flight: Option<(SpeechDone, u64)>,
    spoken: u64,
}

impl Default for LoggingSpeech {
    fn default() -> Self {
        Self {
            base_ms: 300,
            per_word_ms: 350,
            in_flight: None,
            spoken: 0,
        }
    }
}

impl LoggingSpeech {
    /// Simulated playback time for `text`.
    pub fn duration_ms(&self, text: &str) -> u64 {
        self.base_ms + self.per_word_ms * text.split_whitespace().count() as u64
    }

    /// Number of utterances started.
    pub fn spoken(&self) -> u64 {
        self.spoken
    }
}

impl SpeechSink for LoggingSpeech {
    fn announce(&mut self, request: &AnnounceRequest, now_ms: u64) {
        let text = request.text();
        let finish_at = now_ms + self.duration_ms(&text);
        if let Some((prev, _)) = self.in_flight.take() {
            debug!(generation = prev.generation, "Utterance interrupted");
        }
        info!(generation = request.generation, "Speaking: \"{}\"", text);
        self.in_flight = Some((request.done(), finish_at));
        self.spoken += 1;
    }

    fn poll_finished(&mut self, now_ms: u64) -> Option<SpeechDone> {
        match self.in_flight {
            Some((done, finish_at)) if now_ms >= finish_at => {
                self.in_flight = None;
                Some(done)
            }
            _ => None,
        }
    }
}
