//! Coach — the classifier context driven once per tick.
//!
//! Owns every stateful component and runs them in a fixed order:
//! validator, evaluators, stabilizer, session machine, then guidance and
//! progress.  The caller owns the `Coach`, feeds it observations, forwards
//! announce requests to a speech sink, and hands speech completions back
//! through [`Coach::speech_finished`].

use tracing::{debug, info};

use crate::config::CoachConfig;
use crate::criteria::Evaluators;
use crate::guidance::{AnnounceRequest, GuidanceMessage, GuidancePrioritizer, SpeechDone};
use crate::hand::{FrameValidator, Observation, Presence, PresenceKind, ValidatorSignal};
use crate::progress::Progress;
use crate::session::{SessionEvent, SessionMachine, SessionPhase};
use crate::sexp::{bool_sexp, format_event, quote};
use crate::snapshot::Snapshot;
use crate::stabilizer::Stabilizer;

// ── Events ─────────────────────────────────────────────────

/// Why the session was reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    HandsLost,
    PartialTimeout,
    HandsReturned,
    Stop,
}

impl ResetReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandsLost => "hands-lost",
            Self::PartialTimeout => "partial-timeout",
            Self::HandsReturned => "hands-returned",
            Self::Stop => "stop",
        }
    }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachEvent {
    Presence(ValidatorSignal),
    Session(SessionEvent),
    Reset { reason: ResetReason, generation: u64 },
}

impl CoachEvent {
    pub fn to_sexp(&self) -> String {
        match self {
            Self::Presence(signal) => {
                let gap = match signal {
                    ValidatorSignal::HandsLost { gap_ms }
                    | ValidatorSignal::PartialTimeout { gap_ms }
                    | ValidatorSignal::HandsReturned { gap_ms } => gap_ms.to_string(),
                };
                format_event(signal.as_str(), &[("gap-ms", &gap)])
            }
            Self::Session(event) => match event {
                SessionEvent::PhaseChanged { from, to } => format_event(
                    event.as_str(),
                    &[
                        ("from", &format!(":{}", from.as_str())),
                        ("to", &format!(":{}", to.as_str())),
                    ],
                ),
                SessionEvent::TimingStarted { start_ms } => {
                    format_event(event.as_str(), &[("start-ms", &start_ms.to_string())])
                }
                SessionEvent::TimerCancelled { elapsed_ms }
                | SessionEvent::Completed { elapsed_ms } => {
                    format_event(event.as_str(), &[("elapsed-ms", &elapsed_ms.to_string())])
                }
                SessionEvent::CompletionCleared => format_event(event.as_str(), &[]),
            },
            Self::Reset { reason, generation } => format_event(
                "reset",
                &[
                    ("reason", &format!(":{}", reason.as_str())),
                    ("generation", &generation.to_string()),
                ],
            ),
        }
    }
}

/// Everything one tick produces.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub snapshot: Snapshot,
    pub events: Vec<CoachEvent>,
    /// New announcement for the speech sink, if any.
    pub announce: Option<AnnounceRequest>,
}

// ── Coach ──────────────────────────────────────────────────

/// Classifier context for one user at one sink.
#[derive(Debug)]
pub struct Coach {
    config: CoachConfig,
    validator: FrameValidator,
    evaluators: Evaluators,
    stabilizer: Stabilizer,
    session: SessionMachine,
    guidance: GuidancePrioritizer,
    /// Bumped on every reset; tags announce requests.
    generation: u64,
    last_tick_ms: u64,
    ticks: u64,
}

impl Coach {
    pub fn new(config: CoachConfig) -> Self {
        Self {
            validator: FrameValidator::new(config.validator.clone()),
            evaluators: Evaluators::new(
                config.contact.clone(),
                config.motion.clone(),
                config.orientation.clone(),
            )
            .with_confidence(config.confidence.clone()),
            stabilizer: Stabilizer::new(config.stabilizer.clone()),
            session: SessionMachine::new(config.session.clone()),
            guidance: GuidancePrioritizer::new(0),
            generation: 0,
            last_tick_ms: 0,
            ticks: 0,
            config,
        }
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run the pipeline for one observation.
    pub fn tick(&mut self, obs: &Observation) -> TickOutput {
        let now = obs.timestamp_ms;
        self.last_tick_ms = now;
        self.ticks += 1;

        let mut events = Vec::new();
        let validated = self.validator.validate(obs);

        if let Some(signal) = validated.signal {
            events.push(CoachEvent::Presence(signal));
            match signal {
                ValidatorSignal::HandsLost { .. } => {
                    self.reset_session(ResetReason::HandsLost, &mut events);
                    self.guidance.set_topic(GuidanceMessage::ShowHandsToCamera);
                }
                ValidatorSignal::PartialTimeout { .. } => {
                    self.reset_session(ResetReason::PartialTimeout, &mut events);
                }
                ValidatorSignal::HandsReturned { .. } => {
                    self.reset_session(ResetReason::HandsReturned, &mut events);
                }
            }
        }

        let completing = self.session.phase() == SessionPhase::Complete;
        let mut contact_score = 0;
        let mut confidence = 0;

        match validated.presence {
            Presence::TwoHands(a, b) if !completing => {
                let verdict = self.evaluators.evaluate(a, b, now);
                contact_score = verdict.contact_score;
                confidence = verdict.confidence;
                let stable = self.stabilizer.update(verdict.flags);

                let session_events = self.session.on_evaluated(stable.passed_count(), now);
                let completed = session_events
                    .iter()
                    .any(|e| matches!(e, SessionEvent::Completed { .. }));
                events.extend(session_events.into_iter().map(CoachEvent::Session));

                if completed {
                    self.guidance
                        .announce_completion(self.config.session.target_ms);
                    self.stabilizer.reset();
                    self.evaluators.reset();
                } else {
                    self.guidance
                        .set_topic(GuidanceMessage::for_unmet(stable.first_unmet()));
                }
            }
            Presence::OneHand(_) if !completing => {
                self.guidance.set_topic(GuidanceMessage::ShowBothHands);
                events.extend(self.session.on_unevaluated(now).into_iter().map(CoachEvent::Session));
            }
            _ => {
                events.extend(self.session.on_unevaluated(now).into_iter().map(CoachEvent::Session));
            }
        }

        for event in &events {
            debug!("{}", event.to_sexp());
        }

        let announce = self.guidance.poll();
        let snapshot = self.snapshot(now, validated.presence.kind(), contact_score, confidence);

        TickOutput {
            snapshot,
            events,
            announce,
        }
    }

    /// Hand a speech completion back; it is consumed on the next tick.
    pub fn speech_finished(&mut self, done: SpeechDone) {
        self.guidance.deliver(done);
    }

    /// External stop: clear every counter, the timer, guidance, and the
    /// occlusion latch.  The next observation starts a fresh session.
    pub fn stop(&mut self) -> Vec<CoachEvent> {
        let mut events = Vec::new();
        self.validator.reset();
        self.reset_session(ResetReason::Stop, &mut events);
        events
    }

    fn reset_session(&mut self, reason: ResetReason, events: &mut Vec<CoachEvent>) {
        self.generation += 1;
        info!(
            generation = self.generation,
            "Session reset ({})",
            reason.as_str()
        );
        self.evaluators.reset();
        self.stabilizer.reset();
        if let Some(e) = self.session.reset() {
            events.push(CoachEvent::Session(e));
        }
        // The one-hand prompt stays current through a partial timeout
        if reason == ResetReason::PartialTimeout {
            self.guidance.carry_over(self.generation);
        } else {
            self.guidance.reset(self.generation);
        }
        events.push(CoachEvent::Reset {
            reason,
            generation: self.generation,
        });
    }

    fn snapshot(
        &self,
        now: u64,
        presence: PresenceKind,
        contact_score: u32,
        confidence: u32,
    ) -> Snapshot {
        let phase = self.session.phase();
        let elapsed_ms = self.session.elapsed_ms();
        let progress = Progress::for_phase(phase, elapsed_ms, self.config.session.target_ms);
        Snapshot {
            timestamp_ms: now,
            generation: self.generation,
            presence,
            contact_score,
            confidence,
            criteria: self.stabilizer.stable(),
            phase,
            elapsed_ms,
            percent_complete: progress.percent_complete,
            seconds_remaining: progress.seconds_remaining,
            guidance: self.guidance.current(),
        }
    }

    /// Generate s-expression for the coach status.
    pub fn status_sexp(&self) -> String {
        let guidance = self
            .guidance
            .current()
            .map(|g| quote(&g.text()))
            .unwrap_or_else(|| "nil".to_string());
        format!(
            "(:generation {} :ticks {} :last-tick-ms {} :phase :{} :elapsed-ms {} :criteria {} :lapsed {} :speaking {} :guidance {})",
            self.generation,
            self.ticks,
            self.last_tick_ms,
            self.session.phase().as_str(),
            self.session.elapsed_ms(),
            self.stabilizer.stable().to_sexp(),
            bool_sexp(self.validator.is_lapsed()),
            bool_sexp(self.guidance.is_speaking()),
            guidance,
        )
    }

    /// Generate s-expression for the active config.
    pub fn config_sexp(&self) -> String {
        self.config.to_sexp()
    }
}

// ── Tests ──────────────────────────────────────────────────
