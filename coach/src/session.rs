//! Session state machine — owns the washing timer.
//!
//! `Idle → Arming → Timing → Complete → Idle`.  Arming begins on the first
//! evaluated two-hand tick; timing starts the instant any stabilized
//! criterion holds and keeps its start time through criterion dips as long
//! as at least one criterion stays met.  Completion fires once per timing
//! run and is held for a display period before the machine idles again.

use tracing::{debug, info};

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session running.
    Idle,
    /// Two hands tracked, waiting for a criterion to stabilize.
    Arming,
    /// Timer running.
    Timing,
    /// Target reached; completion being displayed.
    Complete,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Arming => "arming",
            Self::Timing => "timing",
            Self::Complete => "complete",
        }
    }
}

/// Configuration for the session timer.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Washing time required for completion (ms).
    pub target_ms: u64,
    /// How long the completion acknowledgment is held (ms).
    pub completion_display_ms: u64,
    /// How long all criteria may stay unmet before the timer is
    /// cancelled (ms).  Zero cancels on the first such tick.
    pub arming_grace_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_ms: 20_000,
            completion_display_ms: 3000,
            arming_grace_ms: 0,
        }
    }
}

/// Transitions reported by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    PhaseChanged {
        from: SessionPhase,
        to: SessionPhase,
    },
    TimingStarted {
        start_ms: u64,
    },
    TimerCancelled {
        elapsed_ms: u64,
    },
    Completed {
        elapsed_ms: u64,
    },
    /// Completion display period ended.
    CompletionCleared,
}

impl SessionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. } => "phase-changed",
            Self::TimingStarted { .. } => "timing-started",
            Self::TimerCancelled { .. } => "timer-cancelled",
            Self::Completed { .. } => "completed",
            Self::CompletionCleared => "completion-cleared",
        }
    }
}

/// Washing session timer.
#[derive(Debug)]
pub struct SessionMachine {
    pub config: SessionConfig,
    phase: SessionPhase,
    /// Timer start, set once per timing run.
    start_ms: Option<u64>,
    /// `now - start` as of the latest tick while timing; frozen at the
    /// completion value while complete.
    elapsed_ms: u64,
    completed_this_session: bool,
    /// When the completion display began.
    completed_at_ms: Option<u64>,
    /// First tick of the current all-criteria-unmet stretch while timing.
    unmet_since_ms: Option<u64>,
}

impl SessionMachine {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            phase: SessionPhase::Idle,
            start_ms: None,
            elapsed_ms: 0,
            completed_this_session: false,
            completed_at_ms: None,
            unmet_since_ms: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn start_ms(&self) -> Option<u64> {
        self.start_ms
    }

    /// Elapsed washing time; zero unless timing or complete.
    pub fn elapsed_ms(&self) -> u64 {
        match self.phase {
            SessionPhase::Timing | SessionPhase::Complete => self.elapsed_ms,
            _ => 0,
        }
    }

    pub fn completed_this_session(&self) -> bool {
        self.completed_this_session
    }

    fn transition(&mut self, to: SessionPhase, events: &mut Vec<SessionEvent>) {
        let from = self.phase;
        if from == to {
            return;
        }
        debug!("Session {} -> {}", from.as_str(), to.as_str());
        self.phase = to;
        events.push(SessionEvent::PhaseChanged { from, to });
    }

    /// Advance on a tick whose two-hand frame was evaluated; `passed` is
    /// the number of stabilized criteria currently met.
    pub fn on_evaluated(&mut self, passed: usize, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if self.phase == SessionPhase::Complete {
            self.expire_completion(now_ms, &mut events);
            return events;
        }

        if self.phase == SessionPhase::Idle {
            self.completed_this_session = false;
            self.transition(SessionPhase::Arming, &mut events);
        }

        if self.phase == SessionPhase::Arming && passed >= 1 {
            let start = *self.start_ms.get_or_insert(now_ms);
            self.elapsed_ms = 0;
            self.unmet_since_ms = None;
            self.transition(SessionPhase::Timing, &mut events);
            info!("Washing timer started at {}ms", start);
            events.push(SessionEvent::TimingStarted { start_ms: start });
        }

        if self.phase == SessionPhase::Timing {
            self.elapsed_ms = self.start_ms.map_or(0, |s| now_ms.saturating_sub(s));

            if passed == 0 {
                let since = *self.unmet_since_ms.get_or_insert(now_ms);
                if now_ms.saturating_sub(since) >= self.config.arming_grace_ms {
                    let elapsed_ms = self.elapsed_ms;
                    info!("Washing stopped after {}ms, timer cancelled", elapsed_ms);
                    self.clear_timer();
                    self.transition(SessionPhase::Idle, &mut events);
                    events.push(SessionEvent::TimerCancelled { elapsed_ms });
                    return events;
                }
            } else {
                self.unmet_since_ms = None;
            }

            if !self.completed_this_session && self.elapsed_ms >= self.config.target_ms {
                self.completed_this_session = true;
                self.completed_at_ms = Some(now_ms);
                info!("Washing complete after {}ms", self.elapsed_ms);
                self.transition(SessionPhase::Complete, &mut events);
                events.push(SessionEvent::Completed {
                    elapsed_ms: self.elapsed_ms,
                });
            }
        }

        events
    }

    /// Advance on a tick without a two-hand frame.  Only the completion
    /// display can expire here; the timer keeps running until the
    /// occlusion latch resets the session.
    pub fn on_unevaluated(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        match self.phase {
            SessionPhase::Complete => self.expire_completion(now_ms, &mut events),
            SessionPhase::Timing => {
                self.elapsed_ms = self.start_ms.map_or(0, |s| now_ms.saturating_sub(s));
            }
            _ => {}
        }
        events
    }

    fn expire_completion(&mut self, now_ms: u64, events: &mut Vec<SessionEvent>) {
        let Some(at) = self.completed_at_ms else {
            return;
        };
        if now_ms.saturating_sub(at) >= self.config.completion_display_ms {
            debug!("Completion display ended");
            self.clear_timer();
            self.transition(SessionPhase::Idle, events);
            events.push(SessionEvent::CompletionCleared);
        }
    }

    fn clear_timer(&mut self) {
        self.start_ms = None;
        self.elapsed_ms = 0;
        self.completed_at_ms = None;
        self.unmet_since_ms = None;
    }

    /// Drop the session and return to idle.  Reports the phase change if
    /// there was one.
    pub fn reset(&mut self) -> Option<SessionEvent> {
        self.clear_timer();
        self.completed_this_session = false;
        let mut events = Vec::with_capacity(1);
        self.transition(SessionPhase::Idle, &mut events);
        events.pop()
    }
}

// ── Tests ──────────────────────────────────────────────────
