//! Tick scheduler — calloop timers driving the coach.
//!
//! A tick timer pulls one observation per period from the source, runs the
//! coach, forwards announcements to the speech sink, and publishes the
//! render frame.  A separate ~60 Hz render timer reads the latest frame
//! from the publisher, so the render path never waits on a tick.  The
//! loop exits on SIGINT/SIGTERM, when the exit timer fires, or when the
//! source runs dry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use tracing::{debug, info, trace};

use super::ObservationSource;
use crate::coach::{Coach, CoachEvent};
use crate::hand::overlay;
use crate::session::SessionEvent;
use crate::snapshot::{RenderFrame, SnapshotPublisher};
use crate::speech::SpeechSink;

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Classifier tick period in milliseconds (~15 Hz).
    pub tick_ms: u64,
    /// Render poll period in milliseconds (~60 Hz).
    pub render_ms: u64,
    /// Overlay canvas width in pixels.
    pub width: u32,
    /// Overlay canvas height in pixels.
    pub height: u32,
    /// Stop after this long, if set.
    pub exit_after: Option<Duration>,
    /// Period of the status log line.
    pub status_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 66,
            render_ms: 16,
            width: 1280,
            height: 720,
            exit_after: None,
            status_interval: Duration::from_secs(10),
        }
    }
}

impl SchedulerConfig {
    /// Parse a "WxH" resolution string. Returns (width, height) or None.
    pub fn parse_resolution(s: &str) -> Option<(u32, u32)> {
        let (w, h) = s.split_once('x')?;
        let w = w.parse::<u32>().ok()?;
        let h = h.parse::<u32>().ok()?;
        if w > 0 && h > 0 {
            Some((w, h))
        } else {
            None
        }
    }
}

/// Counters reported when a run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub announcements: u64,
    pub completions: u64,
    pub resets: u64,
    /// Distinct frames picked up by the render timer.
    pub frames_rendered: u64,
}

impl RunSummary {
    pub fn to_sexp(&self) -> String {
        format!(
            "(:ticks {} :announcements {} :completions {} :resets {} :frames-rendered {})",
            self.ticks, self.announcements, self.completions, self.resets, self.frames_rendered
        )
    }
}

/// One source, one coach, one speech sink, and the publisher between
/// them and the renderer.
pub struct Pipeline {
    pub coach: Coach,
    source: Box<dyn ObservationSource>,
    speech: Box<dyn SpeechSink>,
    publisher: SnapshotPublisher,
    width: u32,
    height: u32,
    pub summary: RunSummary,
    /// Timestamp of the last frame the render timer picked up.
    last_rendered: Option<u64>,
    running: bool,
}

impl Pipeline {
    pub fn new(
        coach: Coach,
        source: Box<dyn ObservationSource>,
        speech: Box<dyn SpeechSink>,
        publisher: SnapshotPublisher,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            coach,
            source,
            speech,
            publisher,
            width,
            height,
            summary: RunSummary::default(),
            last_rendered: None,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one tick at `now_ms` since start.  Returns false once the
    /// source is exhausted.
    pub fn step(&mut self, now_ms: u64) -> bool {
        let Some(obs) = self.source.next_observation(now_ms) else {
            info!("{} source exhausted", self.source.name());
            self.running = false;
            return false;
        };
        let t = obs.timestamp_ms;

        if let Some(done) = self.speech.poll_finished(t) {
            self.coach.speech_finished(done);
        }

        let out = self.coach.tick(&obs);
        self.summary.ticks += 1;
        for event in &out.events {
            match event {
                CoachEvent::Session(SessionEvent::Completed { .. }) => {
                    self.summary.completions += 1
                }
                CoachEvent::Reset { .. } => self.summary.resets += 1,
                _ => {}
            }
        }

        if let Some(request) = out.announce {
            self.speech.announce(&request, t);
            self.summary.announcements += 1;
        }

        trace!("{}", out.snapshot.to_sexp());
        self.publisher.publish(RenderFrame {
            snapshot: out.snapshot,
            overlay: overlay::project(&obs, self.width, self.height),
        });
        true
    }

    /// Pick up the latest published frame, if it is new.
    pub fn render(&mut self) {
        let Some(frame) = self.publisher.latest() else {
            return;
        };
        let t = frame.snapshot.timestamp_ms;
        if self.last_rendered == Some(t) {
            return;
        }
        self.last_rendered = Some(t);
        self.summary.frames_rendered += 1;
        trace!(
            "Render t={} phase={} {} overlay point(s)",
            t,
            frame.snapshot.phase.as_str(),
            frame.overlay.len()
        );
    }
}

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Drive `pipeline` from calloop timers until it stops.
pub fn run(mut pipeline: Pipeline, config: &SchedulerConfig) -> anyhow::Result<RunSummary> {
    let mut event_loop = EventLoop::<Pipeline>::try_new()?;
    let start = Instant::now();

    let tick = Duration::from_millis(config.tick_ms.max(1));
    event_loop
        .handle()
        .insert_source(Timer::immediate(), move |_, _, pipeline: &mut Pipeline| {
            let now_ms = start.elapsed().as_millis() as u64;
            if pipeline.step(now_ms) {
                TimeoutAction::ToDuration(tick)
            } else {
                TimeoutAction::Drop
            }
        })
        .map_err(|e| anyhow::anyhow!("failed to insert tick timer: {:?}", e))?;

    let render = Duration::from_millis(config.render_ms.max(1));
    event_loop
        .handle()
        .insert_source(Timer::from_duration(render), move |_, _, pipeline: &mut Pipeline| {
            pipeline.render();
            TimeoutAction::ToDuration(render)
        })
        .map_err(|e| anyhow::anyhow!("failed to insert render timer: {:?}", e))?;

    // Signal handling via libc
    install_signal_handlers();

    let mut last_status_log = Instant::now();
    info!(
        "Scheduler running (tick {}ms, render {}ms, source {})",
        config.tick_ms,
        config.render_ms,
        pipeline.source.name()
    );

    while pipeline.running {
        // Check global shutdown flag (set by signal handler)
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            info!("Shutdown signal received, exiting");
            pipeline.running = false;
            break;
        }

        if let Some(dur) = config.exit_after {
            if start.elapsed() >= dur {
                info!("Exit timer fired after {}s", dur.as_secs());
                pipeline.running = false;
                break;
            }
        }

        if last_status_log.elapsed() >= config.status_interval {
            info!("Coach status: {}", pipeline.coach.status_sexp());
            last_status_log = Instant::now();
        }

        event_loop.dispatch(Some(render), &mut pipeline)?;
    }

    // Show whatever the last tick published
    pipeline.render();
    debug!("Final status: {}", pipeline.coach.status_sexp());
    info!("Scheduler stopped: {}", pipeline.summary.to_sexp());
    Ok(pipeline.summary)
}
