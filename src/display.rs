use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::spool::{LatestJob, PrintSpooler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPhase {
    /// No job has ever been shown
    Idle,
    /// Actively rendering a job, hide timer running
    Showing(u64),
    /// Timer elapsed; screen cleared but the identity is remembered
    Hidden(u64),
}

/// Client-side display state, driven purely by polling the latest-job query.
///
/// Each job identity is rendered exactly once: a re-poll reporting the id
/// already shown never re-triggers display, and a newer id preempts whatever
/// is currently on screen (the caller restarts the hide timer).
#[derive(Debug)]
pub struct DisplaySession {
    phase: DisplayPhase,
    last_shown: Option<u64>,
}

impl Default for DisplaySession {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySession {
    pub fn new() -> Self {
        Self {
            phase: DisplayPhase::Idle,
            last_shown: None,
        }
    }

    pub fn phase(&self) -> DisplayPhase {
        self.phase
    }

    pub fn last_shown(&self) -> Option<u64> {
        self.last_shown
    }

    pub fn is_showing(&self) -> bool {
        matches!(self.phase, DisplayPhase::Showing(_))
    }

    /// Feed one poll result through the state machine.
    ///
    /// Returns the job identity to fetch and render when a transition to
    /// `Showing` occurs; the caller must then (re)start the hide timer.
    pub fn observe(&mut self, latest: &LatestJob) -> Option<u64> {
        match latest.id {
            Some(id) if latest.available && self.last_shown != Some(id) => {
                self.last_shown = Some(id);
                self.phase = DisplayPhase::Showing(id);
                Some(id)
            }
            _ => None,
        }
    }

    /// The hide timer elapsed while showing.
    pub fn timeout(&mut self) {
        if let DisplayPhase::Showing(id) = self.phase {
            self.phase = DisplayPhase::Hidden(id);
        }
    }
}

/// Where the session renders to. The embedded web page is the real surface;
/// headless deployments get a log-only one.
pub trait DisplaySurface: Send + Sync {
    fn show(&self, id: u64, content: &str);
    fn clear(&self);
}

/// Surface that just logs transitions, for headless `serve` runs.
pub struct LogSurface;

impl DisplaySurface for LogSurface {
    fn show(&self, id: u64, content: &str) {
        tracing::info!(job_id = id, chars = content.len(), "Showing print job");
    }

    fn clear(&self) {
        tracing::info!("Display window elapsed, hiding job");
    }
}

/// Drive a `DisplaySession` against the spooler until cancelled.
///
/// Polling is the only suspension point; the hide timer is armed on each
/// `Showing` transition and cancelled implicitly by preemption (a newer job
/// resets it).
pub async fn run_display_session(
    spooler: Arc<PrintSpooler>,
    surface: Arc<dyn DisplaySurface>,
    poll_interval: Duration,
    display_duration: Duration,
    shutdown: CancellationToken,
) {
    let mut session = DisplaySession::new();
    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let hide_timer = tokio::time::sleep(display_duration);
    tokio::pin!(hide_timer);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Display session shutting down");
                break;
            }
            _ = poll.tick() => {
                let latest = spooler.latest();
                if let Some(id) = session.observe(&latest) {
                    match spooler.content(id) {
                        Ok(content) => surface.show(id, &content),
                        Err(e) => {
                            tracing::warn!(job_id = id, error = %e, "Failed to fetch job content")
                        }
                    }
                    hide_timer
                        .as_mut()
                        .reset(tokio::time::Instant::now() + display_duration);
                }
            }
            _ = &mut hide_timer, if session.is_showing() => {
                session.timeout();
                surface.clear();
            }
        }
    }
}
