//! Realtime tile: progress that moves on its own, with an update pulse.
//!
//! DESIGN
//! ======
//! Two tasks run for the widget's lifetime:
//! - poll: every `poll_interval` (first tick one interval after start) asks
//!   the project store to simulate progress on the bound project;
//! - pulse: watches the project list and the binding, lights `is_updating`
//!   whenever the resolved project differs from the last one seen, and turns
//!   it off `pulse` after the most recent change.
//!
//! Both tasks are aborted by `stop()` and on drop, so a torn-down widget never
//! mutates the store again.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::config::RealtimeTimings;
use crate::metrics::project_progress;
use crate::model::{Project, WidgetKind};
use crate::services::project::ProjectStore;
use crate::widgets::{Widget, WidgetHandle};

#[cfg(test)]
#[path = "realtime_test.rs"]
mod realtime_test;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealtimeStatus {
    pub is_updating: bool,
    pub last_update: Option<OffsetDateTime>,
}

pub struct RealtimeWidget {
    handle: WidgetHandle,
    bound: watch::Sender<Option<u32>>,
    status: Arc<watch::Sender<RealtimeStatus>>,
    tasks: Vec<JoinHandle<()>>,
}

impl RealtimeWidget {
    /// Bind to `handle`'s project and start polling and pulse tasks.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(handle: WidgetHandle, store: Arc<ProjectStore>, timings: RealtimeTimings, clock: Arc<dyn Clock>) -> Self {
        let (bound, _) = watch::channel(handle.project_id());
        let (status, _) = watch::channel(RealtimeStatus::default());
        let status = Arc::new(status);

        let poll = tokio::spawn(poll_loop(store, bound.subscribe(), timings.poll_interval));
        let pulse = tokio::spawn(pulse_loop(
            handle.projects_receiver(),
            bound.subscribe(),
            status.clone(),
            timings.pulse,
            clock,
        ));
        debug!(project_id = ?handle.project_id(), "realtime widget started");

        Self { handle, bound, status, tasks: vec![poll, pulse] }
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.handle.project().map_or(0.0, |p| project_progress(&p))
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.status.borrow().is_updating
    }

    #[must_use]
    pub fn last_update(&self) -> Option<OffsetDateTime> {
        self.status.borrow().last_update
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<RealtimeStatus> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }

    /// Cancel both timers. Idempotent.
    pub fn stop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.status.send_modify(|s| s.is_updating = false);
        debug!(project_id = ?self.handle.project_id(), "realtime widget stopped");
    }
}

impl Widget for RealtimeWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Realtime
    }

    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }

    fn set_project_id(&mut self, project_id: Option<u32>) {
        self.handle.set_project_id(project_id);
        self.bound.send_replace(project_id);
    }
}

impl Drop for RealtimeWidget {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(store: Arc<ProjectStore>, bound: watch::Receiver<Option<u32>>, every: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let project_id = *bound.borrow();
        if let Some(project_id) = project_id {
            store.update_project_progress(project_id);
        }
    }
}

async fn pulse_loop(
    mut projects: watch::Receiver<Vec<Project>>,
    mut bound: watch::Receiver<Option<u32>>,
    status: Arc<watch::Sender<RealtimeStatus>>,
    pulse: Duration,
    clock: Arc<dyn Clock>,
) {
    let mut last_seen: Option<Project> = None;
    let mut decay_at: Option<Instant> = None;

    loop {
        let current = {
            let id = *bound.borrow_and_update();
            let list = projects.borrow_and_update();
            id.and_then(|id| list.iter().find(|p| p.id == id).cloned())
        };
        if current.is_some() && current != last_seen {
            let now = clock.now();
            status.send_modify(|s| {
                s.is_updating = true;
                s.last_update = Some(now);
            });
            decay_at = Some(Instant::now() + pulse);
            trace!(project_id = ?current.as_ref().map(|p| p.id), "realtime pulse");
        }
        last_seen = current;

        tokio::select! {
            changed = projects.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = bound.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            () = tokio::time::sleep_until(decay_at.unwrap_or_else(Instant::now)), if decay_at.is_some() => {
                status.send_modify(|s| s.is_updating = false);
                decay_at = None;
            }
        }
    }
}
