//! Task statistics tile: progress, remaining count, and a donut chart.
//!
//! DESIGN
//! ======
//! Chart rendering belongs to the charting library behind `DonutChart`. The
//! widget only decides what the two segments are and when to push them: the
//! first push renders the chart, later pushes happen only when the counters
//! actually changed.
//!
//! Once a chart is attached, a follower task watches the project list and the
//! binding and pushes new segments on its own. `sync_chart` stays available
//! for an immediate push. The follower is aborted on drop.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::metrics::project_progress;
use crate::model::{Project, WidgetKind};
use crate::widgets::{Widget, WidgetHandle};

#[cfg(test)]
#[path = "statistics_test.rs"]
mod statistics_test;

pub const SEGMENT_LABELS: [&str; 2] = ["Completed", "Remaining"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonutSegments {
    pub completed: u32,
    pub remaining: u32,
}

impl DonutSegments {
    fn of(project: &Project) -> Self {
        Self { completed: project.tasks_completed, remaining: project.tasks_remaining() }
    }
}

/// Sink for the two-segment donut visualization.
pub trait DonutChart: Send {
    /// Draw the chart for the first time.
    fn render(&mut self, labels: [&'static str; 2], segments: DonutSegments);

    /// Replace the data of an already drawn chart.
    fn update(&mut self, segments: DonutSegments);
}

#[derive(Default)]
struct ChartSlot {
    chart: Option<Box<dyn DonutChart>>,
    pushed: Option<DonutSegments>,
}

impl ChartSlot {
    fn push(&mut self, segments: Option<DonutSegments>) -> bool {
        let Some(segments) = segments else {
            return false;
        };
        let Some(chart) = self.chart.as_mut() else {
            return false;
        };
        match self.pushed {
            None => chart.render(SEGMENT_LABELS, segments),
            Some(shown) if shown == segments => return false,
            Some(_) => chart.update(segments),
        }
        self.pushed = Some(segments);
        true
    }
}

fn lock(slot: &Mutex<ChartSlot>) -> std::sync::MutexGuard<'_, ChartSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct StatisticsWidget {
    handle: WidgetHandle,
    bound: watch::Sender<Option<u32>>,
    slot: Arc<Mutex<ChartSlot>>,
    follower: Option<JoinHandle<()>>,
}

impl StatisticsWidget {
    #[must_use]
    pub fn new(handle: WidgetHandle) -> Self {
        let (bound, _) = watch::channel(handle.project_id());
        Self { handle, bound, slot: Arc::default(), follower: None }
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.handle.project().map_or(0.0, |p| project_progress(&p))
    }

    #[must_use]
    pub fn tasks_remaining(&self) -> u32 {
        self.handle.project().map_or(0, |p| p.tasks_remaining())
    }

    #[must_use]
    pub fn segments(&self) -> Option<DonutSegments> {
        self.handle.project().map(|p| DonutSegments::of(&p))
    }

    /// Attach the chart surface, draw it if a project is already bound, and
    /// keep it in step with the store from then on.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach_chart(&mut self, chart: Box<dyn DonutChart>) {
        *lock(&self.slot) = ChartSlot { chart: Some(chart), pushed: None };
        self.sync_chart();

        if let Some(previous) = self.follower.take() {
            previous.abort();
        }
        self.follower = Some(tokio::spawn(follow_loop(
            self.handle.projects_receiver(),
            self.bound.subscribe(),
            self.slot.clone(),
        )));
    }

    /// Push current segments to the chart if they differ from what it shows.
    ///
    /// Returns `true` when the chart was drawn or updated.
    pub fn sync_chart(&mut self) -> bool {
        let segments = self.segments();
        lock(&self.slot).push(segments)
    }

    /// Whether the store follower is running.
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.follower.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Widget for StatisticsWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Statistics
    }

    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }

    fn set_project_id(&mut self, project_id: Option<u32>) {
        self.handle.set_project_id(project_id);
        self.bound.send_replace(project_id);
    }
}

impl Drop for StatisticsWidget {
    fn drop(&mut self) {
        if let Some(follower) = self.follower.take() {
            follower.abort();
        }
    }
}

async fn follow_loop(
    mut projects: watch::Receiver<Vec<Project>>,
    mut bound: watch::Receiver<Option<u32>>,
    slot: Arc<Mutex<ChartSlot>>,
) {
    loop {
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
        }
        let segments = {
            let id = *bound.borrow_and_update();
            let list = projects.borrow_and_update();
            id.and_then(|id| list.iter().find(|p| p.id == id).map(DonutSegments::of))
        };
        if lock(&slot).push(segments) {
            trace!(?segments, "statistics chart refreshed");
        }
    }
}
