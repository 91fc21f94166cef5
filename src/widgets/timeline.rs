//! Timeline tile: status badge, calendar progress, and task count.

use std::sync::Arc;

use crate::clock::Clock;
use crate::metrics::{TimelineMetrics, format_date, project_status};
use crate::model::{ProjectStatus, WidgetKind};
use crate::widgets::{Widget, WidgetHandle};

#[cfg(test)]
#[path = "timeline_test.rs"]
mod timeline_test;

pub struct TimelineWidget {
    handle: WidgetHandle,
    clock: Arc<dyn Clock>,
}

impl TimelineWidget {
    #[must_use]
    pub fn new(handle: WidgetHandle, clock: Arc<dyn Clock>) -> Self {
        Self { handle, clock }
    }

    #[must_use]
    pub fn status(&self) -> Option<ProjectStatus> {
        self.handle.project().map(|p| project_status(&p, self.clock.now()))
    }

    #[must_use]
    pub fn status_label(&self) -> &'static str {
        self.status().map_or("", ProjectStatus::label)
    }

    #[must_use]
    pub fn status_class(&self) -> String {
        self.status().map(ProjectStatus::css_class).unwrap_or_default()
    }

    /// Calendar metrics at the clock's current instant; all zero when unbound.
    #[must_use]
    pub fn metrics(&self) -> TimelineMetrics {
        self.handle
            .project()
            .map_or_else(TimelineMetrics::default, |p| TimelineMetrics::compute(&p, self.clock.now()))
    }

    #[must_use]
    pub fn duration_days(&self) -> i64 {
        self.metrics().duration_days
    }

    #[must_use]
    pub fn days_elapsed(&self) -> i64 {
        self.metrics().days_elapsed
    }

    #[must_use]
    pub fn days_remaining(&self) -> i64 {
        self.metrics().days_remaining
    }

    #[must_use]
    pub fn time_progress(&self) -> f64 {
        self.metrics().time_progress
    }

    /// `"<left>/<total>"`, e.g. `5/85`.
    #[must_use]
    pub fn tasks_left(&self) -> String {
        self.handle
            .project()
            .map(|p| format!("{}/{}", p.tasks_remaining(), p.tasks_total))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn start_label(&self) -> String {
        self.handle.project().map(|p| format_date(p.start_date)).unwrap_or_default()
    }

    #[must_use]
    pub fn end_label(&self) -> String {
        self.handle.project().map(|p| format_date(p.end_date)).unwrap_or_default()
    }
}

impl Widget for TimelineWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Timeline
    }

    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }

    fn set_project_id(&mut self, project_id: Option<u32>) {
        self.handle.set_project_id(project_id);
    }
}
