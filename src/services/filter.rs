//! Filtering engine: visible projects and widgets for the current filters.
//!
//! DESIGN
//! ======
//! The filter functions are pure over (projects, widgets, filters, now).
//! `DashboardView` memoizes them over the two stores: it holds one receiver
//! per store plus the clock, and recomputes on read only when a store has
//! published since the last computation or the UTC date has moved on (status
//! is date-driven, so the same inputs can derive differently tomorrow).

use std::sync::Arc;

use time::{Date, OffsetDateTime, Time};
use tokio::sync::watch;
use tracing::trace;

use crate::clock::Clock;
use crate::metrics::project_status;
use crate::model::{DashboardFilters, DashboardState, Project, WidgetConfig};
use crate::services::layout::DashboardLayoutStore;
use crate::services::project::ProjectStore;

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;

/// Name contains the search text (case-insensitive) and the status filter accepts it.
#[must_use]
pub fn project_matches(project: &Project, filters: &DashboardFilters, now: OffsetDateTime) -> bool {
    matches_lowered(project, &filters.search_text.to_lowercase(), filters, now)
}

fn matches_lowered(project: &Project, needle: &str, filters: &DashboardFilters, now: OffsetDateTime) -> bool {
    let name_hit = needle.is_empty() || project.name.to_lowercase().contains(needle);
    name_hit && filters.status.matches(project_status(project, now))
}

#[must_use]
pub fn filter_projects(projects: &[Project], filters: &DashboardFilters, now: OffsetDateTime) -> Vec<Project> {
    let needle = filters.search_text.to_lowercase();
    projects
        .iter()
        .filter(|p| matches_lowered(p, &needle, filters, now))
        .cloned()
        .collect()
}

/// Widgets whose project passes the filters, in their configured order.
///
/// Default filters return every widget, including ones without a resolvable
/// project. Any active filter drops unresolvable widgets.
#[must_use]
pub fn filter_widgets(
    widgets: &[WidgetConfig],
    projects: &[Project],
    filters: &DashboardFilters,
    now: OffsetDateTime,
) -> Vec<WidgetConfig> {
    if filters.is_default() {
        return widgets.to_vec();
    }
    let needle = filters.search_text.to_lowercase();
    widgets
        .iter()
        .filter(|widget| {
            widget
                .project_id
                .and_then(|id| projects.iter().find(|p| p.id == id))
                .is_some_and(|p| matches_lowered(p, &needle, filters, now))
        })
        .cloned()
        .collect()
}

// =============================================================================
// MEMOIZED VIEW
// =============================================================================

struct Derived {
    date: Date,
    /// Built exactly at the UTC day start, before end-date-today projects turn overdue.
    at_day_start: bool,
    projects: Vec<Project>,
    widgets: Vec<WidgetConfig>,
}

/// Derived filtered projects and widgets over live stores.
pub struct DashboardView {
    projects: watch::Receiver<Vec<Project>>,
    layout: watch::Receiver<DashboardState>,
    clock: Arc<dyn Clock>,
    derived: Option<Derived>,
    recomputations: u64,
}

impl DashboardView {
    #[must_use]
    pub fn new(projects: &ProjectStore, layout: &DashboardLayoutStore, clock: Arc<dyn Clock>) -> Self {
        Self::from_receivers(projects.subscribe(), layout.subscribe(), clock)
    }

    #[must_use]
    pub fn from_receivers(
        projects: watch::Receiver<Vec<Project>>,
        layout: watch::Receiver<DashboardState>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { projects, layout, clock, derived: None, recomputations: 0 }
    }

    pub fn filtered_projects(&mut self) -> &[Project] {
        &self.refresh().projects
    }

    pub fn filtered_widgets(&mut self) -> &[WidgetConfig] {
        &self.refresh().widgets
    }

    /// How many times the derived lists have been rebuilt.
    #[must_use]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    fn refresh(&mut self) -> &Derived {
        let now = self.clock.now().to_offset(time::UtcOffset::UTC);
        let date = now.date();
        let at_day_start = now.time() == Time::MIDNIGHT;
        // A closed channel means the store is gone; keep serving the last values.
        let inputs_changed =
            self.projects.has_changed().unwrap_or(false) || self.layout.has_changed().unwrap_or(false);
        // Overdue starts strictly after end-date midnight, so a midnight build
        // expires on the next later read of the same day.
        let stale = inputs_changed
            || self
                .derived
                .as_ref()
                .is_none_or(|d| d.date != date || (d.at_day_start && !at_day_start));

        if stale {
            let projects = self.projects.borrow_and_update();
            let layout = self.layout.borrow_and_update();
            let derived = Derived {
                date,
                at_day_start,
                projects: filter_projects(&projects, &layout.filters, now),
                widgets: filter_widgets(&layout.widgets, &projects, &layout.filters, now),
            };
            drop(projects);
            drop(layout);
            self.recomputations += 1;
            trace!(
                projects = derived.projects.len(),
                widgets = derived.widgets.len(),
                "dashboard view recomputed"
            );
            self.derived = Some(derived);
        }

        self.derived.get_or_insert_with(|| Derived { date, at_day_start, projects: Vec::new(), widgets: Vec::new() })
    }
}
