//! Dashboard page: toolbar inputs, drag-drop reorder, add/remove, mounting.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the page-level controller the rendering layer talks to. It owns no
//! state of its own beyond the add-widget dialog draft: filters and widget
//! order live in the layout store, projects in the project store, and the
//! visible lists come from a memoized `DashboardView` over both.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::RealtimeTimings;
use crate::model::{ParseStatusError, Project, StatusFilter, WidgetConfig, WidgetKind};
use crate::services::filter::DashboardView;
use crate::services::layout::{DashboardLayoutStore, move_item};
use crate::services::project::ProjectStore;
use crate::widgets::{
    ProgressWidget, RealtimeWidget, StatisticsWidget, TimelineWidget, Widget, WidgetHandle,
};

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

/// State of the "add widget" dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddWidgetDraft {
    pub open: bool,
    pub project_id: Option<u32>,
    pub kind: WidgetKind,
}

/// A live widget view built from a `WidgetConfig`.
pub enum MountedWidget {
    Progress(ProgressWidget),
    Statistics(StatisticsWidget),
    Timeline(TimelineWidget),
    Realtime(RealtimeWidget),
}

impl MountedWidget {
    #[must_use]
    pub fn as_widget(&self) -> &dyn Widget {
        match self {
            Self::Progress(w) => w,
            Self::Statistics(w) => w,
            Self::Timeline(w) => w,
            Self::Realtime(w) => w,
        }
    }
}

pub struct Dashboard {
    projects: Arc<ProjectStore>,
    layout: Arc<DashboardLayoutStore>,
    clock: Arc<dyn Clock>,
    timings: RealtimeTimings,
    view: DashboardView,
    draft: AddWidgetDraft,
}

impl Dashboard {
    #[must_use]
    pub fn new(
        projects: Arc<ProjectStore>,
        layout: Arc<DashboardLayoutStore>,
        clock: Arc<dyn Clock>,
        timings: RealtimeTimings,
    ) -> Self {
        let view = DashboardView::new(&projects, &layout, clock.clone());
        Self { projects, layout, clock, timings, view, draft: AddWidgetDraft::default() }
    }

    // =========================================================================
    // READS
    // =========================================================================

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.projects.is_loading()
    }

    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.projects.projects()
    }

    pub fn filtered_projects(&mut self) -> &[Project] {
        self.view.filtered_projects()
    }

    pub fn filtered_widgets(&mut self) -> &[WidgetConfig] {
        self.view.filtered_widgets()
    }

    #[must_use]
    pub fn widgets(&self) -> Vec<WidgetConfig> {
        self.layout.widgets()
    }

    #[must_use]
    pub fn search_text(&self) -> String {
        self.layout.search_text()
    }

    #[must_use]
    pub fn status_filter(&self) -> StatusFilter {
        self.layout.status_filter()
    }

    #[must_use]
    pub fn draft(&self) -> AddWidgetDraft {
        self.draft
    }

    // =========================================================================
    // TOOLBAR
    // =========================================================================

    pub fn on_search_change(&self, value: &str) {
        self.layout.update_search_text(value);
    }

    /// Apply a status selector value (`all` or a status wire name).
    pub fn on_status_change(&self, value: &str) -> Result<(), ParseStatusError> {
        let status = value.parse::<StatusFilter>().inspect_err(|e| warn!(error = %e, "status filter rejected"))?;
        self.layout.update_status_filter(status);
        Ok(())
    }

    /// Move the widget dropped from `previous` to `current` in the full list.
    pub fn on_drop(&self, previous: usize, current: usize) {
        if previous == current {
            return;
        }
        let mut widgets = self.layout.widgets();
        move_item(&mut widgets, previous, current);
        debug!(previous, current, "widget reordered");
        self.layout.update_widgets(widgets);
    }

    // =========================================================================
    // ADD / REMOVE / RESET
    // =========================================================================

    /// Open the dialog, preselecting the first project the filters show.
    pub fn open_add_widget(&mut self) {
        let first = self.view.filtered_projects().first().map(|p| p.id);
        self.draft.project_id = first;
        self.draft.open = true;
    }

    pub fn close_add_widget(&mut self) {
        self.draft.open = false;
    }

    pub fn select_project(&mut self, project_id: Option<u32>) {
        self.draft.project_id = project_id;
    }

    pub fn select_kind(&mut self, kind: WidgetKind) {
        self.draft.kind = kind;
    }

    /// Create a widget from the dialog draft. Needs a selected project.
    pub fn add_widget(&mut self) -> Option<WidgetConfig> {
        let project_id = self.draft.project_id?;
        let widget = WidgetConfig::new(self.draft.kind, Some(project_id));
        info!(id = %widget.id, kind = ?widget.kind, project_id, "widget added");
        self.layout.add_widget(widget.clone());
        self.close_add_widget();
        Some(widget)
    }

    pub fn remove_widget(&self, id: &str) {
        info!(%id, "widget removed");
        self.layout.remove_widget(id);
    }

    pub fn reset(&mut self) {
        self.layout.reset_state();
        self.draft = AddWidgetDraft::default();
    }

    // =========================================================================
    // MOUNTING
    // =========================================================================

    /// Build the view for `config`, wired so closing it removes the widget.
    ///
    /// Realtime views start their timers immediately and need a tokio runtime.
    #[must_use]
    pub fn mount(&self, config: &WidgetConfig) -> MountedWidget {
        let layout = Arc::downgrade(&self.layout);
        let id = config.id.clone();
        let handle = WidgetHandle::new(&self.projects, config.project_id).on_remove(Arc::new(move || {
            if let Some(layout) = layout.upgrade() {
                layout.remove_widget(&id);
            }
        }));

        match config.kind {
            WidgetKind::Progress => MountedWidget::Progress(ProgressWidget::new(handle)),
            WidgetKind::Statistics => MountedWidget::Statistics(StatisticsWidget::new(handle)),
            WidgetKind::Timeline => MountedWidget::Timeline(TimelineWidget::new(handle, self.clock.clone())),
            WidgetKind::Realtime => MountedWidget::Realtime(RealtimeWidget::start(
                handle,
                self.projects.clone(),
                self.timings,
                self.clock.clone(),
            )),
        }
    }
}
