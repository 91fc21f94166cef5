//! Progress tile: percentage of tasks completed.

use crate::metrics::project_progress;
use crate::model::WidgetKind;
use crate::widgets::{Widget, WidgetHandle};

#[cfg(test)]
#[path = "progress_test.rs"]
mod progress_test;

pub struct ProgressWidget {
    handle: WidgetHandle,
}

impl ProgressWidget {
    #[must_use]
    pub fn new(handle: WidgetHandle) -> Self {
        Self { handle }
    }

    /// Completion percentage, 0 when no project is bound.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.handle.project().map_or(0.0, |p| project_progress(&p))
    }
}

impl Widget for ProgressWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Progress
    }

    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }

    fn set_project_id(&mut self, project_id: Option<u32>) {
        self.handle.set_project_id(project_id);
    }
}
