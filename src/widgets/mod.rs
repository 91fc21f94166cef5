//! Widget views: per-project derived values behind each dashboard tile.
//!
//! DESIGN
//! ======
//! Every view is bound to at most one project id and resolves that project
//! through a Project Store receiver on each read, so it always reflects the
//! latest published list. A dangling id resolves to nothing and the view
//! reports empty values. Closing a view only invokes the removal callback the
//! composing page supplied; the page owns the layout.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{Project, WidgetKind};
use crate::services::project::ProjectStore;

pub mod progress;
pub mod realtime;
pub mod statistics;
pub mod timeline;


pub use progress::ProgressWidget;
pub use realtime::{RealtimeStatus, RealtimeWidget};
pub use statistics::{DonutChart, DonutSegments, StatisticsWidget};
pub use timeline::TimelineWidget;

/// Invoked when the user dismisses a widget.
pub type RemoveCallback = Arc<dyn Fn() + Send + Sync>;

/// Project binding and close action shared by all widget views.
pub struct WidgetHandle {
    projects: watch::Receiver<Vec<Project>>,
    project_id: Option<u32>,
    on_remove: Option<RemoveCallback>,
}

impl WidgetHandle {
    #[must_use]
    pub fn new(store: &ProjectStore, project_id: Option<u32>) -> Self {
        Self { projects: store.subscribe(), project_id, on_remove: None }
    }

    #[must_use]
    pub fn on_remove(mut self, callback: RemoveCallback) -> Self {
        self.on_remove = Some(callback);
        self
    }

    #[must_use]
    pub fn project_id(&self) -> Option<u32> {
        self.project_id
    }

    pub(crate) fn set_project_id(&mut self, project_id: Option<u32>) {
        self.project_id = project_id;
    }

    /// The bound project as currently published, if it exists.
    #[must_use]
    pub fn project(&self) -> Option<Project> {
        let id = self.project_id?;
        self.projects.borrow().iter().find(|p| p.id == id).cloned()
    }

    pub(crate) fn projects_receiver(&self) -> watch::Receiver<Vec<Project>> {
        self.projects.clone()
    }

    pub fn close(&self) {
        if let Some(callback) = &self.on_remove {
            callback();
        }
    }
}

/// Common surface of the four widget views.
pub trait Widget {
    fn kind(&self) -> WidgetKind;

    fn handle(&self) -> &WidgetHandle;

    /// Rebind the view. The only way to change a mounted view's project, so
    /// views that run background work can move it along with the binding.
    fn set_project_id(&mut self, project_id: Option<u32>);

    fn project_id(&self) -> Option<u32> {
        self.handle().project_id()
    }

    fn project(&self) -> Option<Project> {
        self.handle().project()
    }

    fn close(&self) {
        self.handle().close();
    }
}
