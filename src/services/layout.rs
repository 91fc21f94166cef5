//! Dashboard layout store: widget order and filters, persisted write-through.
//!
//! DESIGN
//! ======
//! The store owns a `watch` channel holding the whole `DashboardState` and is
//! the only writer of the persisted blob. State is read once when the store is
//! opened and written back after every mutation that changed it, so storage
//! always mirrors memory (last write wins).
//!
//! ERROR HANDLING
//! ==============
//! Storage failures never reach callers. A missing, unreadable or unparsable
//! blob leaves the defaults in place; a blob with one bad field only loses
//! that field. Write failures are logged and the in-memory state stays
//! authoritative.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::model::{DashboardFilters, DashboardState, StatusFilter, WidgetConfig, default_widgets};
use crate::storage::{self, KeyValueStore};

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

pub struct DashboardLayoutStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    state: watch::Sender<DashboardState>,
}

impl DashboardLayoutStore {
    /// Open the store, restoring whatever valid state `storage` holds under `key`.
    pub fn open(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = load_state(storage.as_ref(), &key);
        let (state, _) = watch::channel(initial);
        let store = Self { storage, key, state };
        store.save_state();
        store
    }

    // =========================================================================
    // READS
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn widgets(&self) -> Vec<WidgetConfig> {
        self.state.borrow().widgets.clone()
    }

    #[must_use]
    pub fn filters(&self) -> DashboardFilters {
        self.state.borrow().filters.clone()
    }

    #[must_use]
    pub fn search_text(&self) -> String {
        self.state.borrow().filters.search_text.clone()
    }

    #[must_use]
    pub fn status_filter(&self) -> StatusFilter {
        self.state.borrow().filters.status
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Replace the widget list wholesale, e.g. after a drag-drop reorder.
    pub fn update_widgets(&self, widgets: Vec<WidgetConfig>) {
        self.mutate(|state| replace_if_changed(&mut state.widgets, widgets));
    }

    /// Append a widget. The caller supplies a unique id.
    pub fn add_widget(&self, widget: WidgetConfig) {
        debug!(id = %widget.id, kind = ?widget.kind, project_id = ?widget.project_id, "adding widget");
        self.mutate(|state| {
            state.widgets.push(widget);
            true
        });
    }

    /// Remove the widget with `id`; absent ids are ignored.
    pub fn remove_widget(&self, id: &str) {
        self.mutate(|state| {
            let before = state.widgets.len();
            state.widgets.retain(|w| w.id != id);
            state.widgets.len() != before
        });
    }

    pub fn update_search_text(&self, search_text: impl Into<String>) {
        let search_text = search_text.into();
        self.mutate(|state| replace_if_changed(&mut state.filters.search_text, search_text));
    }

    pub fn update_status_filter(&self, status: StatusFilter) {
        self.mutate(|state| replace_if_changed(&mut state.filters.status, status));
    }

    /// Restore the default widgets and filters.
    pub fn reset_state(&self) {
        info!("resetting dashboard layout");
        self.mutate(|state| replace_if_changed(state, DashboardState::default()));
    }

    fn mutate(&self, f: impl FnOnce(&mut DashboardState) -> bool) {
        if self.state.send_if_modified(f) {
            self.save_state();
        }
    }

    fn save_state(&self) {
        let state = self.state.borrow().clone();
        match storage::save_json(self.storage.as_ref(), &self.key, &state) {
            Ok(()) => debug!(key = %self.key, widgets = state.widgets.len(), "dashboard state saved"),
            Err(e) => error!(key = %self.key, error = %e, "failed to save dashboard state"),
        }
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Read the persisted blob, falling back per field.
fn load_state(storage: &dyn KeyValueStore, key: &str) -> DashboardState {
    let parsed = match storage::load_json::<serde_json::Value>(storage, key) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!(%key, "no saved dashboard state");
            return DashboardState::default();
        }
        Err(e) => {
            error!(%key, error = %e, "failed to load dashboard state");
            return DashboardState::default();
        }
    };

    let widgets = field_or_default(&parsed, "widgets", default_widgets);
    let filters = parsed.get("filters").map_or_else(DashboardFilters::default, |saved| DashboardFilters {
        search_text: field_or_default(saved, "searchText", String::new),
        status: field_or_default(saved, "status", StatusFilter::default),
    });
    info!(%key, widgets = widgets.len(), "dashboard state restored");
    DashboardState { widgets, filters }
}

fn field_or_default<T: DeserializeOwned>(parsed: &serde_json::Value, field: &str, default: impl FnOnce() -> T) -> T {
    let Some(raw) = parsed.get(field).filter(|v| !v.is_null()) else {
        return default();
    };
    match serde_json::from_value(raw.clone()) {
        Ok(value) => value,
        Err(e) => {
            warn!(field, error = %e, "ignoring malformed saved field");
            default()
        }
    }
}

/// Move the element at `from` to `to`, shifting the ones in between.
///
/// Both indices are clamped to the list bounds, matching drag-drop semantics
/// where a drop past the end lands at the end.
pub fn move_item<T>(items: &mut [T], from: usize, to: usize) {
    let Some(last) = items.len().checked_sub(1) else {
        return;
    };
    let from = from.min(last);
    let to = to.min(last);
    if from < to {
        items[from..=to].rotate_left(1);
    } else if from > to {
        items[to..=from].rotate_right(1);
    }
}
