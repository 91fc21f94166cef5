use super::*;
use crate::model::{ProjectStatus, WidgetKind};
use crate::storage::{MemoryStore, StorageError};

const KEY: &str = "dashboard_state";

fn memory() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

fn open(store: &Arc<MemoryStore>) -> DashboardLayoutStore {
    DashboardLayoutStore::open(store.clone(), KEY)
}

fn persisted(store: &MemoryStore) -> DashboardState {
    storage::load_json(store, KEY).unwrap().unwrap()
}

fn widget(id: &str) -> WidgetConfig {
    WidgetConfig::with_id(id, WidgetKind::Progress, Some(1))
}

/// Storage that can be told to fail reads or writes.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_reads: bool,
    fail_writes: std::sync::atomic::AtomicBool,
}

impl KeyValueStore for FlakyStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Io(std::io::Error::other("read refused")));
        }
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(StorageError::Io(std::io::Error::other("quota exceeded")));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn empty_storage_yields_defaults_and_persists_them() {
    let store = memory();
    let layout = open(&store);
    assert_eq!(layout.snapshot(), DashboardState::default());
    assert_eq!(persisted(&store), DashboardState::default());
}

#[test]
fn saved_state_is_restored() {
    let store = memory();
    let saved = DashboardState {
        widgets: vec![widget("a"), WidgetConfig::with_id("b", WidgetKind::Realtime, Some(4))],
        filters: DashboardFilters { search_text: "proj".into(), status: StatusFilter::Only(ProjectStatus::Overdue) },
    };
    storage::save_json(store.as_ref(), KEY, &saved).unwrap();

    let layout = open(&store);
    assert_eq!(layout.snapshot(), saved);
    assert_eq!(layout.search_text(), "proj");
    assert_eq!(layout.status_filter(), StatusFilter::Only(ProjectStatus::Overdue));
}

#[test]
fn browser_shaped_blob_is_restored() {
    let store = memory();
    store
        .set_item(
            KEY,
            r#"{"widgets":[{"id":"1700000000000","type":"timeline","projectId":5}],"filters":{"searchText":"","status":"completed"}}"#,
        )
        .unwrap();
    let layout = open(&store);
    assert_eq!(layout.widgets(), vec![WidgetConfig::with_id("1700000000000", WidgetKind::Timeline, Some(5))]);
    assert_eq!(layout.status_filter(), StatusFilter::Only(ProjectStatus::Completed));
}

#[test]
fn unparsable_blob_falls_back_to_defaults() {
    let store = memory();
    store.set_item(KEY, "{{{ definitely not json").unwrap();
    let layout = open(&store);
    assert_eq!(layout.snapshot(), DashboardState::default());
}

#[test]
fn missing_fields_fall_back_individually() {
    let store = memory();
    store.set_item(KEY, r#"{"filters":{"searchText":"x","status":"all"}}"#).unwrap();
    let layout = open(&store);
    assert_eq!(layout.widgets(), default_widgets());
    assert_eq!(layout.search_text(), "x");

    store.set_item(KEY, r#"{"widgets":[]}"#).unwrap();
    let layout = open(&store);
    assert!(layout.widgets().is_empty());
    assert_eq!(layout.filters(), DashboardFilters::default());
}

#[test]
fn malformed_field_only_loses_that_field() {
    let store = memory();
    store
        .set_item(KEY, r#"{"widgets":[{"id":"z","type":"progress","projectId":2}],"filters":{"searchText":"q","status":"sleeping"}}"#)
        .unwrap();
    let layout = open(&store);
    assert_eq!(layout.widgets(), vec![WidgetConfig::with_id("z", WidgetKind::Progress, Some(2))]);
    assert_eq!(layout.search_text(), "q");
    assert_eq!(layout.status_filter(), StatusFilter::All);
}

#[test]
fn filter_values_fall_back_independently() {
    let store = memory();
    store.set_item(KEY, r#"{"filters":{"searchText":42,"status":"overdue"}}"#).unwrap();
    let layout = open(&store);
    assert_eq!(layout.search_text(), "");
    assert_eq!(layout.status_filter(), StatusFilter::Only(ProjectStatus::Overdue));

    store.set_item(KEY, r#"{"filters":{"status":"completed"}}"#).unwrap();
    let layout = open(&store);
    assert_eq!(layout.filters(), DashboardFilters { search_text: String::new(), status: StatusFilter::Only(ProjectStatus::Completed) });

    store.set_item(KEY, r#"{"filters":"broken"}"#).unwrap();
    assert_eq!(open(&store).filters(), DashboardFilters::default());
    assert_eq!(persisted(&store).filters, DashboardFilters::default());
}

#[test]
fn non_object_blob_falls_back_to_defaults() {
    let store = memory();
    store.set_item(KEY, "42").unwrap();
    assert_eq!(open(&store).snapshot(), DashboardState::default());
    store.set_item(KEY, "null").unwrap();
    assert_eq!(open(&store).snapshot(), DashboardState::default());
}

#[test]
fn read_failure_keeps_defaults() {
    let flaky = Arc::new(FlakyStore { fail_reads: true, ..FlakyStore::default() });
    let layout = DashboardLayoutStore::open(flaky, KEY);
    assert_eq!(layout.snapshot(), DashboardState::default());
}

// =============================================================================
// Mutations
// =============================================================================

#[test]
fn add_widget_appends_and_persists() {
    let store = memory();
    let layout = open(&store);
    layout.add_widget(widget("x"));
    let ids: Vec<_> = layout.widgets().into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec!["1", "2", "3", "x"]);
    assert_eq!(persisted(&store).widgets.len(), 4);
}

#[test]
fn remove_widget_by_id() {
    let store = memory();
    let layout = open(&store);
    layout.remove_widget("2");
    let ids: Vec<_> = layout.widgets().into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(persisted(&store).widgets, layout.widgets());
}

#[test]
fn remove_unknown_widget_is_no_op() {
    let store = memory();
    let layout = open(&store);
    let rx = layout.subscribe();
    layout.remove_widget("nope");
    assert!(!rx.has_changed().unwrap());
    assert_eq!(layout.widgets(), default_widgets());
}

#[test]
fn filter_updates_touch_only_their_field() {
    let store = memory();
    let layout = open(&store);
    layout.update_status_filter(StatusFilter::Only(ProjectStatus::InProgress));
    layout.update_search_text("alpha");
    assert_eq!(
        layout.filters(),
        DashboardFilters { search_text: "alpha".into(), status: StatusFilter::Only(ProjectStatus::InProgress) }
    );
    layout.update_search_text("");
    assert_eq!(layout.status_filter(), StatusFilter::Only(ProjectStatus::InProgress));
    assert_eq!(persisted(&store).filters, layout.filters());
}

#[test]
fn mutations_notify_subscribers() {
    let store = memory();
    let layout = open(&store);
    let mut rx = layout.subscribe();
    layout.update_search_text("b");
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().filters.search_text, "b");
}

#[test]
fn reset_restores_defaults_in_memory_and_storage() {
    let store = memory();
    let layout = open(&store);
    layout.update_widgets(vec![widget("only")]);
    layout.update_search_text("zzz");
    layout.reset_state();
    assert_eq!(layout.snapshot(), DashboardState::default());

    let reopened = open(&store);
    assert_eq!(reopened.snapshot(), DashboardState::default());
}

#[test]
fn save_then_load_round_trips() {
    let store = memory();
    let layout = open(&store);
    layout.update_widgets(vec![widget("c"), widget("a"), WidgetConfig::with_id("b", WidgetKind::Statistics, None)]);
    layout.update_status_filter(StatusFilter::Only(ProjectStatus::NotStarted));
    let expected = layout.snapshot();
    drop(layout);
    assert_eq!(open(&store).snapshot(), expected);
}

#[test]
fn write_failure_is_swallowed_and_memory_stays_authoritative() {
    let flaky = Arc::new(FlakyStore::default());
    let layout = DashboardLayoutStore::open(flaky.clone(), KEY);
    flaky.fail_writes.store(true, std::sync::atomic::Ordering::Relaxed);
    layout.add_widget(widget("lost"));
    assert_eq!(layout.widgets().len(), 4);
    let on_disk: DashboardState = storage::load_json(&flaky.inner, KEY).unwrap().unwrap();
    assert_eq!(on_disk.widgets.len(), 3);
}

// =============================================================================
// move_item
// =============================================================================

#[test]
fn move_first_to_last() {
    let mut items = vec!['A', 'B', 'C'];
    move_item(&mut items, 0, 2);
    assert_eq!(items, vec!['B', 'C', 'A']);
}

#[test]
fn move_last_to_first() {
    let mut items = vec!['A', 'B', 'C', 'D'];
    move_item(&mut items, 3, 1);
    assert_eq!(items, vec!['A', 'D', 'B', 'C']);
}

#[test]
fn move_clamps_out_of_range_indices() {
    let mut items = vec![1, 2, 3];
    move_item(&mut items, 9, 0);
    assert_eq!(items, vec![3, 1, 2]);
    move_item(&mut items, 0, 99);
    assert_eq!(items, vec![1, 2, 3]);
}

#[test]
fn move_on_empty_or_same_index_is_no_op() {
    let mut empty: Vec<u8> = Vec::new();
    move_item(&mut empty, 0, 3);
    assert!(empty.is_empty());

    let mut items = vec![1, 2];
    move_item(&mut items, 1, 1);
    assert_eq!(items, vec![1, 2]);
}
