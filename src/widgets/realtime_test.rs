use super::*;
use time::macros::{date, datetime};

use crate::clock::FixedClock;

const POLL: Duration = Duration::from_secs(5);
const PULSE: Duration = Duration::from_millis(500);

fn timings() -> RealtimeTimings {
    RealtimeTimings { poll_interval: POLL, pulse: PULSE }
}

fn store_with(completed: u32, total: u32) -> Arc<ProjectStore> {
    let project = Project::new(1, "Live", completed, total, date!(2024 - 01 - 01), date!(2024 - 12 - 31));
    let other = Project::new(2, "Other", 0, 100, date!(2024 - 01 - 01), date!(2024 - 12 - 31));
    Arc::new(ProjectStore::with_seed(vec![project, other], 21))
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(datetime!(2024-05-01 10:00 UTC)))
}

fn start(store: &Arc<ProjectStore>, project_id: Option<u32>, clock: Arc<FixedClock>) -> RealtimeWidget {
    RealtimeWidget::start(WidgetHandle::new(store, project_id), store.clone(), timings(), clock)
}

fn completed(store: &ProjectStore, id: u32) -> u32 {
    store.project(id).unwrap().tasks_completed
}

/// Let spawned tasks run without moving the paused clock meaningfully.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn polls_only_after_each_full_interval() {
    let store = store_with(0, 100);
    let _widget = start(&store, Some(1), clock());

    tokio::time::sleep(POLL - Duration::from_millis(10)).await;
    assert_eq!(completed(&store, 1), 0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let after_first = completed(&store, 1);
    assert!((1..=3).contains(&after_first));

    tokio::time::sleep(POLL).await;
    assert!(completed(&store, 1) > after_first);
    assert_eq!(completed(&store, 2), 0);
}

#[tokio::test(start_paused = true)]
async fn polling_converges_and_stops_at_total() {
    let store = store_with(48, 50);
    let widget = start(&store, Some(1), clock());
    tokio::time::sleep(POLL * 4 + Duration::from_millis(10)).await;
    assert_eq!(completed(&store, 1), 50);
    assert!((widget.progress() - 100.0).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn first_resolution_pulses_then_decays() {
    let store = store_with(0, 100);
    let clock = clock();
    let widget = start(&store, Some(1), clock.clone());

    settle().await;
    assert!(widget.is_updating());
    assert_eq!(widget.last_update(), Some(datetime!(2024-05-01 10:00 UTC)));

    tokio::time::sleep(PULSE).await;
    assert!(!widget.is_updating());
}

#[tokio::test(start_paused = true)]
async fn store_change_to_bound_project_pulses() {
    let store = store_with(0, 100);
    let clock = clock();
    let widget = start(&store, Some(1), clock.clone());
    tokio::time::sleep(PULSE * 2).await;
    assert!(!widget.is_updating());

    clock.advance(time::Duration::minutes(3));
    store.update_project_progress(1);
    settle().await;
    assert!(widget.is_updating());
    assert_eq!(widget.last_update(), Some(datetime!(2024-05-01 10:03 UTC)));

    tokio::time::sleep(PULSE).await;
    assert!(!widget.is_updating());
}

#[tokio::test(start_paused = true)]
async fn other_projects_do_not_pulse() {
    let store = store_with(0, 100);
    let widget = start(&store, Some(1), clock());
    tokio::time::sleep(PULSE * 2).await;

    store.update_project_progress(2);
    settle().await;
    assert!(!widget.is_updating());
}

#[tokio::test(start_paused = true)]
async fn dangling_binding_never_pulses_or_mutates() {
    let store = store_with(0, 100);
    let widget = start(&store, Some(404), clock());
    tokio::time::sleep(POLL * 2 + Duration::from_millis(10)).await;
    assert!(!widget.is_updating());
    assert!(widget.last_update().is_none());
    assert_eq!(widget.progress(), 0.0);
    assert_eq!(completed(&store, 1), 0);
}

#[tokio::test(start_paused = true)]
async fn rebinding_moves_polling_to_new_project() {
    let store = store_with(0, 100);
    let mut widget = start(&store, None, clock());
    settle().await;
    assert!(!widget.is_updating());

    widget.set_project_id(Some(2));
    settle().await;
    assert!(widget.is_updating());

    tokio::time::sleep(POLL).await;
    assert!(completed(&store, 2) >= 1);
    assert_eq!(completed(&store, 1), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_timers() {
    let store = store_with(0, 100);
    let mut widget = start(&store, Some(1), clock());
    settle().await;
    assert!(widget.is_running());

    widget.stop();
    widget.stop();
    settle().await;
    assert!(!widget.is_running());
    assert!(!widget.is_updating());

    tokio::time::sleep(POLL * 3).await;
    assert_eq!(completed(&store, 1), 0);
}

#[tokio::test(start_paused = true)]
async fn drop_cancels_timers() {
    let store = store_with(0, 100);
    let widget = start(&store, Some(1), clock());
    drop(widget);
    tokio::time::sleep(POLL * 3).await;
    assert_eq!(completed(&store, 1), 0);
    assert_eq!(Arc::strong_count(&store), 1);
}

#[tokio::test(start_paused = true)]
async fn rebinding_through_trait_object_moves_timers_too() {
    let store = store_with(0, 100);
    let mut widget = start(&store, Some(1), clock());
    {
        let view: &mut dyn Widget = &mut widget;
        view.set_project_id(Some(2));
        assert_eq!(view.project_id(), Some(2));
    }
    tokio::time::sleep(POLL + Duration::from_millis(10)).await;
    assert!(completed(&store, 2) >= 1);
    assert_eq!(completed(&store, 1), 0);
}
