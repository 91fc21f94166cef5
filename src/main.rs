use std::sync::Arc;

use dashwidgets::clock::SystemClock;
use dashwidgets::config::DashboardConfig;
use dashwidgets::dashboard::{Dashboard, MountedWidget};
use dashwidgets::metrics::format_date;
use dashwidgets::services::layout::DashboardLayoutStore;
use dashwidgets::services::project::ProjectStore;
use dashwidgets::storage::{FileStore, KeyValueStore, MemoryStore};
use dashwidgets::widgets::{DonutChart, DonutSegments, Widget};

/// Chart sink that logs instead of drawing.
struct LogChart {
    widget_id: String,
}

impl DonutChart for LogChart {
    fn render(&mut self, labels: [&'static str; 2], segments: DonutSegments) {
        tracing::info!(widget = %self.widget_id, ?labels, completed = segments.completed, remaining = segments.remaining, "chart rendered");
    }

    fn update(&mut self, segments: DonutSegments) {
        tracing::info!(widget = %self.widget_id, completed = segments.completed, remaining = segments.remaining, "chart updated");
    }
}

fn open_storage(config: &DashboardConfig) -> Arc<dyn KeyValueStore> {
    match FileStore::open(config.state_dir.clone()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, dir = %config.state_dir.display(), "state dir unavailable; layout will not persist");
            Arc::new(MemoryStore::new())
        }
    }
}

fn log_widget(id: &str, mounted: &MountedWidget) {
    let project = mounted.as_widget().project().map(|p| p.name);
    match mounted {
        MountedWidget::Progress(w) => {
            tracing::info!(widget = id, ?project, progress = w.progress(), "progress");
        }
        MountedWidget::Statistics(w) => {
            tracing::info!(widget = id, ?project, remaining = w.tasks_remaining(), "statistics");
        }
        MountedWidget::Timeline(w) => {
            tracing::info!(
                widget = id,
                ?project,
                status = w.status_label(),
                elapsed = w.days_elapsed(),
                remaining = w.days_remaining(),
                window = %format!("{} - {}", w.start_label(), w.end_label()),
                "timeline"
            );
        }
        MountedWidget::Realtime(w) => {
            let last_update = w.last_update().map(|t| format_date(t.date()));
            tracing::info!(widget = id, ?project, progress = w.progress(), updating = w.is_updating(), ?last_update, "realtime");
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = DashboardConfig::from_env();
    let storage = open_storage(&config);

    let projects = Arc::new(ProjectStore::seeded());
    let layout = Arc::new(DashboardLayoutStore::open(storage, config.storage_key.clone()));
    let mut dashboard = Dashboard::new(projects.clone(), layout, Arc::new(SystemClock), config.realtime);

    {
        let projects = projects.clone();
        let bounds = config.load_delay;
        tokio::spawn(async move { projects.simulate_fetch(bounds).await });
    }

    let mut loading = projects.subscribe_loading();
    while *loading.borrow_and_update() {
        if loading.changed().await.is_err() {
            break;
        }
    }

    let visible = dashboard.filtered_widgets().to_vec();
    let mut mounted: Vec<(String, MountedWidget)> = visible
        .iter()
        .map(|entry| {
            let mut widget = dashboard.mount(entry);
            if let MountedWidget::Statistics(stats) = &mut widget {
                stats.attach_chart(Box::new(LogChart { widget_id: entry.id.clone() }));
            }
            (entry.id.clone(), widget)
        })
        .collect();
    tracing::info!(
        widgets = mounted.len(),
        projects = dashboard.filtered_projects().len(),
        run_secs = config.run_for.as_secs(),
        "dashboard mounted"
    );

    let deadline = tokio::time::sleep(config.run_for);
    tokio::pin!(deadline);
    let mut ticker = tokio::time::interval(config.realtime.poll_interval);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
            _ = ticker.tick() => {
                for (id, widget) in &mounted {
                    log_widget(id, widget);
                }
            }
        }
    }

    for (_, widget) in &mut mounted {
        if let MountedWidget::Realtime(realtime) = widget {
            realtime.stop();
        }
    }
    tracing::info!("dashboard stopped");
}
