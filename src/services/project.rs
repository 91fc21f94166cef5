//! Project store: project list, loading flag, and simulated progress.
//!
//! DESIGN
//! ======
//! Both values live in `tokio::sync::watch` channels so any number of views
//! can subscribe and see whole-list replacements atomically. There is no
//! backend: the list starts from seed data and the "fetch" is a random delay
//! that only flips the loading flag.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::LoadDelay;
use crate::model::{Project, seed_projects};

#[cfg(test)]
#[path = "project_test.rs"]
mod project_test;

/// Largest number of tasks a single simulated update can complete.
const MAX_PROGRESS_STEP: u32 = 3;

pub struct ProjectStore {
    projects: watch::Sender<Vec<Project>>,
    loading: watch::Sender<bool>,
    rng: Mutex<StdRng>,
}

impl ProjectStore {
    /// Store over the built-in seed projects.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed_projects())
    }

    #[must_use]
    pub fn new(projects: Vec<Project>) -> Self {
        Self::with_rng(projects, StdRng::from_os_rng())
    }

    /// Deterministic store for tests and replays.
    #[must_use]
    pub fn with_seed(projects: Vec<Project>, seed: u64) -> Self {
        Self::with_rng(projects, StdRng::seed_from_u64(seed))
    }

    fn with_rng(projects: Vec<Project>, rng: StdRng) -> Self {
        let (projects, _) = watch::channel(projects);
        let (loading, _) = watch::channel(true);
        Self { projects, loading, rng: Mutex::new(rng) }
    }

    // =========================================================================
    // READS
    // =========================================================================

    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.projects.borrow().clone()
    }

    #[must_use]
    pub fn project(&self, id: u32) -> Option<Project> {
        self.projects.borrow().iter().find(|p| p.id == id).cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Observe the project list. The receiver starts with the current list marked seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Project>> {
        self.projects.subscribe()
    }

    #[must_use]
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    /// Pick the simulated fetch latency, uniform in `[min_ms, max_ms)`.
    ///
    /// An empty range yields exactly `min_ms`.
    pub fn sample_load_delay(&self, bounds: LoadDelay) -> Duration {
        if bounds.min_ms >= bounds.max_ms {
            return Duration::from_millis(bounds.min_ms);
        }
        let ms = self.with_rng_locked(|rng| rng.random_range(bounds.min_ms..bounds.max_ms));
        Duration::from_millis(ms)
    }

    /// Wait out the simulated fetch, then clear the loading flag.
    pub async fn simulate_fetch(&self, bounds: LoadDelay) {
        let delay = self.sample_load_delay(bounds);
        debug!(delay_ms = delay.as_millis(), "simulating project fetch");
        tokio::time::sleep(delay).await;
        self.loading.send_replace(false);
        info!(count = self.projects.borrow().len(), "projects loaded");
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Complete one to three more tasks on `project_id`, never exceeding the total.
    ///
    /// Unknown ids and finished projects are left untouched and observers are
    /// not notified.
    pub fn update_project_progress(&self, project_id: u32) {
        let step = self.with_rng_locked(|rng| rng.random_range(1..=MAX_PROGRESS_STEP));
        let changed = self.projects.send_if_modified(|projects| {
            let Some(project) = projects.iter_mut().find(|p| p.id == project_id) else {
                return false;
            };
            if project.tasks_completed >= project.tasks_total {
                return false;
            }
            project.tasks_completed = project.tasks_completed.saturating_add(step).min(project.tasks_total);
            debug!(
                project_id,
                completed = project.tasks_completed,
                total = project.tasks_total,
                "project progress updated"
            );
            true
        });
        if !changed {
            debug!(project_id, "progress update skipped");
        }
    }

    fn with_rng_locked<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut rng)
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::seeded()
    }
}
