//! Dashboard domain types: projects, widget configs, and filters.
//!
//! DESIGN
//! ======
//! `Project` is runtime-only data owned by the project store. Widget configs
//! and filters are the persisted half of the dashboard and keep the JSON field
//! names the browser layout blob has always used (`type`, `projectId`,
//! `searchText`), so old blobs keep loading.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::date;
use uuid::Uuid;

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

// =============================================================================
// PROJECT
// =============================================================================

/// A tracked project. `tasks_completed <= tasks_total` is maintained by the
/// progress mutator, not by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: u32,
    pub name: String,
    pub tasks_completed: u32,
    pub tasks_total: u32,
    pub start_date: Date,
    pub end_date: Date,
}

impl Project {
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, tasks_completed: u32, tasks_total: u32, start_date: Date, end_date: Date) -> Self {
        Self { id, name: name.into(), tasks_completed, tasks_total, start_date, end_date }
    }

    /// Tasks still open. Saturates if the counters were ever inverted.
    #[must_use]
    pub fn tasks_remaining(&self) -> u32 {
        self.tasks_total.saturating_sub(self.tasks_completed)
    }
}

/// The fixed project list loaded at startup.
#[must_use]
pub fn seed_projects() -> Vec<Project> {
    vec![
        Project::new(1, "Project A", 25, 50, date!(2024 - 01 - 01), date!(2024 - 12 - 31)),
        Project::new(2, "Project B", 75, 140, date!(2023 - 06 - 01), date!(2024 - 03 - 31)),
        Project::new(3, "Project C", 80, 85, date!(2024 - 06 - 01), date!(2024 - 09 - 30)),
        Project::new(4, "Project D", 10, 60, date!(2025 - 07 - 15), date!(2025 - 12 - 15)),
        Project::new(5, "Project E", 45, 90, date!(2023 - 11 - 01), date!(2024 - 08 - 31)),
    ]
}

// =============================================================================
// PROJECT STATUS
// =============================================================================

/// Lifecycle status derived from a project's dates and counters. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    Completed,
    Overdue,
}

impl ProjectStatus {
    pub const ALL: [Self; 4] = [Self::NotStarted, Self::InProgress, Self::Completed, Self::Overdue];

    /// Wire name, also used as the status filter value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }

    /// Human-readable badge text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
        }
    }

    /// Badge modifier class, e.g. `not-started`.
    #[must_use]
    pub fn css_class(self) -> String {
        self.as_str().replacen('_', "-", 1)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status filter: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for ProjectStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Status selector in the dashboard toolbar: everything, or one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProjectStatus),
}

impl StatusFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }

    #[must_use]
    pub fn matches(self, status: ProjectStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        value.as_str().to_owned()
    }
}

/// Search box text plus status selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilters {
    pub search_text: String,
    pub status: StatusFilter,
}

impl DashboardFilters {
    /// True when nothing would be filtered out.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.search_text.is_empty() && self.status == StatusFilter::All
    }
}

// =============================================================================
// WIDGETS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    #[default]
    Progress,
    Statistics,
    Timeline,
    Realtime,
}

/// One configured tile on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    #[serde(rename = "projectId", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u32>,
}

impl WidgetConfig {
    /// New widget with a freshly generated id.
    #[must_use]
    pub fn new(kind: WidgetKind, project_id: Option<u32>) -> Self {
        Self { id: Uuid::new_v4().to_string(), kind, project_id }
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>, kind: WidgetKind, project_id: Option<u32>) -> Self {
        Self { id: id.into(), kind, project_id }
    }
}

/// The widgets shown on a fresh dashboard.
#[must_use]
pub fn default_widgets() -> Vec<WidgetConfig> {
    vec![
        WidgetConfig::with_id("1", WidgetKind::Progress, Some(1)),
        WidgetConfig::with_id("2", WidgetKind::Statistics, Some(2)),
        WidgetConfig::with_id("3", WidgetKind::Timeline, Some(3)),
    ]
}

// =============================================================================
// PERSISTED STATE
// =============================================================================

/// Everything the layout store persists under its storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardState {
    pub widgets: Vec<WidgetConfig>,
    pub filters: DashboardFilters,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self { widgets: default_widgets(), filters: DashboardFilters::default() }
    }
}
