//! Per-project derived metrics: lifecycle status, task progress, timeline.
//!
//! DESIGN
//! ======
//! Pure functions over a `Project` and an explicit "now". Project dates are
//! whole days; each date compares as the instant of its UTC midnight, so a
//! project becomes overdue as soon as its end date has begun.
//!
//! EDGE CASES
//! ==========
//! A project with zero total tasks is complete and reports 0% progress.
//! Timeline progress is 0 when the end date is not after the start date.

use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

use crate::model::{Project, ProjectStatus};

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;

const SECONDS_PER_DAY: i64 = 86_400;

/// Derive the lifecycle status. Completion wins over any date rule.
#[must_use]
pub fn project_status(project: &Project, now: OffsetDateTime) -> ProjectStatus {
    if project.tasks_completed == project.tasks_total {
        return ProjectStatus::Completed;
    }
    if now < day_start(project.start_date) {
        return ProjectStatus::NotStarted;
    }
    if now > day_start(project.end_date) {
        return ProjectStatus::Overdue;
    }
    ProjectStatus::InProgress
}

/// Percentage of tasks completed. Zero-task projects report 0.
#[must_use]
pub fn project_progress(project: &Project) -> f64 {
    if project.tasks_total == 0 {
        return 0.0;
    }
    f64::from(project.tasks_completed) / f64::from(project.tasks_total) * 100.0
}

/// Calendar-based progress of a project at a given instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimelineMetrics {
    pub duration_days: i64,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub time_progress: f64,
}

impl TimelineMetrics {
    #[must_use]
    pub fn compute(project: &Project, now: OffsetDateTime) -> Self {
        let start = day_start(project.start_date);
        let end = day_start(project.end_date);

        let duration_days = ceil_days(end - start);
        let days_elapsed = ceil_days(now - start).min(duration_days).max(0);
        let days_remaining = ceil_days(end - now).max(0);

        #[allow(clippy::cast_precision_loss)]
        let time_progress = if duration_days <= 0 {
            0.0
        } else {
            (days_elapsed as f64 / duration_days as f64 * 100.0).min(100.0)
        };

        Self { duration_days, days_elapsed, days_remaining, time_progress }
    }
}

/// Short US-style date, e.g. `Jan 1, 2024`.
#[must_use]
pub fn format_date(date: Date) -> String {
    let format = format_description!("[month repr:short] [day padding:none], [year]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

fn day_start(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

/// Round a signed span up to whole days.
fn ceil_days(span: Duration) -> i64 {
    let secs = span.whole_seconds();
    let days = secs.div_euclid(SECONDS_PER_DAY);
    if secs.rem_euclid(SECONDS_PER_DAY) == 0 && span.subsec_nanoseconds() <= 0 { days } else { days + 1 }
}
