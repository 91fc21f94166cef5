//! Derived-state core of a project dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Projects carry task counts and a date window. From them the crate derives
//! status, progress and timeline figures, filters the dashboard by free text
//! and status, keeps an ordered widget layout persisted as one JSON blob, and
//! drives four widget views (progress, statistics, timeline, realtime).
//! Rendering is left to whatever shell embeds the crate; `main.rs` is a
//! headless runner that logs what a page would show.

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod metrics;
pub mod model;
pub mod services;
pub mod storage;
pub mod widgets;
