//! Dashboard state services.
//!
//! ARCHITECTURE
//! ============
//! `project` owns the project list and its simulated updates, `layout` owns
//! widget order and filters with persistence, and `filter` derives the visible
//! lists from both. Widget views and the dashboard page only read through
//! these and call their mutation methods.

pub mod filter;
pub mod layout;
pub mod project;
