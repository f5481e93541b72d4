//! Local web UI

pub mod api;
pub mod page;
