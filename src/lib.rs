//! Milestone timeline: renders work items as diamonds and bars on a day
//! axis, with label policies and pointer-driven rescheduling.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod timeline;
pub mod ui;
