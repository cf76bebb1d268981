//! Exam seating planner.
//!
//! Seats exam candidates across rooms so that the two students sharing a bench always come from
//! different departments, and serves the result over HTTP backed by SQLite.

pub mod config;
pub mod data;
pub mod error;
pub mod planner;
pub mod pool;
pub mod server;
pub mod solver;
pub mod store;
