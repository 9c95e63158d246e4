//! Periodic cycle scheduling.

pub mod handler;

pub use handler::Scheduler;
