//! CLI commands module.

pub mod health;
pub mod invoke;
pub mod run_all;
pub mod serve;
