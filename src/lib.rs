//! Check-in streaks and journey progress.
//!
//! [`progress`] holds the pure computations. Everything else is the local
//! store and command-line caller around them.

pub mod cli;
pub mod config;
pub mod db;
pub mod models;
pub mod progress;
pub mod utils;
