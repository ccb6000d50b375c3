//! Recordbook Library
//!
//! This module exports the core components for testing and integration.

pub mod chart;
pub mod cli;
pub mod config;
pub mod csv_io;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod types;
