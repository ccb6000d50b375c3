//! Web dashboard HTTP server module.
//!
//! Started by the `serve` subcommand.

mod server;
pub mod templates;

pub use server::{
    DashboardHandle, DashboardServer, DashboardStatus, build_router, start_server,
    start_server_with_retry,
};
