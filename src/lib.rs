//! Restaurant back-office administration client.
//!
//! Talks to the back-office REST API (menu, orders, expenses, restaurant,
//! coupons, loyalty, reports), mirrors results in an explicit client-side
//! store, and exposes page actions that the `resto-admin` CLI drives.

use anyhow::Context;
use clap::Parser;
use tracing::info;

pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod coupons;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod expenses;
pub mod logging;
pub mod lookup;
pub mod loyalty;
pub mod menu;
pub mod models;
pub mod order_status;
pub mod orders;
pub mod reports;
pub mod restaurant;
pub mod routes;
pub mod search;
pub mod storage;
pub mod store;
pub mod totals;
pub mod users;

pub use app::AdminApp;
pub use error::{AdminError, AdminResult};

/// Entry point of the `resto-admin` binary.
pub fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let mut config = config::AppConfig::load().context("loading configuration")?;
    cli.apply_overrides(&mut config);

    // Keep the guard alive until exit; dropping it flushes the log file.
    let _guard = logging::init(&config).context("initialising logging")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = env!("BUILD_GIT_SHA"),
        "Starting resto-admin"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(async move {
        let app = AdminApp::bootstrap(config).context("opening local state")?;
        cli::execute(cli.command, &app).await
    })
}
