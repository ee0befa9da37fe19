#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use syncauth_server::handler::routes;
use syncauth_server::middleware::{RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt};
use syncauth_server::service::ServiceState;

use crate::config::{
    Cli, MiddlewareConfig, create_email_service, create_key_value_store, create_oauth_registry,
    create_user_store,
};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "syncauth_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "syncauth_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "syncauth_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        let message = format!("{error:#}");
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %message,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing();
    cli.log();
    cli.validate()?;

    let users = create_user_store(&cli.postgres).await?;
    let kv = create_key_value_store(&cli).await?;
    let email = create_email_service(&cli.smtp)?;
    let oauth = create_oauth_registry(&cli.github)?;

    let state = ServiceState::new(&cli.service, users, kv, email, oauth)
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - tracing spans with redacted authorization headers
/// 3. Security - CORS
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(state)
        .with_security(&middleware.cors)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
