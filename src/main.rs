// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use zonekeeper::{
    constants::{
        ERROR_REQUEUE_DURATION_SECS, REQUEUE_WHEN_NOT_READY_SECS, REQUEUE_WHEN_READY_SECS,
        TOKIO_WORKER_THREADS,
    },
    context::Context,
    crd::{DNSZone, DNSZoneStatus},
    reconcilers::{dnszone::is_zone_not_empty, reconcile_dnszone},
    status_reasons::{CONDITION_STATUS_TRUE, CONDITION_TYPE_ZONE_AVAILABLE},
};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("zonekeeper-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug cargo run
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json cargo run
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting zonekeeper Route53 DNSZone controller");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let ctx = Arc::new(Context::new(client.clone()));

    run_dnszone_controller(client, ctx).await?;

    info!("DNSZone controller stopped");
    Ok(())
}

/// Run the `DNSZone` controller until a shutdown signal is received
async fn run_dnszone_controller(client: Client, ctx: Arc<Context>) -> Result<()> {
    info!("Starting DNSZone controller");

    let api = Api::<DNSZone>::all(client);

    Controller::new(api, Config::default())
        .shutdown_on_signal()
        .run(reconcile_dnszone_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `DNSZone`
async fn reconcile_dnszone_wrapper(
    dnszone: Arc<DNSZone>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let name = format!(
        "{}/{}",
        dnszone.namespace().unwrap_or_default(),
        dnszone.name_any()
    );

    match reconcile_dnszone(ctx, (*dnszone).clone()).await {
        Ok(status) => {
            info!("Successfully reconciled DNSZone: {}", name);
            Ok(Action::requeue(requeue_interval(status.as_ref())))
        }
        Err(e) if is_zone_not_empty(&e) => {
            info!("DNSZone {} still has records, retrying deletion: {}", name, e);
            Ok(Action::requeue(Duration::from_secs(
                ERROR_REQUEUE_DURATION_SECS,
            )))
        }
        Err(e) => {
            error!("Failed to reconcile DNSZone {}: {:#}", name, e);
            Err(e.into())
        }
    }
}

/// Requeue interval after a successful pass, from the status that pass produced.
///
/// Zones that are available are checked less frequently than zones still converging.
fn requeue_interval(status: Option<&DNSZoneStatus>) -> Duration {
    let is_ready = status
        .and_then(|status| {
            status
                .conditions
                .iter()
                .find(|condition| condition.r#type == CONDITION_TYPE_ZONE_AVAILABLE)
        })
        .is_some_and(|condition| condition.status == CONDITION_STATUS_TRUE);

    if is_ready {
        Duration::from_secs(REQUEUE_WHEN_READY_SECS)
    } else {
        Duration::from_secs(REQUEUE_WHEN_NOT_READY_SECS)
    }
}

/// Error policy for controller
fn error_policy(_resource: Arc<DNSZone>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
