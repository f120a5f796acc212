//! Node Pool Controller
//!
//! Reconciles a managed cluster's node pools against the fleet-management
//! service from a YAML manifest. `CONTROLLER_MODE` picks a one-shot pass
//! (reconcile, provision, bring-up, update, tear-down) or the periodic watch loop.

use anyhow::Context;
use fleet_client::{FleetClient, FleetClientTrait};
use nodepool_controller::{Controller, ControllerConfig, Mode, NodePoolManifest, Reconciler};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Node Pool Controller");

    // Load configuration from environment variables
    let config = ControllerConfig::from_env()?;
    info!("Configuration:");
    info!("  Fleet URL: {}", config.fleet_url);
    info!("  Manifest: {}", config.manifest_path);
    info!("  Mode: {}", config.mode);
    info!("  Poll interval: {:?}, timeout: {:?}", config.poll.interval, config.poll.timeout);

    let client = FleetClient::new(config.fleet_url.clone(), config.fleet_token.clone())
        .context("failed to build fleet client")?;
    client
        .validate_token()
        .await
        .context("fleet API token was rejected")?;

    let manifest = NodePoolManifest::load(&config.manifest_path).await?;
    let cluster = manifest.cluster();
    let desired = manifest.desired_node_pools();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current wait");
            on_signal.cancel();
        }
    });

    let reconciler = Reconciler::new(Box::new(client), config.poll).with_cancellation(cancel);

    match config.mode {
        Mode::Reconcile => {
            let summary = reconciler.reconcile(&cluster, &desired).await?;
            info!("Reconcile finished: {}", summary);
        }
        Mode::Provision => {
            let summary = reconciler.provision_all(&cluster, &desired).await?;
            info!("Provisioned node pools {:?}", summary.created);
        }
        Mode::BringUp => {
            let summary = reconciler.bring_up_cluster(&cluster, &desired).await?;
            info!("Cluster {} is up with node pools {:?}", cluster.full_name, summary.created);
        }
        Mode::Update => {
            let summary = reconciler.update_cluster(&cluster, &desired).await?;
            info!("Cluster {} updated: {}", cluster.full_name, summary);
        }
        Mode::TearDown => {
            reconciler.tear_down_cluster(&cluster.full_name).await?;
        }
        Mode::Watch => {
            Controller::new(reconciler, cluster, desired, config.reconcile_interval)
                .run()
                .await?;
        }
    }

    Ok(())
}
