//! Botanist operator - shoot care controller

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kube::CustomResourceExt;

use botanist_common::crd::{MachineDeployment, Shoot};
use botanist_common::kube_utils::create_client;
use botanist_common::telemetry::{init_telemetry, TelemetryConfig};
use botanist_operator::controller_runner::build_care_controller;
use botanist_operator::{CareConfig, Context};

/// Botanist - health checks and condition reporting for shoot clusters
#[derive(Parser, Debug)]
#[command(name = "botanist-operator", version, about, long_about = None)]
struct Cli {
    /// Generate CRD manifests and exit
    #[arg(long)]
    crd: bool,

    /// Path to the care controller configuration file
    #[arg(long, env = "BOTANIST_CONFIG")]
    config: Option<PathBuf>,

    /// Kubeconfig of the seed cluster (in-cluster config when unset)
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Emit human-readable logs instead of JSON
    #[arg(long)]
    plain_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.crd {
        let shoot = serde_yaml::to_string(&Shoot::crd())
            .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
        let machine_deployment = serde_yaml::to_string(&MachineDeployment::crd())
            .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
        println!("{shoot}---\n{machine_deployment}");
        return Ok(());
    }

    init_telemetry(TelemetryConfig {
        service_name: "botanist-operator".to_string(),
        json: !cli.plain_logs,
        ..Default::default()
    })?;

    let config = match &cli.config {
        Some(path) => CareConfig::load(path)?,
        None => CareConfig::default(),
    };
    tracing::info!(
        sync_period_secs = config.sync_period_seconds,
        thresholds = config.condition_thresholds.len(),
        monitoring = config.features.monitoring,
        logging = config.features.logging,
        "loaded care configuration"
    );

    let client = create_client(cli.kubeconfig.as_deref()).await?;
    let ctx = Arc::new(Context::from_client(client.clone(), config));

    tracing::info!("Starting botanist operator...");
    build_care_controller(client, ctx).await;
    tracing::info!("Botanist operator shut down");

    Ok(())
}
