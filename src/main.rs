// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::info;

use secret_reloader::config::Config;
use secret_reloader::restart::WorkloadRestarter;
use secret_reloader::watch::SecretMonitor;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting secret reloader");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: secret={}/{}, workload={} {}/{}",
        config.watch.namespace,
        config.watch.secret_name,
        config.restart.kind,
        config.restart.namespace,
        config.restart.name
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let restarter = WorkloadRestarter::new(
        client.clone(),
        config.restart.clone(),
        config.conflict_retries,
    );
    let monitor = SecretMonitor::new(client, &config, restarter);

    monitor.run().await?;

    info!("Secret monitoring stopped");
    Ok(())
}
