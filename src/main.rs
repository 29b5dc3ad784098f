use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::{signal, sync::oneshot, time::Instant};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

use ledger_mapper::mapper;
use ledger_mapper::metrics::Metrics;
use ledger_mapper::storage;
use ledger_mapper::utils::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    println!();
    info!("=========================== INITIALIZING ===========================");

    let config = match load_config("config.yml") {
        Ok(config) => {
            info!("Config loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return Err(e);
        }
    };

    let input_dir = PathBuf::from(&config.input_dir);
    let output_dir = PathBuf::from(&config.output_dir);
    let poll_interval = tokio::time::Duration::from_millis(config.poll_interval_ms);

    let metrics = if config.metrics.enabled {
        Some(Metrics::new(config.network_name.clone())?)
    } else {
        info!("Metrics are disabled");
        None
    };

    if let Some(metrics_instance) = &metrics {
        metrics_instance
            .start_metrics_server(&config.metrics.address, config.metrics.port)
            .await?;
    }

    tokio::fs::create_dir_all(&output_dir).await?;

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Ok(()) = signal::ctrl_c().await {
            info!("Received Ctrl+C signal, initiating shutdown...");
            let _ = shutdown_tx.send(());
        }
    });

    info!("Network: {}", config.network_name);
    info!("Reading bundles from {}", input_dir.display());
    info!("Writing operations to {}", output_dir.display());

    // Bundles that failed to map are not retried until restart
    let mut failed: HashSet<PathBuf> = HashSet::new();

    println!();
    info!("========================== STARTING MAPPER =========================");

    loop {
        if shutdown_rx.try_recv().is_ok() {
            info!("Shutting down main processing loop...");
            break Ok(());
        }

        let pending = storage::pending_bundles(&input_dir, &output_dir, &failed).await?;
        if pending.is_empty() {
            tokio::time::sleep(poll_interval).await;
            continue;
        }

        for bundle in pending {
            if let Err(e) = process_bundle(&bundle, &output_dir, metrics.as_ref()).await {
                error!("Failed to map bundle {}: {:#}", bundle.display(), e);
                if let Some(metrics_instance) = &metrics {
                    metrics_instance.record_error();
                }
                failed.insert(bundle);
            }
        }
    }
}

async fn process_bundle(bundle: &Path, output_dir: &Path, metrics: Option<&Metrics>) -> Result<()> {
    let start = Instant::now();

    let block_bundle = storage::read_bundle(bundle).await?;
    let mapped = mapper::map_block(&block_bundle)?;
    storage::write_operations(bundle, output_dir, &mapped).await?;

    if let Some(metrics_instance) = metrics {
        // Cross-chain records follow the one-per-transaction records
        let cross_chain = mapped
            .transactions
            .len()
            .saturating_sub(block_bundle.receipts.len());
        metrics_instance.record_block(&mapped, cross_chain, start.elapsed().as_secs_f64());
    }

    Ok(())
}
