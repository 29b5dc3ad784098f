use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, http::StatusCode, routing::get};
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Gauge, Histogram, MeterProvider};
use opentelemetry_sdk::metrics::{MetricError, SdkMeterProvider};
use prometheus::{Encoder, TextEncoder};
use tracing::{error, info};

use crate::models::common::MappedBlock;

pub struct Metrics {
    registry: Arc<prometheus::Registry>,
    _provider: SdkMeterProvider,
    pub network_name: String,

    // Block mapping metrics
    pub blocks_mapped: Counter<u64>,
    pub latest_mapped_block: Gauge<u64>,
    pub block_mapping_latency: Histogram<f64>,

    // Output metrics
    pub transactions_mapped: Counter<u64>,
    pub operations_emitted: Counter<u64>,
    pub cross_chain_transactions: Counter<u64>,

    pub mapping_errors: Counter<u64>,
}

impl Metrics {
    pub fn new(network_name: String) -> Result<Self, MetricError> {
        let registry = prometheus::Registry::new();

        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()?;

        let provider = SdkMeterProvider::builder().with_reader(exporter).build();
        let meter = provider.meter("mapper_metrics");

        let blocks_mapped = meter
            .u64_counter("mapper_blocks_mapped")
            .with_description("Total number of blocks mapped")
            .build();

        let latest_mapped_block = meter
            .u64_gauge("mapper_latest_mapped_block_number")
            .with_description("Latest block number mapped")
            .build();

        let block_mapping_latency = meter
            .f64_histogram("mapper_block_mapping_latency")
            .with_description("Time spent mapping a block bundle")
            .with_boundaries(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
            ])
            .with_unit("s")
            .build();

        let transactions_mapped = meter
            .u64_counter("mapper_transactions_mapped")
            .with_description("Number of ledger transactions emitted")
            .build();

        let operations_emitted = meter
            .u64_counter("mapper_operations_emitted")
            .with_description("Number of ledger operations emitted")
            .build();

        let cross_chain_transactions = meter
            .u64_counter("mapper_cross_chain_transactions")
            .with_description("Number of atomic import/export transactions mapped")
            .build();

        let mapping_errors = meter
            .u64_counter("mapper_mapping_errors")
            .with_description("Number of block bundles that failed to map")
            .build();

        Ok(Self {
            registry: Arc::new(registry),
            _provider: provider,
            network_name,
            blocks_mapped,
            latest_mapped_block,
            block_mapping_latency,
            transactions_mapped,
            operations_emitted,
            cross_chain_transactions,
            mapping_errors,
        })
    }

    fn labels(&self) -> [KeyValue; 1] {
        [KeyValue::new("network", self.network_name.clone())]
    }

    /// Records a successfully mapped block. `cross_chain` is the number of
    /// records that came from the block's atomic payload.
    pub fn record_block(&self, block: &MappedBlock, cross_chain: usize, elapsed_secs: f64) {
        let labels = self.labels();
        let operations: usize = block
            .transactions
            .iter()
            .map(|tx| tx.operations.len())
            .sum();

        self.blocks_mapped.add(1, &labels);
        self.latest_mapped_block
            .record(block.block_identifier.index, &labels);
        self.block_mapping_latency.record(elapsed_secs, &labels);
        self.transactions_mapped
            .add(block.transactions.len() as u64, &labels);
        self.operations_emitted.add(operations as u64, &labels);
        self.cross_chain_transactions
            .add(cross_chain as u64, &labels);
    }

    pub fn record_error(&self) {
        self.mapping_errors.add(1, &self.labels());
    }

    pub fn render(&self) -> Result<String> {
        render_registry(&self.registry)
    }

    pub async fn start_metrics_server(&self, addr: &str, port: u16) -> Result<()> {
        let addr = format!("{addr}:{port}")
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid metrics address {addr}:{port}"))?;
        let registry = self.registry.clone();

        let app = Router::new().route("/metrics", get(move || metrics_handler(registry.clone())));

        // Only used for logging
        let access_url = if addr.ip().is_unspecified() {
            format!("http://localhost:{port}/metrics")
        } else {
            format!("http://{}:{port}/metrics", addr.ip())
        };

        info!(
            "Starting metrics server - binding to {} (accessible at {})",
            addr, access_url
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind metrics server to {addr}"))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Metrics server stopped: {}", e);
            }
        });

        Ok(())
    }
}

fn render_registry(registry: &prometheus::Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    encoder
        .encode(&metric_families, &mut buffer)
        .context("failed to encode metrics")?;
    String::from_utf8(buffer).context("metrics output is not UTF-8")
}

async fn metrics_handler(registry: Arc<prometheus::Registry>) -> Result<String, StatusCode> {
    render_registry(&registry).map_err(|e| {
        error!("Failed to render metrics: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
