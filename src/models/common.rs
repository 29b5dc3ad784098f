use alloy_primitives::B256;
use alloy_rpc_types_eth::{Block, TransactionReceipt};
use alloy_rpc_types_trace::geth::CallFrame;
use alloy_serde::WithOtherFields;
use serde::{Deserialize, Serialize};

use crate::models::operations::Transaction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network_name: String,
    pub input_dir: String,
    pub output_dir: String,
    pub poll_interval_ms: u64,
    pub metrics: MetricsConfig,
}

/// Everything the mapper needs for one block, as returned by the node:
/// the full block, its receipts, and one `callTracer` frame per transaction,
/// all in block order.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockBundle {
    pub block: WithOtherFields<Block>,
    pub receipts: Vec<TransactionReceipt>,
    pub traces: Vec<CallFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockIdentifier {
    pub index: u64,
    pub hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappedBlock {
    pub block_identifier: BlockIdentifier,
    pub parent_block_identifier: BlockIdentifier,
    pub transactions: Vec<Transaction>,
}

impl BlockIdentifier {
    pub fn new(index: u64, hash: B256) -> Self {
        Self {
            index,
            hash: hash.to_string(),
        }
    }
}
