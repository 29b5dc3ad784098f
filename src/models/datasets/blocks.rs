use alloy_primitives::{Address, B256, Bytes};
use serde::Serialize;

/// Block fields the mapper needs from `eth_getBlockByNumber`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcHeaderData {
    pub block_hash: B256,
    pub block_number: u64,
    pub parent_hash: B256,
    pub coinbase: Address,
    /// Serialized atomic transaction, empty when the block carries none
    pub block_extra_data: Bytes,
}
