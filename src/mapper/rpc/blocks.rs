use alloy_network::TransactionResponse;
use alloy_primitives::Bytes;
use alloy_rpc_types_eth::Block;
use alloy_serde::WithOtherFields;
use anyhow::{Context, Result};

use crate::models::datasets::blocks::RpcHeaderData;
use crate::models::datasets::transactions::RpcTransactionData;

// Atomic transactions travel in the block body, which the node exposes as
// an extra field on the block object rather than in the header.
const BLOCK_EXTRA_DATA_FIELD: &str = "blockExtraData";

pub trait BlockParser {
    fn parse_header(&self) -> Result<RpcHeaderData>;
    fn parse_transactions(&self) -> Vec<RpcTransactionData>;
}

impl BlockParser for WithOtherFields<Block> {
    fn parse_header(&self) -> Result<RpcHeaderData> {
        let header = &self.inner.header;

        let block_extra_data = self
            .other
            .get_deserialized::<Bytes>(BLOCK_EXTRA_DATA_FIELD)
            .transpose()
            .with_context(|| format!("invalid {BLOCK_EXTRA_DATA_FIELD} in block {}", header.hash))?
            .unwrap_or_default();

        Ok(RpcHeaderData {
            block_hash: header.hash,
            block_number: header.inner.number,
            parent_hash: header.inner.parent_hash,
            coinbase: header.inner.beneficiary,
            block_extra_data,
        })
    }

    fn parse_transactions(&self) -> Vec<RpcTransactionData> {
        // Hash-only blocks yield no transactions here
        self.inner
            .transactions
            .txns()
            .map(|tx| RpcTransactionData {
                tx_hash: TransactionResponse::tx_hash(tx),
                from_address: TransactionResponse::from(tx),
                gas_limit: alloy_consensus::Transaction::gas_limit(tx),
                gas_price: alloy_consensus::Transaction::gas_price(tx)
                    .unwrap_or_else(|| alloy_consensus::Transaction::max_fee_per_gas(tx)),
            })
            .collect()
    }
}
