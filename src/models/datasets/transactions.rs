use alloy_primitives::{Address, B256};
use serde::Serialize;

////////////////////////////////////// RPC Data ////////////////////////////////////////
///////////////////////////////// eth_getBlockByNumber /////////////////////////////////
#[derive(Debug, Clone)]
pub struct RpcTransactionData {
    pub tx_hash: B256,
    pub from_address: Address,
    pub gas_limit: u64,
    // Legacy gas price, or the fee cap for dynamic-fee transactions
    pub gas_price: u128,
}

///////////////////////////////// eth_getBlockReceipts /////////////////////////////////
#[derive(Debug, Clone, Serialize)]
pub struct RpcTransactionReceiptData {
    pub tx_hash: B256,
    pub tx_index: Option<u64>,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub status: bool,
    pub from_address: Address,
    pub to_address: Option<Address>,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub effective_gas_price: u128,
}

/// The executed view of a transaction: who pays and at what price.
pub trait ExecutionMessage {
    fn sender(&self) -> Address;
    fn gas_price(&self) -> u128;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub from: Address,
    pub gas_price: u128,
}

impl ExecutionMessage for Message {
    fn sender(&self) -> Address {
        self.from
    }

    fn gas_price(&self) -> u128 {
        self.gas_price
    }
}

// Receipts carry the price actually paid, which is what fees are charged at
impl ExecutionMessage for RpcTransactionReceiptData {
    fn sender(&self) -> Address {
        self.from_address
    }

    fn gas_price(&self) -> u128 {
        self.effective_gas_price
    }
}
