use alloy_network::ReceiptResponse;
use alloy_rpc_types_eth::TransactionReceipt;

use crate::models::datasets::transactions::RpcTransactionReceiptData;

pub trait ReceiptParser {
    fn parse_transaction_receipts(&self) -> Vec<RpcTransactionReceiptData>;
}

impl ReceiptParser for [TransactionReceipt] {
    fn parse_transaction_receipts(&self) -> Vec<RpcTransactionReceiptData> {
        self.iter()
            .map(|receipt| RpcTransactionReceiptData {
                tx_hash: receipt.transaction_hash,
                tx_index: receipt.transaction_index,
                block_hash: receipt.block_hash,
                block_number: receipt.block_number,
                status: ReceiptResponse::status(receipt),
                from_address: receipt.from,
                to_address: receipt.to,
                contract_address: receipt.contract_address,
                gas_used: receipt.gas_used,
                effective_gas_price: receipt.effective_gas_price,
            })
            .collect()
    }
}
