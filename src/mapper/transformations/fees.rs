use alloy_primitives::U256;
use serde_json::Map;

use crate::models::datasets::blocks::RpcHeaderData;
use crate::models::datasets::transactions::{ExecutionMessage, RpcTransactionReceiptData};
use crate::models::operations::{
    AccountIdentifier, Amount, Operation, OperationIdentifier, OperationStatus, OperationType,
};

/// Gas paid by the sender to the block's fee recipient. Fees are charged
/// whether or not the transaction reverted, so both legs always succeed.
pub fn fee_operations(
    header: &RpcHeaderData,
    message: &impl ExecutionMessage,
    receipt: &RpcTransactionReceiptData,
) -> Vec<Operation> {
    let fee = U256::from(receipt.gas_used) * U256::from(message.gas_price());

    vec![
        Operation {
            operation_identifier: OperationIdentifier::new(0),
            related_operations: vec![],
            r#type: OperationType::Fee,
            status: OperationStatus::Success,
            account: AccountIdentifier::from(message.sender()),
            amount: Some(Amount::debit(fee)),
            metadata: Map::new(),
        },
        Operation {
            operation_identifier: OperationIdentifier::new(1),
            related_operations: vec![OperationIdentifier::new(0)],
            r#type: OperationType::Fee,
            status: OperationStatus::Success,
            account: AccountIdentifier::from(header.coinbase),
            amount: Some(Amount::credit(fee)),
            metadata: Map::new(),
        },
    ]
}
