use alloy_rpc_types_trace::geth::CallFrame;
use serde_json::{Map, Value, json};

use crate::mapper::rpc::traces::TraceParser;
use crate::mapper::transformations::fees::fee_operations;
use crate::mapper::transformations::traces::trace_operations;
use crate::models::datasets::blocks::RpcHeaderData;
use crate::models::datasets::transactions::{
    ExecutionMessage, RpcTransactionData, RpcTransactionReceiptData,
};
use crate::models::errors::MapperError;
use crate::models::operations::{Transaction, TransactionIdentifier};

/// Builds the ledger record for one executed transaction: the fee pair
/// first, then the trace operations numbered on from there.
pub fn transaction(
    header: &RpcHeaderData,
    tx: &RpcTransactionData,
    message: &impl ExecutionMessage,
    receipt: &RpcTransactionReceiptData,
    trace: &CallFrame,
) -> Result<Transaction, MapperError> {
    let mut operations = fee_operations(header, message, receipt);

    let calls = trace.flatten_calls()?;
    let trace_ops = trace_operations(&calls, operations.len())?;
    operations.extend(trace_ops);

    let mut metadata = Map::new();
    metadata.insert("gas".to_string(), json!(tx.gas_limit));
    metadata.insert(
        "gas_price".to_string(),
        Value::String(tx.gas_price.to_string()),
    );
    metadata.insert("receipt".to_string(), serde_json::to_value(receipt)?);
    metadata.insert("trace".to_string(), serde_json::to_value(trace)?);

    Ok(Transaction {
        transaction_identifier: TransactionIdentifier {
            hash: tx.tx_hash.to_string(),
        },
        operations,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256, Bytes, U256};

    use super::*;
    use crate::models::datasets::transactions::Message;
    use crate::models::operations::{
        AccountIdentifier, OperationIdentifier, OperationStatus, OperationType,
    };

    const SENDER: Address = Address::repeat_byte(0xa1);
    const RECIPIENT: Address = Address::repeat_byte(0xb2);
    const COINBASE: Address = Address::repeat_byte(0xcb);

    fn header() -> RpcHeaderData {
        RpcHeaderData {
            block_hash: B256::repeat_byte(1),
            block_number: 100,
            parent_hash: B256::repeat_byte(2),
            coinbase: COINBASE,
            block_extra_data: Bytes::new(),
        }
    }

    fn tx() -> RpcTransactionData {
        RpcTransactionData {
            tx_hash: B256::repeat_byte(0x77),
            from_address: SENDER,
            gas_limit: 30_000,
            gas_price: 50,
        }
    }

    fn receipt(status: bool) -> RpcTransactionReceiptData {
        RpcTransactionReceiptData {
            tx_hash: B256::repeat_byte(0x77),
            tx_index: Some(0),
            block_hash: Some(B256::repeat_byte(1)),
            block_number: Some(100),
            status,
            from_address: SENDER,
            to_address: Some(RECIPIENT),
            contract_address: None,
            gas_used: 21_000,
            effective_gas_price: 50,
        }
    }

    fn transfer(value: u64) -> CallFrame {
        CallFrame {
            typ: "CALL".to_string(),
            from: SENDER,
            to: Some(RECIPIENT),
            value: Some(U256::from(value)),
            gas: U256::from(30_000),
            gas_used: U256::from(21_000),
            ..Default::default()
        }
    }

    fn message() -> Message {
        Message {
            from: SENDER,
            gas_price: 50,
        }
    }

    #[test]
    fn simple_transfer_has_fee_and_call_pairs() {
        let record =
            transaction(&header(), &tx(), &message(), &receipt(true), &transfer(100)).unwrap();

        assert_eq!(
            record.transaction_identifier.hash,
            B256::repeat_byte(0x77).to_string()
        );

        let ops = &record.operations;
        assert_eq!(ops.len(), 4);
        for (idx, op) in ops.iter().enumerate() {
            assert_eq!(op.index(), idx as i64);
            assert_eq!(op.status, OperationStatus::Success);
        }

        assert_eq!(ops[0].r#type, OperationType::Fee);
        assert_eq!(ops[0].account, AccountIdentifier::from(SENDER));
        assert_eq!(ops[0].amount.as_ref().unwrap().value, "-1050000");
        assert_eq!(ops[1].account, AccountIdentifier::from(COINBASE));
        assert_eq!(ops[1].amount.as_ref().unwrap().value, "1050000");

        assert_eq!(ops[2].r#type, OperationType::Call);
        assert_eq!(ops[2].account, AccountIdentifier::from(SENDER));
        assert_eq!(ops[2].amount.as_ref().unwrap().value, "-100");
        assert_eq!(ops[3].account, AccountIdentifier::from(RECIPIENT));
        assert_eq!(ops[3].amount.as_ref().unwrap().value, "100");
        assert_eq!(ops[3].related_operations, vec![OperationIdentifier::new(2)]);
    }

    #[test]
    fn metadata_carries_gas_and_raw_inputs() {
        let record =
            transaction(&header(), &tx(), &message(), &receipt(true), &transfer(100)).unwrap();

        assert_eq!(record.metadata["gas"], json!(30_000));
        assert_eq!(record.metadata["gas_price"], json!("50"));
        assert_eq!(record.metadata["receipt"]["gas_used"], json!(21_000));
        assert_eq!(record.metadata["trace"]["type"], json!("CALL"));
    }

    #[test]
    fn reverted_transaction_still_pays_fees() {
        let mut frame = transfer(100);
        frame.error = Some("execution reverted".to_string());

        let record = transaction(&header(), &tx(), &message(), &receipt(false), &frame).unwrap();
        let ops = &record.operations;

        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0].status, OperationStatus::Success);
        assert_eq!(ops[1].status, OperationStatus::Success);
        assert_eq!(ops[2].status, OperationStatus::Failure);
        assert_eq!(ops[3].status, OperationStatus::Failure);
        assert_eq!(ops[2].metadata["error"], json!("execution reverted"));
    }

    #[test]
    fn zero_value_call_yields_only_fees() {
        let record =
            transaction(&header(), &tx(), &message(), &receipt(true), &transfer(0)).unwrap();
        assert_eq!(record.operations.len(), 2);
    }

    #[test]
    fn unknown_call_type_fails_the_transaction() {
        let mut frame = transfer(1);
        frame.typ = "SUICIDE".to_string();

        let result = transaction(&header(), &tx(), &message(), &receipt(true), &frame);
        assert!(matches!(
            result,
            Err(MapperError::UnsupportedCallType { .. })
        ));
    }
}
