use alloy_primitives::U256;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::codec::atomic::{Tx, UnsignedAtomicTx, UnsignedExportTx, UnsignedImportTx};
use crate::models::datasets::blocks::RpcHeaderData;
use crate::models::errors::MapperError;
use crate::models::operations::{
    AccountIdentifier, Amount, Operation, OperationIdentifier, OperationStatus, OperationType,
    Transaction, TransactionIdentifier, X2C_CONVERSION_FACTOR,
};

/// Maps the atomic transaction carried by a block into ledger operations,
/// one per transfer leg. The record is keyed by the block hash since the
/// payload belongs to the block rather than to any EVM transaction.
pub fn cross_chain_transactions(header: &RpcHeaderData) -> Result<Vec<Transaction>, MapperError> {
    if header.block_extra_data.is_empty() {
        return Ok(vec![]);
    }

    let tx = Tx::unmarshal(&header.block_extra_data)?;
    let meta = json!({ "id": tx.id.to_string() });

    let operations = match &tx.unsigned {
        UnsignedAtomicTx::Import(import) => import_operations(import, &meta),
        UnsignedAtomicTx::Export(export) => export_operations(export, &meta),
    };

    debug!(
        block = header.block_number,
        tx_id = %tx.id,
        operations = operations.len(),
        "Mapped atomic transaction"
    );

    Ok(vec![Transaction {
        transaction_identifier: TransactionIdentifier {
            hash: header.block_hash.to_string(),
        },
        operations,
        metadata: Map::new(),
    }])
}

fn scaled(amount: u64) -> U256 {
    U256::from(amount) * U256::from(X2C_CONVERSION_FACTOR)
}

fn import_operations(tx: &UnsignedImportTx, meta: &Value) -> Vec<Operation> {
    let tx_id = tx
        .imported_inputs
        .first()
        .map(|input| input.tx_id.to_string())
        .unwrap_or_default();

    tx.outs
        .iter()
        .enumerate()
        .map(|(idx, out)| {
            let mut metadata = Map::new();
            metadata.insert("tx_id".to_string(), Value::String(tx_id.clone()));
            metadata.insert(
                "blockchain_id".to_string(),
                Value::String(tx.blockchain_id.to_string()),
            );
            metadata.insert("network_id".to_string(), json!(tx.network_id));
            metadata.insert(
                "source_chain".to_string(),
                Value::String(tx.source_chain.to_string()),
            );
            metadata.insert("meta".to_string(), meta.clone());
            metadata.insert(
                "asset_id".to_string(),
                Value::String(out.asset_id.to_string()),
            );

            Operation {
                operation_identifier: OperationIdentifier::new(idx as i64),
                related_operations: vec![],
                r#type: OperationType::Import,
                status: OperationStatus::Success,
                account: AccountIdentifier::from(out.address),
                amount: Some(Amount::credit(scaled(out.amount))),
                metadata,
            }
        })
        .collect()
}

fn export_operations(tx: &UnsignedExportTx, meta: &Value) -> Vec<Operation> {
    tx.ins
        .iter()
        .enumerate()
        .map(|(idx, input)| {
            let mut metadata = Map::new();
            metadata.insert(
                "blockchain_id".to_string(),
                Value::String(tx.blockchain_id.to_string()),
            );
            metadata.insert("network_id".to_string(), json!(tx.network_id));
            metadata.insert(
                "destination_chain".to_string(),
                Value::String(tx.destination_chain.to_string()),
            );
            metadata.insert("meta".to_string(), meta.clone());
            metadata.insert(
                "asset_id".to_string(),
                Value::String(input.asset_id.to_string()),
            );

            Operation {
                operation_identifier: OperationIdentifier::new(idx as i64),
                related_operations: vec![],
                r#type: OperationType::Export,
                status: OperationStatus::Success,
                account: AccountIdentifier::from(input.address),
                amount: Some(Amount::debit(scaled(input.amount))),
                metadata,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256, Bytes};

    use super::*;
    use crate::codec::atomic::testing::*;
    use crate::codec::ids::Id;
    use crate::models::errors::DecodeError;

    fn header(extra: Vec<u8>) -> RpcHeaderData {
        RpcHeaderData {
            block_hash: B256::repeat_byte(0x42),
            block_number: 7,
            parent_hash: B256::repeat_byte(0x41),
            coinbase: Address::ZERO,
            block_extra_data: Bytes::from(extra),
        }
    }

    #[test]
    fn empty_extra_data_has_no_transactions() {
        assert!(cross_chain_transactions(&header(vec![])).unwrap().is_empty());
    }

    #[test]
    fn import_credits_each_output() {
        let import = sample_import();
        let bytes = encode_import(&import, &sample_credentials());
        let txs = cross_chain_transactions(&header(bytes.clone())).unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(
            txs[0].transaction_identifier.hash,
            B256::repeat_byte(0x42).to_string()
        );

        let ops = &txs[0].operations;
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].index(), 0);
        assert_eq!(ops[1].index(), 1);
        assert_eq!(ops[0].r#type, OperationType::Import);
        assert_eq!(ops[0].account, AccountIdentifier::from(Address::repeat_byte(0xaa)));
        assert_eq!(ops[0].amount.as_ref().unwrap().value, "1250000000000");
        assert_eq!(ops[1].amount.as_ref().unwrap().value, "700000000000");

        let metadata = &ops[1].metadata;
        assert_eq!(metadata["tx_id"], Value::String(Id([3u8; 32]).to_string()));
        assert_eq!(metadata["network_id"], json!(1));
        assert_eq!(
            metadata["source_chain"],
            Value::String(Id([2u8; 32]).to_string())
        );
        assert_eq!(metadata["meta"]["id"], Value::String(Id::hash_of(&bytes).to_string()));
        assert!(!metadata.contains_key("destination_chain"));
    }

    #[test]
    fn export_debits_each_input() {
        let bytes = encode_export(&sample_export(), &[]);
        let txs = cross_chain_transactions(&header(bytes)).unwrap();

        let ops = &txs[0].operations;
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].r#type, OperationType::Export);
        assert_eq!(ops[0].status, OperationStatus::Success);
        assert_eq!(ops[0].amount.as_ref().unwrap().value, "-42000000000");
        assert_eq!(
            ops[0].metadata["destination_chain"],
            Value::String(Id([6u8; 32]).to_string())
        );
        assert_eq!(ops[0].metadata["network_id"], json!(5));
        assert!(!ops[0].metadata.contains_key("tx_id"));
    }

    #[test]
    fn import_without_inputs_has_empty_source_tx() {
        let mut import = sample_import();
        import.imported_inputs.clear();
        let txs = cross_chain_transactions(&header(encode_import(&import, &[]))).unwrap();

        assert_eq!(txs[0].operations[0].metadata["tx_id"], Value::String(String::new()));
    }

    #[test]
    fn malformed_payload_is_propagated() {
        let result = cross_chain_transactions(&header(vec![0, 0, 0]));
        assert!(matches!(
            result,
            Err(MapperError::Decode(DecodeError::UnexpectedEof { .. }))
        ));
    }

    #[test]
    fn non_transaction_payload_is_unsupported() {
        let mut w = Writer::default();
        w.u16(0).u32(9);
        let result = cross_chain_transactions(&header(w.0));
        assert!(matches!(
            result,
            Err(MapperError::UnsupportedTransaction { .. })
        ));
    }
}
