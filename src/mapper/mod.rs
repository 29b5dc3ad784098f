pub mod rpc;
pub mod transformations;

use std::collections::HashMap;

use anyhow::{Context, Result, ensure};
use tracing::{debug, warn};

use crate::mapper::rpc::{blocks::BlockParser, receipts::ReceiptParser};
use crate::mapper::transformations::{
    cross_chain::cross_chain_transactions, transactions::transaction,
};
use crate::models::common::{BlockBundle, BlockIdentifier, MappedBlock};
use crate::models::datasets::transactions::Message;
use crate::models::operations::TransactionIdentifier;

/// Maps one block bundle into its ledger records: one per executed
/// transaction in block order, followed by any cross-chain records.
pub fn map_block(bundle: &BlockBundle) -> Result<MappedBlock> {
    let header = bundle.block.parse_header()?;
    let transactions = bundle.block.parse_transactions();
    let receipts = bundle.receipts.parse_transaction_receipts();

    ensure!(
        transactions.len() == receipts.len() && transactions.len() == bundle.traces.len(),
        "block {} has {} transactions, {} receipts and {} traces",
        header.block_number,
        transactions.len(),
        receipts.len(),
        bundle.traces.len()
    );

    let mut records = Vec::with_capacity(transactions.len() + 1);
    for ((tx, receipt), trace) in transactions.iter().zip(&receipts).zip(&bundle.traces) {
        ensure!(
            tx.tx_hash == receipt.tx_hash,
            "receipt {} does not match transaction {} in block {}",
            receipt.tx_hash,
            tx.tx_hash,
            header.block_number
        );

        // Fees are charged at the price actually paid, not the bid
        let message = Message {
            from: tx.from_address,
            gas_price: receipt.effective_gas_price,
        };

        let record = transaction(&header, tx, &message, receipt, trace).with_context(|| {
            format!(
                "failed to map transaction {} in block {}",
                tx.tx_hash, header.block_number
            )
        })?;
        records.push(record);
    }

    let cross_chain = cross_chain_transactions(&header).with_context(|| {
        format!(
            "failed to map atomic transaction in block {}",
            header.block_number
        )
    })?;
    records.extend(cross_chain);

    debug!(
        block = header.block_number,
        transactions = records.len(),
        "Mapped block"
    );

    Ok(MappedBlock {
        block_identifier: BlockIdentifier::new(header.block_number, header.block_hash),
        parent_block_identifier: BlockIdentifier::new(
            header.block_number.saturating_sub(1),
            header.parent_hash,
        ),
        transactions: records,
    })
}

/// Lists the transactions in a txpool content map (account, then nonce, to a
/// `"<hash>:<summary>"` string). Entries are sorted by hash.
pub fn mempool_transaction_ids(
    content: &HashMap<String, HashMap<String, String>>,
) -> Vec<TransactionIdentifier> {
    let mut hashes: Vec<&str> = content
        .values()
        .flat_map(HashMap::values)
        .filter_map(|entry| {
            let hash = entry.split(':').next().unwrap_or_default();
            if hash.is_empty() {
                warn!("Skipping malformed txpool entry: {}", entry);
                None
            } else {
                Some(hash)
            }
        })
        .collect();
    hashes.sort_unstable();

    hashes
        .into_iter()
        .map(|hash| TransactionIdentifier {
            hash: hash.to_string(),
        })
        .collect()
}
