use std::collections::BTreeMap;

use alloy_primitives::{Address, I256, U256};
use serde_json::{Map, Value};
use tracing::error;

use crate::models::datasets::traces::{CallKind, FlatCall};
use crate::models::errors::MapperError;
use crate::models::operations::{
    AccountIdentifier, Amount, Operation, OperationIdentifier, OperationStatus, OperationType,
};

/// Balance still owed to the void by accounts that self-destructed during
/// the transaction. A destroyed account's balance is zeroed when the
/// transaction finalizes, so anything it receives after the SELFDESTRUCT
/// has to leave again through a final DESTRUCT operation.
///
/// Ordered by address so the DESTRUCT operations come out deterministically.
#[derive(Debug, Default)]
struct DestroyedAccounts(BTreeMap<Address, I256>);

impl DestroyedAccounts {
    /// Marks `account` destroyed, discarding anything accumulated so far.
    fn destroy(&mut self, account: Address) {
        self.0.insert(account, I256::ZERO);
    }

    /// A create targeting a destroyed address brings it back to life.
    fn resurrect(&mut self, account: Address) {
        self.0.remove(&account);
    }

    fn debit(&mut self, account: Address, value: U256) -> Result<(), MapperError> {
        self.adjust(account, value, I256::checked_sub)
    }

    fn credit(&mut self, account: Address, value: U256) -> Result<(), MapperError> {
        self.adjust(account, value, I256::checked_add)
    }

    fn adjust(
        &mut self,
        account: Address,
        value: U256,
        op: fn(I256, I256) -> Option<I256>,
    ) -> Result<(), MapperError> {
        let Some(balance) = self.0.get_mut(&account) else {
            return Ok(());
        };
        let overflow = || MapperError::ValueOverflow {
            value: value.to_string(),
        };
        let value = I256::try_from(value).map_err(|_| overflow())?;
        *balance = op(*balance, value).ok_or_else(overflow)?;
        Ok(())
    }

    /// Balances that must be zeroed out, failing on any negative balance:
    /// a destroyed account can never give away more than it received.
    fn into_outstanding(self) -> Result<Vec<(Address, I256)>, MapperError> {
        let mut outstanding = Vec::new();
        for (account, balance) in self.0 {
            if balance.is_zero() {
                continue;
            }
            if balance.is_negative() {
                error!(
                    %account,
                    %balance,
                    "Negative balance for destroyed account, value is not conserved"
                );
                return Err(MapperError::NegativeDestroyedBalance { account, balance });
            }
            outstanding.push((account, balance));
        }
        Ok(outstanding)
    }
}

/// Walks a flattened call trace and emits the balance-changing operations,
/// numbered from `start_index`.
///
/// Zero-value message calls produce no operations, but still go through the
/// destroyed-account bookkeeping. The walk is order-dependent and must see
/// the calls exactly as they were executed.
pub fn trace_operations(
    calls: &[FlatCall],
    start_index: usize,
) -> Result<Vec<Operation>, MapperError> {
    let mut ops: Vec<Operation> = Vec::new();
    let mut destroyed = DestroyedAccounts::default();
    let next_index = |len: usize| (start_index + len) as i64;

    for call in calls {
        let mut metadata = Map::new();
        let status = if call.revert {
            metadata.insert(
                "error".to_string(),
                Value::String(call.error_message.clone().unwrap_or_default()),
            );
            OperationStatus::Failure
        } else {
            OperationStatus::Success
        };
        let succeeded = status == OperationStatus::Success;

        let zero_value = call.value.is_zero();
        let should_add = !(zero_value && call.kind.is_call());
        let op_type = call.kind.operation_type();

        if should_add {
            if !zero_value && succeeded {
                destroyed.debit(call.from, call.value)?;
            }

            ops.push(Operation {
                operation_identifier: OperationIdentifier::new(next_index(ops.len())),
                related_operations: vec![],
                r#type: op_type,
                status,
                account: AccountIdentifier::from(call.from),
                amount: (!zero_value).then(|| Amount::debit(call.value)),
                metadata: metadata.clone(),
            });
        }

        if call.kind == CallKind::SelfDestruct {
            destroyed.destroy(call.from);

            // Sending the balance to itself is a no-op: the balance is wiped
            // right after it is credited.
            if call.to == Some(call.from) {
                continue;
            }
        }

        let Some(to) = call.to else {
            continue;
        };

        if call.kind.is_create() {
            destroyed.resurrect(to);
        }

        if should_add {
            // Relates to the last emitted operation, which is this call's
            // debit leg.
            let related = ops
                .last()
                .map(|op| OperationIdentifier::new(op.index()))
                .into_iter()
                .collect();

            if !zero_value && succeeded {
                destroyed.credit(to, call.value)?;
            }

            ops.push(Operation {
                operation_identifier: OperationIdentifier::new(next_index(ops.len())),
                related_operations: related,
                r#type: op_type,
                status,
                account: AccountIdentifier::from(to),
                amount: (!zero_value).then(|| Amount::credit(call.value)),
                metadata,
            });
        }
    }

    for (account, balance) in destroyed.into_outstanding()? {
        ops.push(Operation {
            operation_identifier: OperationIdentifier::new(next_index(ops.len())),
            related_operations: vec![],
            r#type: OperationType::Destruct,
            status: OperationStatus::Success,
            account: AccountIdentifier::from(account),
            amount: Some(Amount::signed(-balance)),
            metadata: Map::new(),
        });
    }

    Ok(ops)
}
