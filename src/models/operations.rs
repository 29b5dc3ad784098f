use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::errors::{ApiError, error_list};

/// Scale between the 9-decimal cross-chain unit and the 18-decimal native unit.
pub const X2C_CONVERSION_FACTOR: u64 = 1_000_000_000;

pub const NATIVE_CURRENCY: Currency = Currency {
    symbol: "AVAX",
    decimals: 18,
};

pub const OPERATION_TYPES: [OperationType; 11] = [
    OperationType::Fee,
    OperationType::Call,
    OperationType::Create,
    OperationType::Create2,
    OperationType::SelfDestruct,
    OperationType::CallCode,
    OperationType::DelegateCall,
    OperationType::StaticCall,
    OperationType::Destruct,
    OperationType::Import,
    OperationType::Export,
];

pub const OPERATION_STATUSES: [OperationStatusInfo; 2] = [
    OperationStatusInfo {
        status: OperationStatus::Success,
        successful: true,
    },
    OperationStatusInfo {
        status: OperationStatus::Failure,
        successful: false,
    },
];

pub const CALL_METHODS: [&str; 1] = ["eth_getTransactionReceipt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub symbol: &'static str,
    pub decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Fee,
    Call,
    Create,
    Create2,
    #[serde(rename = "SELFDESTRUCT")]
    SelfDestruct,
    #[serde(rename = "CALLCODE")]
    CallCode,
    #[serde(rename = "DELEGATECALL")]
    DelegateCall,
    #[serde(rename = "STATICCALL")]
    StaticCall,
    Destruct,
    Import,
    Export,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fee => "FEE",
            Self::Call => "CALL",
            Self::Create => "CREATE",
            Self::Create2 => "CREATE2",
            Self::SelfDestruct => "SELFDESTRUCT",
            Self::CallCode => "CALLCODE",
            Self::DelegateCall => "DELEGATECALL",
            Self::StaticCall => "STATICCALL",
            Self::Destruct => "DESTRUCT",
            Self::Import => "IMPORT",
            Self::Export => "EXPORT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationStatusInfo {
    pub status: OperationStatus,
    pub successful: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OperationIdentifier {
    pub index: i64,
}

impl OperationIdentifier {
    pub fn new(index: i64) -> Self {
        Self { index }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountIdentifier {
    pub address: String,
}

impl From<Address> for AccountIdentifier {
    // `Display` on `Address` is the EIP-55 checksummed form
    fn from(address: Address) -> Self {
        Self {
            address: address.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Amount {
    pub value: String,
    pub currency: Currency,
}

impl Amount {
    pub fn credit(value: U256) -> Self {
        Self {
            value: value.to_string(),
            currency: NATIVE_CURRENCY,
        }
    }

    pub fn debit(value: U256) -> Self {
        let value = if value.is_zero() {
            value.to_string()
        } else {
            format!("-{value}")
        };
        Self {
            value,
            currency: NATIVE_CURRENCY,
        }
    }

    pub fn signed(value: I256) -> Self {
        Self {
            value: value.to_string(),
            currency: NATIVE_CURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub operation_identifier: OperationIdentifier,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_operations: Vec<OperationIdentifier>,
    #[serde(rename = "type")]
    pub r#type: OperationType,
    pub status: OperationStatus,
    pub account: AccountIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Operation {
    pub fn index(&self) -> i64 {
        self.operation_identifier.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionIdentifier {
    pub hash: String,
}

/// One ledger transaction: the ordered operations derived from a single
/// EVM transaction, or the transfer legs of a block's atomic transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub transaction_identifier: TransactionIdentifier,
    pub operations: Vec<Operation>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// Capabilities advertised to the network options endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Allow {
    pub operation_statuses: Vec<OperationStatusInfo>,
    pub operation_types: Vec<OperationType>,
    pub call_methods: Vec<String>,
    pub errors: Vec<ApiError>,
    pub historical_balance_lookup: bool,
}

pub fn network_options_allow() -> Allow {
    Allow {
        operation_statuses: OPERATION_STATUSES.to_vec(),
        operation_types: OPERATION_TYPES.to_vec(),
        call_methods: CALL_METHODS.iter().map(|m| m.to_string()).collect(),
        errors: error_list(),
        historical_balance_lookup: true,
    }
}
