use alloy_primitives::{Address, I256};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Failed to decode atomic transaction: {0}")]
    Decode(#[from] DecodeError),
    #[error("Unsupported transaction: {type_name}")]
    UnsupportedTransaction { type_name: &'static str },
    #[error("Negative balance for destroyed account {account}: {balance}")]
    NegativeDestroyedBalance { account: Address, balance: I256 },
    #[error("Unsupported call type in trace: {call_type}")]
    UnsupportedCallType { call_type: String },
    #[error("Call value does not fit a signed 256-bit balance: {value}")]
    ValueOverflow { value: String },
    #[error("Failed to encode transaction metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl MapperError {
    /// Internal errors are derivation bugs or an unexpected chain state,
    /// never bad caller input.
    pub fn is_internal(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }

    pub fn api_error(&self) -> ApiError {
        let base = if self.is_internal() {
            ERR_INTERNAL_ERROR
        } else {
            ERR_INVALID_INPUT
        };
        base.with_details(self.to_string())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unexpected end of input: needed {needed} bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("Unknown codec version: {0}")]
    UnknownCodecVersion(u16),
    #[error("Unknown type ID: {0}")]
    UnknownTypeId(u32),
    #[error("Expected {expected} at offset {offset}, found type ID {type_id}")]
    UnexpectedType {
        expected: &'static str,
        type_id: u32,
        offset: usize,
    },
    #[error("Slice length {len} at offset {offset} exceeds the remaining input")]
    OversizedSlice { offset: usize, len: u32 },
    #[error("Input has {0} trailing bytes")]
    TrailingBytes(usize),
}

////////////////////////////////////// Error catalog ///////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: i32,
    pub message: &'static str,
    pub retriable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl ApiError {
    const fn new(code: i32, message: &'static str, retriable: bool) -> Self {
        Self {
            code,
            message,
            retriable,
            details: None,
        }
    }

    pub fn with_details(mut self, error: String) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert("error".to_string(), Value::String(error));
        self
    }
}

// General errors
pub const ERR_NOT_IMPLEMENTED: ApiError = ApiError::new(1, "Endpoint is not implemented", false);
pub const ERR_NOT_SUPPORTED: ApiError = ApiError::new(2, "Endpoint is not supported", false);
pub const ERR_INTERNAL_ERROR: ApiError = ApiError::new(3, "Internal server error", true);
pub const ERR_INVALID_INPUT: ApiError = ApiError::new(4, "Invalid input", false);

// Network status errors
pub const ERR_STATUS_BLOCK_FETCH_FAILED: ApiError =
    ApiError::new(100, "Unable to fetch block", true);
pub const ERR_STATUS_BLOCK_NOT_FOUND: ApiError =
    ApiError::new(101, "Latest block was not found", true);
pub const ERR_STATUS_PEERS_FAILED: ApiError = ApiError::new(102, "Unable to fetch peers", true);
pub const ERR_STATUS_NODE_VERSION_FAILED: ApiError =
    ApiError::new(103, "Unable to fetch node version", true);

// Block errors
pub const ERR_BLOCK_INVALID_INPUT: ApiError =
    ApiError::new(200, "Block number or hash is required", false);
pub const ERR_BLOCK_FETCH_FAILED: ApiError = ApiError::new(201, "Unable to fetch block", true);
pub const ERR_BLOCK_NOT_FOUND: ApiError = ApiError::new(202, "Block was not found", false);

// Construction errors
pub const ERR_CONSTRUCTION_INVALID_TX: ApiError =
    ApiError::new(300, "Invalid transaction data", false);
pub const ERR_CONSTRUCTION_SUBMIT_FAILED: ApiError =
    ApiError::new(301, "Transaction submission failed", true);

pub fn error_list() -> Vec<ApiError> {
    vec![
        ERR_NOT_IMPLEMENTED,
        ERR_NOT_SUPPORTED,
        ERR_INVALID_INPUT,
        ERR_INTERNAL_ERROR,
        ERR_STATUS_BLOCK_FETCH_FAILED,
        ERR_STATUS_BLOCK_NOT_FOUND,
        ERR_STATUS_PEERS_FAILED,
        ERR_STATUS_NODE_VERSION_FAILED,
        ERR_BLOCK_INVALID_INPUT,
        ERR_BLOCK_FETCH_FAILED,
        ERR_BLOCK_NOT_FOUND,
        ERR_CONSTRUCTION_SUBMIT_FAILED,
        ERR_CONSTRUCTION_INVALID_TX,
    ]
}
