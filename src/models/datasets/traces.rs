use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::models::errors::MapperError;
use crate::models::operations::OperationType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
    Create,
    Create2,
    SelfDestruct,
}

impl CallKind {
    /// Message calls, as opposed to contract creation or destruction.
    pub fn is_call(&self) -> bool {
        matches!(
            self,
            Self::Call | Self::CallCode | Self::DelegateCall | Self::StaticCall
        )
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create | Self::Create2)
    }

    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Call => OperationType::Call,
            Self::CallCode => OperationType::CallCode,
            Self::DelegateCall => OperationType::DelegateCall,
            Self::StaticCall => OperationType::StaticCall,
            Self::Create => OperationType::Create,
            Self::Create2 => OperationType::Create2,
            Self::SelfDestruct => OperationType::SelfDestruct,
        }
    }
}

impl FromStr for CallKind {
    type Err = MapperError;

    // Tracers disagree on casing ("call" vs "CALL")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CALL" => Ok(Self::Call),
            "CALLCODE" => Ok(Self::CallCode),
            "DELEGATECALL" => Ok(Self::DelegateCall),
            "STATICCALL" => Ok(Self::StaticCall),
            "CREATE" => Ok(Self::Create),
            "CREATE2" => Ok(Self::Create2),
            "SELFDESTRUCT" => Ok(Self::SelfDestruct),
            _ => Err(MapperError::UnsupportedCallType {
                call_type: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation_type().as_str())
    }
}

/// One entry of a flattened call trace, in pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatCall {
    pub kind: CallKind,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub revert: bool,
    pub error_message: Option<String>,
}
