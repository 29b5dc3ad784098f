use alloy_rpc_types_trace::geth::CallFrame;

use crate::models::datasets::traces::{CallKind, FlatCall};
use crate::models::errors::MapperError;

pub trait TraceParser {
    fn flatten_calls(&self) -> Result<Vec<FlatCall>, MapperError>;
}

impl TraceParser for CallFrame {
    fn flatten_calls(&self) -> Result<Vec<FlatCall>, MapperError> {
        let mut calls = Vec::new();
        flatten_call_frames(self, None, &mut calls)?;
        Ok(calls)
    }
}

// Recursively flattens a CallFrame and its nested calls, parent first.
// Everything under a reverted frame is reverted too, and inherits the
// parent's error when it has none of its own.
fn flatten_call_frames(
    frame: &CallFrame,
    parent_error: Option<&str>,
    calls: &mut Vec<FlatCall>,
) -> Result<(), MapperError> {
    let error_message = frame.error.as_deref().or(parent_error);

    calls.push(FlatCall {
        kind: frame.typ.parse::<CallKind>()?,
        from: frame.from,
        to: frame.to,
        value: frame.value.unwrap_or_default(),
        revert: error_message.is_some(),
        error_message: error_message.map(str::to_string),
    });

    for nested_call in &frame.calls {
        flatten_call_frames(nested_call, error_message, calls)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};

    use super::*;

    fn frame(typ: &str, from: u8, to: u8, value: u64) -> CallFrame {
        CallFrame {
            typ: typ.to_string(),
            from: Address::repeat_byte(from),
            to: Some(Address::repeat_byte(to)),
            value: Some(U256::from(value)),
            ..Default::default()
        }
    }

    #[test]
    fn flattens_in_pre_order() {
        let mut root = frame("CALL", 1, 2, 10);
        let mut child = frame("DELEGATECALL", 2, 3, 0);
        child.calls.push(frame("CREATE", 3, 4, 5));
        root.calls.push(child);
        root.calls.push(frame("STATICCALL", 2, 5, 0));

        let calls = root.flatten_calls().unwrap();
        let kinds: Vec<CallKind> = calls.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CallKind::Call,
                CallKind::DelegateCall,
                CallKind::Create,
                CallKind::StaticCall
            ]
        );
        assert_eq!(calls[2].to, Some(Address::repeat_byte(4)));
        assert_eq!(calls[0].value, U256::from(10));
        assert!(calls.iter().all(|c| !c.revert));
    }

    #[test]
    fn revert_propagates_to_children() {
        let mut root = frame("CALL", 1, 2, 10);
        root.error = Some("execution reverted".to_string());
        let mut child = frame("CALL", 2, 3, 1);
        child.error = Some("out of gas".to_string());
        root.calls.push(child);
        root.calls.push(frame("CALL", 2, 4, 1));

        let calls = root.flatten_calls().unwrap();
        assert!(calls.iter().all(|c| c.revert));
        assert_eq!(calls[1].error_message.as_deref(), Some("out of gas"));
        assert_eq!(calls[2].error_message.as_deref(), Some("execution reverted"));
    }

    #[test]
    fn missing_value_is_zero_and_type_is_case_insensitive() {
        let mut root = frame("call", 1, 2, 0);
        root.value = None;

        let calls = root.flatten_calls().unwrap();
        assert_eq!(calls[0].kind, CallKind::Call);
        assert!(calls[0].value.is_zero());
    }

    #[test]
    fn unknown_call_type_is_rejected() {
        let root = frame("SUICIDE", 1, 2, 0);
        assert!(matches!(
            root.flatten_calls(),
            Err(MapperError::UnsupportedCallType { call_type }) if call_type == "SUICIDE"
        ));
    }
}
