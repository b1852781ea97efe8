//! Rewrites encrypted parameter types to their wire encoding.

use alloy::json_abi::JsonAbi;

use crate::abi::types::{InterfaceItem, Param};

/// Error converting an interface description into a [`JsonAbi`].
#[derive(Debug, thiserror::Error)]
#[error("Invalid interface description: {0}")]
pub struct AbiError(#[from] serde_json::Error);

/// Normalize an interface description.
///
/// Every encrypted parameter of a function or constructor (inputs, outputs
/// and tuple components) becomes `bytes32`; everything else is copied as is.
/// Order is preserved and the transform is idempotent.
pub fn normalize(items: &[InterfaceItem]) -> Vec<InterfaceItem> {
    items.iter().map(normalize_item).collect()
}

fn normalize_item(item: &InterfaceItem) -> InterfaceItem {
    match item {
        InterfaceItem::Function(func) => {
            let mut func = func.clone();
            normalize_params(&mut func.inputs);
            normalize_params(&mut func.outputs);
            InterfaceItem::Function(func)
        }
        InterfaceItem::Constructor(ctor) => {
            let mut ctor = ctor.clone();
            normalize_params(&mut ctor.inputs);
            InterfaceItem::Constructor(ctor)
        }
        other => other.clone(),
    }
}

fn normalize_params(params: &mut [Param]) {
    for param in params {
        param.ty = param.ty.wire();
        normalize_params(&mut param.components);
    }
}

/// Parse a JSON interface description.
pub fn parse_interface(json: &str) -> Result<Vec<InterfaceItem>, AbiError> {
    Ok(serde_json::from_str(json)?)
}

/// Convert a (normalized) interface description into a [`JsonAbi`].
pub fn to_json_abi(items: &[InterfaceItem]) -> Result<JsonAbi, AbiError> {
    let value = serde_json::to_value(items)?;
    Ok(serde_json::from_value(value)?)
}
