use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum_macros::{Display as StrumDisplay, EnumString};

/// Position of a call in the transaction call tree, e.g. `[0, 2, 1]`.
///
/// Lexicographic order is execution (pre-)order, and `A` is an ancestor of `B`
/// iff `A` is a strict prefix of `B`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceAddress(pub Vec<usize>);

impl TraceAddress {
    pub fn new(path: Vec<usize>) -> Self {
        TraceAddress(path)
    }

    pub fn root() -> Self {
        TraceAddress(Vec::new())
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Strict descendant check: a trace is not its own descendant.
    pub fn is_descendant_of(&self, ancestor: &TraceAddress) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    pub fn is_ancestor_of(&self, descendant: &TraceAddress) -> bool {
        descendant.is_descendant_of(self)
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        TraceAddress(path)
    }
}

impl From<Vec<usize>> for TraceAddress {
    fn from(path: Vec<usize>) -> Self {
        TraceAddress(path)
    }
}

impl From<&[usize]> for TraceAddress {
    fn from(path: &[usize]) -> Self {
        TraceAddress(path.to_vec())
    }
}

impl Display for TraceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().map(|i| i.to_string()).collect::<Vec<String>>().join(", "))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, StrumDisplay, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    #[default]
    Unknown,
    Transfer,
    Swap,
    Burn,
    Liquidate,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceInputError {
    #[error("input `{0}` is missing")]
    Missing(String),
    #[error("input `{field}` has invalid value {value}")]
    Invalid { field: String, value: String },
}

/// A decoded and classified call from a transaction trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTrace {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: u64,
    pub trace_address: TraceAddress,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub abi_name: Option<String>,
    #[serde(default)]
    pub function_name: Option<String>,
    pub from_address: Address,
    pub to_address: Address,
    #[serde(default)]
    pub inputs: Option<BTreeMap<String, Value>>,
}

impl ClassifiedTrace {
    pub fn is_transfer(&self) -> bool {
        self.classification == Classification::Transfer
    }

    pub fn is_swap(&self) -> bool {
        self.classification == Classification::Swap
    }

    pub fn input(&self, field: &str) -> Option<&Value> {
        self.inputs.as_ref().and_then(|inputs| inputs.get(field))
    }

    /// Reads an address-valued decoded argument. `Ok(None)` when the argument is absent.
    pub fn input_address(&self, field: &str) -> Result<Option<Address>, TraceInputError> {
        let Some(value) = self.input(field) else {
            return Ok(None);
        };

        match value {
            Value::String(s) => Address::from_str(s).map(Some).map_err(|_| invalid_input(field, value)),
            _ => Err(invalid_input(field, value)),
        }
    }

    /// Reads an amount-valued decoded argument given as a decimal or `0x` string, or a JSON integer.
    ///
    /// JSON numbers only cover `u64`; larger amounts must be given as strings or they are `Invalid`.
    pub fn input_amount(&self, field: &str) -> Result<Option<U256>, TraceInputError> {
        let Some(value) = self.input(field) else {
            return Ok(None);
        };

        match value {
            Value::String(s) => U256::from_str(s).map(Some).map_err(|_| invalid_input(field, value)),
            Value::Number(n) => n.as_u64().map(|n| Some(U256::from(n))).ok_or_else(|| invalid_input(field, value)),
            _ => Err(invalid_input(field, value)),
        }
    }

    pub fn required_input_address(&self, field: &str) -> Result<Address, TraceInputError> {
        self.input_address(field)?.ok_or_else(|| TraceInputError::Missing(field.to_string()))
    }

    pub fn required_input_amount(&self, field: &str) -> Result<U256, TraceInputError> {
        self.input_amount(field)?.ok_or_else(|| TraceInputError::Missing(field.to_string()))
    }
}

fn invalid_input(field: &str, value: &Value) -> TraceInputError {
    TraceInputError::Invalid { field: field.to_string(), value: value.to_string() }
}
