//! Builders for traces, transfers and swaps used by unit tests, integration tests and benches.

use crate::constants::InputField;
use crate::logic::Swap;
use crate::traces::{Classification, ClassifiedTrace, TraceAddress};
use crate::transfers::Transfer;
use alloy_primitives::{Address, B256, U256};
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const TEST_TRANSACTION_HASH: B256 = B256::repeat_byte(0x77);

pub fn unknown_trace(trace_address: &[usize]) -> ClassifiedTrace {
    ClassifiedTrace {
        transaction_hash: TEST_TRANSACTION_HASH,
        block_number: 1,
        trace_address: TraceAddress::from(trace_address),
        classification: Classification::Unknown,
        abi_name: None,
        function_name: None,
        from_address: Address::ZERO,
        to_address: Address::ZERO,
        inputs: None,
    }
}

/// An ERC20 `transfer(recipient, amount)` call made by `from` on `token`.
pub fn transfer_trace(trace_address: &[usize], token: Address, from: Address, to: Address, amount: u64) -> ClassifiedTrace {
    ClassifiedTrace {
        classification: Classification::Transfer,
        abi_name: Some("ERC20".to_string()),
        function_name: Some("transfer".to_string()),
        from_address: from,
        to_address: token,
        inputs: Some(inputs(&[(InputField::RECIPIENT, json!(to)), (InputField::AMOUNT, json!(amount.to_string()))])),
        ..unknown_trace(trace_address)
    }
}

/// A `swap` call from `caller` to `pool`, optionally with a decoded recipient argument.
pub fn swap_trace(trace_address: &[usize], abi_name: &str, caller: Address, pool: Address, recipient: Option<(&str, Address)>) -> ClassifiedTrace {
    ClassifiedTrace {
        classification: Classification::Swap,
        abi_name: Some(abi_name.to_string()),
        function_name: Some("swap".to_string()),
        from_address: caller,
        to_address: pool,
        inputs: recipient.map(|(field, address)| inputs(&[(field, json!(address))])),
        ..unknown_trace(trace_address)
    }
}

pub fn in_transaction(traces: Vec<ClassifiedTrace>, transaction_hash: B256) -> Vec<ClassifiedTrace> {
    traces.into_iter().map(|trace| ClassifiedTrace { transaction_hash, ..trace }).collect()
}

pub fn transfer(trace_address: &[usize], token: Address, from: Address, to: Address, amount: u64) -> Transfer {
    Transfer {
        transaction_hash: TEST_TRANSACTION_HASH,
        trace_address: TraceAddress::from(trace_address),
        from_address: from,
        to_address: to,
        token_address: token,
        amount: U256::from(amount),
    }
}

/// `from` sends `amount_in` of `token_in` to `pool`, `to` receives `amount_out` of `token_out`.
#[allow(clippy::too_many_arguments)]
pub fn swap(
    trace_address: &[usize],
    pool: Address,
    from: Address,
    to: Address,
    token_in: Address,
    amount_in: u64,
    token_out: Address,
    amount_out: u64,
) -> Swap {
    Swap {
        abi_name: "UniswapV2Pair".to_string(),
        transaction_hash: TEST_TRANSACTION_HASH,
        block_number: 1,
        trace_address: TraceAddress::from(trace_address),
        pool_address: pool,
        from_address: from,
        to_address: to,
        token_in_address: token_in,
        token_in_amount: U256::from(amount_in),
        token_out_address: token_out,
        token_out_amount: U256::from(amount_out),
    }
}

fn inputs(fields: &[(&str, Value)]) -> BTreeMap<String, Value> {
    fields.iter().map(|(name, value)| (name.to_string(), value.clone())).collect()
}
