use super::types::Swap;
use crate::constants::{InputField, UNISWAP_V2_PAIR_ABI_NAME, UNISWAP_V3_POOL_ABI_NAME};
use crate::traces::{Classification, ClassifiedTrace, TraceTree};
use crate::transfers::{Transfer, extract_transfer, filter_transfers, get_child_transfers, remove_shadowed_transfers};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Swap-executing contracts whose transfer layout is understood, dispatched on the trace's `abi_name`.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString)]
pub enum SwapProtocol {
    /// Input is transferred to the pair before the call, output is sent during it.
    #[strum(serialize = "UniswapV2Pair")]
    UniswapV2Pair,
    /// Both input and output transfers happen inside the call.
    #[strum(serialize = "UniswapV3Pool")]
    UniswapV3Pool,
    /// Any other `abi_name`; never produces a swap.
    #[strum(serialize = "Unsupported")]
    Unsupported,
}

/// Where the transfer paying the pool is found relative to the swap call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputTransferSource {
    Prior,
    Child,
}

impl SwapProtocol {
    pub fn from_abi_name(abi_name: Option<&str>) -> Self {
        match abi_name.map(SwapProtocol::from_str) {
            Some(Ok(protocol)) => protocol,
            _ => SwapProtocol::Unsupported,
        }
    }

    pub fn abi_name(&self) -> Option<&'static str> {
        match self {
            SwapProtocol::UniswapV2Pair => Some(UNISWAP_V2_PAIR_ABI_NAME),
            SwapProtocol::UniswapV3Pool => Some(UNISWAP_V3_POOL_ABI_NAME),
            SwapProtocol::Unsupported => None,
        }
    }

    /// Decoded argument naming who receives the output.
    pub fn recipient_field(&self) -> Option<&'static str> {
        match self {
            SwapProtocol::UniswapV2Pair => Some(InputField::TO),
            SwapProtocol::UniswapV3Pool => Some(InputField::RECIPIENT),
            SwapProtocol::Unsupported => None,
        }
    }

    pub fn input_transfer_source(&self) -> Option<InputTransferSource> {
        match self {
            SwapProtocol::UniswapV2Pair => Some(InputTransferSource::Prior),
            SwapProtocol::UniswapV3Pool => Some(InputTransferSource::Child),
            SwapProtocol::Unsupported => None,
        }
    }
}

/// Reconstructs the swaps of one transaction from its classified traces.
///
/// Traces are sorted into execution order first; the result is in the same order.
pub fn reconstruct(traces: &[ClassifiedTrace]) -> Vec<Swap> {
    reconstruct_tree(&TraceTree::new(traces))
}

pub fn reconstruct_tree(tree: &TraceTree<'_>) -> Vec<Swap> {
    let mut swaps = Vec::new();
    let mut prior_transfers: Vec<Transfer> = Vec::new();

    for trace in tree.iter() {
        match trace.classification {
            Classification::Transfer => {
                if let Some(transfer) = extract_transfer(trace) {
                    prior_transfers.push(transfer);
                }
            }
            Classification::Swap => {
                let child_transfers = get_child_transfers(tree, &trace.trace_address);
                let swap = build_swap(trace, &remove_shadowed_transfers(&prior_transfers), &remove_shadowed_transfers(&child_transfers));

                if let Some(swap) = swap {
                    swaps.push(swap);
                }
            }
            _ => {}
        }
    }

    swaps
}

/// Builds a swap from a `swap` trace and the deduplicated transfers before and below it.
///
/// Returns `None` for unsupported protocols, when nothing was paid into the pool, or when the pool
/// did not pay exactly one transfer to the recipient.
pub fn build_swap(trace: &ClassifiedTrace, prior_transfers: &[Transfer], child_transfers: &[Transfer]) -> Option<Swap> {
    let protocol = SwapProtocol::from_abi_name(trace.abi_name.as_deref());
    let (Some(abi_name), Some(recipient_field), Some(input_source)) =
        (protocol.abi_name(), protocol.recipient_field(), protocol.input_transfer_source())
    else {
        debug!(abi_name = ?trace.abi_name, trace_address = %trace.trace_address, "Unsupported swap protocol");
        return None;
    };

    let pool_address = trace.to_address;
    let recipient_address = match trace.input_address(recipient_field) {
        Ok(recipient) => recipient.unwrap_or(trace.from_address),
        Err(e) => {
            debug!(trace_address = %trace.trace_address, error = %e, "Undecodable swap recipient");
            return None;
        }
    };

    let input_candidates = match input_source {
        InputTransferSource::Prior => prior_transfers,
        InputTransferSource::Child => child_transfers,
    };
    let transfers_to_pool = filter_transfers(input_candidates, Some(pool_address), None);
    let transfers_from_pool_to_recipient = filter_transfers(child_transfers, Some(recipient_address), Some(pool_address));

    // the most recent payment is the one closest to this call when a router relays several hops
    let Some(transfer_in) = transfers_to_pool.last() else {
        debug!(trace_address = %trace.trace_address, %pool_address, "No transfer into pool");
        return None;
    };

    let [transfer_out] = transfers_from_pool_to_recipient.as_slice() else {
        debug!(
            trace_address = %trace.trace_address,
            %pool_address,
            matches = transfers_from_pool_to_recipient.len(),
            "Expected exactly one transfer from pool to recipient"
        );
        return None;
    };

    Some(Swap {
        abi_name: abi_name.to_string(),
        transaction_hash: trace.transaction_hash,
        block_number: trace.block_number,
        trace_address: trace.trace_address.clone(),
        pool_address,
        from_address: transfer_in.from_address,
        to_address: transfer_out.to_address,
        token_in_address: transfer_in.token_address,
        token_in_amount: transfer_in.amount,
        token_out_address: transfer_out.token_address,
        token_out_amount: transfer_out.amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{swap_trace, transfer_trace, unknown_trace};
    use alloy_primitives::{Address, U256};

    const USER: Address = Address::repeat_byte(1);
    const ROUTER: Address = Address::repeat_byte(2);
    const RECIPIENT: Address = Address::repeat_byte(3);
    const POOL: Address = Address::repeat_byte(0x10);
    const A: Address = Address::repeat_byte(0xa);
    const B: Address = Address::repeat_byte(0xb);

    #[test]
    fn test_protocol_dispatch() {
        assert_eq!(SwapProtocol::from_abi_name(Some("UniswapV2Pair")), SwapProtocol::UniswapV2Pair);
        assert_eq!(SwapProtocol::from_abi_name(Some("UniswapV3Pool")), SwapProtocol::UniswapV3Pool);
        assert_eq!(SwapProtocol::from_abi_name(Some("Balancer")), SwapProtocol::Unsupported);
        assert_eq!(SwapProtocol::from_abi_name(Some("Unsupported")), SwapProtocol::Unsupported);
        assert_eq!(SwapProtocol::from_abi_name(None), SwapProtocol::Unsupported);
        assert_eq!(SwapProtocol::UniswapV3Pool.to_string(), "UniswapV3Pool");
    }

    #[test]
    fn test_unsupported_protocol_display() {
        assert_eq!(SwapProtocol::Unsupported.to_string(), "Unsupported");
        assert_eq!(SwapProtocol::Unsupported.abi_name(), None);
        assert_eq!(SwapProtocol::Unsupported.recipient_field(), None);
    }

    #[test]
    fn test_uniswap_v2_swap() {
        let traces = vec![
            transfer_trace(&[0], A, USER, POOL, 100),
            swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None),
            transfer_trace(&[1, 0], B, POOL, USER, 80),
        ];

        let swaps = reconstruct(&traces);

        assert_eq!(swaps.len(), 1);
        let swap = &swaps[0];
        assert_eq!(swap.abi_name, UNISWAP_V2_PAIR_ABI_NAME);
        assert_eq!(swap.pool_address, POOL);
        assert_eq!(swap.from_address, USER);
        assert_eq!(swap.to_address, USER);
        assert_eq!(swap.token_in_address, A);
        assert_eq!(swap.token_in_amount, U256::from(100));
        assert_eq!(swap.token_out_address, B);
        assert_eq!(swap.token_out_amount, U256::from(80));
        assert_eq!(swap.trace_address.as_slice(), &[1]);
    }

    #[test]
    fn test_uniswap_v2_swap_uses_to_input() {
        let traces = vec![
            transfer_trace(&[0], A, USER, POOL, 100),
            swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, ROUTER, POOL, Some(("to", RECIPIENT))),
            transfer_trace(&[1, 0], B, POOL, RECIPIENT, 80),
        ];

        let swaps = reconstruct(&traces);

        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].to_address, RECIPIENT);
        assert_eq!(swaps[0].from_address, USER);
    }

    #[test]
    fn test_uniswap_v2_swap_picks_latest_prior_transfer() {
        let traces = vec![
            transfer_trace(&[0], A, USER, POOL, 1),
            transfer_trace(&[1], A, ROUTER, POOL, 100),
            swap_trace(&[2], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None),
            transfer_trace(&[2, 0], B, POOL, USER, 80),
        ];

        let swaps = reconstruct(&traces);

        assert_eq!(swaps[0].from_address, ROUTER);
        assert_eq!(swaps[0].token_in_amount, U256::from(100));
    }

    #[test]
    fn test_uniswap_v2_ignores_child_input() {
        // a V2 pair is paid before the call, a payment inside it is not evidence
        let traces = vec![
            swap_trace(&[0], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None),
            transfer_trace(&[0, 0], B, POOL, USER, 80),
            transfer_trace(&[0, 1], A, USER, POOL, 100),
        ];

        assert!(reconstruct(&traces).is_empty());
    }

    #[test]
    fn test_uniswap_v3_swap() {
        let traces = vec![
            swap_trace(&[0], UNISWAP_V3_POOL_ABI_NAME, ROUTER, POOL, Some(("recipient", USER))),
            transfer_trace(&[0, 0], B, POOL, USER, 80),
            unknown_trace(&[0, 1]),
            transfer_trace(&[0, 1, 0], A, USER, POOL, 100),
        ];

        let swaps = reconstruct(&traces);

        assert_eq!(swaps.len(), 1);
        let swap = &swaps[0];
        assert_eq!(swap.abi_name, UNISWAP_V3_POOL_ABI_NAME);
        assert_eq!(swap.from_address, USER);
        assert_eq!(swap.to_address, USER);
        assert_eq!(swap.token_in_address, A);
        assert_eq!(swap.token_in_amount, U256::from(100));
        assert_eq!(swap.token_out_address, B);
        assert_eq!(swap.token_out_amount, U256::from(80));
    }

    #[test]
    fn test_uniswap_v3_recipient_defaults_to_caller() {
        let traces = vec![
            swap_trace(&[0], UNISWAP_V3_POOL_ABI_NAME, ROUTER, POOL, None),
            transfer_trace(&[0, 0], B, POOL, ROUTER, 80),
            transfer_trace(&[0, 1], A, ROUTER, POOL, 100),
        ];

        let swaps = reconstruct(&traces);

        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].to_address, ROUTER);
    }

    #[test]
    fn test_ambiguous_output_is_rejected() {
        let traces = vec![
            swap_trace(&[0], UNISWAP_V3_POOL_ABI_NAME, USER, POOL, None),
            transfer_trace(&[0, 0], B, POOL, USER, 40),
            transfer_trace(&[0, 1], B, POOL, USER, 40),
            transfer_trace(&[0, 2], A, USER, POOL, 100),
        ];

        assert!(reconstruct(&traces).is_empty());
    }

    #[test]
    fn test_no_evidence_is_rejected() {
        let traces = vec![
            transfer_trace(&[0], A, USER, RECIPIENT, 100),
            swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None),
            swap_trace(&[2], UNISWAP_V3_POOL_ABI_NAME, USER, POOL, None),
        ];

        assert!(reconstruct(&traces).is_empty());
    }

    #[test]
    fn test_missing_output_is_rejected() {
        let traces = vec![transfer_trace(&[0], A, USER, POOL, 100), swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None)];

        assert!(reconstruct(&traces).is_empty());
    }

    #[test]
    fn test_unsupported_protocol_is_skipped() {
        let traces = vec![
            transfer_trace(&[0], A, USER, POOL, 100),
            swap_trace(&[1], "CurvePool", USER, POOL, None),
            transfer_trace(&[1, 0], B, POOL, USER, 80),
        ];

        assert!(reconstruct(&traces).is_empty());
    }

    #[test]
    fn test_invalid_recipient_is_skipped() {
        let mut swap = swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None);
        swap.inputs = serde_json::from_value(serde_json::json!({ "to": 12 })).unwrap();
        let traces = vec![transfer_trace(&[0], A, USER, POOL, 100), swap, transfer_trace(&[1, 0], B, POOL, USER, 80)];

        assert!(reconstruct(&traces).is_empty());
    }

    #[test]
    fn test_proxied_output_counts_once() {
        // the token is a proxy: the outer transfer call forwards to an implementation that transfers again
        let traces = vec![
            transfer_trace(&[0], A, USER, POOL, 100),
            swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None),
            transfer_trace(&[1, 0], B, POOL, USER, 80),
            transfer_trace(&[1, 0, 0], B, POOL, USER, 80),
        ];

        let swaps = reconstruct(&traces);

        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].token_out_amount, U256::from(80));
    }

    #[test]
    fn test_proxied_input_counts_once() {
        // the pair is paid through a proxy token whose implementation performs the same transfer
        let implementation = Address::repeat_byte(0xe);
        let traces = vec![
            transfer_trace(&[0], A, USER, POOL, 100),
            transfer_trace(&[0, 0], implementation, USER, POOL, 100),
            swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None),
            transfer_trace(&[1, 0], B, POOL, USER, 80),
        ];

        let swaps = reconstruct(&traces);

        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].token_in_address, implementation);
        assert_eq!(swaps[0].token_in_amount, U256::from(100));
    }

    #[test]
    fn test_unrelated_transfer_inside_input_transfer() {
        // a token hook moves another token while the input transfer runs
        let hook_token = Address::repeat_byte(0xc);
        let traces = vec![
            transfer_trace(&[0], A, USER, POOL, 100),
            transfer_trace(&[0, 0], hook_token, A, RECIPIENT, 1),
            swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None),
            transfer_trace(&[1, 0], B, POOL, USER, 80),
        ];

        let swaps = reconstruct(&traces);

        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].token_in_address, A);
        assert_eq!(swaps[0].token_in_amount, U256::from(100));
        assert_eq!(swaps[0].token_out_amount, U256::from(80));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut traces = vec![
            transfer_trace(&[1, 0], B, POOL, USER, 80),
            swap_trace(&[1], UNISWAP_V2_PAIR_ABI_NAME, USER, POOL, None),
            transfer_trace(&[0], A, USER, POOL, 100),
        ];
        let expected = reconstruct(&traces);
        traces.reverse();

        assert_eq!(expected.len(), 1);
        assert_eq!(reconstruct(&traces), expected);
    }
}
