pub mod transfer;

pub use transfer::{Transfer, TransferError};

use crate::traces::{ClassifiedTrace, TraceAddress, TraceTree};
use alloy_primitives::Address;
use tracing::warn;

/// Keeps the transfers matching every given address filter, preserving order.
pub fn filter_transfers(transfers: &[Transfer], to_address: Option<Address>, from_address: Option<Address>) -> Vec<Transfer> {
    transfers
        .iter()
        .filter(|t| to_address.is_none_or(|to| t.to_address == to))
        .filter(|t| from_address.is_none_or(|from| t.from_address == from))
        .cloned()
        .collect()
}

/// Transfers emitted by strict descendants of `trace_address`, in execution order.
/// Transfer traces whose inputs can't be decoded are skipped.
pub fn get_child_transfers(tree: &TraceTree<'_>, trace_address: &TraceAddress) -> Vec<Transfer> {
    tree.descendants(trace_address).iter().filter(|t| t.is_transfer()).filter_map(|t| extract_transfer(t)).collect()
}

pub(crate) fn extract_transfer(trace: &ClassifiedTrace) -> Option<Transfer> {
    match Transfer::try_from(trace) {
        Ok(transfer) => Some(transfer),
        Err(e) => {
            warn!(transaction_hash = %trace.transaction_hash, error = %e, "Skipping undecodable transfer");
            None
        }
    }
}

/// Collapses proxied transfers: a transfer with a nested transfer below it that moves the same amount
/// between the same accounts is the outer half of one forwarded movement, so only the innermost is kept.
/// The token may differ, as a proxy and its implementation are distinct contracts.
///
/// Order of the remaining transfers is preserved.
pub fn remove_shadowed_transfers(transfers: &[Transfer]) -> Vec<Transfer> {
    let mut sorted: Vec<&Transfer> = transfers.iter().collect();
    sorted.sort_by(|a, b| a.trace_address.cmp(&b.trace_address));

    // in pre-order the descendants of a transfer directly follow it
    let shadowed: Vec<&TraceAddress> = sorted
        .iter()
        .enumerate()
        .filter(|(index, outer)| {
            sorted[index + 1..]
                .iter()
                .take_while(|inner| inner.trace_address.is_descendant_of(&outer.trace_address))
                .any(|inner| inner.is_same_movement(outer))
        })
        .map(|(_, outer)| &outer.trace_address)
        .collect();

    transfers.iter().filter(|t| !shadowed.contains(&&t.trace_address)).cloned().collect()
}
