use super::arbitrage_hash::ArbitrageHash;
use crate::traces::TraceAddress;
use alloy_primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One exchange at one pool, reconstructed from the transfers around a `swap` call
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swap {
    pub abi_name: String,
    pub transaction_hash: B256,
    pub block_number: u64,
    /// Trace address of the swap call itself
    pub trace_address: TraceAddress,
    pub pool_address: Address,
    /// Sender of the input transfer
    pub from_address: Address,
    /// Recipient of the output transfer
    pub to_address: Address,
    pub token_in_address: Address,
    pub token_in_amount: U256,
    pub token_out_address: Address,
    pub token_out_amount: U256,
}

impl Display for Swap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Swap({} {}, {} {:#} -> {} {:#}, {:#} -> {:#})",
            self.abi_name,
            self.trace_address,
            self.token_in_amount,
            self.token_in_address,
            self.token_out_amount,
            self.token_out_address,
            self.from_address,
            self.to_address
        )
    }
}

impl Swap {
    /// Whether `next` picks up where this swap left off: it is executed by the pool that received
    /// this swap's output, with the token this swap produced.
    pub fn continues_into(&self, next: &Swap) -> bool {
        next.pool_address == self.to_address && next.token_in_address == self.token_out_address
    }
}

/// A closed path of swaps returning an account's outflow back to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arbitrage {
    pub arbitrage_hash: ArbitrageHash,
    pub transaction_hash: B256,
    pub block_number: u64,
    pub swaps: Vec<Swap>,
    pub account_address: Address,
    pub profit_token_address: Address,
    pub start_amount: U256,
    pub end_amount: U256,
    /// `end_amount - start_amount`, negative for losing cycles
    pub profit_amount: I256,
}

impl Arbitrage {
    /// Builds an arbitrage from a closed swap path, validating that every hop continues the previous one
    /// and that the last hop pays the first hop's token back to its sender.
    pub fn new(swaps: Vec<Swap>) -> Result<Self, ArbitrageError> {
        if swaps.len() < 2 {
            return Err(ArbitrageError::TooFewSwaps(swaps.len()));
        }

        if let Some(index) = swaps.windows(2).position(|pair| !pair[0].continues_into(&pair[1])) {
            return Err(ArbitrageError::BrokenPath(index + 1));
        }

        let (Some(first), Some(last)) = (swaps.first(), swaps.last()) else {
            return Err(ArbitrageError::TooFewSwaps(swaps.len()));
        };
        if last.to_address != first.from_address || last.token_out_address != first.token_in_address {
            return Err(ArbitrageError::NotClosed);
        }

        let transaction_hash = first.transaction_hash;
        let block_number = first.block_number;
        let account_address = first.from_address;
        let profit_token_address = first.token_in_address;
        let start_amount = first.token_in_amount;
        let end_amount = last.token_out_amount;

        Ok(Arbitrage {
            arbitrage_hash: ArbitrageHash::new(transaction_hash, &swaps),
            transaction_hash,
            block_number,
            swaps,
            account_address,
            profit_token_address,
            start_amount,
            end_amount,
            profit_amount: signed_difference(end_amount, start_amount),
        })
    }

    pub fn is_profitable(&self) -> bool {
        self.profit_amount.is_positive()
    }

    pub fn pool_addresses(&self) -> Vec<Address> {
        self.swaps.iter().map(|swap| swap.pool_address).collect()
    }
}

/// `a - b` as a signed 256-bit value, saturating at the `I256` bounds.
fn signed_difference(a: U256, b: U256) -> I256 {
    if a >= b {
        I256::try_from(a - b).unwrap_or(I256::MAX)
    } else {
        I256::try_from(b - a).map(|d| -d).unwrap_or(I256::MIN)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbitrageError {
    /// More than one swap continues a path from the same pool and token.
    #[error("{count} swaps continue the path at pool {pool_address} with token {token_address} in transaction {transaction_hash}", count = .candidates.len())]
    AmbiguousContinuation { transaction_hash: B256, pool_address: Address, token_address: Address, candidates: Vec<Swap> },
    #[error("arbitrage needs at least 2 swaps, got {0}")]
    TooFewSwaps(usize),
    #[error("swap {0} does not continue the previous swap")]
    BrokenPath(usize),
    #[error("last swap does not return the start token to the start account")]
    NotClosed,
}
