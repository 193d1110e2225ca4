use super::inspector_config::AmbiguousPathPolicy;
use super::types::{Arbitrage, ArbitrageError, Swap};
use ahash::HashSet;
use alloy_primitives::Address;
use tracing::{debug, warn};

/// Finds closed swap paths (arbitrage cycles) among the swaps of one transaction.
///
/// A path starts at every swap sent by an account that is not itself a pool, then follows the single swap
/// executed by the pool that received the previous output, with the token it produced, until the start
/// token lands back at the start account.
#[derive(Clone, Debug, Default)]
pub struct ArbitrageDetector {
    policy: AmbiguousPathPolicy,
}

impl ArbitrageDetector {
    pub fn new(policy: AmbiguousPathPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AmbiguousPathPolicy {
        self.policy
    }

    /// Detects all arbitrages among `swaps`, which must belong to one transaction and be in execution order.
    ///
    /// Under [`AmbiguousPathPolicy::Fail`] the first ambiguous continuation aborts detection for the whole
    /// swap set; under [`AmbiguousPathPolicy::SkipStart`] only the affected start is dropped.
    pub fn detect(&self, swaps: &[Swap]) -> Result<Vec<Arbitrage>, ArbitrageError> {
        if swaps.len() < 2 {
            return Ok(Vec::new());
        }

        let pool_addresses: HashSet<Address> = swaps.iter().map(|swap| swap.pool_address).collect();
        let mut arbitrages = Vec::new();

        for (index, start_swap) in swaps.iter().enumerate() {
            if pool_addresses.contains(&start_swap.from_address) {
                continue;
            }

            match self.arbitrage_starting_with(index, swaps) {
                Ok(Some(arbitrage)) => arbitrages.push(arbitrage),
                Ok(None) => {}
                Err(error @ ArbitrageError::AmbiguousContinuation { .. }) if self.policy == AmbiguousPathPolicy::SkipStart => {
                    warn!(trace_address = %start_swap.trace_address, %error, "Skipping arbitrage start with ambiguous continuation");
                }
                Err(error) => return Err(error),
            }
        }

        debug!(swaps = swaps.len(), arbitrages = arbitrages.len(), "Arbitrage detection finished");
        Ok(arbitrages)
    }

    fn arbitrage_starting_with(&self, start_index: usize, swaps: &[Swap]) -> Result<Option<Arbitrage>, ArbitrageError> {
        let start_swap = &swaps[start_index];
        // every swap is used at most once per start, which also bounds the walk
        let mut remaining: Vec<&Swap> =
            swaps.iter().enumerate().filter(|(index, _)| *index != start_index).map(|(_, swap)| swap).collect();
        let mut swap_path = vec![start_swap.clone()];

        let mut current_address = start_swap.to_address;
        let mut current_token = start_swap.token_out_address;

        loop {
            let candidates: Vec<usize> = remaining
                .iter()
                .enumerate()
                .filter(|(_, swap)| swap.pool_address == current_address && swap.token_in_address == current_token)
                .map(|(position, _)| position)
                .collect();

            let position = match candidates.as_slice() {
                [] => return Ok(None),
                [position] => *position,
                _ => {
                    return Err(ArbitrageError::AmbiguousContinuation {
                        transaction_hash: start_swap.transaction_hash,
                        pool_address: current_address,
                        token_address: current_token,
                        candidates: candidates.iter().map(|position| remaining[*position].clone()).collect(),
                    });
                }
            };

            let latest_swap = remaining.remove(position);
            swap_path.push(latest_swap.clone());

            current_address = latest_swap.to_address;
            current_token = latest_swap.token_out_address;

            if current_address == start_swap.from_address && current_token == start_swap.token_in_address {
                return Arbitrage::new(swap_path).map(Some);
            }
        }
    }
}

/// Detects arbitrages with the default detector, failing on ambiguous continuations.
pub fn detect(swaps: &[Swap]) -> Result<Vec<Arbitrage>, ArbitrageError> {
    ArbitrageDetector::default().detect(swaps)
}
