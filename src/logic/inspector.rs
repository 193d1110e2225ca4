use super::arbitrage_detector::ArbitrageDetector;
use super::inspector_config::InspectorConfig;
use super::swap_reconstructor::reconstruct_tree;
use super::types::{Arbitrage, ArbitrageError};
use crate::traces::{ClassifiedTrace, TraceTree};
use ahash::HashMap;
use alloy_primitives::B256;
use eyre::Result;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

type TransactionResult = (B256, Result<Vec<Arbitrage>, ArbitrageError>);

/// A transaction whose arbitrage detection failed. Other transactions are unaffected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionFailure {
    pub transaction_hash: B256,
    pub error: ArbitrageError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InspectionReport {
    /// Arbitrages of all transactions, in order of first appearance of each transaction
    pub arbitrages: Vec<Arbitrage>,
    pub failures: Vec<TransactionFailure>,
}

/// Runs swap reconstruction and arbitrage detection over the traces of many transactions.
///
/// Transactions are independent, so with `parallel` enabled each one is inspected on a rayon worker.
pub struct ArbitrageInspector {
    config: InspectorConfig,
    detector: ArbitrageDetector,
    thread_pool: Option<ThreadPool>,
}

impl Default for ArbitrageInspector {
    fn default() -> Self {
        let config = InspectorConfig::default();
        Self { detector: ArbitrageDetector::new(config.ambiguous_path_policy), config, thread_pool: None }
    }
}

impl ArbitrageInspector {
    pub fn new(config: InspectorConfig) -> Result<Self> {
        config.validate()?;

        let thread_pool = match config.worker_threads {
            Some(num_threads) if config.parallel => Some(
                ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .thread_name(|index| format!("arb-inspect-{index}"))
                    .build()?,
            ),
            _ => None,
        };

        Ok(Self { detector: ArbitrageDetector::new(config.ambiguous_path_policy), config, thread_pool })
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Groups `traces` by transaction and returns the arbitrages found in each.
    pub fn get_arbitrages(&self, traces: &[ClassifiedTrace]) -> InspectionReport {
        let transactions = group_by_transaction(traces);
        debug!(traces = traces.len(), transactions = transactions.len(), parallel = self.config.parallel, "Inspecting traces");

        let results: Vec<TransactionResult> = if self.config.parallel {
            let run = || -> Vec<TransactionResult> {
                transactions.par_iter().map(|(hash, traces)| (*hash, self.inspect_transaction(traces))).collect()
            };
            match &self.thread_pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        } else {
            transactions.iter().map(|(hash, traces)| (*hash, self.inspect_transaction(traces))).collect()
        };

        let mut report = InspectionReport::default();
        for (transaction_hash, result) in results {
            match result {
                Ok(arbitrages) => report.arbitrages.extend(arbitrages),
                Err(error) => {
                    warn!(%transaction_hash, %error, "Arbitrage detection failed");
                    report.failures.push(TransactionFailure { transaction_hash, error });
                }
            }
        }

        report
    }

    /// Reconstructs swaps and detects arbitrages for the traces of a single transaction.
    pub fn inspect_transaction(&self, traces: &[&ClassifiedTrace]) -> Result<Vec<Arbitrage>, ArbitrageError> {
        let tree = TraceTree::new(traces.iter().copied());
        let swaps = reconstruct_tree(&tree);
        self.detector.detect(&swaps)
    }
}

/// Inspects `traces` with the default configuration.
pub fn get_arbitrages(traces: &[ClassifiedTrace]) -> InspectionReport {
    ArbitrageInspector::default().get_arbitrages(traces)
}

/// Partitions traces by transaction hash, keeping the order in which transactions first appear.
pub fn group_by_transaction(traces: &[ClassifiedTrace]) -> Vec<(B256, Vec<&ClassifiedTrace>)> {
    let mut index: HashMap<B256, usize> = HashMap::default();
    let mut groups: Vec<(B256, Vec<&ClassifiedTrace>)> = Vec::new();

    for trace in traces {
        let position = *index.entry(trace.transaction_hash).or_insert_with(|| {
            groups.push((trace.transaction_hash, Vec::new()));
            groups.len() - 1
        });
        groups[position].1.push(trace);
    }

    groups
}
