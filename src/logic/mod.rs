//! Logic Layer - swap reconstruction and arbitrage detection
//!
//! - Rebuilds swaps from the transfers around each `swap` call of a transaction
//! - Follows reconstructed swaps pool to pool to find closed arbitrage paths
//! - Fans independent transactions out over a rayon pool

pub mod arbitrage_detector;
pub mod arbitrage_hash;
pub mod inspector;
pub mod inspector_config;
pub mod swap_reconstructor;
pub mod types;

// Re-export key components from the logic layer
pub use arbitrage_detector::{ArbitrageDetector, detect};
pub use arbitrage_hash::ArbitrageHash;
pub use inspector::{ArbitrageInspector, InspectionReport, TransactionFailure, get_arbitrages, group_by_transaction};
pub use inspector_config::{AmbiguousPathPolicy, InspectorConfig, InspectorConfigRoot};
pub use swap_reconstructor::{InputTransferSource, SwapProtocol, build_swap, reconstruct, reconstruct_tree};
pub use types::{Arbitrage, ArbitrageError, Swap};
