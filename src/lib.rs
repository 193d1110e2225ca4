// Input Layer: classified traces and the transfers extracted from them
pub mod traces;
pub mod transfers;
// Logic Layer: swap reconstruction, arbitrage detection
pub mod logic;

// Common utilities and types
pub mod constants;
pub mod utils;

#[doc(hidden)]
pub mod test_helpers;

// Re-export key components from each layer
pub use logic::{
    AmbiguousPathPolicy, Arbitrage, ArbitrageDetector, ArbitrageError, ArbitrageHash, ArbitrageInspector, InspectionReport,
    InspectorConfig, Swap, SwapProtocol, TransactionFailure, detect, get_arbitrages, reconstruct,
};
pub use traces::{Classification, ClassifiedTrace, TraceAddress, TraceTree};
pub use transfers::{Transfer, TransferError, filter_transfers, get_child_transfers, remove_shadowed_transfers};
pub use utils::{ConfigLoader, ConfigLoaderSync, LoadConfigError};
