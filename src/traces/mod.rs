pub mod classified_trace;
pub mod trace_tree;

pub use classified_trace::{Classification, ClassifiedTrace, TraceAddress, TraceInputError};
pub use trace_tree::TraceTree;
