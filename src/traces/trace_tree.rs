use super::classified_trace::{ClassifiedTrace, TraceAddress};

/// Call tree of one transaction, stored as a flat arena sorted by trace address.
///
/// Pre-order sorting keeps every subtree contiguous, so descendant queries are two binary searches
/// instead of parent/child pointers.
#[derive(Clone, Debug, Default)]
pub struct TraceTree<'a> {
    traces: Vec<&'a ClassifiedTrace>,
}

impl<'a> TraceTree<'a> {
    pub fn new<I>(traces: I) -> Self
    where
        I: IntoIterator<Item = &'a ClassifiedTrace>,
    {
        let mut traces: Vec<&'a ClassifiedTrace> = traces.into_iter().collect();
        // stable, so duplicated addresses keep their input order
        traces.sort_by(|a, b| a.trace_address.cmp(&b.trace_address));
        TraceTree { traces }
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// All traces in execution order.
    pub fn traces(&self) -> &[&'a ClassifiedTrace] {
        &self.traces
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ClassifiedTrace> + '_ {
        self.traces.iter().copied()
    }

    pub fn get(&self, trace_address: &TraceAddress) -> Option<&'a ClassifiedTrace> {
        self.traces.binary_search_by(|t| t.trace_address.cmp(trace_address)).ok().map(|idx| self.traces[idx])
    }

    /// Strict descendants of `trace_address`, in execution order. The address itself does not need to be in the tree.
    pub fn descendants(&self, trace_address: &TraceAddress) -> &[&'a ClassifiedTrace] {
        let start = self.traces.partition_point(|t| t.trace_address <= *trace_address);
        let len = self.traces[start..].partition_point(|t| t.trace_address.is_descendant_of(trace_address));
        &self.traces[start..start + len]
    }
}
