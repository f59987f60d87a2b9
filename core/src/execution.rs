use rayon::prelude::*;

/// Fan-out strategy for index scans and removals.
///
/// Both variants run the same algorithm; `Sequential` drives it with a serial
/// iterator and a single accumulator bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

impl ExecutionPolicy {
    pub fn from_parallel(parallel: bool) -> Self {
        if parallel {
            Self::Parallel
        } else {
            Self::Sequential
        }
    }

    /// Accumulator shard count to use under this policy.
    pub(crate) fn bucket_count(self, configured: usize) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Parallel => configured.max(1),
        }
    }

    pub(crate) fn for_each<T, F>(self, items: &[T], op: F)
    where
        T: Sync,
        F: Fn(&T) + Sync + Send,
    {
        match self {
            Self::Sequential => items.iter().for_each(op),
            Self::Parallel => items.par_iter().for_each(op),
        }
    }

    pub(crate) fn any<T, F>(self, items: &[T], pred: F) -> bool
    where
        T: Sync,
        F: Fn(&T) -> bool + Sync + Send,
    {
        match self {
            Self::Sequential => items.iter().any(pred),
            Self::Parallel => items.par_iter().any(pred),
        }
    }

    /// Keeps the items matching `pred`, preserving input order.
    pub(crate) fn filter_cloned<T, F>(self, items: &[T], pred: F) -> Vec<T>
    where
        T: Clone + Send + Sync,
        F: Fn(&T) -> bool + Sync + Send,
    {
        match self {
            Self::Sequential => items.iter().filter(|item| pred(item)).cloned().collect(),
            Self::Parallel => items.par_iter().filter(|item| pred(item)).cloned().collect(),
        }
    }
}
