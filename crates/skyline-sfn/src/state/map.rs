//! Map state parameters.

use std::num::NonZeroU32;

use crate::chain::Chain;

/// Parameters of a map state: a nested chain executed once per element of a
/// runtime-resolved collection, under a concurrency bound.
#[derive(Debug, Clone, PartialEq)]
pub struct MapParams {
    pub(crate) items_path: String,
    pub(crate) max_concurrency: NonZeroU32,
    pub(crate) iterator: Chain,
}

impl MapParams {
    /// Creates map parameters iterating the chain over the collection at
    /// `items_path`, strictly sequentially.
    pub fn new(items_path: impl Into<String>, iterator: impl Into<Chain>) -> Self {
        Self {
            items_path: items_path.into(),
            max_concurrency: NonZeroU32::MIN,
            iterator: iterator.into(),
        }
    }

    /// Bounds how many iterations may run concurrently. A bound of 1 forces
    /// strictly sequential iteration.
    pub fn with_max_concurrency(mut self, bound: NonZeroU32) -> Self {
        self.max_concurrency = bound;
        self
    }

    /// Returns the data-context path yielding the iterated collection.
    pub fn items_path(&self) -> &str {
        &self.items_path
    }

    /// Returns the concurrency bound.
    pub fn max_concurrency(&self) -> NonZeroU32 {
        self.max_concurrency
    }

    /// Returns the iterator body.
    pub fn iterator(&self) -> &Chain {
        &self.iterator
    }
}
