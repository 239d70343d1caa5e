//! Parallel state parameters.

use crate::chain::Chain;

/// Parameters of a parallel state: independent chains executed concurrently
/// with no ordering guarantee between branches. The execution engine collects
/// results as an ordered list matching branch declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParallelParams {
    pub(crate) branches: Vec<Chain>,
}

impl ParallelParams {
    /// Creates parallel parameters with no branches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an independent branch.
    pub fn branch(mut self, branch: impl Into<Chain>) -> Self {
        self.branches.push(branch.into());
        self
    }

    /// Returns the branches in declaration order.
    pub fn branches(&self) -> &[Chain] {
        &self.branches
    }
}
