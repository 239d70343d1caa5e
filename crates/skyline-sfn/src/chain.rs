//! Chain linking.
//!
//! A [`Chain`] is the ordered linkage of states reachable from a designated
//! head. Linking consumes both sides, so a state can belong to exactly one
//! chain and the graph is acyclic by construction: there is no back-reference
//! API and no way to attach the same state twice.

use crate::error::{GraphError, GraphResult};
use crate::policy::Permission;
use crate::state::State;

/// A linked sequence of states with a single entry point.
///
/// Constructed from a head state and composed left to right via [`Chain::next`].
/// A chain is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    states: Vec<State>,
}

impl Chain {
    /// Returns the entry state of the chain.
    pub fn head(&self) -> &State {
        // Invariant: chains are built from a head state and only ever grow.
        &self.states[0]
    }

    /// Returns the final state of the chain.
    pub fn tail(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    /// Returns the states in execution order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the number of states in this chain, not counting nested
    /// iterator bodies or branches.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns false; chains always contain at least their head.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Appends a successor chain after this chain's tail.
    ///
    /// The result is "head, then successor, then the successor's own
    /// continuation", so call sites can build the full sequence as a single
    /// left-to-right expression. Fails fast with
    /// [`GraphError::TerminalSuccessor`] when the current tail is terminal.
    pub fn next(mut self, successor: impl Into<Chain>) -> GraphResult<Chain> {
        let tail = self.tail();
        if tail.is_terminal() {
            return Err(GraphError::TerminalSuccessor {
                name: tail.name().clone(),
                kind: tail.state_type(),
            });
        }
        self.states.extend(successor.into().states);
        Ok(self)
    }

    /// Returns the union of permissions required by every state in this
    /// chain, including nested iterator bodies, branches, and catch handlers.
    /// Duplicates are preserved here; deduplication happens in the manifest.
    pub fn required_permissions(&self) -> Vec<Permission> {
        self.states
            .iter()
            .flat_map(State::required_permissions)
            .collect()
    }
}

impl From<State> for Chain {
    fn from(head: State) -> Self {
        Self {
            states: vec![head],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TaskParams;

    fn task(name: &str) -> State {
        State::task(
            name,
            TaskParams::lambda_invoke(format!("arn:aws:lambda:us-east-1:0:function:{name}")),
        )
    }

    #[test]
    fn next_composes_left_to_right() {
        let chain = task("A")
            .next(task("B"))
            .and_then(|chain| chain.next(State::succeed("Done")))
            .expect("chain links");

        let names: Vec<_> = chain.states().iter().map(|s| s.name().as_str()).collect();
        assert_eq!(names, ["A", "B", "Done"]);
        assert_eq!(chain.head().name().as_str(), "A");
        assert_eq!(chain.tail().name().as_str(), "Done");
    }

    #[test]
    fn next_appends_the_successors_continuation() {
        let continuation = task("B").next(task("C")).expect("chain links");
        let chain = task("A").next(continuation).expect("chain links");

        let names: Vec<_> = chain.states().iter().map(|s| s.name().as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn succeed_rejects_a_successor() {
        let result = State::succeed("Done").next(task("After"));
        assert!(matches!(
            result,
            Err(GraphError::TerminalSuccessor { .. })
        ));
    }

    #[test]
    fn fail_rejects_a_successor() {
        let chain = task("A").next(State::fail("Broken")).expect("chain links");
        let result = chain.next(task("After"));
        match result {
            Err(GraphError::TerminalSuccessor { name, .. }) => {
                assert_eq!(name.as_str(), "Broken");
            }
            other => panic!("expected terminal successor error, got {other:?}"),
        }
    }
}
