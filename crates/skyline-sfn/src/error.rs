//! Builder and compiler error types.

use thiserror::Error;

use crate::state::{StateName, StateType};

/// Result type for chain-construction operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Structural violations raised while linking states into a chain.
///
/// These are programming errors in the graph-construction code, raised
/// synchronously at the offending call site. They are never recoverable at
/// run time: the construction code must be fixed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A successor was linked after a terminal state.
    #[error("state {name} is terminal ({kind}) and cannot have a successor")]
    TerminalSuccessor {
        /// Name of the terminal state.
        name: StateName,
        /// Variant of the terminal state.
        kind: StateType,
    },

    /// A retry policy was attached to a state that cannot fail.
    #[error("state {name} ({kind}) does not support retry policies")]
    RetryNotSupported {
        /// Name of the offending state.
        name: StateName,
        /// Variant of the offending state.
        kind: StateType,
    },

    /// A catcher was attached to a state that cannot fail.
    #[error("state {name} ({kind}) does not support catchers")]
    CatchNotSupported {
        /// Name of the offending state.
        name: StateName,
        /// Variant of the offending state.
        kind: StateType,
    },
}

/// Errors raised while compiling a chain into a definition document.
///
/// Compilation is all-or-nothing: any of these aborts the whole build.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Chain-construction error surfaced during compilation.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Two states resolve to the same document key.
    #[error("state name collision: {name}")]
    NameCollision {
        /// The duplicated state name.
        name: StateName,
    },

    /// A transition references a state missing from its document.
    #[error("state {from} transitions to unknown state {to}")]
    DanglingTransition {
        /// State owning the transition.
        from: StateName,
        /// Missing transition target.
        to: StateName,
    },

    /// A state in the document cannot be reached from the entry state.
    #[error("state {name} is unreachable from the entry state")]
    Unreachable {
        /// Name of the unreachable state.
        name: StateName,
    },

    /// The definition could not be rendered to JSON.
    #[error("definition serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
