//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use skyline_sfn::prelude::*;
//! ```

pub use crate::chain::Chain;
pub use crate::compile::{CatchDoc, Compiled, Definition, StateDoc, compile};
pub use crate::error::{CompileError, CompileResult, GraphError, GraphResult};
pub use crate::policy::{Permission, PermissionManifest, collect_permissions};
pub use crate::retry::{Catcher, ERRORS_ALL, RetryPolicy};
pub use crate::state::{
    FailParams, InvocationTarget, MapParams, ParallelParams, PassParams, PayloadTemplate,
    PayloadValue, PrefixResolver, State, StateKind, StateName, StateType, SucceedParams,
    TargetResolver, TaskInput, TaskParams,
};
