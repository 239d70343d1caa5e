#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod chain;
pub mod compile;
mod error;
pub mod policy;
pub mod retry;
pub mod state;

#[doc(hidden)]
pub mod prelude;

pub use error::{CompileError, CompileResult, GraphError, GraphResult};

/// Tracing target for definition-builder operations.
pub const TRACING_TARGET: &str = "skyline_sfn";
