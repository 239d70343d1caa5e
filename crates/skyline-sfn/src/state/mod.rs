//! Workflow state variants.
//!
//! A [`State`] is one node in the workflow graph: an immutable name plus a
//! closed sum of variant parameters, with optional retry and catch policies
//! attached. States never execute anything; they only know how to serialize
//! themselves and which execution-role permissions they require.

mod map;
mod parallel;
mod pass;
mod payload;
mod task;
mod terminal;

use derive_more::{Debug, Display, From, Into};
use serde::Serialize;

pub use map::MapParams;
pub use parallel::ParallelParams;
pub use pass::PassParams;
pub use payload::{PayloadTemplate, PayloadValue};
pub use task::{
    InvocationTarget, LAMBDA_INVOKE_RESOURCE, PrefixResolver, TargetResolver, TaskInput,
    TaskParams,
};
pub use terminal::{FailParams, SucceedParams};

use crate::chain::Chain;
use crate::error::{GraphError, GraphResult};
use crate::policy::Permission;
use crate::retry::{Catcher, RetryPolicy};

/// Name of a state, used as its key in the compiled document.
///
/// Names are assigned at construction and never change afterwards. They must
/// be unique within one compiled document; the compiler rejects collisions.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0:?}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct StateName(String);

impl StateName {
    /// Creates a new state name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl std::borrow::Borrow<str> for StateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Variant tag of a state, matching the document's `Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum StateType {
    /// No-op step that rewrites the data passed through it.
    Pass,
    /// Terminal state ending an execution path successfully.
    Succeed,
    /// Terminal state ending an execution path with an error.
    Fail,
    /// Service-invocation step.
    Task,
    /// Per-element iteration over a runtime collection.
    Map,
    /// Concurrent execution of independent branches.
    Parallel,
}

/// Variant-specific parameters of a state.
///
/// A closed sum type: serialization and permission contribution are
/// exhaustive matches over these variants.
#[derive(Debug, Clone, PartialEq, From)]
pub enum StateKind {
    /// No-op data rewrite.
    Pass(PassParams),
    /// Successful termination.
    Succeed(SucceedParams),
    /// Failed termination.
    Fail(FailParams),
    /// Service invocation.
    Task(TaskParams),
    /// Iterated sub-chain.
    Map(MapParams),
    /// Concurrent branches.
    Parallel(ParallelParams),
}

impl StateKind {
    /// Returns the variant tag of this kind.
    pub const fn state_type(&self) -> StateType {
        match self {
            StateKind::Pass(_) => StateType::Pass,
            StateKind::Succeed(_) => StateType::Succeed,
            StateKind::Fail(_) => StateType::Fail,
            StateKind::Task(_) => StateType::Task,
            StateKind::Map(_) => StateType::Map,
            StateKind::Parallel(_) => StateType::Parallel,
        }
    }
}

/// A single node in the workflow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    name: StateName,
    kind: StateKind,
    retry: Vec<RetryPolicy>,
    catch: Vec<Catcher>,
}

impl State {
    /// Creates a state with the given name and variant parameters.
    pub fn new(name: impl Into<StateName>, kind: impl Into<StateKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            retry: Vec::new(),
            catch: Vec::new(),
        }
    }

    /// Creates a pass state with default parameters.
    pub fn pass(name: impl Into<StateName>) -> Self {
        Self::new(name, PassParams::default())
    }

    /// Creates a terminal succeed state.
    pub fn succeed(name: impl Into<StateName>) -> Self {
        Self::new(name, SucceedParams::default())
    }

    /// Creates a terminal fail state.
    pub fn fail(name: impl Into<StateName>) -> Self {
        Self::new(name, FailParams::default())
    }

    /// Creates a task state.
    pub fn task(name: impl Into<StateName>, params: TaskParams) -> Self {
        Self::new(name, params)
    }

    /// Creates a map state iterating a nested chain.
    pub fn map(name: impl Into<StateName>, params: MapParams) -> Self {
        Self::new(name, params)
    }

    /// Creates a parallel state with independent branches.
    pub fn parallel(name: impl Into<StateName>, params: ParallelParams) -> Self {
        Self::new(name, params)
    }

    /// Returns the state's name.
    pub fn name(&self) -> &StateName {
        &self.name
    }

    /// Returns the variant-specific parameters.
    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    /// Returns the variant tag.
    pub const fn state_type(&self) -> StateType {
        self.kind.state_type()
    }

    /// Returns whether this state ends an execution path.
    pub const fn is_terminal(&self) -> bool {
        matches!(self.kind, StateKind::Succeed(_) | StateKind::Fail(_))
    }

    /// Returns whether retry and catch policies may be attached.
    pub const fn supports_error_handling(&self) -> bool {
        matches!(
            self.kind,
            StateKind::Task(_) | StateKind::Map(_) | StateKind::Parallel(_)
        )
    }

    /// Returns the attached retry policies in attachment order.
    pub fn retries(&self) -> &[RetryPolicy] {
        &self.retry
    }

    /// Returns the attached catchers in attachment order.
    pub fn catchers(&self) -> &[Catcher] {
        &self.catch
    }

    /// Attaches a retry policy, preserving attachment order.
    ///
    /// The execution engine evaluates policies in this order and applies the
    /// first whose error set matches the failure, so a wildcard policy should
    /// generally be attached last.
    pub fn with_retry(mut self, policy: RetryPolicy) -> GraphResult<Self> {
        if !self.supports_error_handling() {
            return Err(GraphError::RetryNotSupported {
                name: self.name,
                kind: self.kind.state_type(),
            });
        }
        self.retry.push(policy);
        Ok(self)
    }

    /// Attaches a catcher routing matching failures to a handler chain.
    pub fn with_catch(mut self, catcher: Catcher) -> GraphResult<Self> {
        if !self.supports_error_handling() {
            return Err(GraphError::CatchNotSupported {
                name: self.name,
                kind: self.kind.state_type(),
            });
        }
        self.catch.push(catcher);
        Ok(self)
    }

    /// Links a successor after this state, returning the composed chain.
    ///
    /// Fails fast with [`GraphError::TerminalSuccessor`] when invoked on a
    /// terminal state. Reusing a state in two chains is prevented by
    /// ownership: linking consumes both sides.
    pub fn next(self, successor: impl Into<Chain>) -> GraphResult<Chain> {
        Chain::from(self).next(successor)
    }

    /// Returns the permissions this state requires, including those of any
    /// nested iterator bodies, branches, and catch handlers.
    pub fn required_permissions(&self) -> Vec<Permission> {
        let mut permissions = match &self.kind {
            StateKind::Task(task) => vec![task.permission()],
            StateKind::Map(map) => map.iterator().required_permissions(),
            StateKind::Parallel(parallel) => parallel
                .branches()
                .iter()
                .flat_map(Chain::required_permissions)
                .collect(),
            StateKind::Pass(_) | StateKind::Succeed(_) | StateKind::Fail(_) => Vec::new(),
        };

        for catcher in &self.catch {
            permissions.extend(catcher.handler().required_permissions());
        }

        permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_name_displays_raw_value() {
        let name = StateName::from("RetrieveLambda");
        assert_eq!(name.to_string(), "RetrieveLambda");
        assert_eq!(name.as_str(), "RetrieveLambda");
    }

    #[test]
    fn state_type_matches_kind() {
        assert_eq!(State::pass("A").state_type(), StateType::Pass);
        assert_eq!(State::succeed("B").state_type(), StateType::Succeed);
        assert_eq!(State::fail("C").state_type(), StateType::Fail);
    }

    #[test]
    fn terminal_states_reject_retry_policies() {
        let result = State::succeed("Done").with_retry(RetryPolicy::new());
        assert!(matches!(
            result,
            Err(GraphError::RetryNotSupported { kind: StateType::Succeed, .. })
        ));
    }

    #[test]
    fn pass_states_reject_catchers() {
        let handler = Chain::from(State::succeed("Recovered"));
        let result = State::pass("Noop").with_catch(Catcher::new(handler));
        assert!(matches!(result, Err(GraphError::CatchNotSupported { .. })));
    }

    #[test]
    fn retry_attachment_order_is_preserved() {
        let state = State::task(
            "Publish",
            TaskParams::lambda_invoke("arn:aws:lambda:us-east-1:0:function:Publish"),
        )
        .with_retry(RetryPolicy::new().on_errors(["TooManyRequestsException"]))
        .and_then(|s| s.with_retry(RetryPolicy::new()))
        .expect("task states accept retries");

        let errors: Vec<_> = state
            .retries()
            .iter()
            .map(|policy| policy.error_equals().to_vec())
            .collect();
        assert_eq!(
            errors,
            vec![
                vec!["TooManyRequestsException".to_owned()],
                vec![crate::retry::ERRORS_ALL.to_owned()],
            ]
        );
    }

    #[test]
    fn task_permissions_name_the_invocation_target() {
        let arn = "arn:aws:lambda:us-east-1:0:function:Score";
        let state = State::task("Score", TaskParams::lambda_invoke(arn));
        let permissions = state.required_permissions();
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].actions(), ["lambda:InvokeFunction"]);
        assert_eq!(permissions[0].resources(), [arn]);
    }
}
