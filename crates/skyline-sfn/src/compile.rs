//! Workflow compilation.
//!
//! Serializes a root [`Chain`] into the declarative document consumed by the
//! external execution engine and collects the permission manifest in the same
//! pass. Compilation is pure and deterministic: the same chain always
//! produces byte-identical output, which keeps deployments reproducible and
//! diffable against previously deployed definitions.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::TRACING_TARGET;
use crate::chain::Chain;
use crate::error::{CompileError, CompileResult};
use crate::policy::{PermissionManifest, collect_permissions};
use crate::retry::RetryPolicy;
use crate::state::{PayloadTemplate, State, StateKind, StateName, StateType};

/// A compiled workflow definition document.
///
/// Serializes to the target `{ "StartAt": ..., "States": { ... } }` shape.
/// Nested iterator bodies and branches are fully self-contained documents of
/// the same type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Definition {
    start_at: StateName,
    states: IndexMap<StateName, StateDoc>,
}

impl Definition {
    /// Returns the name of the entry state.
    pub fn start_at(&self) -> &StateName {
        &self.start_at
    }

    /// Returns the named state fragments in document order.
    pub fn states(&self) -> &IndexMap<StateName, StateDoc> {
        &self.states
    }

    /// Renders the document as compact JSON.
    pub fn to_json(&self) -> CompileResult<String> {
        serde_json::to_string(self).map_err(CompileError::from)
    }

    /// Renders the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> CompileResult<String> {
        serde_json::to_string_pretty(self).map_err(CompileError::from)
    }
}

/// One serialized state fragment of a [`Definition`].
///
/// Field order matches the target format's conventional key order; unset
/// fields are omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StateDoc {
    #[serde(rename = "Type")]
    kind: StateType,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<PayloadTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result_selector: Option<PayloadTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_concurrency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iterator: Option<Box<Definition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branches: Option<Vec<Definition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry: Option<Vec<RetryPolicy>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    catch: Option<Vec<CatchDoc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<StateName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<bool>,
}

impl StateDoc {
    fn typed(kind: StateType) -> Self {
        Self {
            kind,
            resource: None,
            parameters: None,
            result_selector: None,
            result: None,
            result_path: None,
            error: None,
            cause: None,
            items_path: None,
            max_concurrency: None,
            iterator: None,
            branches: None,
            timeout_seconds: None,
            retry: None,
            catch: None,
            next: None,
            end: None,
        }
    }

    /// Returns the variant tag.
    pub fn state_type(&self) -> StateType {
        self.kind
    }

    /// Returns the successor name, if any.
    pub fn next(&self) -> Option<&StateName> {
        self.next.as_ref()
    }

    /// Returns whether this fragment carries the terminal `End` marker.
    pub fn is_end(&self) -> bool {
        self.end == Some(true)
    }

    /// Returns the nested iterator document of a map fragment.
    pub fn iterator(&self) -> Option<&Definition> {
        self.iterator.as_deref()
    }

    /// Returns the serialized retry entries.
    pub fn retries(&self) -> Option<&[RetryPolicy]> {
        self.retry.as_deref()
    }
}

/// One serialized entry of a state's `Catch` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatchDoc {
    error_equals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result_path: Option<String>,
    next: StateName,
}

/// Result of compiling a root chain: the definition document together with
/// the execution-role permission manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// The declarative workflow document.
    pub definition: Definition,
    /// Deduplicated execution-role grants the workflow requires.
    pub permissions: PermissionManifest,
}

/// Compiles a root chain into a definition document and its permission
/// manifest.
///
/// Depth-first: every reachable state gets exactly one entry keyed by its
/// name, successors are wired via `Next`, the chain's trailing non-terminal
/// state is marked `End: true`, and map iterators and parallel branches are
/// compiled into self-contained nested documents. Names must be unique across
/// the whole compiled document, nested documents included.
pub fn compile(chain: &Chain) -> CompileResult<Compiled> {
    let mut seen = HashSet::new();
    let definition = compile_definition(chain, &mut seen)?;
    verify(&definition)?;
    let permissions = collect_permissions(chain);

    tracing::debug!(
        target: TRACING_TARGET,
        start_at = %definition.start_at(),
        states = definition.states().len(),
        permissions = permissions.len(),
        "compiled workflow definition"
    );

    Ok(Compiled {
        definition,
        permissions,
    })
}

fn compile_definition(chain: &Chain, seen: &mut HashSet<StateName>) -> CompileResult<Definition> {
    let mut states = IndexMap::new();
    emit_chain(chain, &mut states, seen)?;
    Ok(Definition {
        start_at: chain.head().name().clone(),
        states,
    })
}

/// Emits the chain's spine in execution order, then the handler chains of any
/// catchers into the same state table.
fn emit_chain(
    chain: &Chain,
    states: &mut IndexMap<StateName, StateDoc>,
    seen: &mut HashSet<StateName>,
) -> CompileResult<()> {
    let members = chain.states();

    for (index, state) in members.iter().enumerate() {
        if !seen.insert(state.name().clone()) {
            return Err(CompileError::NameCollision {
                name: state.name().clone(),
            });
        }
        let successor = members.get(index + 1).map(|next| next.name().clone());
        let doc = state_doc(state, successor, seen)?;
        states.insert(state.name().clone(), doc);
    }

    for state in members {
        for catcher in state.catchers() {
            emit_chain(catcher.handler(), states, seen)?;
        }
    }

    Ok(())
}

fn state_doc(
    state: &State,
    successor: Option<StateName>,
    seen: &mut HashSet<StateName>,
) -> CompileResult<StateDoc> {
    let mut doc = StateDoc::typed(state.state_type());

    match state.kind() {
        StateKind::Pass(params) => {
            doc.parameters = params.parameters.clone();
            doc.result = params.result.clone();
            doc.result_path = params.result_path.clone();
        }
        StateKind::Succeed(params) => {
            doc.result = params.result.clone();
        }
        StateKind::Fail(params) => {
            doc.error = params.error.clone();
            doc.cause = params.cause.clone();
        }
        StateKind::Task(params) => {
            doc.resource = Some(params.resource.clone());
            doc.parameters = Some(params.parameters());
            doc.result_selector = params.result_selector.clone();
            doc.result_path = params.result_path.clone();
            doc.timeout_seconds = params.timeout_seconds;
        }
        StateKind::Map(params) => {
            doc.items_path = Some(params.items_path.clone());
            doc.max_concurrency = Some(params.max_concurrency.get());
            doc.iterator = Some(Box::new(compile_definition(params.iterator(), seen)?));
        }
        StateKind::Parallel(params) => {
            let branches = params
                .branches()
                .iter()
                .map(|branch| compile_definition(branch, seen))
                .collect::<CompileResult<Vec<_>>>()?;
            doc.branches = Some(branches);
        }
    }

    if !state.retries().is_empty() {
        doc.retry = Some(state.retries().to_vec());
    }
    if !state.catchers().is_empty() {
        let catchers = state
            .catchers()
            .iter()
            .map(|catcher| CatchDoc {
                error_equals: catcher.error_equals().to_vec(),
                result_path: catcher.result_path().map(str::to_owned),
                next: catcher.handler().head().name().clone(),
            })
            .collect();
        doc.catch = Some(catchers);
    }

    match successor {
        Some(next) => doc.next = Some(next),
        None if !state.is_terminal() => doc.end = Some(true),
        None => {}
    }

    Ok(doc)
}

/// Defensive structural check over the compiled document: every transition
/// target must exist in its state table, and every state must be reachable
/// from the entry state. Chain construction makes violations impossible, so
/// a failure here indicates a compiler bug rather than a caller bug.
fn verify(definition: &Definition) -> CompileResult<()> {
    for (name, doc) in &definition.states {
        if let Some(next) = &doc.next
            && !definition.states.contains_key(next)
        {
            return Err(CompileError::DanglingTransition {
                from: name.clone(),
                to: next.clone(),
            });
        }
        if let Some(catchers) = &doc.catch {
            for catcher in catchers {
                if !definition.states.contains_key(&catcher.next) {
                    return Err(CompileError::DanglingTransition {
                        from: name.clone(),
                        to: catcher.next.clone(),
                    });
                }
            }
        }
        if let Some(iterator) = &doc.iterator {
            verify(iterator)?;
        }
        if let Some(branches) = &doc.branches {
            for branch in branches {
                verify(branch)?;
            }
        }
    }

    let mut visited = HashSet::new();
    let mut pending = vec![&definition.start_at];
    while let Some(name) = pending.pop() {
        if !visited.insert(name) {
            continue;
        }
        let Some(doc) = definition.states.get(name) else {
            continue;
        };
        if let Some(next) = &doc.next {
            pending.push(next);
        }
        if let Some(catchers) = &doc.catch {
            pending.extend(catchers.iter().map(|catcher| &catcher.next));
        }
    }
    for name in definition.states.keys() {
        if !visited.contains(name) {
            return Err(CompileError::Unreachable { name: name.clone() });
        }
    }

    Ok(())
}
