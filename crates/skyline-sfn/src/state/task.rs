//! Task state parameters and invocation-target resolution.

use derive_more::{Debug, Display, From, Into};
use serde::Serialize;

use super::payload::PayloadTemplate;
use crate::policy::Permission;

/// Service-integration URI for synchronous Lambda invocation.
pub const LAMBDA_INVOKE_RESOURCE: &str = "arn:aws:states:::lambda:invoke";

/// Stable identifier of an invocation target, usable both in the compiled
/// document and in the permission manifest.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0:?}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct InvocationTarget(String);

impl InvocationTarget {
    /// Creates a target from a resolved resource identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InvocationTarget {
    fn from(identifier: &str) -> Self {
        Self(identifier.to_owned())
    }
}

/// Resolves a logical invocation-target name into a stable resource
/// identifier.
///
/// Implemented by the deployment layer; this crate only consumes it.
pub trait TargetResolver {
    /// Resolves a logical name into a resource identifier.
    fn resolve(&self, logical_name: &str) -> InvocationTarget;
}

/// Resolver that prepends a fixed prefix to the logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixResolver {
    prefix: String,
}

impl PrefixResolver {
    /// Creates a resolver with the given identifier prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TargetResolver for PrefixResolver {
    fn resolve(&self, logical_name: &str) -> InvocationTarget {
        InvocationTarget::new(format!("{}{logical_name}", self.prefix))
    }
}

/// Input-payload specification of a task.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TaskInput {
    /// Pass the full running data context through as the payload.
    #[default]
    FullInput,
    /// Build the payload from a structured field mapping.
    Template(PayloadTemplate),
}

/// Parameters of a task state.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskParams {
    pub(crate) resource: String,
    pub(crate) target: InvocationTarget,
    pub(crate) input: TaskInput,
    pub(crate) result_selector: Option<PayloadTemplate>,
    pub(crate) result_path: Option<String>,
    pub(crate) timeout_seconds: Option<u32>,
}

impl TaskParams {
    /// Creates parameters for a synchronous Lambda invocation.
    pub fn lambda_invoke(target: impl Into<InvocationTarget>) -> Self {
        Self {
            resource: LAMBDA_INVOKE_RESOURCE.to_owned(),
            target: target.into(),
            input: TaskInput::default(),
            result_selector: None,
            result_path: None,
            timeout_seconds: None,
        }
    }

    /// Sets the input-payload specification.
    pub fn with_input(mut self, input: TaskInput) -> Self {
        self.input = input;
        self
    }

    /// Builds the payload from the given field mapping.
    pub fn with_payload(self, template: PayloadTemplate) -> Self {
        self.with_input(TaskInput::Template(template))
    }

    /// Reshapes the raw task output before it is placed at the result path.
    pub fn with_result_selector(mut self, selector: PayloadTemplate) -> Self {
        self.result_selector = Some(selector);
        self
    }

    /// Sets where the task's output is merged into the data context.
    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    /// Bounds the task's execution time.
    pub fn with_timeout_seconds(mut self, seconds: u32) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Returns the invocation target.
    pub fn target(&self) -> &InvocationTarget {
        &self.target
    }

    /// Renders the document `Parameters` object for this task.
    pub(crate) fn parameters(&self) -> PayloadTemplate {
        let template = PayloadTemplate::new().literal("FunctionName", self.target.as_str());
        match &self.input {
            TaskInput::FullInput => template.path("Payload", "$"),
            TaskInput::Template(payload) => template.nested("Payload", payload.clone()),
        }
    }

    /// Returns the permission required to invoke this task's target.
    pub(crate) fn permission(&self) -> Permission {
        Permission::new(["lambda:InvokeFunction"], [self.target.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prefix_resolver_concatenates_logical_name() {
        let resolver = PrefixResolver::new("arn:aws:lambda:us-east-1:0:function:");
        assert_eq!(
            resolver.resolve("SaveToAll").as_str(),
            "arn:aws:lambda:us-east-1:0:function:SaveToAll"
        );
    }

    #[test]
    fn full_input_renders_payload_path_marker() {
        let params = TaskParams::lambda_invoke("arn:aws:lambda:us-east-1:0:function:Retrieve");
        let value = serde_json::to_value(params.parameters()).expect("parameters serialize");
        assert_eq!(
            value,
            json!({
                "FunctionName": "arn:aws:lambda:us-east-1:0:function:Retrieve",
                "Payload.$": "$",
            })
        );
    }

    #[test]
    fn templated_input_renders_nested_payload() {
        let params = TaskParams::lambda_invoke("arn:aws:lambda:us-east-1:0:function:Extract")
            .with_payload(PayloadTemplate::new().path("event", "$"));
        let value = serde_json::to_value(params.parameters()).expect("parameters serialize");
        assert_eq!(
            value,
            json!({
                "FunctionName": "arn:aws:lambda:us-east-1:0:function:Extract",
                "Payload": { "event.$": "$" },
            })
        );
    }
}
