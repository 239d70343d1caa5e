//! Pass state parameters.

use super::payload::PayloadTemplate;

/// Parameters of a pass state: a no-op step that rewrites the data passed
/// through it. Requires no permissions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassParams {
    pub(crate) result: Option<serde_json::Value>,
    pub(crate) parameters: Option<PayloadTemplate>,
    pub(crate) result_path: Option<String>,
}

impl PassParams {
    /// Creates empty pass parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a static result payload injected into the data context.
    pub fn with_result(mut self, result: impl Into<serde_json::Value>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Sets a parameter-rewrite expression applied to the input.
    pub fn with_parameters(mut self, parameters: PayloadTemplate) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Sets where the result is merged into the data context.
    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }
}
