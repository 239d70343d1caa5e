//! Terminal state parameters.
//!
//! Succeed and fail states end an execution path; linking a successor after
//! either is a [`crate::GraphError`].

/// Parameters of a terminal succeed state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SucceedParams {
    pub(crate) result: Option<serde_json::Value>,
}

impl SucceedParams {
    /// Creates empty succeed parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the result payload reported for the execution path.
    pub fn with_result(mut self, result: impl Into<serde_json::Value>) -> Self {
        self.result = Some(result.into());
        self
    }
}

/// Parameters of a terminal fail state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailParams {
    pub(crate) error: Option<String>,
    pub(crate) cause: Option<String>,
}

impl FailParams {
    /// Creates empty fail parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error code reported for the failed execution.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Sets the human-readable failure cause.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}
