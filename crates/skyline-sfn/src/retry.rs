//! Retry and catch policies.
//!
//! Policies are declarations consumed by the external execution engine; this
//! crate only encodes them. Attempt `n` (1-indexed) waits
//! `min(interval * backoff_rate^(n-1), max_delay)` seconds before retrying,
//! up to `max_attempts` total attempts, after which the failure propagates to
//! the enclosing chain or map as a terminal error for that execution.

use serde::Serialize;

use crate::chain::Chain;

/// Wildcard error category matching any failure.
pub const ERRORS_ALL: &str = "States.ALL";

/// Backoff and attempt limits applied by the execution engine when a
/// task-like state fails.
///
/// Serializes directly into one entry of the document's `Retry` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetryPolicy {
    error_equals: Vec<String>,
    interval_seconds: u32,
    max_attempts: u32,
    backoff_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_delay_seconds: Option<u32>,
}

impl RetryPolicy {
    /// Creates a policy matching all errors: one-second initial interval,
    /// three attempts, doubling backoff, no delay cap.
    pub fn new() -> Self {
        Self {
            error_equals: vec![ERRORS_ALL.to_owned()],
            interval_seconds: 1,
            max_attempts: 3,
            backoff_rate: 2.0,
            max_delay_seconds: None,
        }
    }

    /// Restricts the policy to the given error categories.
    pub fn on_errors<I, S>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.error_equals = errors.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the initial wait before the first retry.
    pub fn interval_seconds(mut self, seconds: u32) -> Self {
        self.interval_seconds = seconds;
        self
    }

    /// Sets the total attempt limit.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the multiplier applied to the interval after each attempt.
    pub fn backoff_rate(mut self, rate: f64) -> Self {
        self.backoff_rate = rate;
        self
    }

    /// Caps the wait between attempts regardless of backoff growth.
    pub fn max_delay_seconds(mut self, seconds: u32) -> Self {
        self.max_delay_seconds = Some(seconds);
        self
    }

    /// Returns the matched error categories.
    pub fn error_equals(&self) -> &[String] {
        &self.error_equals
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Error-routing rule attached to a task-like state.
///
/// When a matching failure exhausts its retries, the execution engine routes
/// it to the handler chain instead of failing the whole execution. Handler
/// states are compiled into the same document as the state they guard.
#[derive(Debug, Clone, PartialEq)]
pub struct Catcher {
    error_equals: Vec<String>,
    result_path: Option<String>,
    handler: Chain,
}

impl Catcher {
    /// Creates a catcher routing any failure to the handler chain.
    pub fn new(handler: impl Into<Chain>) -> Self {
        Self {
            error_equals: vec![ERRORS_ALL.to_owned()],
            result_path: None,
            handler: handler.into(),
        }
    }

    /// Restricts the catcher to the given error categories.
    pub fn on_errors<I, S>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.error_equals = errors.into_iter().map(Into::into).collect();
        self
    }

    /// Sets where the error output is merged into the handler's input.
    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    /// Returns the matched error categories.
    pub fn error_equals(&self) -> &[String] {
        &self.error_equals
    }

    /// Returns the error-output placement path.
    pub fn result_path(&self) -> Option<&str> {
        self.result_path.as_deref()
    }

    /// Returns the handler chain.
    pub fn handler(&self) -> &Chain {
        &self.handler
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn new_policy_defaults_to_wildcard_errors() {
        let policy = RetryPolicy::new();
        assert_eq!(policy.error_equals(), [ERRORS_ALL]);
    }

    #[test]
    fn policy_serializes_all_supplied_fields() {
        let policy = RetryPolicy::new()
            .interval_seconds(10)
            .max_attempts(4)
            .backoff_rate(10.0)
            .max_delay_seconds(20);

        let value = serde_json::to_value(&policy).expect("policy serializes");
        assert_eq!(
            value,
            json!({
                "ErrorEquals": ["States.ALL"],
                "IntervalSeconds": 10,
                "MaxAttempts": 4,
                "BackoffRate": 10.0,
                "MaxDelaySeconds": 20,
            })
        );
    }

    #[test]
    fn unset_delay_cap_is_omitted() {
        let value = serde_json::to_value(RetryPolicy::new()).expect("policy serializes");
        assert!(value.get("MaxDelaySeconds").is_none());
    }
}
