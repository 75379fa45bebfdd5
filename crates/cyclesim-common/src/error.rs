use thiserror::Error;

/// The five error kinds the engine surfaces, per the error handling design.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed configuration: unknown type, duplicate name, invalid period, reserved name
    /// collision, or any other defect caught at load time. The engine refuses to start.
    #[error("configuration error: {0}")]
    Config(String),

    /// Evaluation failure: unknown identifier, disallowed AST node, division by zero, negative
    /// argument to a function that forbids it, arity mismatch, or a non-scalar where a scalar
    /// was expected. Fatal to the run.
    #[error("expression error in `{expression}`: {message}")]
    Expression {
        /// Human-readable description of the failure.
        message: String,
        /// The source text of the expression that failed, for diagnostics.
        expression: String,
    },

    /// Cycle work exceeded the 60% warning threshold or the whole period. Non-fatal; logged and
    /// surfaced via `exec_ratio` in the snapshot.
    #[error("scheduling warning: {message} (exec_ratio={ratio:.3})")]
    Scheduling {
        /// Fraction of the cycle period consumed by work, clamped to `[0, 1]`.
        ratio: f64,
        /// Human-readable description.
        message: String,
    },

    /// A collaborator (live publisher or history sink) failed. Logged, cycle continues.
    #[error("sink error: {0}")]
    Sink(String),

    /// Cooperative cancellation was requested; `run_realtime` returns normally.
    #[error("run cancelled")]
    Cancelled,
}

/// Convenience alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Build an [`EngineError::Expression`] with the given message and offending source text.
    pub fn expression(message: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Expression {
            message: message.into(),
            expression: expression.into(),
        }
    }

    /// Build an [`EngineError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Build an [`EngineError::Sink`].
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_message() {
        let err = EngineError::config("cycle_time must be positive");
        assert_eq!(
            err.to_string(),
            "configuration error: cycle_time must be positive"
        );
    }

    #[test]
    fn expression_error_carries_source_text() {
        let err = EngineError::expression("unknown identifier `foo`", "foo + 1");
        assert_eq!(
            err.to_string(),
            "expression error in `foo + 1`: unknown identifier `foo`"
        );
    }

    #[test]
    fn scheduling_warning_formats_ratio() {
        let err = EngineError::Scheduling {
            ratio: 1.0,
            message: "cycle overrun".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "scheduling warning: cycle overrun (exec_ratio=1.000)"
        );
    }
}
