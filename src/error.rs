use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the interpreter core.
///
/// Every failure surfaced to the user maps onto one of these kinds; handler
/// code is free to return any [`anyhow::Error`], which the dispatcher reports
/// as an unhandled failure unless it downcasts to a `ShellError`.
///
/// The enum is serializable so hosts can ship errors across a process
/// boundary with the message intact.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ShellError {
    /// Malformed input to the tokenizer or binder, e.g. an unterminated
    /// quoted run or an argument no parameter consumes.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The first token of a dispatch did not resolve to any command.
    #[error("Invalid command: {0}")]
    UnknownCommand(String),

    /// A required argument was not supplied.
    #[error("The value for {0} is required.")]
    MissingArgument(String),

    /// An argument value could not be converted to the declared type.
    #[error("invalid value '{value}' for {argument}")]
    InvalidArgumentValue { argument: String, value: String },

    /// Macro expansion or `get`/`set` referenced an option that is not
    /// registered.
    #[error("unknown option specified: {0}")]
    UnknownOption(String),

    /// A name collision inside a single handler registration.
    #[error("duplicate name registered: {0}")]
    DuplicateName(String),

    /// A handler failure that should be reported with its message alone,
    /// without the generic error prefix.
    #[error("{0}")]
    Application(String),

    /// Pagination was requested but no next-character reader is installed.
    #[error("console input is not available")]
    ConsoleUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_message() {
        let err = ShellError::MissingArgument("number".to_string());
        assert_eq!(err.to_string(), "The value for number is required.");
    }

    #[test]
    fn test_unknown_option_message() {
        let err = ShellError::UnknownOption("MissingProperty".to_string());
        assert_eq!(
            err.to_string(),
            "unknown option specified: MissingProperty"
        );
    }

    #[test]
    fn test_application_error_prints_message_only() {
        let err = ShellError::Application("kaboom".to_string());
        assert_eq!(err.to_string(), "kaboom");
    }

    #[test]
    fn test_serde_round_trip_preserves_message() {
        let errors = vec![
            ShellError::InvalidInput("unterminated quote".to_string()),
            ShellError::UnknownCommand("frobnicate".to_string()),
            ShellError::MissingArgument("number".to_string()),
            ShellError::InvalidArgumentValue {
                argument: "number".to_string(),
                value: "abc".to_string(),
            },
            ShellError::UnknownOption("Nope".to_string()),
            ShellError::DuplicateName("Count".to_string()),
            ShellError::Application("kaboom".to_string()),
            ShellError::ConsoleUnavailable,
        ];
        for err in errors {
            let encoded = serde_json::to_string(&err).unwrap();
            let decoded: ShellError = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, err);
            assert_eq!(decoded.to_string(), err.to_string());
        }
    }
}
