//! Error handling and formatting for value expansion
//!
//! Two families of failure exist. Capability errors describe something the
//! debuggee cannot do right now (native debugging is off, the process is gone);
//! expansions turn them into informational rows. Expansion errors are fatal to
//! the evaluation request and propagate to the host unchanged.

use colored::Colorize;
use thiserror::Error;

/// A capability query against the debuggee process failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Native (unmanaged) debugging is not enabled for the process
    #[error("native debugging is not enabled for this process")]
    NativeDebuggingUnavailable,

    /// The process exited while the request was in flight
    #[error("the debuggee process has exited")]
    ProcessExited,
}

/// Result type for expansion operations
pub type ExpansionResult<T> = Result<T, ExpansionError>;

/// Errors that abort an evaluation request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// A value offered a native view but carries no interface pointer
    #[error("value of type {type_name} has no native COM pointer")]
    MissingNativePointer {
        /// Declared type of the value
        type_name: String,
    },

    /// The expansion was handed a value of a different shape than it was built for
    #[error("expected {expected} value, got {type_name}")]
    UnexpectedValueShape {
        /// Shape the expansion requires
        expected: &'static str,
        /// Declared type of the value received
        type_name: String,
    },

    /// A value could not be rendered as a display string
    #[error("failed to format value of type {type_name}: {message}")]
    Format {
        /// Declared type of the value
        type_name: String,
        /// Formatter message
        message: String,
    },

    /// The host cancelled the request
    #[error("evaluation was cancelled")]
    Cancelled,
}

/// Format a failed evaluation as a watch window error row for the terminal
pub fn format_evaluation_error(name: &str, error: &anyhow::Error) -> String {
    let mut output = format!(
        "{} {} {}\n",
        "✗".red().bold(),
        name.bold(),
        "could not be evaluated".red()
    );

    for (depth, cause) in error.chain().enumerate() {
        let label = if depth == 0 { "error:" } else { "caused by:" };
        output.push_str(&format!("  {} {}\n", label.red().bold(), cause));
    }

    let cancelled = error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ExpansionError>(),
            Some(ExpansionError::Cancelled)
        )
    });
    if cancelled {
        output.push_str(&format!(
            "  {} The request was cancelled; re-expand the row to retry\n",
            "Hint:".yellow().bold()
        ));
    }

    output
}
