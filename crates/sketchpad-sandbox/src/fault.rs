//! Execution outcomes and faults
//!
//! An [`ExecutionOutcome`] is the only value the sandbox ever hands back.
//! Faults are produced fresh on every failed execution and never mutated
//! afterwards, only replaced.

use serde::{Deserialize, Serialize};

/// Fault classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    /// The script failed before any capability call was possible
    Compile,
    /// The script failed after it started drawing
    Execution,
    /// The script did not settle before the deadline
    Timeout,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compile => write!(f, "compile"),
            Self::Execution => write!(f, "execution"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// A classified execution failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFault {
    /// Classification
    pub kind: FaultKind,
    /// Human-readable message
    pub message: String,
    /// 1-based line in the artist's script, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-based column, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ExecutionFault {
    /// Create a fault without position
    #[must_use]
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a timeout fault
    #[must_use]
    pub fn timeout(limit_ms: u128) -> Self {
        Self::new(
            FaultKind::Timeout,
            format!("Script did not finish within {limit_ms}ms"),
        )
    }

    /// Attach a position
    #[must_use]
    pub fn with_position(mut self, line: Option<u32>, column: Option<u32>) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Translate a position reported against wrapped source back into the
    /// artist's own lines. `offset` lines precede the script in the wrapper;
    /// the result is clamped into `1..=script_lines`.
    #[must_use]
    pub fn rebased(mut self, offset: u32, script_lines: u32) -> Self {
        if let Some(line) = self.line {
            let last = script_lines.max(1);
            let rebased = line.saturating_sub(offset).clamp(1, last);
            if rebased != line.saturating_sub(offset) {
                // The reported column belongs to a wrapper line.
                self.column = None;
            }
            self.line = Some(rebased);
        }
        self
    }
}

impl std::fmt::Display for ExecutionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)?;
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, " (line {line}, column {column})"),
            (Some(line), None) => write!(f, " (line {line})"),
            _ => Ok(()),
        }
    }
}

/// Result of one script execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// The script finished; `markup` is the serialized surface
    Success {
        /// Serialized surface contents
        markup: String,
    },
    /// The script failed
    Failure {
        /// The classified fault
        fault: ExecutionFault,
    },
}

impl ExecutionOutcome {
    /// Wrap a fault
    #[must_use]
    pub fn failure(fault: ExecutionFault) -> Self {
        Self::Failure { fault }
    }

    /// Whether the execution succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Fault, if the execution failed
    #[must_use]
    pub fn fault(&self) -> Option<&ExecutionFault> {
        match self {
            Self::Failure { fault } => Some(fault),
            Self::Success { .. } => None,
        }
    }

    /// Markup, if the execution succeeded
    #[must_use]
    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Success { markup } => Some(markup),
            Self::Failure { .. } => None,
        }
    }
}
