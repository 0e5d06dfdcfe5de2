//! Fault classification
//!
//! Turns whatever a script threw into an [`ExecutionFault`]. Classification
//! is pure and total: malformed failures still produce a fault.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::fault::{ExecutionFault, FaultKind};

/// `<line>:<column>` inside a stack trace, e.g. `<anonymous>:3:14`
static TRACE_POSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)").expect("valid trace regex"));

/// `line N` (optionally followed by `, col M`) inside a message
static MESSAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bline[:\s]+(\d+)(?:\s*,\s*col(?:umn)?[:\s]+(\d+))?")
        .expect("valid message regex")
});

/// Where the failure happened, as far as the sandbox can tell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseHint {
    /// No capability call was possible yet
    Compile,
    /// At least one capability call happened
    Execution,
}

/// A failure value captured from the script engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawFailure {
    /// Error constructor name (`SyntaxError`, `TypeError`, ...)
    #[serde(default)]
    pub name: Option<String>,
    /// Error message, or the stringified thrown value
    #[serde(default)]
    pub message: String,
    /// Stack trace text, when the engine attached one
    #[serde(default, alias = "stack")]
    pub trace: Option<String>,
    /// Reported by the parser, so message positions point into wrapped source
    #[serde(skip)]
    pub from_parser: bool,
}

impl RawFailure {
    /// Create a failure from a message only
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Split engine display text of the form `Name: message`
    #[must_use]
    pub fn from_display(text: &str) -> Self {
        match text.split_once(": ") {
            Some((name, message)) if is_error_name(name) => Self {
                name: Some(name.to_string()),
                message: message.to_string(),
                ..Self::default()
            },
            _ => Self::from_message(text),
        }
    }

    /// Failure raised while parsing the wrapped script
    #[must_use]
    pub fn from_parse_error(text: &str) -> Self {
        Self {
            from_parser: true,
            ..Self::from_display(text)
        }
    }

    /// Whether the position [`classify`] picks refers to the wrapped source
    /// rather than to text the script itself wrote into its message
    #[must_use]
    pub fn is_wrapper_relative(&self) -> bool {
        self.from_parser || self.trace.as_deref().and_then(trace_position).is_some()
    }

    /// Attach a trace
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    fn is_syntax_failure(&self) -> bool {
        self.name.as_deref() == Some("SyntaxError") || self.message.starts_with("SyntaxError")
    }
}

fn is_error_name(name: &str) -> bool {
    !name.is_empty()
        && name.ends_with("Error")
        && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Classify a raw failure
#[must_use]
pub fn classify(raw: &RawFailure, hint: PhaseHint) -> ExecutionFault {
    let kind = if hint == PhaseHint::Compile || raw.is_syntax_failure() {
        FaultKind::Compile
    } else {
        FaultKind::Execution
    };

    let message = match (&raw.name, raw.message.trim()) {
        (Some(name), "") => name.clone(),
        (Some(name), msg) if !msg.starts_with(name.as_str()) => format!("{name}: {msg}"),
        (_, "") => "Script failed without a message".to_string(),
        (_, msg) => msg.to_string(),
    };

    let (line, column) = raw
        .trace
        .as_deref()
        .and_then(trace_position)
        .or_else(|| message_position(&raw.message))
        .map_or((None, None), |(line, column)| (Some(line), column));

    ExecutionFault::new(kind, message).with_position(line, column)
}

fn trace_position(trace: &str) -> Option<(u32, Option<u32>)> {
    TRACE_POSITION.captures_iter(trace).find_map(|caps| {
        let line = caps.get(1)?.as_str().parse().ok()?;
        let column = caps.get(2).and_then(|m| m.as_str().parse().ok());
        Some((line, column))
    })
}

fn message_position(message: &str) -> Option<(u32, Option<u32>)> {
    let caps = MESSAGE_LINE.captures(message)?;
    let line = caps.get(1)?.as_str().parse().ok()?;
    let column = caps.get(2).and_then(|m| m.as_str().parse().ok());
    Some((line, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_hint_wins() {
        let raw = RawFailure::from_display("ReferenceError: circle is not defined");
        let fault = classify(&raw, PhaseHint::Compile);
        assert_eq!(fault.kind, FaultKind::Compile);
        assert_eq!(fault.message, "ReferenceError: circle is not defined");
    }

    #[test]
    fn test_syntax_error_is_compile() {
        let raw = RawFailure::from_display("SyntaxError: unexpected token '}'");
        let fault = classify(&raw, PhaseHint::Execution);
        assert_eq!(fault.kind, FaultKind::Compile);
    }

    #[test]
    fn test_execution_kind() {
        let raw = RawFailure::from_display("TypeError: x is not a function");
        assert_eq!(classify(&raw, PhaseHint::Execution).kind, FaultKind::Execution);
    }

    #[test]
    fn test_trace_position() {
        let raw = RawFailure::from_display("Error: boom")
            .with_trace("Error: boom\n    at draw (<anonymous>:12:5)\n    at <anonymous>:40:1");
        let fault = classify(&raw, PhaseHint::Execution);
        assert_eq!(fault.line, Some(12));
        assert_eq!(fault.column, Some(5));
    }

    #[test]
    fn test_message_line_fallback() {
        let raw = RawFailure::from_display(
            "SyntaxError: expected token ')', got '}' in arguments at line 3, col 1",
        );
        let fault = classify(&raw, PhaseHint::Compile);
        assert_eq!(fault.line, Some(3));
        assert_eq!(fault.column, Some(1));

        let raw = RawFailure::from_message("problem near Line 9");
        let fault = classify(&raw, PhaseHint::Execution);
        assert_eq!(fault.line, Some(9));
        assert_eq!(fault.column, None);
    }

    #[test]
    fn test_trace_without_position_falls_back() {
        let raw = RawFailure::from_message("bad value on line 4").with_trace("no frames here");
        assert_eq!(classify(&raw, PhaseHint::Execution).line, Some(4));
    }

    #[test]
    fn test_no_position() {
        let fault = classify(&RawFailure::from_message("nope"), PhaseHint::Execution);
        assert_eq!(fault.line, None);
        assert_eq!(fault.column, None);
    }

    #[test]
    fn test_malformed_failures_are_total() {
        let empty = classify(&RawFailure::default(), PhaseHint::Execution);
        assert_eq!(empty.kind, FaultKind::Execution);
        assert_eq!(empty.message, "Script failed without a message");

        let huge = RawFailure::from_message("line 99999999999999999999");
        assert_eq!(classify(&huge, PhaseHint::Execution).line, None);

        let named = RawFailure {
            name: Some("RangeError".into()),
            message: String::new(),
            trace: Some(":::".into()),
            from_parser: false,
        };
        assert_eq!(classify(&named, PhaseHint::Execution).message, "RangeError");
    }

    #[test]
    fn test_position_origin() {
        let parsed = RawFailure::from_parse_error("SyntaxError: unexpected token at line 4, col 2");
        assert!(parsed.is_wrapper_relative());
        assert_eq!(parsed.name.as_deref(), Some("SyntaxError"));

        let traced = RawFailure::from_message("boom").with_trace("at <anonymous>:7:3");
        assert!(traced.is_wrapper_relative());

        let written = RawFailure::from_display("Error: bad value on line 5");
        assert!(!written.is_wrapper_relative());
        assert_eq!(classify(&written, PhaseHint::Execution).line, Some(5));
    }

    #[test]
    fn test_thrown_string_is_not_split() {
        let raw = RawFailure::from_display("note: this is not an error name");
        assert_eq!(raw.name, None);
        assert_eq!(raw.message, "note: this is not an error name");
    }
}
