//! Orchestrator types and collaborator traits
//!
//! - `RenderState` for the state machine
//! - `EditorSurface` and `PreviewSink` for the UI the orchestrator drives

use serde::Serialize;
use sketchpad_canvas::ViewportSize;
use sketchpad_sandbox::ExecutionFault;

/// Render state machine
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderState {
    /// Nothing issued yet
    #[default]
    Idle,
    /// Execution `seq` is the latest one in flight
    Executing {
        /// Sequence number
        seq: u64,
    },
    /// Execution `seq` succeeded and is on screen
    Rendered {
        /// Sequence number
        seq: u64,
    },
    /// Execution `seq` failed; the previous preview is still shown
    Faulted {
        /// Sequence number
        seq: u64,
        /// Classified failure
        fault: ExecutionFault,
    },
}

impl RenderState {
    /// Sequence number of the state, if any
    #[must_use]
    pub fn seq(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Executing { seq } | Self::Rendered { seq } | Self::Faulted { seq, .. } => {
                Some(*seq)
            }
        }
    }
}

/// Text editing surface holding the script.
///
/// Change notifications flow the other way: whoever owns the editor calls
/// `RenderOrchestrator::on_edit` with the new text.
pub trait EditorSurface: Send + Sync {
    /// Current text
    fn value(&self) -> String;

    /// Replace the text (used when a project is loaded)
    fn set_value(&self, text: &str);

    /// Mark a single line with a fault message
    fn annotate_fault(&self, line: u32, message: &str);

    /// Remove any fault annotation
    fn clear_annotations(&self);
}

/// Where rendered markup is shown
pub trait PreviewSink: Send + Sync {
    /// Display markup produced for `viewport`
    fn show(&self, markup: &str, viewport: &ViewportSize);
}
