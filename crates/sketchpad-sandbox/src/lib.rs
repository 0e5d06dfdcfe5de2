//! Sketchpad Sandbox - Script Execution
//!
//! This crate runs artist scripts against freshly created drawing surfaces:
//! - Sandbox: One engine context and one surface per execution, bounded by a timeout
//! - Prelude: The `draw` capability object handed to scripts
//! - Classify: Raw failures to typed faults with best-effort positions
//! - Fault: `ExecutionOutcome` / `ExecutionFault` values
//! - Config: Timeout, isolation and size limits
//!
//! ## Usage
//!
//! ```ignore
//! use sketchpad_sandbox::{ScriptExecutor, ScriptSandbox, SandboxConfig};
//! use sketchpad_canvas::ViewportSize;
//!
//! let sandbox = ScriptSandbox::new(SandboxConfig::default());
//! let outcome = sandbox
//!     .execute("draw.circle(3, 3, 1).fill('red');", &ViewportSize::new(6.0, 6.0, "6x6"))
//!     .await;
//! ```
//!
//! ## Limitations
//!
//! The timeout can only interrupt suspension points. A script that never
//! yields keeps its engine thread busy; the caller is still released when
//! the deadline passes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod config;
pub mod fault;
mod prelude;
pub mod sandbox;

pub use classify::{classify, PhaseHint, RawFailure};
pub use config::SandboxConfig;
pub use fault::{ExecutionFault, ExecutionOutcome, FaultKind};
pub use sandbox::{ScriptExecutor, ScriptSandbox};
