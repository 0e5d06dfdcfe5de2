//! Sketchpad Core - Projects, Persistence and the Render Loop
//!
//! This crate ties script execution to the artist's session:
//! - Orchestrator: Debounced, sequence-numbered executions with stale-result discard
//! - Store: Single owner of the current project, exchange files and artifacts
//! - Persistence: Namespaced key-value gateway over memory or SQLite backends
//! - Events: Broadcast render events for observers
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use sketchpad_core::{OrchestratorConfig, ProjectStore, RenderOrchestrator};
//! use sketchpad_sandbox::ScriptSandbox;
//!
//! let project = ProjectStore::create("T", ViewportSize::letter(), "draw.circle(4, 5, 2);")?;
//! let orchestrator = RenderOrchestrator::new(
//!     Arc::new(ScriptSandbox::default()),
//!     ProjectStore::new(project),
//!     editor,
//!     preview,
//!     OrchestratorConfig::default(),
//! );
//! orchestrator.regenerate().await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod event_bus;
pub mod exchange;
pub mod orchestrator;
pub mod persistence;
pub mod project;
pub mod store;

pub use error::{Error, Result};
pub use event_bus::{EventBus, RenderEvent, Trigger};
pub use exchange::{ExchangeDocument, EXCHANGE_VERSION};
pub use orchestrator::{
    EditorSurface, OrchestratorConfig, PreviewSink, RenderOrchestrator, RenderState,
};
pub use persistence::{
    KeyValueBackend, MemoryBackend, PersistenceGateway, SqliteBackend, StorageError,
};
pub use project::{Project, DEFAULT_PROJECT_NAME};
pub use store::{artifact_file_name, ProjectStore};
