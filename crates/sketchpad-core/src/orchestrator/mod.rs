//! RenderOrchestrator - the edit / execute / show loop
//!
//! # Module Structure
//!
//! - `types`: `RenderState` and the collaborator traits
//! - `config`: `OrchestratorConfig`
//! - `render`: `RenderOrchestrator` and its public operations
//! - `process`: debounce timer, execution issue and completion

mod config;
mod process;
mod render;
mod types;


pub use config::{OrchestratorConfig, DEFAULT_EDIT_QUIET_PERIOD, DEFAULT_LIVE_QUIET_PERIOD};
pub use render::RenderOrchestrator;
pub use types::{EditorSurface, PreviewSink, RenderState};
