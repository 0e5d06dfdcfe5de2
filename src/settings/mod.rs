//! Application settings
//!
//! # Module Structure
//!
//! - `config`: Typed configuration sections
//! - `loader`: Layered loading from embedded defaults, files and environment

pub mod config;
mod loader;

pub use config::{AppConfig, StorageBackendKind};
pub use loader::load_config;
