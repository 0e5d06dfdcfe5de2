//! Configuration types
//!
//! Each section maps onto the `*Config` struct of the crate it configures.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sketchpad_canvas::ViewportSize;
use sketchpad_core::OrchestratorConfig;
use sketchpad_sandbox::SandboxConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default = "default_viewport")]
    pub viewport: String,
    #[serde(default)]
    pub sandbox: SandboxSettings,
    #[serde(default)]
    pub orchestrator: OrchestratorSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

fn default_viewport() -> String {
    "8.5x11".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            viewport: default_viewport(),
            sandbox: SandboxSettings::default(),
            orchestrator: OrchestratorSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl AppConfig {
    /// Directory holding the session database
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join("sketchpad"))
                .unwrap_or_else(|| PathBuf::from("./data")),
        }
    }

    /// Viewport for new projects
    pub fn default_viewport(&self) -> Result<ViewportSize> {
        ViewportSize::from_label(&self.viewport)
            .with_context(|| format!("Invalid default viewport '{}'", self.viewport))
    }
}

/// Script sandbox configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_true")]
    pub isolate_globals: bool,
    #[serde(default)]
    pub loop_iteration_limit: Option<u64>,
    #[serde(default = "default_max_script_bytes")]
    pub max_script_bytes: usize,
    #[serde(default = "default_true")]
    pub capture_console: bool,
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_script_bytes() -> usize {
    1024 * 1024
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            isolate_globals: true,
            loop_iteration_limit: None,
            max_script_bytes: default_max_script_bytes(),
            capture_console: true,
        }
    }
}

impl SandboxSettings {
    pub fn to_sandbox_config(&self) -> SandboxConfig {
        SandboxConfig::new()
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_isolation(self.isolate_globals)
            .with_loop_iteration_limit(self.loop_iteration_limit)
            .with_max_script_bytes(self.max_script_bytes)
            .with_console_capture(self.capture_console)
    }
}

/// Render loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    #[serde(default = "default_edit_quiet_ms")]
    pub edit_quiet_ms: u64,
    #[serde(default = "default_live_quiet_ms")]
    pub live_quiet_ms: u64,
    #[serde(default)]
    pub live: bool,
}

fn default_edit_quiet_ms() -> u64 {
    1000
}

fn default_live_quiet_ms() -> u64 {
    500
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            edit_quiet_ms: default_edit_quiet_ms(),
            live_quiet_ms: default_live_quiet_ms(),
            live: false,
        }
    }
}

impl OrchestratorSettings {
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new()
            .with_edit_quiet_period(Duration::from_millis(self.edit_quiet_ms))
            .with_live_quiet_period(Duration::from_millis(self.live_quiet_ms))
            .with_live(self.live)
    }
}

/// Session storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    Sqlite,
    Memory,
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackendKind,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub quota_bytes: Option<usize>,
    #[serde(default = "default_true")]
    pub write_legacy_keys: bool,
}

fn default_namespace() -> String {
    "sketchpad".to_string()
}

fn default_database() -> String {
    "sketchpad.db".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            namespace: default_namespace(),
            database: default_database(),
            quota_bytes: None,
            write_legacy_keys: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_mapping() {
        let settings = SandboxSettings {
            timeout_ms: 250,
            loop_iteration_limit: Some(1000),
            ..SandboxSettings::default()
        };
        let config = settings.to_sandbox_config();
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.loop_iteration_limit, Some(1000));
        assert!(config.isolate_globals);
    }

    #[test]
    fn test_orchestrator_mapping() {
        let config = OrchestratorSettings::default().to_orchestrator_config();
        assert_eq!(config.edit_quiet_period, Duration::from_millis(1000));
        assert_eq!(config.live_quiet_period, Duration::from_millis(500));
        assert!(!config.live);
    }

    #[test]
    fn test_default_viewport() {
        let mut config = AppConfig::default();
        assert_eq!(config.default_viewport().unwrap(), ViewportSize::letter());

        config.viewport = "a4".to_string();
        assert_eq!(config.default_viewport().unwrap().label, "A4");

        config.viewport = "huge".to_string();
        assert!(config.default_viewport().is_err());
    }

    #[test]
    fn test_explicit_data_dir() {
        let config = AppConfig {
            data_dir: Some("/tmp/sketchpad-data".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/sketchpad-data"));
    }
}
