//! Shared wiring for commands: storage, sandbox and session project

use anyhow::{Context, Result};
use sketchpad_canvas::ViewportSize;
use sketchpad_core::{
    KeyValueBackend, MemoryBackend, PersistenceGateway, Project, ProjectStore, SqliteBackend,
    DEFAULT_PROJECT_NAME,
};
use sketchpad_sandbox::{ExecutionFault, ScriptSandbox};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::settings::{AppConfig, StorageBackendKind};

/// Open the session store, falling back to memory if the database cannot be used
pub async fn open_gateway(config: &AppConfig) -> Arc<PersistenceGateway> {
    let backend: Arc<dyn KeyValueBackend> = match config.storage.backend {
        StorageBackendKind::Memory => memory_backend(config),
        StorageBackendKind::Sqlite => match open_sqlite(config).await {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                warn!(error = %e, "Session database unavailable, using in-memory storage");
                memory_backend(config)
            }
        },
    };

    debug!(backend = backend.name(), namespace = %config.storage.namespace, "Session storage ready");
    Arc::new(PersistenceGateway::new(backend).with_namespace(config.storage.namespace.clone()))
}

fn memory_backend(config: &AppConfig) -> Arc<dyn KeyValueBackend> {
    let backend = match config.storage.quota_bytes {
        Some(quota) => MemoryBackend::new().with_quota(quota),
        None => MemoryBackend::new(),
    };
    Arc::new(backend)
}

async fn open_sqlite(config: &AppConfig) -> Result<SqliteBackend> {
    let dir = config.data_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

    let backend = SqliteBackend::open(&dir.join(&config.storage.database)).await?;
    Ok(match config.storage.quota_bytes {
        Some(quota) => backend.with_quota(quota),
        None => backend,
    })
}

/// Sandbox configured from settings
pub fn build_sandbox(config: &AppConfig) -> ScriptSandbox {
    ScriptSandbox::new(config.sandbox.to_sandbox_config())
}

/// Store for `project`, persisting through `gateway`
pub fn session_store(
    project: Project,
    gateway: Arc<PersistenceGateway>,
    config: &AppConfig,
) -> ProjectStore {
    ProjectStore::new(project)
        .with_gateway(gateway)
        .with_legacy_keys(config.storage.write_legacy_keys)
}

/// The restored session project, or a blank one
pub async fn session_project(gateway: &PersistenceGateway, config: &AppConfig) -> Result<Project> {
    match ProjectStore::restore(gateway).await {
        Some(project) => Ok(project),
        None => Ok(ProjectStore::create(
            DEFAULT_PROJECT_NAME,
            config.default_viewport()?,
            "",
        )?),
    }
}

/// Viewport from a `--size` argument, or the configured default
pub fn resolve_viewport(size: Option<&str>, config: &AppConfig) -> Result<ViewportSize> {
    match size {
        Some(size) => {
            ViewportSize::from_label(size).with_context(|| format!("Invalid size '{size}'"))
        }
        None => config.default_viewport(),
    }
}

/// Project from a script file or an exchange file
pub async fn read_project(path: &Path, config: &AppConfig) -> Result<Project> {
    if path.extension().is_some_and(|ext| ext == "json") {
        return ProjectStore::load_file(path)
            .await
            .with_context(|| format!("Failed to load project {}", path.display()));
    }

    let script = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
    Ok(ProjectStore::create(name, config.default_viewport()?, script)?)
}

/// Print a fault with the offending script line
pub fn report_fault(script: &str, fault: &ExecutionFault) {
    eprintln!("❌ {fault}");
    if let Some(line) = fault.line {
        if let Some(text) = script.lines().nth(line.saturating_sub(1) as usize) {
            eprintln!("   {line:>4} | {text}");
        }
    }
}
