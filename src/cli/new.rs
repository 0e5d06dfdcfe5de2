//! `sketchpad new`

use anyhow::{Context, Result};
use sketchpad_core::{ProjectStore, store::PROJECT_EXTENSION};
use std::path::{Path, PathBuf};

use super::runtime;
use crate::settings::AppConfig;

pub async fn run(
    config: &AppConfig,
    name: &str,
    size: Option<&str>,
    script: Option<&Path>,
    out: Option<PathBuf>,
) -> Result<()> {
    let viewport = runtime::resolve_viewport(size, config)?;
    let script = match script {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => String::new(),
    };
    let project = ProjectStore::create(name, viewport, script)?;

    let gateway = runtime::open_gateway(config).await;
    let mut store = runtime::session_store(project.clone(), gateway, config);
    let durable = store.replace(project).await?;

    let path = out.unwrap_or_else(|| store.artifact_path(Path::new("."), PROJECT_EXTENSION));
    store.save_file(&path).await?;

    println!("✅ Created '{}' at {}", name, path.display());
    if !durable {
        println!("⚠️  Session storage unavailable; the project was not saved to the session");
    }
    Ok(())
}
