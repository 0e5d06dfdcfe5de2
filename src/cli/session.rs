//! `sketchpad save`, `load` and `export`: the session project and files

use anyhow::{bail, Context, Result};
use sketchpad_core::{store::EXPORT_EXTENSION, ProjectStore};
use sketchpad_sandbox::{ExecutionOutcome, ScriptExecutor};
use std::path::{Path, PathBuf};

use super::runtime;
use crate::settings::AppConfig;

pub async fn save(config: &AppConfig, file: &Path) -> Result<()> {
    let gateway = runtime::open_gateway(config).await;
    let Some(project) = ProjectStore::restore(&gateway).await else {
        bail!("No session project to save. Create one with 'sketchpad new' or 'sketchpad load'.");
    };

    ProjectStore::new(project).save_file(file).await?;
    println!("✅ Saved session project to {}", file.display());
    Ok(())
}

pub async fn load(config: &AppConfig, file: &Path) -> Result<()> {
    // A malformed file aborts here and the session stays as it was
    let project = ProjectStore::load_file(file)
        .await
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let gateway = runtime::open_gateway(config).await;
    let mut store = runtime::session_store(project.clone(), gateway, config);
    let durable = store.replace(project).await?;

    let project = store.project();
    println!(
        "✅ Loaded '{}' ({}, {} bytes of script)",
        project.name,
        project.viewport,
        project.script.len()
    );
    if !durable {
        println!("⚠️  Session storage unavailable; the project is not kept for next time");
    }
    Ok(())
}

pub async fn export(config: &AppConfig, out: Option<PathBuf>) -> Result<()> {
    let gateway = runtime::open_gateway(config).await;
    let project = runtime::session_project(&gateway, config).await?;

    let sandbox = runtime::build_sandbox(config);
    match sandbox.execute(&project.script, &project.viewport).await {
        ExecutionOutcome::Success { markup } => {
            let store = ProjectStore::new(project);
            let path = out.unwrap_or_else(|| store.artifact_path(Path::new("."), EXPORT_EXTENSION));
            ProjectStore::export_svg(&path, &markup, &store.project().viewport).await?;
            println!("✅ Exported {}", path.display());
            Ok(())
        }
        ExecutionOutcome::Failure { fault } => {
            runtime::report_fault(&project.script, &fault);
            bail!("Session project '{}' failed to render", project.name)
        }
    }
}
