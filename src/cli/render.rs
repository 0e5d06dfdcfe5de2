//! `sketchpad render`

use anyhow::{bail, Result};
use sketchpad_core::{store::EXPORT_EXTENSION, ProjectStore};
use sketchpad_sandbox::{ExecutionOutcome, ScriptExecutor};
use std::path::{Path, PathBuf};
use tracing::info;

use super::runtime;
use crate::settings::AppConfig;

pub async fn run(
    config: &AppConfig,
    file: &Path,
    size: Option<&str>,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut project = runtime::read_project(file, config).await?;
    if size.is_some() {
        project.viewport = runtime::resolve_viewport(size, config)?;
    }

    let sandbox = runtime::build_sandbox(config);
    info!(name = %project.name, viewport = %project.viewport.label, "Rendering");

    match sandbox.execute(&project.script, &project.viewport).await {
        ExecutionOutcome::Success { markup } => {
            let store = ProjectStore::new(project);
            let path = out.unwrap_or_else(|| store.artifact_path(Path::new("."), EXPORT_EXTENSION));
            ProjectStore::export_svg(&path, &markup, &store.project().viewport).await?;
            println!("✅ Wrote {}", path.display());
            Ok(())
        }
        ExecutionOutcome::Failure { fault } => {
            runtime::report_fault(&project.script, &fault);
            bail!("{} failed to render", file.display())
        }
    }
}
