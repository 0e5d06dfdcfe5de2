//! `sketchpad watch`
//!
//! The script file plays the editor: polling it turns saves into edit
//! events, and fault annotations are printed against its lines. The preview
//! is an SVG file rewritten after every successful render.

use anyhow::{bail, Context, Result};
use sketchpad_canvas::{preview_document, ViewportSize};
use sketchpad_core::{EditorSurface, PreviewSink, RenderEvent, RenderOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::runtime;
use crate::settings::AppConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Script file acting as the editing surface
struct FileEditor {
    path: PathBuf,
    /// A fault annotation is on screen
    annotated: AtomicBool,
}

impl FileEditor {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            annotated: AtomicBool::new(false),
        }
    }
}

impl EditorSurface for FileEditor {
    fn value(&self) -> String {
        std::fs::read_to_string(&self.path).unwrap_or_default()
    }

    fn set_value(&self, text: &str) {
        if self.value() == text {
            return;
        }
        if let Err(e) = std::fs::write(&self.path, text) {
            warn!(path = %self.path.display(), error = %e, "Failed to write script");
        }
    }

    fn annotate_fault(&self, line: u32, message: &str) {
        let text = self.value();
        let source = text.lines().nth(line.saturating_sub(1) as usize).unwrap_or("");
        eprintln!("   {}:{line}: {message}", self.path.display());
        eprintln!("   {line:>4} | {source}");
        self.annotated.store(true, Ordering::Relaxed);
    }

    fn clear_annotations(&self) {
        if self.annotated.swap(false, Ordering::Relaxed) {
            eprintln!("   {}: fault cleared", self.path.display());
        }
    }
}

/// SVG file rewritten with every new drawing
struct SvgFilePreview {
    path: PathBuf,
}

impl PreviewSink for SvgFilePreview {
    fn show(&self, markup: &str, viewport: &ViewportSize) {
        if let Err(e) = std::fs::write(&self.path, preview_document(markup, viewport)) {
            warn!(path = %self.path.display(), error = %e, "Failed to write preview");
        }
    }
}

pub async fn run(
    config: &AppConfig,
    script_path: &Path,
    size: Option<&str>,
    live: bool,
    preview: Option<PathBuf>,
) -> Result<()> {
    if script_path.extension().is_some_and(|ext| ext == "json") {
        bail!("watch takes a script file; use 'sketchpad load' for exchange files");
    }
    let mut project = runtime::read_project(script_path, config).await?;
    project.viewport = runtime::resolve_viewport(size, config)?;

    let gateway = runtime::open_gateway(config).await;
    let store = runtime::session_store(project.clone(), gateway, config);
    let preview_path = preview.unwrap_or_else(|| PathBuf::from(format!("{}.preview.svg", project.slug())));

    let orchestrator = RenderOrchestrator::new(
        Arc::new(runtime::build_sandbox(config)),
        store,
        Arc::new(FileEditor::new(script_path.to_path_buf())),
        Arc::new(SvgFilePreview {
            path: preview_path.clone(),
        }),
        config
            .orchestrator
            .to_orchestrator_config()
            .with_live(live || config.orchestrator.live),
    );

    let shutdown = CancellationToken::new();
    let reporter = tokio::spawn(report_events(orchestrator.subscribe(), shutdown.clone()));

    let mut last_seen = project.script.clone();
    orchestrator.load_project(project).await?;
    println!(
        "👀 Watching {} (preview: {}). Press Ctrl+C to stop.",
        script_path.display(),
        preview_path.display()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match tokio::fs::read_to_string(script_path).await {
                    Ok(text) if text != last_seen => {
                        last_seen.clone_from(&text);
                        orchestrator.on_edit(text).await;
                    }
                    Ok(_) => {}
                    Err(e) => debug!(error = %e, "Script not readable right now"),
                }
            }
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl+C")?;
                info!("Stopping watch");
                break;
            }
        }
    }

    orchestrator.shutdown().await;
    shutdown.cancel();
    let _ = reporter.await;

    let project = orchestrator.project().await;
    println!("💾 Last rendered script kept in session as '{}'", project.name);
    Ok(())
}

async fn report_events(mut events: broadcast::Receiver<RenderEvent>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(RenderEvent::Rendered { seq }) => println!("✅ #{seq} rendered"),
                Ok(RenderEvent::Faulted { seq, fault }) => println!("❌ #{seq} {fault}"),
                Ok(RenderEvent::Persisted { seq, durable: false }) => {
                    println!("⚠️  #{seq} not saved: session storage unavailable");
                }
                Ok(RenderEvent::Discarded { seq }) => debug!(seq, "Superseded render dropped"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Render events skipped"),
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.cancelled() => break,
        }
    }
}
