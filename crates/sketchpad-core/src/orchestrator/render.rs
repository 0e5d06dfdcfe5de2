//! RenderOrchestrator struct and public operations

use sketchpad_canvas::ViewportSize;
use sketchpad_sandbox::{ExecutionFault, ScriptExecutor};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::config::OrchestratorConfig;
use super::types::{EditorSurface, PreviewSink, RenderState};
use crate::error::{Error, Result};
use crate::event_bus::{EventBus, RenderEvent, Trigger};
use crate::project::Project;
use crate::store::ProjectStore;

/// Mutable state guarded by one lock.
///
/// Lock order is store before machine. The machine lock is never held
/// across storage I/O.
#[derive(Debug)]
pub(super) struct Machine {
    pub(super) state: RenderState,
    pub(super) latest_seq: u64,
    pub(super) script: String,
    pub(super) viewport: ViewportSize,
    pub(super) live: bool,
    /// An edit arrived that no issued execution has seen yet
    pub(super) dirty: bool,
    pub(super) debounce_generation: u64,
    pub(super) timer: Option<JoinHandle<()>>,
    pub(super) markup: Option<String>,
    pub(super) fault: Option<ExecutionFault>,
}

impl Machine {
    pub(super) fn cancel_timer(&mut self) {
        self.debounce_generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

pub(super) struct Inner {
    pub(super) executor: Arc<dyn ScriptExecutor>,
    pub(super) editor: Arc<dyn EditorSurface>,
    pub(super) preview: Arc<dyn PreviewSink>,
    pub(super) store: Mutex<ProjectStore>,
    pub(super) machine: Mutex<Machine>,
    pub(super) config: OrchestratorConfig,
    pub(super) events: EventBus,
}

/// Drives script executions from edits and owns the current outcome.
///
/// Every issued execution gets a strictly increasing sequence number. Only
/// the result of the latest one is applied; anything older that resolves
/// later is discarded without side effects.
#[derive(Clone)]
pub struct RenderOrchestrator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RenderOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOrchestrator")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl RenderOrchestrator {
    /// Create an orchestrator for the project held by `store`
    #[must_use]
    pub fn new(
        executor: Arc<dyn ScriptExecutor>,
        store: ProjectStore,
        editor: Arc<dyn EditorSurface>,
        preview: Arc<dyn PreviewSink>,
        config: OrchestratorConfig,
    ) -> Self {
        let project = store.project();
        let machine = Machine {
            state: RenderState::Idle,
            latest_seq: 0,
            script: project.script,
            viewport: project.viewport,
            live: config.live,
            dirty: false,
            debounce_generation: 0,
            timer: None,
            markup: None,
            fault: None,
        };

        Self {
            inner: Arc::new(Inner {
                executor,
                editor,
                preview,
                store: Mutex::new(store),
                machine: Mutex::new(machine),
                events: EventBus::new(config.event_capacity),
                config,
            }),
        }
    }

    /// Subscribe to render events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.inner.events.subscribe()
    }

    /// Orchestrator configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    /// Current state
    pub async fn state(&self) -> RenderState {
        self.inner.machine.lock().await.state.clone()
    }

    /// Latest issued sequence number (0 before the first execution)
    pub async fn latest_seq(&self) -> u64 {
        self.inner.machine.lock().await.latest_seq
    }

    /// Markup currently on screen
    pub async fn preview_markup(&self) -> Option<String> {
        self.inner.machine.lock().await.markup.clone()
    }

    /// Fault currently shown, if any
    pub async fn current_fault(&self) -> Option<ExecutionFault> {
        self.inner.machine.lock().await.fault.clone()
    }

    /// Copy of the stored project
    pub async fn project(&self) -> Project {
        self.inner.store.lock().await.project()
    }

    /// Whether live mode is on
    pub async fn is_live(&self) -> bool {
        self.inner.machine.lock().await.live
    }

    /// Switch live mode; applies to the next edit
    pub async fn set_live(&self, live: bool) {
        let mut machine = self.inner.machine.lock().await;
        if machine.live != live {
            info!(live, "Live mode changed");
            machine.live = live;
        }
    }

    /// Record an edit; execution follows once the quiet period passes
    pub async fn on_edit(&self, script: impl Into<String>) {
        let mut machine = self.inner.machine.lock().await;
        machine.script = script.into();
        self.inner.schedule(&mut machine, Trigger::Edit);
    }

    /// Change the viewport and render against it right away
    pub async fn set_viewport(&self, viewport: ViewportSize) -> Result<u64> {
        viewport.validate()?;
        let mut machine = self.inner.machine.lock().await;
        debug!(viewport = %viewport.label, "Viewport changed");
        machine.viewport = viewport;
        machine.cancel_timer();
        Ok(self.inner.issue(&mut machine, Trigger::Viewport))
    }

    /// Execute the current script now, skipping the debounce
    pub async fn regenerate(&self) -> u64 {
        let mut machine = self.inner.machine.lock().await;
        machine.cancel_timer();
        self.inner.issue(&mut machine, Trigger::Regenerate)
    }

    /// Start a fresh project and render it
    pub async fn new_project(
        &self,
        name: impl Into<String>,
        viewport: ViewportSize,
        script: impl Into<String>,
    ) -> Result<u64> {
        let project = ProjectStore::create(name, viewport, script)?;
        self.load_project(project).await
    }

    /// Replace the current project, show its script and render it.
    ///
    /// An invalid project is rejected and leaves everything untouched.
    /// The store stays locked until the load's own execution is issued, so
    /// an older execution finishing meanwhile cannot commit into it.
    pub async fn load_project(&self, project: Project) -> Result<u64> {
        if !project.is_valid() {
            return Err(Error::validation("project violates its invariants"));
        }

        let mut store = self.inner.store.lock().await;
        store.replace(project.clone()).await?;
        self.inner.editor.set_value(&project.script);
        info!(name = %project.name, "Project loaded");

        let mut machine = self.inner.machine.lock().await;
        machine.script = project.script;
        machine.viewport = project.viewport;
        machine.cancel_timer();
        Ok(self.inner.issue(&mut machine, Trigger::Load))
    }

    /// Cancel any pending debounce timer
    pub async fn shutdown(&self) {
        let mut machine = self.inner.machine.lock().await;
        machine.cancel_timer();
        machine.dirty = false;
    }
}
