//! Script sandbox built on boa_engine.
//!
//! Every call runs the artist's script in a brand-new engine context against
//! a brand-new surface. The script is compiled into a callable whose only
//! parameter is the `draw` capability object. Capability limiting is
//! cooperative: it keeps honest scripts away from ambient state, it is not a
//! security boundary.
//!
//! The engine is synchronous, so the script runs on its own detached thread
//! while the caller races the result channel against the deadline. A script
//! that never yields cannot be halted; on timeout the caller is released and
//! the engine thread is left to finish on its own. The thread is not owned by
//! the tokio runtime, so runtime shutdown never waits for it.

use async_trait::async_trait;
use boa_engine::{Context, Script, Source};
use serde::Deserialize;
use sketchpad_canvas::{Element, Surface, SurfaceBinding, SurfaceFactory, ViewportSize};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, error, instrument, warn};

use crate::classify::{classify, PhaseHint, RawFailure};
use crate::config::SandboxConfig;
use crate::fault::{ExecutionFault, ExecutionOutcome, FaultKind};
use crate::prelude;

/// Anything that can turn a script and a viewport into an outcome
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Execute `script` against a fresh surface sized to `viewport`
    async fn execute(&self, script: &str, viewport: &ViewportSize) -> ExecutionOutcome;
}

/// What the script reported back through `collect()`
#[derive(Debug, Deserialize)]
struct ScriptReport {
    settled: bool,
    error: Option<RawFailure>,
    calls: u64,
    elements: Vec<Element>,
    logs: Vec<String>,
}

/// Result of running one script on the engine thread
#[derive(Debug)]
enum ScriptRun {
    Completed {
        elements: Vec<Element>,
        logs: Vec<String>,
    },
    Failed {
        failure: RawFailure,
        hint: PhaseHint,
        logs: Vec<String>,
    },
    /// The script's promise never settled and no work is left to run
    Pending { logs: Vec<String> },
    /// The sandbox itself could not run or read back the script
    HostFailure(String),
}

/// JavaScript sandbox producing SVG markup
#[derive(Debug, Clone, Default)]
pub struct ScriptSandbox {
    config: SandboxConfig,
    factory: SurfaceFactory,
}

impl ScriptSandbox {
    /// Create a sandbox with its own surface factory
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            config,
            factory: SurfaceFactory::new(),
        }
    }

    /// Use a shared surface factory
    #[must_use]
    pub fn with_factory(mut self, factory: SurfaceFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Sandbox configuration
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Surface factory used for executions
    #[must_use]
    pub fn factory(&self) -> &SurfaceFactory {
        &self.factory
    }

    /// Run a trivial script end to end
    pub async fn health_check(&self) -> bool {
        let outcome = self
            .execute(
                "draw.circle(0.5, 0.5, 0.25);",
                &ViewportSize::new(1.0, 1.0, "1x1"),
            )
            .await;
        outcome
            .markup()
            .is_some_and(|markup| markup.contains("<circle"))
    }

    async fn run_on(&self, surface: &mut Surface, script: &str) -> ExecutionOutcome {
        let deadline = Instant::now() + self.config.timeout;
        let binding = surface.binding();
        let config = self.config.clone();
        let source = script.to_owned();

        let (tx, rx) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("sketchpad-script".to_string())
            .spawn(move || {
                let _ = tx.send(run_script(&source, &binding, &config));
            });
        if let Err(err) = spawned {
            error!(error = %err, "Failed to start script engine thread");
            return ExecutionOutcome::failure(ExecutionFault::new(
                FaultKind::Execution,
                format!("failed to start script engine: {err}"),
            ));
        }

        let run = match tokio::time::timeout_at(deadline, rx).await {
            Ok(Ok(run)) => run,
            Ok(Err(_)) => {
                error!("Script engine thread exited without a result");
                return ExecutionOutcome::failure(ExecutionFault::new(
                    FaultKind::Execution,
                    "script engine failed",
                ));
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Script timed out; engine thread left to finish on its own"
                );
                return ExecutionOutcome::failure(ExecutionFault::timeout(
                    self.config.timeout.as_millis(),
                ));
            }
        };

        match run {
            ScriptRun::Completed { elements, logs } => {
                emit_logs(&logs);
                surface.draw_all(elements);
                ExecutionOutcome::Success {
                    markup: surface.serialize(),
                }
            }
            ScriptRun::Failed {
                failure,
                hint,
                logs,
            } => {
                emit_logs(&logs);
                let offset = if failure.is_wrapper_relative() {
                    prelude::WRAPPER_HEADER_LINES
                } else {
                    0
                };
                let fault = classify(&failure, hint).rebased(offset, line_count(script));
                debug!(kind = %fault.kind, line = ?fault.line, "Script failed");
                ExecutionOutcome::failure(fault)
            }
            ScriptRun::Pending { logs } => {
                emit_logs(&logs);
                // Nothing can settle the script any more; it runs out the clock.
                tokio::time::sleep_until(deadline).await;
                ExecutionOutcome::failure(ExecutionFault::timeout(
                    self.config.timeout.as_millis(),
                ))
            }
            ScriptRun::HostFailure(message) => {
                error!(%message, "Script host failure");
                ExecutionOutcome::failure(ExecutionFault::new(FaultKind::Execution, message))
            }
        }
    }
}

#[async_trait]
impl ScriptExecutor for ScriptSandbox {
    #[instrument(skip(self, script), fields(bytes = script.len(), viewport = %viewport.label))]
    async fn execute(&self, script: &str, viewport: &ViewportSize) -> ExecutionOutcome {
        if script.len() > self.config.max_script_bytes {
            return ExecutionOutcome::failure(ExecutionFault::new(
                FaultKind::Compile,
                format!(
                    "script is {} bytes, the limit is {}",
                    script.len(),
                    self.config.max_script_bytes
                ),
            ));
        }

        let mut surface = match self.factory.create(viewport) {
            Ok(surface) => surface,
            Err(err) => {
                return ExecutionOutcome::failure(ExecutionFault::new(
                    FaultKind::Execution,
                    err.to_string(),
                ))
            }
        };

        let outcome = self.run_on(&mut surface, script).await;
        surface.dispose();
        outcome
    }
}

fn run_script(script: &str, binding: &SurfaceBinding, config: &SandboxConfig) -> ScriptRun {
    let mut context = Context::default();
    if let Some(limit) = config.loop_iteration_limit {
        context.runtime_limits_mut().set_loop_iteration_limit(limit);
    }

    let setup = prelude::setup_source(binding, config.capture_console, config.isolate_globals);
    if let Err(err) = context.eval(Source::from_bytes(setup.as_str())) {
        return ScriptRun::HostFailure(format!("failed to install drawing capability: {err}"));
    }

    let wrapped = prelude::wrap_script(script);
    let compiled = match Script::parse(Source::from_bytes(wrapped.as_str()), None, &mut context) {
        Ok(compiled) => compiled,
        Err(err) => {
            return ScriptRun::Failed {
                failure: RawFailure::from_parse_error(&err.to_string()),
                hint: PhaseHint::Compile,
                logs: Vec::new(),
            }
        }
    };

    let evaluated = compiled.evaluate(&mut context).map(|_| ());
    let _ = context.run_jobs();

    let report = match collect_report(&mut context) {
        Ok(report) => report,
        Err(message) => return ScriptRun::HostFailure(message),
    };

    let hint = if report.calls == 0 {
        PhaseHint::Compile
    } else {
        PhaseHint::Execution
    };

    if let Err(err) = evaluated {
        return ScriptRun::Failed {
            failure: RawFailure::from_display(&err.to_string()),
            hint,
            logs: report.logs,
        };
    }

    match report.error {
        Some(failure) => ScriptRun::Failed {
            failure,
            hint,
            logs: report.logs,
        },
        None if !report.settled => ScriptRun::Pending { logs: report.logs },
        None => ScriptRun::Completed {
            elements: report.elements,
            logs: report.logs,
        },
    }
}

fn collect_report(context: &mut Context) -> Result<ScriptReport, String> {
    let value = context
        .eval(Source::from_bytes(prelude::COLLECT_SOURCE))
        .map_err(|e| format!("failed to read back drawing: {e}"))?;

    let json = value
        .as_string()
        .map(|s| s.to_std_string_escaped())
        .ok_or_else(|| "drawing report was not a string".to_string())?;

    serde_json::from_str(&json).map_err(|e| format!("failed to decode drawing: {e}"))
}

fn emit_logs(logs: &[String]) {
    for line in logs {
        debug!(target: "sketchpad::script", "{line}");
    }
}

fn line_count(script: &str) -> u32 {
    u32::try_from(script.lines().count()).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests;
