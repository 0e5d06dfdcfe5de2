//! Debounce, issue and completion of executions

use sketchpad_canvas::ViewportSize;
use sketchpad_sandbox::ExecutionOutcome;
use std::sync::Arc;
use tracing::{debug, info};

use super::render::{Inner, Machine};
use super::types::RenderState;
use crate::event_bus::{RenderEvent, Trigger};

impl Inner {
    /// Restart the debounce timer for the latest edit
    pub(super) fn schedule(self: &Arc<Self>, machine: &mut Machine, trigger: Trigger) {
        machine.cancel_timer();
        machine.dirty = true;

        let generation = machine.debounce_generation;
        let quiet = self.config.quiet_period(machine.live);
        let inner = Arc::clone(self);
        machine.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            inner.fire(generation, trigger).await;
        }));
    }

    async fn fire(self: &Arc<Self>, generation: u64, trigger: Trigger) {
        let mut machine = self.machine.lock().await;
        if machine.debounce_generation != generation || !machine.dirty {
            return;
        }
        machine.timer = None;
        self.issue(&mut machine, trigger);
    }

    /// Start an execution of the current script and viewport
    pub(super) fn issue(self: &Arc<Self>, machine: &mut Machine, trigger: Trigger) -> u64 {
        machine.dirty = false;
        machine.latest_seq += 1;
        let seq = machine.latest_seq;
        machine.state = RenderState::Executing { seq };

        let script = machine.script.clone();
        let viewport = machine.viewport.clone();
        debug!(seq, ?trigger, bytes = script.len(), "Execution issued");
        self.events
            .publish(RenderEvent::ExecutionStarted { seq, trigger });

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = inner.executor.execute(&script, &viewport).await;
            inner.complete(seq, &script, &viewport, outcome).await;
        });
        seq
    }

    async fn complete(
        &self,
        seq: u64,
        script: &str,
        viewport: &ViewportSize,
        outcome: ExecutionOutcome,
    ) {
        let mut machine = self.machine.lock().await;
        if seq != machine.latest_seq {
            debug!(
                seq,
                latest = machine.latest_seq,
                "Discarding result of superseded execution"
            );
            self.events.publish(RenderEvent::Discarded { seq });
            return;
        }

        match outcome {
            ExecutionOutcome::Success { markup } => {
                self.preview.show(&markup, viewport);
                self.editor.clear_annotations();
                machine.markup = Some(markup);
                machine.fault = None;
                machine.state = RenderState::Rendered { seq };
                info!(seq, "Rendered");
                self.events.publish(RenderEvent::Rendered { seq });
                drop(machine);

                let mut store = self.store.lock().await;
                let latest = self.machine.lock().await.latest_seq;
                if seq != latest {
                    debug!(seq, latest, "Superseded before commit, not persisting");
                    return;
                }
                let durable = store.commit(script, viewport).await;
                drop(store);
                self.events
                    .publish(RenderEvent::Persisted { seq, durable });
            }
            ExecutionOutcome::Failure { fault } => {
                self.editor.clear_annotations();
                if let Some(line) = fault.line {
                    self.editor.annotate_fault(line, &fault.message);
                }
                info!(seq, kind = %fault.kind, line = ?fault.line, message = %fault.message, "Script fault");
                machine.fault = Some(fault.clone());
                machine.state = RenderState::Faulted {
                    seq,
                    fault: fault.clone(),
                };
                self.events.publish(RenderEvent::Faulted { seq, fault });
            }
        }
    }
}
