//! Engine - orchestration state shared by the runners
//!
//! The Engine owns the TEA state, the message channel and the context
//! background actions report through. Runners feed it messages and
//! subscribe to the `EngineEvent`s it derives from state changes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use lasval_client::ValidationService;
use lasval_core::prelude::*;
use lasval_core::SelectionId;

use crate::actions::ActionContext;
use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::message::Message;
use crate::notifications::NotificationId;
use crate::process;
use crate::state::AppState;
use crate::workflow::{Phase, Workflow};

/// Upper bound on how late a notification disappears
const MAX_NOTIFICATION_TICK: Duration = Duration::from_millis(250);

/// Lightweight snapshot of state for change detection.
///
/// Captured before message processing, compared after to detect
/// what changed and emit the matching EngineEvents.
#[derive(Debug, Clone)]
struct StateSnapshot {
    phase: Phase,
    selection: Option<SelectionId>,
    has_preview: bool,
    percent: Option<u8>,
    last_notification: NotificationId,
    exported: usize,
    export_failures: usize,
}

impl StateSnapshot {
    fn capture(state: &AppState) -> Self {
        Self {
            phase: state.phase(),
            selection: state.current_selection_id(),
            has_preview: state.preview().is_some(),
            percent: state.progress().map(|p| p.percent()),
            last_notification: state.notifications.last_id(),
            exported: state.exported.len(),
            export_failures: state.export_failures,
        }
    }
}

/// Orchestration engine for the validation workflow.
pub struct Engine<S> {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the unified message channel.
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    pub msg_rx: mpsc::Receiver<Message>,

    pub settings: Settings,

    ctx: ActionContext<S>,

    event_tx: broadcast::Sender<EngineEvent>,

    notification_task: JoinHandle<()>,
}

impl<S> Engine<S>
where
    S: ValidationService + Sync + 'static,
{
    /// Create an engine around `service` with the given settings.
    pub fn new(settings: Settings, service: S) -> Self {
        let state = AppState::with_settings(settings.clone());
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);
        let (event_tx, _) = broadcast::channel(256);

        let ctx = ActionContext {
            msg_tx: msg_tx.clone(),
            service: Arc::new(service),
            progress_interval: Duration::from_millis(settings.progress.interval_ms.max(1)),
            progress_task: Arc::new(Mutex::new(None)),
        };
        let notification_task = spawn_notification_ticker(
            msg_tx.clone(),
            notification_tick(settings.notifications.timeout_ms),
        );

        Self {
            state,
            msg_tx,
            msg_rx,
            settings,
            ctx,
            event_tx,
            notification_task,
        }
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Process a single message through the TEA update cycle and emit
    /// events for whatever changed.
    pub fn process_message(&mut self, msg: Message) {
        let pre = StateSnapshot::capture(&self.state);

        process::process_message(&mut self.state, msg, &self.ctx);

        let post = StateSnapshot::capture(&self.state);
        self.emit_events(&pre, &post);
    }

    /// Wait for the next message from a background task.
    pub async fn recv(&mut self) -> Option<Message> {
        self.msg_rx.recv().await
    }

    /// Stop background timers and tell subscribers we are done.
    pub fn shutdown(&mut self) {
        self.emit(EngineEvent::Shutdown);

        self.notification_task.abort();
        match self.ctx.progress_task.lock() {
            Ok(mut slot) => {
                if let Some(handle) = slot.take() {
                    handle.abort();
                }
            }
            Err(e) => warn!("Progress task lock poisoned: {}", e),
        }
        info!("Engine shut down");
    }

    fn emit_events(&self, pre: &StateSnapshot, post: &StateSnapshot) {
        if post.selection != pre.selection {
            if let (Some(selection), Some(file)) = (post.selection, self.state.current_file()) {
                self.emit(EngineEvent::FileAccepted {
                    selection,
                    name: file.name.clone(),
                    size_bytes: file.size_bytes,
                });
            }
        }

        if pre.phase != post.phase {
            self.emit(EngineEvent::PhaseChanged {
                old_phase: pre.phase,
                new_phase: post.phase,
            });
        }

        let preview_arrived =
            post.has_preview && (!pre.has_preview || pre.selection != post.selection);
        if preview_arrived {
            if let (Some(selection), Some(preview)) = (post.selection, self.state.preview()) {
                self.emit(EngineEvent::PreviewReady {
                    selection,
                    shown_lines: preview.lines.len(),
                    total_lines: preview.total_lines,
                    section_lines: preview.section_count(),
                    available: preview.is_available(),
                });
            }
        }

        if let Some(percent) = post.percent {
            if pre.percent != Some(percent) {
                self.emit(EngineEvent::ProgressChanged { percent });
            }
        }

        if pre.phase != post.phase {
            match &self.state.workflow {
                Workflow::ResultsShown {
                    result, rendered, ..
                } => self.emit(EngineEvent::ResultsRevealed {
                    result: result.clone(),
                    html: rendered.to_html(),
                }),
                Workflow::Error { failure, .. } => self.emit(EngineEvent::SubmissionFailed {
                    kind: failure.kind,
                    message: failure.message.clone(),
                }),
                _ => {}
            }
        }

        for notification in self.state.notifications.since(pre.last_notification) {
            self.emit(EngineEvent::Notification {
                kind: notification.kind,
                message: notification.message.clone(),
            });
        }

        for path in self.state.exported.iter().skip(pre.exported) {
            self.emit(EngineEvent::ExportSaved { path: path.clone() });
        }
        for _ in pre.export_failures..post.export_failures {
            self.emit(EngineEvent::ExportFailed);
        }
    }

    /// send() only fails without receivers, which is fine.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Half the display timeout, so expiry lags by at most that much
fn notification_tick(timeout_ms: u64) -> Duration {
    Duration::from_millis(timeout_ms / 2)
        .clamp(Duration::from_millis(1), MAX_NOTIFICATION_TICK)
}

/// Feed `Message::Tick` until the engine's receiver goes away
fn spawn_notification_ticker(msg_tx: mpsc::Sender<Message>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if msg_tx.send(Message::Tick).await.is_err() {
                break;
            }
        }
    })
}
