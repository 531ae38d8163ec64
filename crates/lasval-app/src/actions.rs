//! Action handlers: UpdateAction dispatch and background task spawning

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use lasval_client::ValidationService;
use lasval_core::prelude::*;
use lasval_core::{SelectedFile, SelectionId};

use crate::export::ExportArtifact;
use crate::message::{Message, SubmitFailure};
use crate::preview::{self, Preview};
use crate::UpdateAction;

/// Handle of the running progress ticker, if any
pub type ProgressTask = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Everything background tasks need to report back
pub struct ActionContext<S> {
    pub msg_tx: mpsc::Sender<Message>,
    pub service: Arc<S>,
    pub progress_interval: Duration,
    pub progress_task: ProgressTask,
}

impl<S> Clone for ActionContext<S> {
    fn clone(&self) -> Self {
        Self {
            msg_tx: self.msg_tx.clone(),
            service: self.service.clone(),
            progress_interval: self.progress_interval,
            progress_task: self.progress_task.clone(),
        }
    }
}

/// Execute an action by spawning a background task
pub fn handle_action<S>(action: UpdateAction, ctx: &ActionContext<S>)
where
    S: ValidationService + Sync + 'static,
{
    match action {
        UpdateAction::DecodePreview {
            selection,
            file,
            line_limit,
        } => {
            spawn_preview_decode(ctx.msg_tx.clone(), selection, file, line_limit);
        }

        UpdateAction::SubmitValidation { selection, file } => {
            start_progress_ticker(ctx);
            spawn_validation(ctx.msg_tx.clone(), ctx.service.clone(), selection, file);
        }

        UpdateAction::FinishProgress { reveal_after } => {
            stop_progress_ticker(&ctx.progress_task);
            if let Some(delay) = reveal_after {
                let msg_tx = ctx.msg_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = msg_tx.send(Message::RevealResults).await;
                });
            }
        }

        UpdateAction::WriteExport {
            artifact,
            directory,
        } => {
            spawn_export_write(ctx.msg_tx.clone(), artifact, directory);
        }
    }
}

fn spawn_preview_decode(
    msg_tx: mpsc::Sender<Message>,
    selection: SelectionId,
    file: SelectedFile,
    line_limit: usize,
) {
    tokio::spawn(async move {
        let preview = match tokio::task::spawn_blocking(move || {
            preview::render(&file.raw_bytes, line_limit)
        })
        .await
        {
            Ok(preview) => preview,
            Err(e) => {
                warn!("Preview task failed: {}", e);
                Preview::unavailable(&e.to_string())
            }
        };

        let _ = msg_tx
            .send(Message::PreviewDecoded { selection, preview })
            .await;
    });
}

fn spawn_validation<S>(
    msg_tx: mpsc::Sender<Message>,
    service: Arc<S>,
    selection: SelectionId,
    file: SelectedFile,
) where
    S: ValidationService + Sync + 'static,
{
    tokio::spawn(async move {
        let msg = match service.validate(file).await {
            Ok(result) => Message::ValidationCompleted {
                selection,
                result: Arc::new(result),
            },
            Err(e) => Message::ValidationFailed {
                selection,
                failure: SubmitFailure::from_error(&e),
            },
        };

        if msg_tx.send(msg).await.is_err() {
            warn!("Validation outcome for {} dropped: engine gone", selection);
        }
    });
}

fn start_progress_ticker<S>(ctx: &ActionContext<S>) {
    let msg_tx = ctx.msg_tx.clone();
    let period = ctx.progress_interval;

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            if msg_tx.send(Message::ProgressTick).await.is_err() {
                break;
            }
        }
    });

    match ctx.progress_task.lock() {
        Ok(mut slot) => {
            if let Some(previous) = slot.replace(handle) {
                previous.abort();
            }
        }
        Err(e) => {
            warn!("Progress task lock poisoned: {}", e);
            handle.abort();
        }
    }
}

fn stop_progress_ticker(progress_task: &ProgressTask) {
    match progress_task.lock() {
        Ok(mut slot) => {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
        Err(e) => warn!("Progress task lock poisoned: {}", e),
    }
}

fn spawn_export_write(msg_tx: mpsc::Sender<Message>, artifact: ExportArtifact, directory: PathBuf) {
    tokio::spawn(async move {
        let msg = match write_artifact(&artifact, &directory).await {
            Ok(path) => Message::ExportSaved { path },
            Err(e) => {
                error!("Failed to write {}: {}", artifact.file_name, e);
                Message::ExportFailed {
                    error: e.to_string(),
                }
            }
        };
        let _ = msg_tx.send(msg).await;
    });
}

async fn write_artifact(artifact: &ExportArtifact, directory: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(directory).await?;
    let path = directory.join(&artifact.file_name);
    tokio::fs::write(&path, artifact.body.as_bytes()).await?;
    Ok(path)
}
