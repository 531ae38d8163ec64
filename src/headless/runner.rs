//! Headless validation runner
//!
//! Drives one file through selection → preview → submission → results and
//! optional exports, with no interactive front end. Engine events are
//! translated to [`HeadlessEvent`]s as they are broadcast.

use std::path::{Path, PathBuf};

use tokio::sync::broadcast;

use lasval_app::{AppState, Engine, EngineEvent, Message, Phase, Settings};
use lasval_client::{ValidationClient, ValidationService};
use lasval_core::prelude::*;
use lasval_core::{ExportFormat, SelectedFile};

use super::HeadlessEvent;

/// What `lasval validate` was asked to do
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub file: PathBuf,
    /// One artifact per entry, in order
    pub exports: Vec<ExportFormat>,
    /// Write the rendered results page here
    pub html: Option<PathBuf>,
}

/// How the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid,
    /// Rejected, undecodable or failed submission
    Failed,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Valid => 0,
            Outcome::Invalid => 2,
            Outcome::Failed => 1,
        }
    }
}

/// Validate `options.file` against the configured service, printing NDJSON
pub async fn run_validate(settings: Settings, options: &ValidateOptions) -> Result<Outcome> {
    info!("═══════════════════════════════════════════════════════");
    info!("LAS validator starting in HEADLESS mode");
    info!("File: {}", options.file.display());
    info!("Server: {}", settings.server.base_url);
    info!("═══════════════════════════════════════════════════════");

    let client = ValidationClient::new(&settings.server.base_url)?;
    let outcome = run_with_service(settings, client, options, |event| event.emit()).await?;

    info!("Headless run finished: {:?}", outcome);
    Ok(outcome)
}

/// Same as [`run_validate`] with any service and event sink
pub async fn run_with_service<S, F>(
    settings: Settings,
    service: S,
    options: &ValidateOptions,
    mut sink: F,
) -> Result<Outcome>
where
    S: ValidationService + Sync + 'static,
    F: FnMut(HeadlessEvent),
{
    let file = SelectedFile::from_path(&options.file)
        .with_context(|| format!("Failed to read {}", options.file.display()))?;
    let mut engine = Engine::new(settings, service);
    let mut events = engine.subscribe();

    let outcome = drive(&mut engine, &mut events, &mut sink, file, options).await;

    engine.shutdown();
    forward(&mut events, &mut sink);

    if let Err(e) = &outcome {
        sink(HeadlessEvent::error(e.to_string(), e.is_fatal()));
    }
    outcome
}

async fn drive<S, F>(
    engine: &mut Engine<S>,
    events: &mut broadcast::Receiver<EngineEvent>,
    sink: &mut F,
    file: SelectedFile,
    options: &ValidateOptions,
) -> Result<Outcome>
where
    S: ValidationService + Sync + 'static,
    F: FnMut(HeadlessEvent),
{
    engine.process_message(Message::ControlSelected(file));
    forward(events, sink);

    if engine.state.phase() == Phase::Idle {
        let reason = engine
            .state
            .notifications
            .latest()
            .map(|n| n.message.clone())
            .unwrap_or_else(|| "File rejected".to_string());
        warn!("File rejected: {}", reason);
        sink(HeadlessEvent::file_rejected(reason));
        return Ok(Outcome::Failed);
    }

    run_until(engine, events, sink, |phase| phase != Phase::Previewing).await?;

    engine.process_message(Message::SubmitRequested);
    forward(events, sink);
    run_until(engine, events, sink, |phase| {
        matches!(phase, Phase::ResultsShown | Phase::Error)
    })
    .await?;

    let Some(result) = engine.state.current_result().cloned() else {
        return Ok(Outcome::Failed);
    };

    if let Some(path) = &options.html {
        if let Some(rendered) = engine.state.rendered_results() {
            let name = engine
                .state
                .current_file()
                .map(|f| f.name.clone())
                .unwrap_or_default();
            write_html(path, &rendered.to_document(&name)).await?;
        }
    }

    let expected = options.exports.len();
    if expected > 0 {
        let settled = engine.state.exported.len() + engine.state.export_failures;
        for format in &options.exports {
            engine.process_message(Message::ExportRequested(*format));
        }
        forward(events, sink);
        run_until_state(engine, events, sink, |state| {
            state.exported.len() + state.export_failures >= settled + expected
        })
        .await?;
    }

    Ok(if result.valid {
        Outcome::Valid
    } else {
        Outcome::Invalid
    })
}

/// Process background messages until `done` holds for the phase
async fn run_until<S, F>(
    engine: &mut Engine<S>,
    events: &mut broadcast::Receiver<EngineEvent>,
    sink: &mut F,
    done: impl Fn(Phase) -> bool,
) -> Result<()>
where
    S: ValidationService + Sync + 'static,
    F: FnMut(HeadlessEvent),
{
    run_until_state(engine, events, sink, |state| done(state.phase())).await
}

async fn run_until_state<S, F>(
    engine: &mut Engine<S>,
    events: &mut broadcast::Receiver<EngineEvent>,
    sink: &mut F,
    done: impl Fn(&AppState) -> bool,
) -> Result<()>
where
    S: ValidationService + Sync + 'static,
    F: FnMut(HeadlessEvent),
{
    while !done(&engine.state) {
        let Some(msg) = engine.recv().await else {
            return Err(Error::ChannelClosed);
        };
        engine.process_message(msg);
        forward(events, sink);
    }
    Ok(())
}

/// Pass every pending engine event to the sink
fn forward<F>(events: &mut broadcast::Receiver<EngineEvent>, sink: &mut F)
where
    F: FnMut(HeadlessEvent),
{
    loop {
        match events.try_recv() {
            Ok(event) => {
                if let Some(headless) = HeadlessEvent::from_engine(&event) {
                    sink(headless);
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!("Headless output skipped {} engine events", skipped);
            }
            Err(_) => break,
        }
    }
}

async fn write_html(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, document).await?;
    info!("Wrote results page to {}", path.display());
    Ok(())
}
