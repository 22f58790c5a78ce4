//! Generation pipeline driver.
//!
//! A single actor task owns the [`PipelineState`]. Callers hold a
//! [`GenerationPipeline`] handle that sends commands over a channel and
//! observes the state through a watch channel (current value) and a
//! broadcast channel (every transition).
//!
//! Stage calls run as spawned tasks and report back tagged with the attempt
//! they belong to. A reset bumps the attempt counter, so a call that
//! resolves afterwards is discarded instead of cancelled. At most one stage
//! call is outstanding: a selection made while a discarded call is still
//! running enters `Analyzing` right away and starts its extraction once
//! that call resolves.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::error::{PipelineError, Result};
use crate::types::{ImageInput, MoodAnalysis, PlaylistResult};

use super::sources::{MoodSource, TrackSource};
use super::state::{transition, FailureReason, PipelineEvent, PipelineState};

/// Capacity of the command channel.
const COMMAND_CAPACITY: usize = 32;

/// Capacity of the transition broadcast channel.
const TRANSITION_CAPACITY: usize = 64;

/// Message sent to the pipeline actor.
#[derive(Debug)]
enum Command {
    /// Start a new attempt with this image.
    Select {
        image: ImageInput,
        reply: oneshot::Sender<Result<bool>>,
    },
    /// Return to Idle, discarding the current attempt.
    Reset { reply: oneshot::Sender<()> },
    /// Stop the actor.
    Shutdown,
}

/// Result of a stage call, tagged with its attempt.
#[derive(Debug)]
struct StageOutcome {
    attempt: u64,
    result: StageResult,
}

#[derive(Debug)]
enum StageResult {
    Analysis(Result<MoodAnalysis>),
    Selection(Result<PlaylistResult>),
}

/// Handle to a running pipeline session.
///
/// Cloning the handle shares the same session. The actor stops once every
/// handle is dropped or [`shutdown`](Self::shutdown) is called.
#[derive(Clone)]
pub struct GenerationPipeline {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<PipelineState>,
    transitions: broadcast::Sender<PipelineState>,
}

impl GenerationPipeline {
    /// Spawns the pipeline actor on the current tokio runtime.
    pub fn spawn(mood_source: Arc<dyn MoodSource>, track_source: Arc<dyn TrackSource>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(PipelineState::Idle);
        let (transition_tx, _) = broadcast::channel(TRANSITION_CAPACITY);

        let actor = PipelineActor {
            state: PipelineState::Idle,
            attempt: 0,
            in_flight: false,
            deferred_start: false,
            mood_source,
            track_source,
            outcome_tx,
            state_tx,
            transition_tx: transition_tx.clone(),
        };
        tokio::spawn(actor.run(command_rx, outcome_rx));

        Self {
            commands: command_tx,
            state: state_rx,
            transitions: transition_tx,
        }
    }

    /// Selects an image, starting a new attempt.
    ///
    /// Returns `Ok(true)` if the attempt started and `Ok(false)` if the
    /// selection was ignored because a playlist is ready (reset first).
    /// Fails with `PipelineBusy` while an attempt is in flight.
    pub async fn select_image(&self, image: ImageInput) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Select { image, reply }).await?;
        rx.await.map_err(|_| stopped())?
    }

    /// Returns to `Idle`. Idempotent.
    pub async fn reset(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset { reply }).await?;
        rx.await.map_err(|_| stopped())
    }

    /// Returns the current state.
    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    /// Returns a receiver that always holds the current state.
    pub fn watch(&self) -> watch::Receiver<PipelineState> {
        self.state.clone()
    }

    /// Subscribes to every state the pipeline enters from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineState> {
        self.transitions.subscribe()
    }

    /// Waits until no stage call belongs to the current state.
    pub async fn settled(&self) -> PipelineState {
        let mut rx = self.state.clone();
        let settled = match rx.wait_for(|state| !state.is_busy()).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| rx.borrow().clone())
    }

    /// Runs one attempt to completion and returns the settled state.
    ///
    /// Fails with `PipelineBusy` if the image was not accepted because an
    /// earlier playlist is still ready.
    pub async fn run(&self, image: ImageInput) -> Result<PipelineState> {
        if !self.select_image(image).await? {
            return Err(PipelineError::reset_required());
        }
        Ok(self.settled().await)
    }

    /// Stops the actor. Pending stage calls are left to finish unobserved.
    pub async fn shutdown(&self) {
        self.commands.send(Command::Shutdown).await.ok();
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).await.map_err(|_| stopped())
    }
}

fn stopped() -> PipelineError {
    PipelineError::service("Pipeline is not running")
}

/// Owns the state and performs every transition.
struct PipelineActor {
    state: PipelineState,
    attempt: u64,
    in_flight: bool,
    deferred_start: bool,
    mood_source: Arc<dyn MoodSource>,
    track_source: Arc<dyn TrackSource>,
    outcome_tx: mpsc::UnboundedSender<StageOutcome>,
    state_tx: watch::Sender<PipelineState>,
    transition_tx: broadcast::Sender<PipelineState>,
}

impl PipelineActor {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut outcomes: mpsc::UnboundedReceiver<StageOutcome>,
    ) {
        tracing::debug!("Pipeline actor started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Select { image, reply }) => {
                        reply.send(self.handle_select(image)).ok();
                    }
                    Some(Command::Reset { reply }) => {
                        self.handle_reset();
                        reply.send(()).ok();
                    }
                    Some(Command::Shutdown) | None => break,
                },
                Some(outcome) = outcomes.recv() => self.handle_outcome(outcome),
            }
        }

        tracing::debug!(attempt = self.attempt, "Pipeline actor stopped");
    }

    fn handle_select(&mut self, image: ImageInput) -> Result<bool> {
        if self.state.is_busy() {
            tracing::warn!(stage = %self.state.stage(), "Image selected while busy");
            return Err(PipelineError::busy());
        }
        if !self.state.accepts_image() {
            tracing::info!(stage = %self.state.stage(), "Image selection ignored, reset first");
            return Ok(false);
        }

        self.attempt += 1;
        tracing::info!(
            attempt = self.attempt,
            mime_type = image.mime_type(),
            bytes = image.bytes().len(),
            "Image selected"
        );
        self.apply(PipelineEvent::ImageSelected(image.clone()));

        if self.in_flight {
            tracing::debug!(attempt = self.attempt, "Waiting for a discarded call before analyzing");
            self.deferred_start = true;
        } else {
            self.start_analysis(image);
        }
        Ok(true)
    }

    fn handle_reset(&mut self) {
        self.attempt += 1;
        self.deferred_start = false;
        self.apply(PipelineEvent::Reset);
    }

    fn handle_outcome(&mut self, outcome: StageOutcome) {
        self.in_flight = false;

        if outcome.attempt != self.attempt {
            tracing::debug!(
                stale_attempt = outcome.attempt,
                attempt = self.attempt,
                "Discarding result of a reset attempt"
            );
            if self.deferred_start {
                self.deferred_start = false;
                if let PipelineState::Analyzing { image, .. } = &self.state {
                    let image = image.clone();
                    self.start_analysis(image);
                }
            }
            return;
        }

        match outcome.result {
            StageResult::Analysis(Ok(analysis)) => {
                self.apply(PipelineEvent::AnalysisSucceeded(analysis.clone()));
                self.start_selection(analysis);
            }
            StageResult::Analysis(Err(err)) => {
                tracing::warn!(attempt = outcome.attempt, error = %err, "Mood extraction failed");
                self.apply(PipelineEvent::AnalysisFailed(FailureReason::from(err)));
            }
            StageResult::Selection(Ok(playlist)) => {
                self.apply(PipelineEvent::SelectionSucceeded(playlist));
            }
            StageResult::Selection(Err(err)) => {
                tracing::warn!(attempt = outcome.attempt, error = %err, "Track selection failed");
                self.apply(PipelineEvent::SelectionFailed(FailureReason::from(err)));
            }
        }
    }

    fn start_analysis(&mut self, image: ImageInput) {
        self.in_flight = true;
        let attempt = self.attempt;
        let source = Arc::clone(&self.mood_source);
        let outcome_tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let result = source.analyze(&image).await;
            outcome_tx
                .send(StageOutcome {
                    attempt,
                    result: StageResult::Analysis(result),
                })
                .ok();
        });
    }

    fn start_selection(&mut self, analysis: MoodAnalysis) {
        self.in_flight = true;
        let attempt = self.attempt;
        let source = Arc::clone(&self.track_source);
        let outcome_tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let result = source.select(&analysis).await;
            outcome_tx
                .send(StageOutcome {
                    attempt,
                    result: StageResult::Selection(result),
                })
                .ok();
        });
    }

    fn apply(&mut self, event: PipelineEvent) {
        let from = self.state.stage();
        let event_name = event.name();
        let state = std::mem::take(&mut self.state);
        self.state = transition(state, event);

        tracing::info!(
            attempt = self.attempt,
            event = event_name,
            from = %from,
            to = %self.state.stage(),
            "Pipeline transition"
        );

        self.state_tx.send_replace(self.state.clone());
        self.transition_tx.send(self.state.clone()).ok();
    }
}
