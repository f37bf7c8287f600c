//! Capture-loop driver for the practice flow.
//!
//! Owns the fixed-period timer and the single-in-flight rule: a new frame is
//! only captured once the previous frame's inference call has resolved or
//! failed, so feedback can never arrive out of order. Attempt recording is
//! fire-and-forget and never blocks the loop.

use crate::error::Result;
use crate::inference::{InferenceRequest, InferenceResponse};
use crate::session::flow::{Advance, AttemptToRecord, Phase, PracticeFlow};

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Period of the capture timer.
const CAPTURE_TICK: Duration = Duration::from_millis(500);

/// Produces frames for inference. The webcam stand-in.
pub trait FrameSource: Send {
    /// Capture one frame as a base64 string. `None` skips this tick (camera
    /// not ready, dropped frame).
    fn capture(&mut self) -> Option<String>;
}

/// Scores a frame against a target sign.
pub trait Scorer: Send + Sync {
    fn score(
        &self,
        request: &InferenceRequest,
    ) -> impl Future<Output = Result<InferenceResponse>> + Send;
}

/// Records attempts. Failures are logged, never surfaced.
pub trait AttemptSink: Clone + Send + Sync + 'static {
    fn record(
        &self,
        session_id: String,
        attempt: AttemptToRecord,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// User actions forwarded from whatever renders the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerCommand {
    /// Start (or resume) the capture loop.
    Start,
    /// Pause the capture loop, keeping display state.
    Pause,
    /// Move to the next sign, or finish the session.
    Advance,
}

/// Drives a [`PracticeFlow`] until the session completes or is cancelled.
pub struct SessionRunner<F, S, A> {
    flow: PracticeFlow,
    frames: F,
    scorer: S,
    sink: A,
    tick: Duration,
    commands: mpsc::UnboundedReceiver<RunnerCommand>,
    stop: watch::Receiver<bool>,
}

impl<F, S, A> SessionRunner<F, S, A>
where
    F: FrameSource,
    S: Scorer,
    A: AttemptSink,
{
    pub fn new(
        flow: PracticeFlow,
        frames: F,
        scorer: S,
        sink: A,
        commands: mpsc::UnboundedReceiver<RunnerCommand>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            flow,
            frames,
            scorer,
            sink,
            tick: CAPTURE_TICK,
            commands,
            stop,
        }
    }

    /// Override the capture period (tests use a short one).
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Run until the session completes, the command channel closes, or the
    /// stop signal fires. Returns the final flow so callers can inspect it.
    pub async fn run(mut self) -> PracticeFlow {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if self.flow.phase() == Phase::Complete || *self.stop.borrow() {
                break;
            }

            tokio::select! {
                _ = self.stop.changed() => break,
                command = self.commands.recv() => {
                    match command {
                        Some(RunnerCommand::Start) => {
                            if let Err(error) = self.flow.start_capture() {
                                tracing::debug!(%error, "ignoring start");
                            }
                        }
                        Some(RunnerCommand::Pause) => {
                            if let Err(error) = self.flow.pause() {
                                tracing::debug!(%error, "ignoring pause");
                            }
                        }
                        Some(RunnerCommand::Advance) => {
                            match self.flow.advance() {
                                Ok(Advance::Complete) => break,
                                Ok(Advance::NextSign) => {}
                                Err(error) => tracing::debug!(%error, "ignoring advance"),
                            }
                        }
                        // Controller dropped: same as navigating away.
                        None => break,
                    }
                }
                _ = interval.tick(), if self.flow.phase() == Phase::Capturing => {
                    if self.process_frame().await.is_break() {
                        break;
                    }
                }
            }
        }

        self.flow
    }

    /// Capture one frame, run inference, apply the result. At most one
    /// inference call is ever in flight; a stop signal mid-call abandons the
    /// response instead of waiting for it.
    async fn process_frame(&mut self) -> ControlFlow<()> {
        let Some(sign) = self.flow.current_sign() else {
            return ControlFlow::Continue(());
        };
        let target_sign_id = sign.name.clone();

        let Some(image) = self.frames.capture() else {
            return ControlFlow::Continue(());
        };

        if self.flow.frame_sent().is_err() {
            return ControlFlow::Continue(());
        }

        let request = InferenceRequest {
            target_sign_id,
            features: None,
            image: Some(image),
        };

        let result = tokio::select! {
            result = self.scorer.score(&request) => result,
            _ = self.stop.changed() => return ControlFlow::Break(()),
        };

        match result {
            Ok(response) => {
                if let Ok(verdict) = self.flow.inference_resolved(&response) {
                    if let Some(attempt) = verdict.record {
                        self.record_attempt(attempt);
                    }
                }
            }
            Err(error) => {
                tracing::debug!(%error, "inference call failed");
                let _ = self.flow.inference_failed();
            }
        }

        ControlFlow::Continue(())
    }

    /// Fire-and-forget: a lost attempt must never interrupt practice.
    fn record_attempt(&self, attempt: AttemptToRecord) {
        let Some(session_id) = self.flow.session_id().map(String::from) else {
            return;
        };
        let sink = self.sink.clone();

        tokio::spawn(async move {
            if let Err(error) = sink.record(session_id, attempt).await {
                tracing::warn!(%error, "failed to record attempt");
            }
        });
    }
}
