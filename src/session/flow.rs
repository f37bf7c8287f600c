//! Pure state machine for a practice session.
//!
//! No I/O, no clocks, no rendering: callers feed in events (lesson loaded,
//! session started, frame captured, inference resolved) and read back the
//! phase and per-sign display state. The runner and any UI layer sit on top.
//!
//! Lifecycle:
//! `Idle → Loading → Ready ⇄ Capturing → Analyzing → Ready|Capturing → … → Complete`
//!
//! Loading covers two concurrent prerequisites, the lesson fetch and the
//! session creation, with no ordering between them; practice can start only
//! once both have landed.

use crate::inference::{InferenceResponse, Landmark};

/// Fixed step added to the per-sign progress bar on each correct frame.
const PROGRESS_STEP: u8 = 10;
/// Upper bound of the progress bar.
const PROGRESS_FULL: u8 = 100;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    /// Waiting for the lesson and/or the session to arrive.
    Loading,
    /// Prerequisites met, capture not running.
    Ready,
    /// Capture loop active, no frame in flight.
    Capturing,
    /// Exactly one inference call in flight.
    Analyzing,
    /// All signs practiced; the session is over.
    Complete,
}

/// Status line shown next to the webcam panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignStatus {
    Ready,
    Analyzing,
    /// Last frame matched the target sign.
    Correct,
    /// Last frame did not match; keep going.
    Listening,
    /// Last frame's inference call failed; next tick retries with a new frame.
    Error,
}

/// One sign the lesson asks the user to practice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSign {
    pub id: String,
    pub name: String,
}

/// Display state for the sign currently being practiced.
#[derive(Debug, Clone)]
pub struct SignView {
    /// Confidence of the last frame as a percentage.
    pub accuracy: f64,
    pub feedback: Vec<String>,
    pub landmarks: Vec<Landmark>,
    pub status: SignStatus,
    /// Bounded [0, 100] indicator, bumped on correct frames.
    pub progress: u8,
}

impl SignView {
    fn reset() -> Self {
        Self {
            accuracy: 0.0,
            feedback: Vec::new(),
            landmarks: Vec::new(),
            status: SignStatus::Ready,
            progress: 0,
        }
    }
}

/// An event arrived that the current phase cannot accept.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid transition: {0}")]
pub struct FlowError(pub &'static str);

/// What the caller should do after an inference result was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameVerdict {
    /// Attempt to record (fire-and-forget), present on correct frames.
    pub record: Option<AttemptToRecord>,
}

/// The data an attempt-recording call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptToRecord {
    pub sign_id: String,
    pub is_correct: bool,
    pub accuracy_score: f64,
    pub feedback: Vec<String>,
}

/// The result of asking the flow to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next sign; display state was reset.
    NextSign,
    /// No signs remain; the session is complete.
    Complete,
}

/// State machine for one practice session.
#[derive(Debug, Clone)]
pub struct PracticeFlow {
    phase: Phase,
    signs: Option<Vec<TargetSign>>,
    session_id: Option<String>,
    current: usize,
    view: SignView,
}

impl PracticeFlow {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            signs: None,
            session_id: None,
            current: 0,
            view: SignView::reset(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> &SignView {
        &self.view
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The sign currently being practiced.
    pub fn current_sign(&self) -> Option<&TargetSign> {
        self.signs.as_ref()?.get(self.current)
    }

    /// Enter the loading phase: the lesson fetch and the session creation
    /// have been issued concurrently.
    pub fn begin_loading(&mut self) -> Result<(), FlowError> {
        if self.phase != Phase::Idle {
            return Err(FlowError("loading can only start from idle"));
        }
        self.phase = Phase::Loading;
        Ok(())
    }

    /// The lesson arrived. May land before or after the session.
    pub fn lesson_loaded(&mut self, signs: Vec<TargetSign>) -> Result<(), FlowError> {
        if self.phase != Phase::Loading {
            return Err(FlowError("lesson arrived outside of loading"));
        }
        if signs.is_empty() {
            return Err(FlowError("lesson has no signs"));
        }
        self.signs = Some(signs);
        self.try_become_ready();
        Ok(())
    }

    /// The session was created. May land before or after the lesson.
    pub fn session_started(&mut self, session_id: String) -> Result<(), FlowError> {
        if self.phase != Phase::Loading {
            return Err(FlowError("session arrived outside of loading"));
        }
        self.session_id = Some(session_id);
        self.try_become_ready();
        Ok(())
    }

    fn try_become_ready(&mut self) {
        if self.signs.is_some() && self.session_id.is_some() {
            self.phase = Phase::Ready;
        }
    }

    /// User hit "start practice".
    pub fn start_capture(&mut self) -> Result<(), FlowError> {
        if self.phase != Phase::Ready {
            return Err(FlowError("capture can only start when ready"));
        }
        self.phase = Phase::Capturing;
        Ok(())
    }

    /// User paused; the capture timer stops but nothing is reset.
    pub fn pause(&mut self) -> Result<(), FlowError> {
        if self.phase != Phase::Capturing {
            return Err(FlowError("only an active capture can pause"));
        }
        self.phase = Phase::Ready;
        Ok(())
    }

    /// A frame was captured and its inference call issued. No further frame
    /// may be captured until the call resolves or fails.
    pub fn frame_sent(&mut self) -> Result<(), FlowError> {
        if self.phase != Phase::Capturing {
            return Err(FlowError("no capture in progress"));
        }
        self.phase = Phase::Analyzing;
        self.view.status = SignStatus::Analyzing;
        Ok(())
    }

    /// The in-flight inference call succeeded. Updates the display state and
    /// says whether an attempt should be recorded.
    pub fn inference_resolved(
        &mut self,
        response: &InferenceResponse,
    ) -> Result<FrameVerdict, FlowError> {
        if self.phase != Phase::Analyzing {
            return Err(FlowError("no inference in flight"));
        }

        self.view.accuracy = response.confidence * 100.0;
        self.view.feedback = response.feedback.clone();
        self.view.landmarks = response.landmarks.clone().unwrap_or_default();

        let record = if response.is_correct {
            self.view.status = SignStatus::Correct;
            self.view.progress = self
                .view
                .progress
                .saturating_add(PROGRESS_STEP)
                .min(PROGRESS_FULL);

            self.current_sign().map(|sign| AttemptToRecord {
                sign_id: sign.id.clone(),
                is_correct: true,
                accuracy_score: response.confidence,
                feedback: response.feedback.clone(),
            })
        } else {
            self.view.status = SignStatus::Listening;
            None
        };

        self.phase = Phase::Capturing;
        Ok(FrameVerdict { record })
    }

    /// The in-flight inference call failed. Terminal for this frame only;
    /// the capture loop resumes on the next tick with a fresh frame.
    pub fn inference_failed(&mut self) -> Result<(), FlowError> {
        if self.phase != Phase::Analyzing {
            return Err(FlowError("no inference in flight"));
        }
        self.view.status = SignStatus::Error;
        self.phase = Phase::Capturing;
        Ok(())
    }

    /// Explicit user action: move to the next sign, or complete the session
    /// when none remain. Display state resets either way.
    pub fn advance(&mut self) -> Result<Advance, FlowError> {
        match self.phase {
            Phase::Ready | Phase::Capturing => {}
            _ => return Err(FlowError("advance requires an active session")),
        }

        let total = self.signs.as_ref().map(Vec::len).unwrap_or(0);
        self.view = SignView::reset();

        if self.current + 1 < total {
            self.current += 1;
            Ok(Advance::NextSign)
        } else {
            self.phase = Phase::Complete;
            Ok(Advance::Complete)
        }
    }
}

impl Default for PracticeFlow {
    fn default() -> Self {
        Self::new()
    }
}
