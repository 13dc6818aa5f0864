use crate::config::CaptureParams;
use crate::error::{CollaboratorError, GestError, GpResult};
use crate::landmarks::HandSide;
use crate::protocol::{PredictMotionFeatures, PredictRequest, PredictResponse};
use crate::recorder::CompletedRecording;
use crate::sample::{FingerStates, FINGER_COUNT};
use crate::template::GestureTemplate;
use strum_macros::Display;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    /// 1-based attempt number.
    pub index: usize,
    pub correct: bool,
    pub error_code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub correct: usize,
    pub wrong: usize,
    pub outcomes: Vec<AttemptOutcome>,
    pub attempt_count: usize,
}

impl SessionStats {
    /// Rounded share of correct attempts, 0 when nothing was attempted.
    pub fn accuracy_percent(&self) -> u32 {
        if self.attempt_count == 0 {
            return 0;
        }
        (self.correct as f64 / self.attempt_count as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EvaluatorState {
    Idle,
    Evaluating,
    FinalResult,
}

/// Whether a completed recording may go to the predictor.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationGate {
    Ready(PredictRequest),
    CoolingDown { remaining_ms: u64 },
    Busy,
    Finished,
}

/// Per-finger rounded mean; half or more open frames count as open.
pub fn aggregate_fingers(states: &[FingerStates]) -> FingerStates {
    if states.is_empty() {
        return FingerStates::CLOSED;
    }
    let mut sums = [0usize; FINGER_COUNT];
    for s in states {
        for (sum, v) in sums.iter_mut().zip(s.0) {
            *sum += v as usize;
        }
    }
    FingerStates(sums.map(|sum| u8::from(sum * 2 >= states.len())))
}

/// Scores practice attempts against one target gesture.
#[derive(Debug, Clone)]
pub struct PracticeEvaluator {
    target_label: String,
    template: GestureTemplate,
    recorded_hand: HandSide,
    max_attempts: usize,
    cooldown_ms: u64,
    frame_interval_ms: f64,
    last_eval_ms: Option<u64>,
    state: EvaluatorState,
    stats: SessionStats,
}

impl PracticeEvaluator {
    pub fn new(target_label: &str, template: GestureTemplate, params: &CaptureParams) -> Self {
        Self {
            target_label: target_label.to_string(),
            template,
            recorded_hand: params.recorded_hand(),
            max_attempts: params.max_attempts.max(1),
            cooldown_ms: params.eval_cooldown_ms,
            frame_interval_ms: params.frame_interval_ms,
            last_eval_ms: None,
            state: EvaluatorState::Idle,
            stats: SessionStats::default(),
        }
    }

    pub fn target_label(&self) -> &str {
        &self.target_label
    }

    pub fn template(&self) -> &GestureTemplate {
        &self.template
    }

    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.state == EvaluatorState::FinalResult
    }

    pub fn attempts_left(&self) -> usize {
        self.max_attempts.saturating_sub(self.stats.attempt_count)
    }

    pub fn build_request(&self, recording: &CompletedRecording) -> PredictRequest {
        let aggregated = aggregate_fingers(&recording.recorded_states);
        let (left_fingers, right_fingers) = match self.recorded_hand {
            HandSide::Right => (FingerStates::CLOSED, aggregated),
            HandSide::Left => (aggregated, FingerStates::CLOSED),
        };
        PredictRequest {
            left_fingers,
            right_fingers,
            motion_features: PredictMotionFeatures::from(&recording.sample.motion),
            target_gesture: self.target_label.clone(),
            duration: recording.frame_count as f64 * self.frame_interval_ms / 1000.0,
        }
    }

    /// Admits a recording for evaluation and enters `Evaluating`.
    pub fn prepare(&mut self, recording: &CompletedRecording, now_ms: u64) -> EvaluationGate {
        match self.state {
            EvaluatorState::FinalResult => return EvaluationGate::Finished,
            EvaluatorState::Evaluating => return EvaluationGate::Busy,
            EvaluatorState::Idle => {}
        }
        if let Some(last) = self.last_eval_ms {
            let since = now_ms.saturating_sub(last);
            if since < self.cooldown_ms {
                debug!("Evaluation ignored, {} ms into cooldown", since);
                return EvaluationGate::CoolingDown {
                    remaining_ms: self.cooldown_ms - since,
                };
            }
        }

        self.last_eval_ms = Some(now_ms);
        self.state = EvaluatorState::Evaluating;
        EvaluationGate::Ready(self.build_request(recording))
    }

    /// Applies the predictor's answer. A failed call leaves the attempt count
    /// untouched and returns to `Idle`.
    pub fn record_verdict(
        &mut self,
        result: Result<PredictResponse, CollaboratorError>,
    ) -> GpResult<AttemptOutcome> {
        if self.state != EvaluatorState::Evaluating {
            return Err(GestError::Validation(
                "no evaluation is outstanding".to_string(),
            ));
        }

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Prediction for '{}' failed: {}", self.target_label, e);
                self.state = EvaluatorState::Idle;
                return Err(GestError::Collaborator(e));
            }
        };

        self.stats.attempt_count += 1;
        if resp.success {
            self.stats.correct += 1;
        } else {
            self.stats.wrong += 1;
        }
        let outcome = AttemptOutcome {
            index: self.stats.attempt_count,
            correct: resp.success,
            error_code: resp.reason_code,
            message: resp.reason_message,
        };
        self.stats.outcomes.push(outcome.clone());
        info!(
            "Attempt {}/{} for '{}': {}",
            outcome.index,
            self.max_attempts,
            self.target_label,
            if outcome.correct { "correct" } else { "wrong" }
        );

        self.state = if self.stats.attempt_count >= self.max_attempts {
            info!(
                "Practice finished: {}/{} correct ({}%)",
                self.stats.correct,
                self.stats.attempt_count,
                self.stats.accuracy_percent()
            );
            EvaluatorState::FinalResult
        } else {
            EvaluatorState::Idle
        };
        Ok(outcome)
    }

    /// Drops an outstanding evaluation whose verdict will never arrive. No
    /// attempt is consumed.
    pub fn abandon(&mut self) {
        if self.state == EvaluatorState::Evaluating {
            warn!("Evaluation for '{}' was interrupted", self.target_label);
            self.state = EvaluatorState::Idle;
        }
    }

    pub fn restart(&mut self) {
        self.stats = SessionStats::default();
        self.state = EvaluatorState::Idle;
        self.last_eval_ms = None;
    }
}
