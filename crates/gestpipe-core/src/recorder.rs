use crate::classifier::FingerStateClassifier;
use crate::config::{ClassifierThresholds, HoldPolicy, PipelineConfig};
use crate::consts::{DEFAULT_MIN_FRAMES, DEFAULT_STATIC_HOLD_MS};
use crate::hold::{HoldStatus, StaticHoldDetector};
use crate::landmarks::{HandFrame, HandSide, Point2};
use crate::sample::{FingerStates, Sample};
use crate::trajectory;
use strum_macros::Display;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RecorderState {
    Wait,
    Record,
    Process,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct RecorderOptions {
    /// Shortest recording that yields a sample. The count includes both the
    /// trigger frame and the release frame.
    #[builder(default = DEFAULT_MIN_FRAMES)]
    pub min_frames: usize,
    #[builder(default = HandSide::Left)]
    pub gate_hand: HandSide,
    #[builder(default, setter(into))]
    pub pose_label: String,
    /// Target pose when recording a static gesture.
    #[builder(default, setter(strip_option))]
    pub static_target: Option<FingerStates>,
    #[builder(default = DEFAULT_STATIC_HOLD_MS)]
    pub static_hold_ms: u64,
    #[builder(default)]
    pub hold_policy: HoldPolicy,
    #[builder(default)]
    pub thresholds: ClassifierThresholds,
}

impl RecorderOptions {
    pub fn from_config(config: &PipelineConfig, pose_label: &str) -> Self {
        Self {
            min_frames: config.capture.min_frames,
            gate_hand: config.capture.gate_hand,
            pose_label: pose_label.to_string(),
            static_target: None,
            static_hold_ms: config.capture.static_hold_ms,
            hold_policy: config.capture.static_hold_policy,
            thresholds: config.thresholds.clone(),
        }
    }
}

/// A finished recording cycle that met the minimum length.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRecording {
    pub sample: Sample,
    /// Recorded hand's finger states, one per buffered frame.
    pub recorded_states: Vec<FingerStates>,
    pub frame_count: usize,
    /// Final hold status for static gestures.
    pub hold: Option<HoldStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// At least one of the two required hands is not in view.
    HandsMissing,
    Waiting { gate_fist: bool },
    Started,
    Recording {
        frames: usize,
        hold: Option<HoldStatus>,
    },
    /// The cycle ended with fewer than `min_frames` frames; nothing was emitted.
    TooShort { frames: usize },
    Completed(Box<CompletedRecording>),
}

/// Gate-driven recorder: a fist on the gate hand starts a recording of the
/// other hand's wrist, opening it again finalizes the sample.
///
/// `Wait -> Record -> Process -> Wait`. `Process` runs synchronously inside the
/// frame that released the gate, so it is never observed between frames.
#[derive(Debug, Clone)]
pub struct RecordingStateMachine {
    options: RecorderOptions,
    classifier: FingerStateClassifier,
    state: RecorderState,
    buffer: Vec<Point2>,
    recorded_states: Vec<FingerStates>,
    snapshot: (FingerStates, FingerStates),
    prev_gate_fist: bool,
    next_instance_id: u32,
    suspended: bool,
    hold: Option<StaticHoldDetector>,
    last_hold: Option<HoldStatus>,
}

impl RecordingStateMachine {
    pub fn new(options: RecorderOptions) -> Self {
        let classifier = FingerStateClassifier::new(options.thresholds.clone());
        let hold = options
            .static_target
            .map(|target| StaticHoldDetector::new(target, options.static_hold_ms));
        Self {
            options,
            classifier,
            state: RecorderState::Wait,
            buffer: Vec::new(),
            recorded_states: Vec::new(),
            snapshot: (FingerStates::CLOSED, FingerStates::CLOSED),
            prev_gate_fist: false,
            next_instance_id: 1,
            suspended: false,
            hold,
            last_hold: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn options(&self) -> &RecorderOptions {
        &self.options
    }

    pub fn buffer(&self) -> &[Point2] {
        &self.buffer
    }

    pub fn next_instance_id(&self) -> u32 {
        self.next_instance_id
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// While suspended the gate is still tracked but a rising edge does not
    /// start a new recording.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn set_pose_label(&mut self, label: &str) {
        self.options.pose_label = label.to_string();
        self.reset();
    }

    /// Current hold progress of a static gesture, as of `now_ms`.
    pub fn hold_progress(&self, now_ms: u64) -> Option<u8> {
        self.hold.as_ref().map(|h| h.progress_percent(now_ms))
    }

    /// Back to `Wait` with an empty buffer. Instance ids keep counting.
    pub fn reset(&mut self) {
        self.clear_cycle();
        self.state = RecorderState::Wait;
        self.prev_gate_fist = false;
    }

    /// Full restart of the session-level counters as well.
    pub fn restart(&mut self) {
        self.reset();
        self.next_instance_id = 1;
        self.suspended = false;
    }

    pub fn on_frame(&mut self, frame: &HandFrame) -> FrameOutcome {
        let gate_side = self.options.gate_hand;
        let (gate, recorded) = match (frame.hand(gate_side), frame.hand(gate_side.opposite())) {
            (Some(g), Some(r)) => (g, r),
            _ => {
                if self.state != RecorderState::Wait {
                    debug!("Hand left the frame during {}, back to Wait", self.state);
                }
                self.reset();
                return FrameOutcome::HandsMissing;
            }
        };

        let gate_states = self.classifier.classify(gate);
        let recorded_states = self.classifier.classify(recorded);
        let Some(wrist) = recorded.wrist() else {
            self.reset();
            return FrameOutcome::HandsMissing;
        };

        let gate_fist = gate_states.is_fist();
        let prev_fist = self.prev_gate_fist;
        self.prev_gate_fist = gate_fist;

        match self.state {
            RecorderState::Wait => {
                if gate_fist && !prev_fist && !self.suspended {
                    self.clear_cycle();
                    self.state = RecorderState::Record;
                    self.snapshot = match gate_side {
                        HandSide::Left => (gate_states, recorded_states),
                        HandSide::Right => (recorded_states, gate_states),
                    };
                    self.append(wrist, recorded_states, frame.timestamp_ms);
                    info!(
                        "Recording '{}' started (gate={}, recorded={})",
                        self.options.pose_label, gate_states, recorded_states
                    );
                    FrameOutcome::Started
                } else {
                    FrameOutcome::Waiting { gate_fist }
                }
            }
            RecorderState::Record => {
                self.append(wrist, recorded_states, frame.timestamp_ms);

                let released = !gate_fist && prev_fist;
                let hold_done = self.options.hold_policy == HoldPolicy::AutoFinalize
                    && self.last_hold.is_some_and(|h| h.is_satisfied());

                if released || hold_done {
                    self.state = RecorderState::Process;
                    return self.process();
                }
                FrameOutcome::Recording {
                    frames: self.buffer.len(),
                    hold: self.last_hold,
                }
            }
            RecorderState::Process => self.process(),
        }
    }

    fn append(&mut self, wrist: Point2, states: FingerStates, now_ms: u64) {
        self.buffer.push(wrist);
        self.recorded_states.push(states);
        if let Some(hold) = self.hold.as_mut() {
            self.last_hold = Some(hold.update(states, wrist, now_ms));
        }
    }

    fn process(&mut self) -> FrameOutcome {
        let frames = self.buffer.len();
        let outcome = if frames < self.options.min_frames {
            debug!(
                "Recording too short ({} < {} frames), discarded",
                frames, self.options.min_frames
            );
            FrameOutcome::TooShort { frames }
        } else {
            FrameOutcome::Completed(Box::new(self.build_recording()))
        };

        self.clear_cycle();
        self.state = RecorderState::Wait;
        outcome
    }

    fn build_recording(&mut self) -> CompletedRecording {
        let smoothed = trajectory::smooth(&self.buffer);
        // Non-empty: min_frames >= 1 is checked by the caller.
        let motion = trajectory::extract_features(&smoothed).unwrap_or_default();

        let held_positions = self
            .hold
            .as_mut()
            .map(StaticHoldDetector::take_positions)
            .unwrap_or_default();

        let sample = Sample {
            instance_id: self.next_instance_id,
            pose_label: self.options.pose_label.clone(),
            left_finger_state: self.snapshot.0,
            right_finger_state: self.snapshot.1,
            motion,
            held_positions,
        };
        self.next_instance_id += 1;

        info!(
            "Sample #{} '{}' captured: {} frames, dx={:.3}, dy={:.3}",
            sample.instance_id,
            sample.pose_label,
            self.buffer.len(),
            motion.delta_x,
            motion.delta_y
        );

        CompletedRecording {
            sample,
            recorded_states: std::mem::take(&mut self.recorded_states),
            frame_count: self.buffer.len(),
            hold: self.last_hold,
        }
    }

    fn clear_cycle(&mut self) {
        self.buffer.clear();
        self.recorded_states.clear();
        self.last_hold = None;
        if let Some(hold) = self.hold.as_mut() {
            hold.reset();
        }
    }
}

/// Lets through every `stride`-th delivered frame.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    stride: usize,
    seen: u64,
}

impl FrameThrottle {
    pub fn new(stride: usize) -> Self {
        Self {
            stride: stride.max(1),
            seen: 0,
        }
    }

    pub fn admit(&mut self) -> bool {
        self.seen += 1;
        self.seen % self.stride as u64 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_stride_three() {
        let mut t = FrameThrottle::new(3);
        let admitted: Vec<bool> = (0..6).map(|_| t.admit()).collect();
        assert_eq!(admitted, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_throttle_zero_stride_admits_all() {
        let mut t = FrameThrottle::new(0);
        assert!((0..5).all(|_| t.admit()));
    }

    #[test]
    fn test_builder_defaults() {
        let opts = RecorderOptions::builder().pose_label("wave").build();
        assert_eq!(opts.min_frames, DEFAULT_MIN_FRAMES);
        assert_eq!(opts.gate_hand, HandSide::Left);
        assert!(opts.static_target.is_none());
    }
}
