#![allow(dead_code)]

use gestpipe_core::collab::{BatchSubmitter, ConflictChecker, Predictor};
use gestpipe_core::error::CollaboratorError;
use gestpipe_core::landmarks::{HandFrame, HandObservation, HandSide, LandmarkPoint, Point2};
use gestpipe_core::protocol::{
    ConflictCheckRequest, ConflictCheckResponse, PredictRequest, PredictResponse,
    SampleBatchRequest, SampleBatchResponse,
};
use gestpipe_core::sample::FingerStates;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// (x, mcp_y) per non-thumb finger, relative to the wrist.
const FINGER_COLUMNS: [(f32, f32); 4] = [(-0.03, -0.12), (0.0, -0.12), (0.02, -0.11), (0.04, -0.10)];

/// Builds an upright 21-point hand whose geometry classifies to the requested
/// finger states under the default thresholds.
pub struct HandBuilder {
    side: HandSide,
    wrist: (f32, f32),
    fingers: FingerStates,
    confidence: f32,
}

impl HandBuilder {
    pub fn new(side: HandSide) -> Self {
        Self {
            side,
            wrist: (0.5, 0.7),
            fingers: FingerStates::OPEN,
            confidence: 0.9,
        }
    }

    pub fn left() -> Self {
        Self::new(HandSide::Left)
    }

    pub fn right() -> Self {
        Self::new(HandSide::Right)
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.wrist = (x, y);
        self
    }

    pub fn fingers(mut self, states: [u8; 5]) -> Self {
        self.fingers = FingerStates(states);
        self
    }

    pub fn fist(self) -> Self {
        self.fingers([0, 0, 0, 0, 0])
    }

    pub fn open(self) -> Self {
        self.fingers([1, 1, 1, 1, 1])
    }

    pub fn confidence(mut self, c: f32) -> Self {
        self.confidence = c;
        self
    }

    pub fn build(self) -> HandObservation {
        let (wx, wy) = self.wrist;
        let mut offsets = vec![(0.0f32, 0.0f32); 21];

        offsets[1] = (-0.02, -0.03);
        offsets[2] = (-0.05, -0.06);
        if self.fingers.0[0] == 1 {
            offsets[3] = (-0.08, -0.08);
            offsets[4] = (-0.11, -0.10);
        } else {
            offsets[3] = (-0.05, -0.08);
            offsets[4] = (-0.02, -0.09);
        }

        for (i, (x, mcp_y)) in FINGER_COLUMNS.into_iter().enumerate() {
            let base = 5 + i * 4;
            let pip_y = mcp_y - 0.04;
            let (dip_y, tip_y) = if self.fingers.0[i + 1] == 1 {
                (pip_y - 0.03, pip_y - 0.06)
            } else {
                (pip_y + 0.01, pip_y + 0.03)
            };
            offsets[base] = (x, mcp_y);
            offsets[base + 1] = (x, pip_y);
            offsets[base + 2] = (x, dip_y);
            offsets[base + 3] = (x, tip_y);
        }

        let landmarks = offsets
            .into_iter()
            .map(|(dx, dy)| LandmarkPoint::new(wx + dx, wy + dy))
            .collect();

        HandObservation {
            side: self.side,
            landmarks,
            confidence: self.confidence,
        }
    }
}

pub fn frame(ts: u64, hands: Vec<HandObservation>) -> HandFrame {
    HandFrame::new(ts, hands)
}

/// One complete gate cycle of `n` buffered frames (n >= 2): fist on the
/// first, held through the middle, released on the last. The right wrist moves
/// linearly from `from` to `to` across frames `0..n-1` and stays at `to` on
/// the release frame.
pub fn gesture_cycle(
    start_ts: u64,
    step_ms: u64,
    n: usize,
    from: Point2,
    to: Point2,
    right_fingers: [u8; 5],
) -> Vec<HandFrame> {
    let moving = n - 1;
    (0..n)
        .map(|i| {
            let t = if moving <= 1 {
                1.0
            } else {
                (i.min(moving - 1)) as f32 / (moving - 1) as f32
            };
            let x = from.x + (to.x - from.x) * t;
            let y = from.y + (to.y - from.y) * t;
            let gate = if i + 1 == n {
                HandBuilder::left().open()
            } else {
                HandBuilder::left().fist()
            };
            frame(
                start_ts + i as u64 * step_ms,
                vec![gate.build(), HandBuilder::right().fingers(right_fingers).at(x, y).build()],
            )
        })
        .collect()
}

/// A cycle with a rightward-on-screen sweep (`delta_x` = -0.2 after the flip).
pub fn simple_cycle(start_ts: u64, step_ms: u64, n: usize, right_fingers: [u8; 5]) -> Vec<HandFrame> {
    gesture_cycle(
        start_ts,
        step_ms,
        n,
        Point2::new(0.4, 0.5),
        Point2::new(0.6, 0.5),
        right_fingers,
    )
}

// --- Mock collaborators ---

#[derive(Clone)]
pub enum ConflictMode {
    Clear,
    Conflict(String),
    Fail(CollaboratorError),
}

#[derive(Clone)]
pub struct MockChecker {
    pub mode: ConflictMode,
    pub calls: Arc<Mutex<Vec<ConflictCheckRequest>>>,
}

impl MockChecker {
    pub fn new(mode: ConflictMode) -> Self {
        Self {
            mode,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ConflictChecker for MockChecker {
    async fn check_conflict(
        &self,
        request: &ConflictCheckRequest,
    ) -> Result<ConflictCheckResponse, CollaboratorError> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.mode {
            ConflictMode::Clear => Ok(ConflictCheckResponse::default()),
            ConflictMode::Conflict(msg) => Ok(ConflictCheckResponse {
                conflict: true,
                message: Some(msg.clone()),
            }),
            ConflictMode::Fail(e) => Err(e.clone()),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockSubmitter {
    pub fail_with: Option<CollaboratorError>,
    pub calls: Arc<Mutex<Vec<SampleBatchRequest>>>,
    /// Time each upload takes to answer.
    pub delay: Duration,
}

impl MockSubmitter {
    pub fn failing(e: CollaboratorError) -> Self {
        Self {
            fail_with: Some(e),
            ..Default::default()
        }
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl BatchSubmitter for MockSubmitter {
    async fn submit_batch(
        &self,
        request: &SampleBatchRequest,
    ) -> Result<SampleBatchResponse, CollaboratorError> {
        self.calls.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(SampleBatchResponse {
                message: format!("Stored {} samples", request.samples.len()),
                validation: Some("ok".to_string()),
                raw_file: Some(format!("gesture_data_custom_{}.csv", request.gesture_label)),
                master_file: None,
            }),
        }
    }
}

/// Replays scripted verdicts in order; answers "correct" once the script runs out.
#[derive(Clone, Default)]
pub struct MockPredictor {
    pub script: Arc<Mutex<Vec<Result<PredictResponse, CollaboratorError>>>>,
    pub calls: Arc<Mutex<Vec<PredictRequest>>>,
    pub delay: Duration,
}

impl MockPredictor {
    pub fn scripted(mut verdicts: Vec<Result<PredictResponse, CollaboratorError>>) -> Self {
        verdicts.reverse();
        Self {
            script: Arc::new(Mutex::new(verdicts)),
            calls: Arc::default(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Predictor for MockPredictor {
    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, CollaboratorError> {
        self.calls.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script.lock().unwrap().pop().unwrap_or_else(|| {
            Ok(PredictResponse {
                success: true,
                reason_message: "Correct gesture".to_string(),
                reason_code: None,
            })
        })
    }
}

pub fn verdict(success: bool, code: Option<&str>) -> Result<PredictResponse, CollaboratorError> {
    Ok(PredictResponse {
        success,
        reason_message: if success { "Correct" } else { "Wrong direction" }.to_string(),
        reason_code: code.map(str::to_string),
    })
}
