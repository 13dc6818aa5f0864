use crate::sample::{FingerStates, MotionFeatures, Sample};
use serde::{Deserialize, Serialize};

// --- Conflict check ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckRequest {
    pub left_states: FingerStates,
    pub right_states: FingerStates,
    pub delta_x: f32,
    pub delta_y: f32,
}

impl From<&Sample> for ConflictCheckRequest {
    fn from(sample: &Sample) -> Self {
        Self {
            left_states: sample.left_finger_state,
            right_states: sample.right_finger_state,
            delta_x: sample.motion.delta_x,
            delta_y: sample.motion.delta_y,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ConflictCheckResponse {
    pub conflict: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// --- Sample batch submission ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleBatchRequest {
    #[serde(rename = "adminId")]
    pub operator_id: String,
    #[serde(rename = "gestureName")]
    pub gesture_label: String,
    pub samples: Vec<Sample>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleBatchResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub validation: Option<String>,
    #[serde(default)]
    pub raw_file: Option<String>,
    #[serde(default)]
    pub master_file: Option<String>,
}

/// Body the services attach to a non-2xx reply.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// `detail` is more specific than `message` when both are present.
    pub fn best_message(&self) -> Option<String> {
        self.detail.clone().or_else(|| self.message.clone())
    }
}

// --- Practice prediction ---

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PredictMotionFeatures {
    pub delta_x: f32,
    pub delta_y: f32,
    pub main_axis_x: u8,
    pub main_axis_y: u8,
    pub raw_dx: f32,
    pub raw_dy: f32,
    pub delta_magnitude: f32,
    pub motion_left: f32,
    pub motion_right: f32,
    pub motion_up: f32,
    pub motion_down: f32,
}

impl From<&MotionFeatures> for PredictMotionFeatures {
    /// Only the dominant axis keeps its delta; the raw deltas carry both.
    fn from(m: &MotionFeatures) -> Self {
        let (dx, dy) = (m.delta_x, m.delta_y);
        let horizontal = m.is_horizontal();
        Self {
            delta_x: if horizontal { dx } else { 0.0 },
            delta_y: if horizontal { 0.0 } else { dy },
            main_axis_x: m.main_axis_x,
            main_axis_y: m.main_axis_y,
            raw_dx: dx,
            raw_dy: dy,
            delta_magnitude: dx.hypot(dy),
            motion_left: flag(dx < 0.0),
            motion_right: flag(dx > 0.0),
            motion_up: flag(dy < 0.0),
            motion_down: flag(dy > 0.0),
        }
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictRequest {
    pub left_fingers: FingerStates,
    pub right_fingers: FingerStates,
    pub motion_features: PredictMotionFeatures,
    pub target_gesture: String,
    /// Seconds.
    pub duration: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(default, rename = "reason_msg")]
    pub reason_message: String,
    #[serde(default)]
    pub reason_code: Option<String>,
}
