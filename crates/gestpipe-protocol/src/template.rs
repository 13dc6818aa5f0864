use crate::sample::FingerStates;
use serde::{Deserialize, Serialize};

/// Reference shape of a known gesture, read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureTemplate {
    pub left_fingers: FingerStates,
    pub right_fingers: FingerStates,
    pub main_axis_x: u8,
    pub main_axis_y: u8,
    pub delta_x: f32,
    pub delta_y: f32,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub description: String,
}
