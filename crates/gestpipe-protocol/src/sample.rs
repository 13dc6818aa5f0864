use crate::landmarks::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;

pub const FINGER_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Per-finger openness, thumb first. 1 = extended, 0 = curled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerStates(pub [u8; FINGER_COUNT]);

impl FingerStates {
    pub const CLOSED: FingerStates = FingerStates([0; FINGER_COUNT]);
    pub const OPEN: FingerStates = FingerStates([1; FINGER_COUNT]);

    pub fn from_flags(flags: [bool; FINGER_COUNT]) -> Self {
        Self(flags.map(u8::from))
    }

    pub fn is_open(&self, finger: Finger) -> bool {
        self.0[finger.index()] != 0
    }

    pub fn set(&mut self, finger: Finger, open: bool) {
        self.0[finger.index()] = u8::from(open);
    }

    /// Index through pinky all curled; the thumb is ignored.
    pub fn is_fist(&self) -> bool {
        self.0[1..].iter().all(|&f| f == 0)
    }

    pub fn open_count(&self) -> usize {
        self.0.iter().filter(|&&f| f != 0).count()
    }

    pub fn as_array(&self) -> [u8; FINGER_COUNT] {
        self.0
    }
}

impl From<[u8; FINGER_COUNT]> for FingerStates {
    fn from(value: [u8; FINGER_COUNT]) -> Self {
        Self(value.map(|v| u8::from(v != 0)))
    }
}

impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e] = self.0;
        write!(f, "[{},{},{},{},{}]", a, b, c, d, e)
    }
}

/// Start/mid/end anchors of the smoothed wrist path plus its displacement.
///
/// `delta_x` is sign-flipped relative to image coordinates so that a positive
/// value matches the operator's physical rightward motion on a mirrored feed.
/// Exactly one of `main_axis_x` / `main_axis_y` is 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionFeatures {
    #[serde(rename = "motion_x_start")]
    pub x_start: f32,
    #[serde(rename = "motion_y_start")]
    pub y_start: f32,
    #[serde(rename = "motion_x_mid")]
    pub x_mid: f32,
    #[serde(rename = "motion_y_mid")]
    pub y_mid: f32,
    #[serde(rename = "motion_x_end")]
    pub x_end: f32,
    #[serde(rename = "motion_y_end")]
    pub y_end: f32,
    pub main_axis_x: u8,
    pub main_axis_y: u8,
    pub delta_x: f32,
    pub delta_y: f32,
}

impl MotionFeatures {
    pub fn start(&self) -> Point2 {
        Point2::new(self.x_start, self.y_start)
    }

    pub fn mid(&self) -> Point2 {
        Point2::new(self.x_mid, self.y_mid)
    }

    pub fn end(&self) -> Point2 {
        Point2::new(self.x_end, self.y_end)
    }

    pub fn is_horizontal(&self) -> bool {
        self.main_axis_x == 1
    }
}

/// One captured gesture repetition, the unit exchanged with the remote services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub instance_id: u32,
    pub pose_label: String,
    /// Left hand at the moment recording started.
    pub left_finger_state: FingerStates,
    pub right_finger_state: FingerStates,
    #[serde(flatten)]
    pub motion: MotionFeatures,
    /// Wrist positions logged while a static pose was held.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub held_positions: Vec<Point2>,
}
