use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Number of skeleton joints the detector reports per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Joint indices of the 21-point hand skeleton.
pub mod joints {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;

    /// (tip, pip) pairs for index, middle, ring, pinky.
    pub const FINGER_TIP_PIP: [(usize, usize); 4] = [
        (INDEX_TIP, INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP, RING_PIP),
        (PINKY_TIP, PINKY_PIP),
    ];
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
pub enum HandSide {
    #[serde(alias = "left", alias = "LEFT")]
    #[strum(to_string = "Left", serialize = "left")]
    Left,
    #[serde(alias = "right", alias = "RIGHT")]
    #[strum(to_string = "Right", serialize = "right")]
    Right,
}

impl HandSide {
    pub fn opposite(self) -> Self {
        match self {
            HandSide::Left => HandSide::Right,
            HandSide::Right => HandSide::Left,
        }
    }
}

/// One normalized joint position. `x`/`y` are in [0, 1] relative to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn xy(&self) -> Point2 {
        Point2 {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub side: HandSide,
    pub landmarks: Vec<LandmarkPoint>,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl HandObservation {
    pub fn new(side: HandSide, landmarks: Vec<LandmarkPoint>) -> Self {
        Self {
            side,
            landmarks,
            confidence: 1.0,
        }
    }

    /// A hand is only usable when the detector delivered the full skeleton.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }

    pub fn wrist(&self) -> Option<Point2> {
        self.landmarks.get(joints::WRIST).map(LandmarkPoint::xy)
    }
}

/// Everything the detector reported for one processed video frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HandFrame {
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

impl HandFrame {
    pub fn new(timestamp_ms: u64, hands: Vec<HandObservation>) -> Self {
        Self { timestamp_ms, hands }
    }

    /// Most confident complete hand of the given side, if any.
    pub fn hand(&self, side: HandSide) -> Option<&HandObservation> {
        self.hands
            .iter()
            .filter(|h| h.side == side && h.is_complete())
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }

    /// Swaps Left/Right labels. A selfie-mirrored feed makes the detector
    /// report the operator's right hand as "Left" and vice versa.
    pub fn mirrored(mut self) -> Self {
        for hand in &mut self.hands {
            hand.side = hand.side.opposite();
        }
        self
    }
}
