use crate::landmarks::HandSide;
use clap::{parser::ValueSource, ArgMatches, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    #[command(flatten)]
    pub capture: CaptureParams,
    #[command(flatten)]
    pub thresholds: ClassifierThresholds,
    #[command(flatten)]
    pub quality: QualityParams,
}

/// What a static (held-pose) recording does once the hold duration is reached.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HoldPolicy {
    /// Keep recording until the gate hand opens, same as a dynamic gesture.
    #[default]
    WaitForRelease,
    /// Finalize the sample as soon as the hold is satisfied.
    AutoFinalize,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureParams {
    #[arg(long, default_value_t = 5)]
    pub required_samples: usize,
    #[arg(long, default_value_t = 12)]
    pub min_frames: usize,
    #[arg(long, default_value_t = 1000)]
    pub static_hold_ms: u64,
    #[arg(long, default_value_t = 5)]
    pub max_attempts: usize,
    #[arg(long, default_value_t = 1500)]
    pub eval_cooldown_ms: u64,

    // 30 fps camera
    #[arg(long, default_value_t = 1000.0 / 30.0)]
    pub frame_interval_ms: f64,

    // Throttle: only every Nth delivered frame reaches the state machine
    #[arg(long, default_value_t = 1)]
    pub frame_stride: usize,

    #[arg(long, value_enum, default_value_t = HoldPolicy::WaitForRelease)]
    pub static_hold_policy: HoldPolicy,
    #[arg(long, value_enum, default_value_t = HandSide::Left)]
    pub gate_hand: HandSide,

    // Reject inconsistent batches locally instead of uploading them
    #[arg(long, default_value_t = false)]
    pub quality_gate: bool,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            required_samples: 5,
            min_frames: 12,
            static_hold_ms: 1000,
            max_attempts: 5,
            eval_cooldown_ms: 1500,
            frame_interval_ms: 1000.0 / 30.0,
            frame_stride: 1,
            static_hold_policy: HoldPolicy::WaitForRelease,
            gate_hand: HandSide::Left,
            quality_gate: false,
        }
    }
}

impl CaptureParams {
    /// The hand whose wrist trajectory is recorded.
    pub fn recorded_hand(&self) -> HandSide {
        self.gate_hand.opposite()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.required_samples == 0 {
            return Err("required_samples must be at least 1".to_string());
        }
        if self.min_frames == 0 {
            return Err("min_frames must be at least 1".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.frame_stride == 0 {
            return Err("frame_stride must be at least 1".to_string());
        }
        if !(self.frame_interval_ms.is_finite() && self.frame_interval_ms > 0.0) {
            return Err(format!(
                "frame_interval_ms must be positive, got {}",
                self.frame_interval_ms
            ));
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    // Thumb tip to palm centre (index MCP / pinky MCP midpoint)
    #[arg(long, default_value_t = 0.08)]
    pub thumb_palm_distance: f32,
    #[arg(long, default_value_t = 0.04)]
    pub thumb_extension_x: f32,
    #[arg(long, default_value_t = 0.03)]
    pub thumb_extension_y: f32,
    #[arg(long, default_value_t = 140.0)]
    pub thumb_straight_angle_deg: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            thumb_palm_distance: 0.08,
            thumb_extension_x: 0.04,
            thumb_extension_y: 0.03,
            thumb_straight_angle_deg: 140.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityParams {
    #[arg(long, default_value_t = 3)]
    pub min_consistent_samples: usize,
    #[arg(long, default_value_t = 0.85)]
    pub similarity_threshold: f32,
    #[arg(long, default_value_t = 0.01)]
    pub static_motion_threshold: f32,
}

impl Default for QualityParams {
    fn default() -> Self {
        Self {
            min_consistent_samples: 3,
            similarity_threshold: 0.85,
            static_motion_threshold: 0.01,
        }
    }
}

impl PipelineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config JSON: {}", e))
    }

    /// Overlays only the flags the user typed on the command line.
    pub fn merge_from_cli(&mut self, cli: &PipelineConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(capture.required_samples);
        update_if_present!(capture.min_frames);
        update_if_present!(capture.static_hold_ms);
        update_if_present!(capture.max_attempts);
        update_if_present!(capture.eval_cooldown_ms);
        update_if_present!(capture.frame_interval_ms);
        update_if_present!(capture.frame_stride);
        update_if_present!(capture.static_hold_policy);
        update_if_present!(capture.gate_hand);
        update_if_present!(capture.quality_gate);

        update_if_present!(thresholds.thumb_palm_distance);
        update_if_present!(thresholds.thumb_extension_x);
        update_if_present!(thresholds.thumb_extension_y);
        update_if_present!(thresholds.thumb_straight_angle_deg);

        update_if_present!(quality.min_consistent_samples);
        update_if_present!(quality.similarity_threshold);
        update_if_present!(quality.static_motion_threshold);
    }
}
