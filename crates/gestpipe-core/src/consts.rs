/// Quota of samples per gesture label before a batch is uploaded.
pub const DEFAULT_REQUIRED_SAMPLES: usize = 5;

/// Shortest wrist trajectory (in frames) that still yields a sample.
pub const DEFAULT_MIN_FRAMES: usize = 12;

/// How long a static pose must be held, in milliseconds.
pub const DEFAULT_STATIC_HOLD_MS: u64 = 1000;

/// Practice attempts per session before the final result is shown.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Minimum spacing between two practice evaluations, in milliseconds.
pub const DEFAULT_EVAL_COOLDOWN_MS: u64 = 1500;

/// Similarity contributed by each matching finger when comparing samples.
pub const FINGER_SIMILARITY_STEP: f32 = 0.2;
