use crate::landmarks::Point2;
use crate::sample::FingerStates;

/// Progress of a held static pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldStatus {
    /// The current pose does not match the target.
    Idle,
    Holding { elapsed_ms: u64, percent: u8 },
    Satisfied { elapsed_ms: u64 },
}

impl HoldStatus {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, HoldStatus::Satisfied { .. })
    }

    pub fn percent(&self) -> u8 {
        match self {
            HoldStatus::Idle => 0,
            HoldStatus::Holding { percent, .. } => *percent,
            HoldStatus::Satisfied { .. } => 100,
        }
    }
}

/// Tracks how long a target finger pose has been held without interruption.
///
/// Invariant: `start_ms` is `Some` only while every update since then matched
/// the target exactly; a mismatch clears both the timer and the position log.
#[derive(Debug, Clone)]
pub struct StaticHoldDetector {
    target: FingerStates,
    required_ms: u64,
    start_ms: Option<u64>,
    positions: Vec<Point2>,
}

impl StaticHoldDetector {
    pub fn new(target: FingerStates, required_ms: u64) -> Self {
        Self {
            target,
            required_ms,
            start_ms: None,
            positions: Vec::new(),
        }
    }

    pub fn target(&self) -> FingerStates {
        self.target
    }

    pub fn start_ms(&self) -> Option<u64> {
        self.start_ms
    }

    pub fn positions(&self) -> &[Point2] {
        &self.positions
    }

    pub fn take_positions(&mut self) -> Vec<Point2> {
        std::mem::take(&mut self.positions)
    }

    pub fn reset(&mut self) {
        self.start_ms = None;
        self.positions.clear();
    }

    pub fn update(&mut self, current: FingerStates, wrist: Point2, now_ms: u64) -> HoldStatus {
        if current != self.target {
            self.reset();
            return HoldStatus::Idle;
        }

        let start = *self.start_ms.get_or_insert(now_ms);
        self.positions.push(wrist);
        self.status_at(start, now_ms)
    }

    /// Status as of `now_ms` without feeding a new frame.
    pub fn status(&self, now_ms: u64) -> HoldStatus {
        match self.start_ms {
            Some(start) => self.status_at(start, now_ms),
            None => HoldStatus::Idle,
        }
    }

    pub fn progress_percent(&self, now_ms: u64) -> u8 {
        self.status(now_ms).percent()
    }

    fn status_at(&self, start: u64, now_ms: u64) -> HoldStatus {
        let elapsed_ms = now_ms.saturating_sub(start);
        if elapsed_ms >= self.required_ms {
            return HoldStatus::Satisfied { elapsed_ms };
        }
        let percent = (elapsed_ms as f64 / self.required_ms as f64 * 100.0).round() as u8;
        HoldStatus::Holding {
            elapsed_ms,
            percent: percent.min(99),
        }
    }
}
