use crate::config::QualityParams;
use crate::consts::FINGER_SIMILARITY_STEP;
use crate::landmarks::HandSide;
use crate::sample::{FingerStates, Sample};
use crate::trajectory::MotionDirection;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Outcome of checking a finished batch for internal consistency.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub consistent: bool,
    /// Size of the largest group of mutually similar samples.
    pub largest_group: usize,
    /// Instance ids outside the largest group.
    pub outliers: Vec<u32>,
    /// How many samples moved in each direction.
    pub directions: BTreeMap<String, usize>,
    pub message: String,
}

/// 0.2 per finger that agrees, so identical poses score 1.0.
pub fn finger_similarity(a: &FingerStates, b: &FingerStates) -> f32 {
    a.0.iter()
        .zip(b.0.iter())
        .filter(|(x, y)| x == y)
        .count() as f32
        * FINGER_SIMILARITY_STEP
}

fn recorded_states(sample: &Sample, recorded: HandSide) -> &FingerStates {
    match recorded {
        HandSide::Left => &sample.left_finger_state,
        HandSide::Right => &sample.right_finger_state,
    }
}

/// Greedy grouping: each sample seeds a group that takes every later sample
/// similar to all current members. The batch passes when some group reaches
/// `min_consistent_samples`.
pub fn validate_batch(samples: &[Sample], recorded: HandSide, params: &QualityParams) -> QualityReport {
    let states: Vec<&FingerStates> = samples.iter().map(|s| recorded_states(s, recorded)).collect();

    let mut assigned = vec![false; samples.len()];
    let mut best: Vec<usize> = Vec::new();

    for seed in 0..samples.len() {
        if assigned[seed] {
            continue;
        }
        let mut group = vec![seed];
        assigned[seed] = true;
        for candidate in seed + 1..samples.len() {
            if assigned[candidate] {
                continue;
            }
            let fits = group.iter().all(|&m| {
                finger_similarity(states[m], states[candidate]) >= params.similarity_threshold
            });
            if fits {
                group.push(candidate);
                assigned[candidate] = true;
            }
        }
        if group.len() > best.len() {
            best = group;
        }
    }

    let outliers = (0..samples.len())
        .filter(|i| !best.contains(i))
        .map(|i| samples[i].instance_id)
        .collect_vec();

    let directions = samples
        .iter()
        .map(|s| MotionDirection::of(&s.motion, params.static_motion_threshold).to_string())
        .counts()
        .into_iter()
        .collect::<BTreeMap<_, _>>();

    let consistent = best.len() >= params.min_consistent_samples;
    let message = if consistent {
        format!("{} of {} samples agree", best.len(), samples.len())
    } else {
        format!(
            "Only {} of {} samples agree (need {})",
            best.len(),
            samples.len(),
            params.min_consistent_samples
        )
    };

    QualityReport {
        consistent,
        largest_group: best.len(),
        outliers,
        directions,
        message,
    }
}
