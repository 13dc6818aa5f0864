use gestpipe_core::collab::{BatchSubmitter, ConflictChecker, Predictor};
use gestpipe_core::error::GpResult;
use gestpipe_core::evaluator::SessionStats;
use gestpipe_core::export;
use gestpipe_core::landmarks::HandFrame;
use gestpipe_core::recorder::FrameOutcome;
use gestpipe_core::session::{CaptureEvent, CaptureSession, PracticeEvent, PracticeSession};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const MASTER_FILE: &str = "gesture_data_master.csv";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub batches: usize,
    pub failed_uploads: usize,
}

fn log_frame(outcome: &FrameOutcome) {
    match outcome {
        FrameOutcome::Started => info!("● Recording..."),
        FrameOutcome::TooShort { frames } => {
            warn!("Gesture too short ({} frames), try again", frames)
        }
        other => debug!("{:?}", other),
    }
}

/// Feeds frames to a capture session until the input ends. Submitted
/// batches are also written under `export_dir` when one is given.
pub async fn run_capture<C, S>(
    session: &mut CaptureSession<C, S>,
    frames: &mut mpsc::Receiver<HandFrame>,
    export_dir: Option<&Path>,
) -> GpResult<CaptureSummary>
where
    C: ConflictChecker,
    S: BatchSubmitter,
{
    let mut summary = CaptureSummary::default();

    while let Some(frame) = frames.recv().await {
        match session.on_frame_with(&frame, &mut *frames).await? {
            CaptureEvent::Skipped => {}
            CaptureEvent::Frame(outcome) => log_frame(&outcome),
            CaptureEvent::SampleRejected { instance_id, message } => {
                summary.rejected += 1;
                warn!("⚠️  Sample #{} rejected: {}", instance_id, message);
            }
            CaptureEvent::SampleAccepted { count, required } => {
                summary.accepted += 1;
                info!("✅ Sample {}/{} captured", count, required);
            }
            CaptureEvent::BatchSubmitted {
                label,
                samples,
                response,
                quality,
            } => {
                summary.accepted += 1;
                summary.batches += 1;
                info!("📤 '{}' uploaded: {} ({})", label, response.message, quality.message);
                if let Some(dir) = export_dir {
                    export::save_batch(dir, &label, &samples)?;
                    export::append_to_master(dir.join(MASTER_FILE), &samples)?;
                }
            }
            CaptureEvent::BatchDiscarded { quality } => {
                warn!("🗑️  Batch discarded: {}", quality.message);
            }
            CaptureEvent::UploadFailed { message } => {
                summary.failed_uploads += 1;
                warn!("❌ Upload failed: {}", message);
            }
        }
    }

    Ok(summary)
}

/// Feeds frames to a practice session until it reaches its final result or
/// the input ends.
pub async fn run_practice<P: Predictor>(
    session: &mut PracticeSession<P>,
    frames: &mut mpsc::Receiver<HandFrame>,
) -> GpResult<SessionStats> {
    while let Some(frame) = frames.recv().await {
        match session.on_frame_with(&frame, &mut *frames).await? {
            PracticeEvent::Skipped => {}
            PracticeEvent::Frame(outcome) => log_frame(&outcome),
            PracticeEvent::Ignored(gate) => debug!("Attempt not evaluated: {:?}", gate),
            PracticeEvent::Scored { outcome, finished } => {
                let mark = if outcome.correct { "✅" } else { "❌" };
                info!("{} Attempt {}: {}", mark, outcome.index, outcome.message);
                if finished {
                    break;
                }
            }
            PracticeEvent::PredictionFailed { message } => {
                warn!("Prediction failed: {}", message);
            }
            PracticeEvent::Finished => break,
        }
    }
    Ok(session.stats().clone())
}
