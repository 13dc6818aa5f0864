//! Drivers that own a recording machine and route its samples to the remote
//! collaborators. One frame is handled to completion before the next; frames
//! that arrive while an upload or prediction is outstanding go through the
//! suspended machine instead of queueing behind it.

use crate::collab::{BatchSubmitter, ConflictChecker, FrameBacklog, NoBacklog, Predictor};
use crate::collector::{conflict_verdict, ConflictVerdict, PushOutcome, SampleCollector};
use crate::config::PipelineConfig;
use crate::error::{GestError, GpResult};
use crate::evaluator::{AttemptOutcome, EvaluationGate, PracticeEvaluator, SessionStats};
use crate::landmarks::{HandFrame, HandSide};
use crate::protocol::{ConflictCheckRequest, SampleBatchResponse};
use crate::quality::{validate_batch, QualityReport};
use crate::recorder::{FrameOutcome, FrameThrottle, RecorderOptions, RecordingStateMachine};
use crate::registry::TemplateRegistry;
use crate::sample::Sample;
use std::future::Future;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// Dropped by the frame throttle.
    Skipped,
    Frame(FrameOutcome),
    SampleRejected { instance_id: u32, message: String },
    SampleAccepted { count: usize, required: usize },
    BatchSubmitted {
        label: String,
        samples: Vec<Sample>,
        response: SampleBatchResponse,
        quality: QualityReport,
    },
    /// Inconsistent batch dropped locally by the quality gate.
    BatchDiscarded { quality: QualityReport },
    UploadFailed { message: String },
}

/// Training capture: samples go through the conflict check into the collector,
/// full batches go to the submitter.
pub struct CaptureSession<C, S> {
    config: PipelineConfig,
    machine: RecordingStateMachine,
    collector: SampleCollector,
    throttle: FrameThrottle,
    checker: C,
    submitter: S,
}

impl<C: ConflictChecker, S: BatchSubmitter> CaptureSession<C, S> {
    pub fn new(
        config: PipelineConfig,
        operator_id: &str,
        label: &str,
        checker: C,
        submitter: S,
    ) -> GpResult<Self> {
        config.capture.validate().map_err(GestError::Config)?;
        let machine = RecordingStateMachine::new(RecorderOptions::from_config(&config, label));
        let collector = SampleCollector::new(operator_id, label, config.capture.required_samples);
        let throttle = FrameThrottle::new(config.capture.frame_stride);
        Ok(Self {
            config,
            machine,
            collector,
            throttle,
            checker,
            submitter,
        })
    }

    pub fn machine(&self) -> &RecordingStateMachine {
        &self.machine
    }

    pub fn collector(&self) -> &SampleCollector {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut SampleCollector {
        &mut self.collector
    }

    /// Starts over on a (possibly new) label: samples, instance ids and
    /// machine state are cleared. Accepted labels stay in the pending list.
    pub fn start_new_recording(&mut self, label: Option<&str>) -> GpResult<()> {
        self.collector.reset();
        if let Some(label) = label {
            self.collector.set_label(label)?;
            self.machine.set_pose_label(label);
        }
        self.machine.restart();
        info!("New recording started for '{}'", self.collector.label());
        Ok(())
    }

    pub async fn on_frame(&mut self, frame: &HandFrame) -> GpResult<CaptureEvent> {
        self.on_frame_with(frame, &mut NoBacklog).await
    }

    /// Like [`Self::on_frame`], but frames pulled from `backlog` during an
    /// upload only update gate tracking and cannot start a recording.
    pub async fn on_frame_with<B: FrameBacklog>(
        &mut self,
        frame: &HandFrame,
        backlog: &mut B,
    ) -> GpResult<CaptureEvent> {
        self.recover_interrupted();
        if !self.throttle.admit() {
            return Ok(CaptureEvent::Skipped);
        }
        match self.machine.on_frame(frame) {
            FrameOutcome::Completed(rec) => {
                self.handle_sample(rec.sample, frame.timestamp_ms, backlog)
                    .await
            }
            other => Ok(CaptureEvent::Frame(other)),
        }
    }

    // A dropped `on_frame` future leaves the upload flag set.
    fn recover_interrupted(&mut self) {
        if self.collector.is_uploading() {
            warn!(
                "Upload for '{}' was interrupted, batch dropped",
                self.collector.label()
            );
            self.collector.reset();
        }
        self.machine.resume();
    }

    async fn handle_sample<B: FrameBacklog>(
        &mut self,
        sample: Sample,
        now_ms: u64,
        backlog: &mut B,
    ) -> GpResult<CaptureEvent> {
        let request = ConflictCheckRequest::from(&sample);
        let verdict = conflict_verdict(self.checker.check_conflict(&request).await);
        if let ConflictVerdict::Conflict(message) = verdict {
            info!("Sample #{} rejected: {}", sample.instance_id, message);
            return Ok(CaptureEvent::SampleRejected {
                instance_id: sample.instance_id,
                message,
            });
        }

        let batch = match self.collector.push(sample)? {
            PushOutcome::Accepted { count, required } => {
                return Ok(CaptureEvent::SampleAccepted { count, required })
            }
            PushOutcome::QuotaReached(batch) => batch,
        };

        let quality = validate_batch(
            &batch.samples,
            self.config.capture.recorded_hand(),
            &self.config.quality,
        );
        if !quality.consistent {
            warn!("Batch for '{}' is inconsistent: {}", batch.gesture_label, quality.message);
            if self.config.capture.quality_gate {
                self.collector.discard_batch();
                return Ok(CaptureEvent::BatchDiscarded { quality });
            }
        }

        let result = drain_while(
            &mut self.machine,
            &mut self.throttle,
            backlog,
            self.submitter.submit_batch(&batch),
        )
        .await;
        self.machine.resume();
        match self.collector.finish_upload(result, now_ms) {
            Ok(response) => Ok(CaptureEvent::BatchSubmitted {
                label: batch.gesture_label,
                samples: batch.samples,
                response,
                quality,
            }),
            Err(GestError::Collaborator(e)) => Ok(CaptureEvent::UploadFailed {
                message: e.user_message().map_or_else(|| e.to_string(), str::to_string),
            }),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PracticeEvent {
    Skipped,
    Frame(FrameOutcome),
    /// A recording completed but was not sent (cooldown or outstanding call).
    Ignored(EvaluationGate),
    Scored {
        outcome: AttemptOutcome,
        finished: bool,
    },
    PredictionFailed { message: String },
    /// The session already shows its final result.
    Finished,
}

/// Practice mode: every completed recording is scored against one target.
pub struct PracticeSession<P> {
    machine: RecordingStateMachine,
    evaluator: PracticeEvaluator,
    throttle: FrameThrottle,
    predictor: P,
}

impl<P: Predictor> PracticeSession<P> {
    pub fn new(
        config: &PipelineConfig,
        registry: &TemplateRegistry,
        target: &str,
        predictor: P,
    ) -> GpResult<Self> {
        config.capture.validate().map_err(GestError::Config)?;
        let template = registry
            .get(target)
            .cloned()
            .ok_or_else(|| GestError::UnknownGesture(target.to_string()))?;

        let mut options = RecorderOptions::from_config(config, target);
        if template.is_static {
            options.static_target = Some(match config.capture.recorded_hand() {
                HandSide::Right => template.right_fingers,
                HandSide::Left => template.left_fingers,
            });
        }

        Ok(Self {
            machine: RecordingStateMachine::new(options),
            evaluator: PracticeEvaluator::new(target, template, &config.capture),
            throttle: FrameThrottle::new(config.capture.frame_stride),
            predictor,
        })
    }

    pub fn machine(&self) -> &RecordingStateMachine {
        &self.machine
    }

    pub fn evaluator(&self) -> &PracticeEvaluator {
        &self.evaluator
    }

    pub fn stats(&self) -> &SessionStats {
        self.evaluator.stats()
    }

    pub fn is_finished(&self) -> bool {
        self.evaluator.is_finished()
    }

    pub fn restart(&mut self) {
        self.evaluator.restart();
        self.machine.restart();
        info!("Practice for '{}' restarted", self.evaluator.target_label());
    }

    pub async fn on_frame(&mut self, frame: &HandFrame) -> GpResult<PracticeEvent> {
        self.on_frame_with(frame, &mut NoBacklog).await
    }

    /// Like [`Self::on_frame`], but frames pulled from `backlog` during a
    /// prediction only update gate tracking and cannot start a recording.
    pub async fn on_frame_with<B: FrameBacklog>(
        &mut self,
        frame: &HandFrame,
        backlog: &mut B,
    ) -> GpResult<PracticeEvent> {
        self.recover_interrupted();
        if !self.throttle.admit() {
            return Ok(PracticeEvent::Skipped);
        }
        let rec = match self.machine.on_frame(frame) {
            FrameOutcome::Completed(rec) => rec,
            _ if self.evaluator.is_finished() => return Ok(PracticeEvent::Finished),
            other => return Ok(PracticeEvent::Frame(other)),
        };

        let request = match self.evaluator.prepare(&rec, frame.timestamp_ms) {
            EvaluationGate::Ready(request) => request,
            EvaluationGate::Finished => return Ok(PracticeEvent::Finished),
            gate => return Ok(PracticeEvent::Ignored(gate)),
        };

        let result = drain_while(
            &mut self.machine,
            &mut self.throttle,
            backlog,
            self.predictor.predict(&request),
        )
        .await;
        let recorded = self.evaluator.record_verdict(result);

        let finished = self.evaluator.is_finished();
        if !finished {
            self.machine.resume();
        }

        match recorded {
            Ok(outcome) => Ok(PracticeEvent::Scored { outcome, finished }),
            Err(GestError::Collaborator(e)) => Ok(PracticeEvent::PredictionFailed {
                message: e.user_message().map_or_else(|| e.to_string(), str::to_string),
            }),
            Err(e) => Err(e),
        }
    }

    // A dropped `on_frame` future leaves the evaluator in `Evaluating`.
    fn recover_interrupted(&mut self) {
        self.evaluator.abandon();
        if !self.evaluator.is_finished() {
            self.machine.resume();
        }
    }
}

/// Awaits `call` with the machine suspended. Frames arriving meanwhile still
/// reach the machine so gate edges stay in sync with what the operator does.
async fn drain_while<T, B: FrameBacklog>(
    machine: &mut RecordingStateMachine,
    throttle: &mut FrameThrottle,
    backlog: &mut B,
    call: impl Future<Output = T>,
) -> T {
    machine.suspend();
    tokio::pin!(call);
    let mut open = true;
    let mut absorbed = 0usize;

    let out = loop {
        tokio::select! {
            biased;
            out = &mut call => break out,
            next = backlog.next_frame(), if open => match next {
                Some(frame) => {
                    if throttle.admit() {
                        machine.on_frame(&frame);
                        absorbed += 1;
                    }
                }
                None => open = false,
            },
        }
    };

    if absorbed > 0 {
        debug!("{} frames seen while waiting on a collaborator", absorbed);
    }
    out
}
