use crate::error::{CollaboratorError, GestError, GpResult};
use crate::protocol::{ConflictCheckResponse, SampleBatchRequest, SampleBatchResponse};
use crate::sample::Sample;
use tracing::{info, warn};

/// A label whose batch the service accepted during this session.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub label: String,
    pub sample_count: usize,
    pub validation: Option<String>,
    pub raw_file: Option<String>,
    pub master_file: Option<String>,
    pub submitted_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    Accepted { count: usize, required: usize },
    /// Quota met; the caller must submit this batch and report back via
    /// [`SampleCollector::finish_upload`].
    QuotaReached(SampleBatchRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictVerdict {
    Clear,
    Conflict(String),
}

/// Only an explicit "conflict" answer rejects a sample. Transport failures,
/// timeouts and error replies all let it through.
pub fn conflict_verdict(result: Result<ConflictCheckResponse, CollaboratorError>) -> ConflictVerdict {
    match result {
        Ok(resp) if resp.conflict => ConflictVerdict::Conflict(
            resp.message
                .unwrap_or_else(|| "Gesture conflicts with an existing gesture".to_string()),
        ),
        Ok(_) => ConflictVerdict::Clear,
        Err(e) => {
            warn!("Conflict check failed ({}), accepting sample", e);
            ConflictVerdict::Clear
        }
    }
}

/// Accumulates samples for one gesture label until the quota is met.
#[derive(Debug, Clone)]
pub struct SampleCollector {
    operator_id: String,
    label: String,
    required: usize,
    samples: Vec<Sample>,
    uploading: bool,
    pending: Vec<PendingSubmission>,
}

impl SampleCollector {
    pub fn new(operator_id: &str, label: &str, required: usize) -> Self {
        Self {
            operator_id: operator_id.to_string(),
            label: label.to_string(),
            required: required.max(1),
            samples: Vec::with_capacity(required),
            uploading: false,
            pending: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn pending(&self) -> &[PendingSubmission] {
        &self.pending
    }

    /// Switches to a new label, dropping any partial batch.
    pub fn set_label(&mut self, label: &str) -> GpResult<()> {
        if self.uploading {
            return Err(GestError::Busy("cannot change label during upload"));
        }
        self.label = label.to_string();
        self.samples.clear();
        Ok(())
    }

    pub fn push(&mut self, mut sample: Sample) -> GpResult<PushOutcome> {
        if self.uploading {
            return Err(GestError::Busy("upload in progress"));
        }
        sample.pose_label = self.label.clone();
        self.samples.push(sample);

        if self.samples.len() < self.required {
            return Ok(PushOutcome::Accepted {
                count: self.samples.len(),
                required: self.required,
            });
        }

        self.uploading = true;
        info!(
            "Quota of {} reached for '{}', submitting batch",
            self.required, self.label
        );
        Ok(PushOutcome::QuotaReached(SampleBatchRequest {
            operator_id: self.operator_id.clone(),
            gesture_label: self.label.clone(),
            samples: self.samples.clone(),
        }))
    }

    /// Ends the outstanding upload. The sample list is cleared on both
    /// outcomes so the next batch starts from zero.
    pub fn finish_upload(
        &mut self,
        result: Result<SampleBatchResponse, CollaboratorError>,
        now_ms: u64,
    ) -> GpResult<SampleBatchResponse> {
        self.uploading = false;
        let sample_count = self.samples.len();
        self.samples.clear();

        match result {
            Ok(resp) => {
                let entry = PendingSubmission {
                    label: self.label.clone(),
                    sample_count,
                    validation: resp.validation.clone(),
                    raw_file: resp.raw_file.clone(),
                    master_file: resp.master_file.clone(),
                    submitted_at_ms: now_ms,
                };
                match self.pending.iter_mut().find(|p| p.label == entry.label) {
                    Some(existing) => *existing = entry,
                    None => self.pending.push(entry),
                }
                info!("Batch for '{}' accepted: {}", self.label, resp.message);
                Ok(resp)
            }
            Err(e) => {
                warn!("Batch upload for '{}' failed: {}", self.label, e);
                Err(GestError::Collaborator(e))
            }
        }
    }

    /// Drops a full batch without submitting it.
    pub fn discard_batch(&mut self) {
        self.uploading = false;
        self.samples.clear();
    }

    pub fn remove_pending(&mut self, label: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.label != label);
        self.pending.len() != before
    }

    /// Clears samples and the upload flag; the pending list survives.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.uploading = false;
    }
}
