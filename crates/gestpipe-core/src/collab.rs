//! Seams to the remote services. The runtime provides HTTP implementations;
//! tests provide in-memory ones.

use crate::error::CollaboratorError;
use crate::landmarks::HandFrame;
use crate::protocol::{
    ConflictCheckRequest, ConflictCheckResponse, PredictRequest, PredictResponse,
    SampleBatchRequest, SampleBatchResponse,
};
use std::future::Future;
use tokio::sync::mpsc;

pub trait ConflictChecker {
    fn check_conflict(
        &self,
        request: &ConflictCheckRequest,
    ) -> impl Future<Output = Result<ConflictCheckResponse, CollaboratorError>> + Send;
}

pub trait BatchSubmitter {
    fn submit_batch(
        &self,
        request: &SampleBatchRequest,
    ) -> impl Future<Output = Result<SampleBatchResponse, CollaboratorError>> + Send;
}

pub trait Predictor {
    fn predict(
        &self,
        request: &PredictRequest,
    ) -> impl Future<Output = Result<PredictResponse, CollaboratorError>> + Send;
}

/// Frames delivered while a collaborator call is outstanding. `None` once the
/// source is exhausted.
pub trait FrameBacklog {
    fn next_frame(&mut self) -> impl Future<Output = Option<HandFrame>> + Send;
}

impl FrameBacklog for mpsc::Receiver<HandFrame> {
    async fn next_frame(&mut self) -> Option<HandFrame> {
        self.recv().await
    }
}

/// For callers that hand frames over one at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBacklog;

impl FrameBacklog for NoBacklog {
    fn next_frame(&mut self) -> impl Future<Output = Option<HandFrame>> + Send {
        std::future::pending()
    }
}
