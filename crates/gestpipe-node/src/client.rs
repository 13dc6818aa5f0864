use gestpipe_core::collab::{BatchSubmitter, ConflictChecker, Predictor};
use gestpipe_core::error::CollaboratorError;
use gestpipe_core::protocol::{
    ConflictCheckRequest, ConflictCheckResponse, ErrorBody, PredictRequest, PredictResponse,
    SampleBatchRequest, SampleBatchResponse,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const CONFLICT_PATH: &str = "/customize/check-conflict";
pub const UPLOAD_PATH: &str = "/customize/upload";
pub const PREDICT_PATH: &str = "/practice/predict";

/// HTTP client for the gesture services. One instance serves all three
/// collaborator roles.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        token: Option<String>,
    ) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> RequestBuilder {
        let req = self.client.post(format!("{}{}", self.base_url, path)).json(body);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, CollaboratorError> {
        debug!("POST {}{}", self.base_url, path);
        self.post(path, body).send().await.map_err(from_reqwest)
    }
}

fn from_reqwest(e: reqwest::Error) -> CollaboratorError {
    if e.is_timeout() {
        CollaboratorError::Timeout
    } else if e.is_decode() {
        CollaboratorError::Decode(e.to_string())
    } else {
        CollaboratorError::Transport(e.to_string())
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, CollaboratorError> {
    let bytes = resp.bytes().await.map_err(from_reqwest)?;
    serde_json::from_slice(&bytes).map_err(|e| CollaboratorError::Decode(e.to_string()))
}

/// `{message, detail}` body of a failed call, or the raw text.
async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.best_message())
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text
            }
        })
}

async fn expect_success<T: DeserializeOwned>(resp: Response) -> Result<T, CollaboratorError> {
    let status = resp.status();
    if status.is_success() {
        decode(resp).await
    } else {
        Err(CollaboratorError::Rejected {
            status: status.as_u16(),
            message: error_message(resp).await,
        })
    }
}

impl ConflictChecker for HttpGateway {
    async fn check_conflict(
        &self,
        request: &ConflictCheckRequest,
    ) -> Result<ConflictCheckResponse, CollaboratorError> {
        let resp = self.send(CONFLICT_PATH, request).await?;
        if resp.status() == StatusCode::CONFLICT {
            return Ok(ConflictCheckResponse {
                conflict: true,
                message: Some(error_message(resp).await),
            });
        }
        expect_success(resp).await
    }
}

impl BatchSubmitter for HttpGateway {
    async fn submit_batch(
        &self,
        request: &SampleBatchRequest,
    ) -> Result<SampleBatchResponse, CollaboratorError> {
        let resp = self.send(UPLOAD_PATH, request).await?;
        expect_success(resp).await
    }
}

impl Predictor for HttpGateway {
    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, CollaboratorError> {
        let resp = self.send(PREDICT_PATH, request).await?;
        expect_success(resp).await
    }
}
