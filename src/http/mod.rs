//! HTTP skill client
//!
//! Speaks a small JSON protocol:
//!
//! - `POST {base}/state/upload` with `{"image": <base64>}`
//! - `GET {base}/state/{id}/image` answering `{"image": <base64>}`
//! - `POST {base}/skills/{skill}` with the skill request as JSON
//!
//! Any answer carrying an `error` field is a rejected call. Non-2xx statuses
//! are transport failures.

use crate::core::client::{
    BackgroundColorRequest, BlendRequest, CropRequest, DownloadOptions, EraseRequest,
    InferBboxRequest, RecolorRequest, SegmentRequest, ShadowRequest, SkillClient, SkillResult,
};
use crate::core::context::EditorContext;
use crate::core::error::TransportError;
use crate::core::settings::{BridgeSettings, parse_secs};
use crate::core::types::{BoundingBox, CallResult, Skill, StateId};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

pub const API_URL_ENV: &str = "SKILL_NODES_API_URL";
pub const API_KEY_ENV: &str = "SKILL_NODES_API_KEY";
pub const HTTP_TIMEOUT_ENV: &str = "SKILL_NODES_HTTP_TIMEOUT_SECS";

/// Configuration for [`HttpSkillClient`]
#[derive(Clone, Debug, PartialEq)]
pub struct HttpConfig {
    /// Base URL (default: http://localhost:8000)
    pub base_url: String,
    /// Sent as a bearer token when set
    pub api_key: Option<String>,
    /// Bound on a single HTTP exchange
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_ENV) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config.api_key = lookup(API_KEY_ENV).filter(|key| !key.is_empty());
        if let Some(secs) = parse_secs(lookup(HTTP_TIMEOUT_ENV), HTTP_TIMEOUT_ENV) {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Answer body: either the payload or an error message.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Wire<T> {
    Rejected { error: String },
    Accepted(T),
}

impl<T> From<Wire<T>> for CallResult<T> {
    fn from(wire: Wire<T>) -> Self {
        match wire {
            Wire::Accepted(value) => CallResult::Success(value),
            Wire::Rejected { error } => CallResult::Error { message: error },
        }
    }
}

#[derive(Debug, Deserialize)]
struct StateBody {
    state_id: StateId,
}

#[derive(Debug, Serialize, Deserialize)]
struct ImageBody {
    image: String,
}

#[derive(Debug, Deserialize)]
struct BboxBody {
    bbox: BoundingBox,
}

#[derive(Debug, Deserialize)]
struct SubjectBody {
    main_subject: String,
}

/// [`SkillClient`] over HTTP, sharing one connection pool for the session.
///
/// [`close`](SkillClient::close) drops the pool; calls made afterwards fail
/// with [`TransportError::Connection`] without touching the network.
pub struct HttpSkillClient {
    http: Mutex<Option<reqwest::Client>>,
    config: HttpConfig,
}

impl HttpSkillClient {
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http: Mutex::new(Some(http)),
            config,
        })
    }

    /// The live connection pool, or an error once the session is closed.
    fn http(&self) -> Result<reqwest::Client, TransportError> {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| TransportError::Connection("skill session is closed".to_string()))
    }

    pub fn is_closed(&self) -> bool {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> SkillResult<T> {
        let request = match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let wire: Wire<T> = response.json().await?;
        Ok(wire.into())
    }

    async fn skill<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        skill: Skill,
        body: &B,
    ) -> SkillResult<T> {
        let url = self.url(&format!("skills/{skill}"));
        self.send(self.http()?.post(url).json(body)).await
    }

    async fn transform<B: Serialize + ?Sized>(&self, skill: Skill, body: &B) -> SkillResult<StateId> {
        let result: CallResult<StateBody> = self.skill(skill, body).await?;
        Ok(result.map(|body| body.state_id))
    }
}

fn download_query(options: &DownloadOptions) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(format) = &options.format {
        query.push(("format", format.clone()));
    }
    if let Some((width, height)) = options.resolution {
        query.push(("width", width.to_string()));
        query.push(("height", height.to_string()));
    }
    query
}

#[async_trait]
impl SkillClient for HttpSkillClient {
    async fn upload(&self, image: Vec<u8>) -> SkillResult<StateId> {
        let body = ImageBody {
            image: STANDARD.encode(image),
        };
        let request = self.http()?.post(self.url("state/upload")).json(&body);
        let result: CallResult<StateBody> = self.send(request).await?;
        Ok(result.map(|body| body.state_id))
    }

    async fn download(&self, state_id: &StateId, options: &DownloadOptions) -> SkillResult<Vec<u8>> {
        let request = self
            .http()?
            .get(self.url(&format!("state/{state_id}/image")))
            .query(&download_query(options));
        let result: CallResult<ImageBody> = self.send(request).await?;
        match result {
            CallResult::Success(body) => STANDARD
                .decode(body.image)
                .map(CallResult::Success)
                .map_err(|err| TransportError::Decode(err.to_string())),
            CallResult::Error { message } => Ok(CallResult::Error { message }),
        }
    }

    async fn segment(&self, request: SegmentRequest) -> SkillResult<StateId> {
        self.transform(Skill::Segment, &request).await
    }

    async fn crop(&self, request: CropRequest) -> SkillResult<StateId> {
        self.transform(Skill::Crop, &request).await
    }

    async fn erase(&self, request: EraseRequest) -> SkillResult<StateId> {
        self.transform(Skill::Erase, &request).await
    }

    async fn recolor(&self, request: RecolorRequest) -> SkillResult<StateId> {
        self.transform(Skill::Recolor, &request).await
    }

    async fn blend(&self, request: BlendRequest) -> SkillResult<StateId> {
        self.transform(Skill::Blend, &request).await
    }

    async fn shadow(&self, request: ShadowRequest) -> SkillResult<StateId> {
        self.transform(Skill::Shadow, &request).await
    }

    async fn set_background_color(&self, request: BackgroundColorRequest) -> SkillResult<StateId> {
        self.transform(Skill::SetBackgroundColor, &request).await
    }

    async fn infer_bbox(&self, request: InferBboxRequest) -> SkillResult<BoundingBox> {
        let result: CallResult<BboxBody> = self.skill(Skill::InferBbox, &request).await?;
        Ok(result.map(|body| body.bbox))
    }

    async fn infer_main_subject(&self, state_id: &StateId) -> SkillResult<String> {
        let body = serde_json::json!({ "state_id": state_id });
        let result: CallResult<SubjectBody> = self.skill(Skill::InferMainSubject, &body).await?;
        Ok(result.map(|body| body.main_subject))
    }

    async fn close(&self) {
        let released = self
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            log::debug!("Closed HTTP skill session to {}", self.config.base_url);
        }
    }
}

/// Builds a context on an [`HttpSkillClient`], configured from the environment.
pub fn context_from_env() -> Result<EditorContext, TransportError> {
    let client = HttpSkillClient::new(HttpConfig::from_env())?;
    Ok(EditorContext::new(client).with_settings(BridgeSettings::from_env()))
}
