//! The remote skill client contract.
//!
//! One async method per skill. Every method resolves to a [`CallResult`]
//! when the service answered, or to a [`TransportError`] when it could not
//! be reached or its answer could not be read.

use crate::core::error::TransportError;
use crate::core::types::{BoundingBox, CallResult, Mode, StateId};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRequest {
    pub state_id: StateId,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRequest {
    pub state_id: StateId,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EraseRequest {
    pub image_state_id: StateId,
    pub mask_state_id: StateId,
    pub mode: Mode,
    pub seed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecolorRequest {
    pub image_state_id: StateId,
    pub mask_state_id: StateId,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendRequest {
    pub image_state_id: StateId,
    pub mask_state_id: StateId,
    pub bbox: BoundingBox,
    pub flip: bool,
    pub rotation_angle: f64,
    pub mode: Mode,
    pub seed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowRequest {
    pub state_id: StateId,
    pub resolution: (u32, u32),
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    pub seed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundColorRequest {
    pub state_id: StateId,
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferBboxRequest {
    pub state_id: StateId,
    pub product_name: String,
}

/// Optional hints for [`SkillClient::download`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DownloadOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<(u32, u32)>,
}

pub type SkillResult<T> = Result<CallResult<T>, TransportError>;

/// Async RPC surface of the remote image-editing service.
#[async_trait]
pub trait SkillClient: Send + Sync + 'static {
    /// Stores encoded image bytes remotely and returns their handle.
    async fn upload(&self, image: Vec<u8>) -> SkillResult<StateId>;

    /// Fetches the encoded image behind a handle.
    async fn download(&self, state_id: &StateId, options: &DownloadOptions) -> SkillResult<Vec<u8>>;

    async fn segment(&self, request: SegmentRequest) -> SkillResult<StateId>;

    async fn crop(&self, request: CropRequest) -> SkillResult<StateId>;

    async fn erase(&self, request: EraseRequest) -> SkillResult<StateId>;

    async fn recolor(&self, request: RecolorRequest) -> SkillResult<StateId>;

    async fn blend(&self, request: BlendRequest) -> SkillResult<StateId>;

    async fn shadow(&self, request: ShadowRequest) -> SkillResult<StateId>;

    async fn set_background_color(&self, request: BackgroundColorRequest) -> SkillResult<StateId>;

    async fn infer_bbox(&self, request: InferBboxRequest) -> SkillResult<BoundingBox>;

    async fn infer_main_subject(&self, state_id: &StateId) -> SkillResult<String>;

    /// Releases the underlying session. Called once from the context's
    /// shutdown hook.
    async fn close(&self) {}
}
