use crate::core::client::{
    BackgroundColorRequest, BlendRequest, CropRequest, DownloadOptions, EraseRequest,
    InferBboxRequest, RecolorRequest, SegmentRequest, ShadowRequest, SkillClient, SkillResult,
};
use crate::core::types::{BoundingBox, CallResult, Skill, StateId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One call received by [`StubSkillClient`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Upload { bytes: usize },
    Download { state_id: StateId },
    Segment(SegmentRequest),
    Crop(CropRequest),
    Erase(EraseRequest),
    Recolor(RecolorRequest),
    Blend(BlendRequest),
    Shadow(ShadowRequest),
    SetBackgroundColor(BackgroundColorRequest),
    InferBbox(InferBboxRequest),
    InferMainSubject { state_id: StateId },
}

impl RecordedCall {
    pub fn skill(&self) -> Skill {
        match self {
            RecordedCall::Upload { .. } => Skill::Upload,
            RecordedCall::Download { .. } => Skill::Download,
            RecordedCall::Segment(_) => Skill::Segment,
            RecordedCall::Crop(_) => Skill::Crop,
            RecordedCall::Erase(_) => Skill::Erase,
            RecordedCall::Recolor(_) => Skill::Recolor,
            RecordedCall::Blend(_) => Skill::Blend,
            RecordedCall::Shadow(_) => Skill::Shadow,
            RecordedCall::SetBackgroundColor(_) => Skill::SetBackgroundColor,
            RecordedCall::InferBbox(_) => Skill::InferBbox,
            RecordedCall::InferMainSubject { .. } => Skill::InferMainSubject,
        }
    }
}

/// In-process stand-in for the remote service, for tests and offline graphs.
///
/// Uploaded bytes are stored under fresh handles and echoed back on download.
/// Transform skills copy the bytes of their primary input under a new handle.
/// Errors and delays can be scripted per skill or per input handle.
#[derive(Default)]
pub struct StubSkillClient {
    store: Mutex<HashMap<StateId, Vec<u8>>>,
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<HashMap<Skill, String>>,
    skill_delays: Mutex<HashMap<Skill, Duration>>,
    state_delays: Mutex<HashMap<StateId, Duration>>,
    bbox: Mutex<Option<BoundingBox>>,
    closed: Mutex<bool>,
}

impl StubSkillClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call to `skill` returns an error result carrying `message`.
    pub fn fail(self, skill: Skill, message: impl Into<String>) -> Self {
        lock(&self.failures).insert(skill, message.into());
        self
    }

    /// Every call to `skill` sleeps for `delay` before answering.
    pub fn delay(self, skill: Skill, delay: Duration) -> Self {
        lock(&self.skill_delays).insert(skill, delay);
        self
    }

    /// Calls whose primary input is `state_id` sleep for `delay` first.
    pub fn delay_state(self, state_id: impl Into<StateId>, delay: Duration) -> Self {
        lock(&self.state_delays).insert(state_id.into(), delay);
        self
    }

    /// Fixes the box returned by `infer_bbox`.
    pub fn with_bbox(self, bbox: BoundingBox) -> Self {
        *lock(&self.bbox) = Some(bbox);
        self
    }

    /// Seeds the store with bytes under a known handle.
    pub fn insert(&self, state_id: impl Into<StateId>, bytes: Vec<u8>) {
        lock(&self.store).insert(state_id.into(), bytes);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn skills_called(&self) -> Vec<Skill> {
        self.calls().iter().map(RecordedCall::skill).collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn is_closed(&self) -> bool {
        *lock(&self.closed)
    }

    async fn enter(&self, call: RecordedCall, input: Option<&StateId>) -> Option<String> {
        let skill = call.skill();
        lock(&self.calls).push(call);

        let skill_delay = lock(&self.skill_delays).get(&skill).copied();
        let state_delay =
            input.and_then(|id| lock(&self.state_delays).get(id).copied());
        if let Some(delay) = skill_delay.into_iter().chain(state_delay).max() {
            tokio::time::sleep(delay).await;
        }

        lock(&self.failures).get(&skill).cloned()
    }

    fn derive(&self, source: &StateId) -> CallResult<StateId> {
        let mut store = lock(&self.store);
        let bytes = store.get(source).cloned().unwrap_or_default();
        let id = StateId::new(uuid::Uuid::new_v4().to_string());
        store.insert(id.clone(), bytes);
        CallResult::Success(id)
    }

    async fn transform(&self, call: RecordedCall, source: &StateId) -> SkillResult<StateId> {
        if let Some(message) = self.enter(call, Some(source)).await {
            return Ok(CallResult::error(message));
        }
        Ok(self.derive(source))
    }
}

#[async_trait]
impl SkillClient for StubSkillClient {
    async fn upload(&self, image: Vec<u8>) -> SkillResult<StateId> {
        let call = RecordedCall::Upload { bytes: image.len() };
        if let Some(message) = self.enter(call, None).await {
            return Ok(CallResult::error(message));
        }
        let id = StateId::new(uuid::Uuid::new_v4().to_string());
        lock(&self.store).insert(id.clone(), image);
        Ok(CallResult::Success(id))
    }

    async fn download(&self, state_id: &StateId, _options: &DownloadOptions) -> SkillResult<Vec<u8>> {
        let call = RecordedCall::Download {
            state_id: state_id.clone(),
        };
        if let Some(message) = self.enter(call, Some(state_id)).await {
            return Ok(CallResult::error(message));
        }
        match lock(&self.store).get(state_id) {
            Some(bytes) => Ok(CallResult::Success(bytes.clone())),
            None => Ok(CallResult::error(format!("unknown state id {state_id}"))),
        }
    }

    async fn segment(&self, request: SegmentRequest) -> SkillResult<StateId> {
        let source = request.state_id.clone();
        self.transform(RecordedCall::Segment(request), &source).await
    }

    async fn crop(&self, request: CropRequest) -> SkillResult<StateId> {
        let source = request.state_id.clone();
        self.transform(RecordedCall::Crop(request), &source).await
    }

    async fn erase(&self, request: EraseRequest) -> SkillResult<StateId> {
        let source = request.image_state_id.clone();
        self.transform(RecordedCall::Erase(request), &source).await
    }

    async fn recolor(&self, request: RecolorRequest) -> SkillResult<StateId> {
        let source = request.image_state_id.clone();
        self.transform(RecordedCall::Recolor(request), &source).await
    }

    async fn blend(&self, request: BlendRequest) -> SkillResult<StateId> {
        let source = request.image_state_id.clone();
        self.transform(RecordedCall::Blend(request), &source).await
    }

    async fn shadow(&self, request: ShadowRequest) -> SkillResult<StateId> {
        let source = request.state_id.clone();
        self.transform(RecordedCall::Shadow(request), &source).await
    }

    async fn set_background_color(&self, request: BackgroundColorRequest) -> SkillResult<StateId> {
        let source = request.state_id.clone();
        self.transform(RecordedCall::SetBackgroundColor(request), &source)
            .await
    }

    async fn infer_bbox(&self, request: InferBboxRequest) -> SkillResult<BoundingBox> {
        let source = request.state_id.clone();
        if let Some(message) = self.enter(RecordedCall::InferBbox(request), Some(&source)).await {
            return Ok(CallResult::error(message));
        }
        let bbox = lock(&self.bbox).unwrap_or(BoundingBox::new(0, 0, 1, 1));
        Ok(CallResult::Success(bbox))
    }

    async fn infer_main_subject(&self, state_id: &StateId) -> SkillResult<String> {
        let call = RecordedCall::InferMainSubject {
            state_id: state_id.clone(),
        };
        if let Some(message) = self.enter(call, Some(state_id)).await {
            return Ok(CallResult::error(message));
        }
        Ok(CallResult::Success(format!("subject of {state_id}")))
    }

    async fn close(&self) {
        *lock(&self.closed) = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_download_echoes_bytes() {
        let stub = StubSkillClient::new();
        let id = match stub.upload(vec![1, 2, 3]).await.unwrap() {
            CallResult::Success(id) => id,
            other => panic!("unexpected {other:?}"),
        };
        let bytes = stub
            .download(&id, &DownloadOptions::default())
            .await
            .unwrap();
        assert_eq!(bytes, CallResult::Success(vec![1, 2, 3]));
        assert_eq!(stub.skills_called(), vec![Skill::Upload, Skill::Download]);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let stub = StubSkillClient::new().fail(Skill::Segment, "no object");
        stub.insert("img", vec![9]);
        let result = stub
            .segment(SegmentRequest {
                state_id: "img".into(),
                bbox: BoundingBox::new(0, 0, 4, 4),
            })
            .await
            .unwrap();
        assert_eq!(result, CallResult::error("no object"));
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transform_copies_source_bytes() {
        let stub = StubSkillClient::new();
        stub.insert("img", vec![7, 7]);
        let CallResult::Success(mask) = stub
            .crop(CropRequest {
                state_id: "img".into(),
                bbox: BoundingBox::new(0, 0, 1, 1),
            })
            .await
            .unwrap()
        else {
            panic!("crop should succeed");
        };
        assert_ne!(mask.as_str(), "img");
        let bytes = stub
            .download(&mask, &DownloadOptions::default())
            .await
            .unwrap();
        assert_eq!(bytes, CallResult::Success(vec![7, 7]));
    }

    #[tokio::test]
    async fn test_download_of_unknown_state_is_an_error_result() {
        let stub = StubSkillClient::new();
        let result = stub
            .download(&"missing".into(), &DownloadOptions::default())
            .await
            .unwrap();
        assert!(!result.is_success());
    }
}
