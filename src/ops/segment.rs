//! Mask the object inside a bounding box, optionally cropped to that box.

use crate::core::client::{CropRequest, SegmentRequest};
use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::{BoundingBox, Skill, StateId};
use crate::imaging::{ImageTensor, MaskTensor};
use crate::ops::{PLAIN, fetch_mask, stage_image, upload_staged};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentOptions {
    pub bbox: BoundingBox,
    /// Crop the mask to `bbox` once segmentation is done.
    pub cropped: bool,
}

#[derive(Debug, Clone)]
pub struct Params {
    pub image: StateId,
    pub options: SegmentOptions,
}

#[derive(Debug, Clone)]
pub struct TensorParams {
    pub image: ImageTensor,
    pub options: SegmentOptions,
}

async fn script(
    ctx: &EditorContext,
    image: &StateId,
    options: &SegmentOptions,
) -> Result<StateId, NodeError> {
    let request = SegmentRequest {
        state_id: image.clone(),
        bbox: options.bbox,
    };
    let mask = ctx.call(Skill::Segment, ctx.client().segment(request)).await?;
    if !options.cropped {
        return Ok(mask);
    }

    // Crop strictly follows segmentation, on the same box.
    let request = CropRequest {
        state_id: mask,
        bbox: options.bbox,
    };
    ctx.call(Skill::Crop, ctx.client().crop(request)).await
}

pub async fn run(ctx: EditorContext, params: Params) -> Result<StateId, NodeError> {
    script(&ctx, &params.image, &params.options).await
}

pub async fn run_tensor(ctx: EditorContext, params: TensorParams) -> Result<MaskTensor, NodeError> {
    let image = stage_image(&params.image, PLAIN, "Image")?;
    let image_id = upload_staged(&ctx, &image).await?;
    let mask = script(&ctx, &image_id, &params.options).await?;
    fetch_mask(&ctx, &mask).await
}
