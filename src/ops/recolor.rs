//! Repaint the masked region of an image.
//!
//! The colour string goes to the service as is; it accepts names as well as
//! hex codes, so nothing is checked here.

use crate::core::client::RecolorRequest;
use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::{Skill, StateId};
use crate::imaging::{ImageTensor, MaskTensor};
use crate::ops::{fetch_image, stage_masked_image, upload_staged};

#[derive(Debug, Clone, PartialEq)]
pub struct RecolorOptions {
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct Params {
    pub image: StateId,
    pub mask: StateId,
    pub options: RecolorOptions,
}

#[derive(Debug, Clone)]
pub struct TensorParams {
    pub image: ImageTensor,
    pub mask: MaskTensor,
    pub options: RecolorOptions,
}

async fn script(
    ctx: &EditorContext,
    image: StateId,
    mask: StateId,
    options: RecolorOptions,
) -> Result<StateId, NodeError> {
    let request = RecolorRequest {
        image_state_id: image,
        mask_state_id: mask,
        color: options.color,
    };
    ctx.call(Skill::Recolor, ctx.client().recolor(request)).await
}

pub async fn run(ctx: EditorContext, params: Params) -> Result<StateId, NodeError> {
    script(&ctx, params.image, params.mask, params.options).await
}

pub async fn run_tensor(ctx: EditorContext, params: TensorParams) -> Result<ImageTensor, NodeError> {
    let (image, mask) = stage_masked_image(&params.image, &params.mask)?;

    let image_id = upload_staged(&ctx, &image).await?;
    let mask_id = upload_staged(&ctx, &mask).await?;
    let recolored = script(&ctx, image_id, mask_id, params.options).await?;
    fetch_image(&ctx, &recolored).await
}
