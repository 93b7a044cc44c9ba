//! Name the main subject of an image.

use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::{Skill, StateId};
use crate::imaging::ImageTensor;
use crate::ops::{PLAIN, stage_image, upload_staged};

#[derive(Debug, Clone)]
pub struct Params {
    pub image: StateId,
}

#[derive(Debug, Clone)]
pub struct TensorParams {
    pub image: ImageTensor,
}

pub async fn run(ctx: EditorContext, params: Params) -> Result<String, NodeError> {
    ctx.call(
        Skill::InferMainSubject,
        ctx.client().infer_main_subject(&params.image),
    )
    .await
}

pub async fn run_tensor(ctx: EditorContext, params: TensorParams) -> Result<String, NodeError> {
    let image = stage_image(&params.image, PLAIN, "Image")?;
    let image_id = upload_staged(&ctx, &image).await?;
    run(ctx, Params { image: image_id }).await
}
