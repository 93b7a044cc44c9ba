//! Locate a described object and return its bounding box.

use crate::core::client::InferBboxRequest;
use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::{BoundingBox, Skill, StateId};
use crate::core::validation::{Validate, ValidationReport};
use crate::imaging::ImageTensor;
use crate::ops::{PLAIN, stage_image, upload_staged};

#[derive(Debug, Clone, PartialEq)]
pub struct BoxOptions {
    /// Free-text description of the object, such as "red mug".
    pub prompt: String,
}

impl Validate for BoxOptions {
    fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.non_empty("prompt", &self.prompt);
        report
    }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub image: StateId,
    pub options: BoxOptions,
}

#[derive(Debug, Clone)]
pub struct TensorParams {
    pub image: ImageTensor,
    pub options: BoxOptions,
}

async fn script(
    ctx: &EditorContext,
    image: StateId,
    options: BoxOptions,
) -> Result<BoundingBox, NodeError> {
    let request = InferBboxRequest {
        state_id: image,
        product_name: options.prompt,
    };
    ctx.call(Skill::InferBbox, ctx.client().infer_bbox(request))
        .await
}

pub async fn run(ctx: EditorContext, params: Params) -> Result<BoundingBox, NodeError> {
    params.options.validate()?;
    script(&ctx, params.image, params.options).await
}

pub async fn run_tensor(ctx: EditorContext, params: TensorParams) -> Result<BoundingBox, NodeError> {
    params.options.validate()?;
    let image = stage_image(&params.image, PLAIN, "Image")?;

    let image_id = upload_staged(&ctx, &image).await?;
    script(&ctx, image_id, params.options).await
}
