//! Composite a cutout into a scene at a bounding box.

use crate::core::client::BlendRequest;
use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::{BLEND_MODES, BoundingBox, Mode, Skill, StateId};
use crate::core::validation::{Validate, ValidationReport};
use crate::imaging::ImageTensor;
use crate::ops::{CUTOUT, PLAIN, fetch_image, stage_image, upload_staged};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendOptions {
    /// Where the cutout lands in the scene.
    pub bbox: BoundingBox,
    /// Mirror the cutout horizontally.
    pub flip: bool,
    /// Degrees, within `[-360, 360]`.
    pub rotation_angle: f64,
    /// `Premium` is not offered for blending.
    pub mode: Mode,
    pub seed: i64,
}

impl Validate for BlendOptions {
    fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report
            .mode(self.mode, BLEND_MODES)
            .seed(self.seed)
            .rotation_angle(self.rotation_angle);
        report
    }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub scene: StateId,
    pub cutout: StateId,
    pub options: BlendOptions,
}

#[derive(Debug, Clone)]
pub struct TensorParams {
    /// RGB scene.
    pub scene: ImageTensor,
    /// RGBA cutout.
    pub cutout: ImageTensor,
    pub options: BlendOptions,
}

async fn script(
    ctx: &EditorContext,
    scene: StateId,
    cutout: StateId,
    options: &BlendOptions,
) -> Result<StateId, NodeError> {
    let request = BlendRequest {
        image_state_id: scene,
        mask_state_id: cutout,
        bbox: options.bbox,
        flip: options.flip,
        rotation_angle: options.rotation_angle,
        mode: options.mode,
        seed: options.seed,
    };
    ctx.call(Skill::Blend, ctx.client().blend(request)).await
}

pub async fn run(ctx: EditorContext, params: Params) -> Result<StateId, NodeError> {
    params.options.validate()?;
    script(&ctx, params.scene, params.cutout, &params.options).await
}

pub async fn run_tensor(ctx: EditorContext, params: TensorParams) -> Result<ImageTensor, NodeError> {
    params.options.validate()?;
    let scene = stage_image(&params.scene, PLAIN, "Scene")?;
    let cutout = stage_image(&params.cutout, CUTOUT, "Cutout")?;

    let scene_id = upload_staged(&ctx, &scene).await?;
    let cutout_id = upload_staged(&ctx, &cutout).await?;
    let blended = script(&ctx, scene_id, cutout_id, &params.options).await?;
    fetch_image(&ctx, &blended).await
}
