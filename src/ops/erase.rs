//! Remove the masked region of an image and fill it in.

use crate::core::client::EraseRequest;
use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::{ERASE_MODES, Mode, Skill, StateId};
use crate::core::validation::{Validate, ValidationReport};
use crate::imaging::{ImageTensor, MaskTensor};
use crate::ops::{fetch_image, stage_masked_image, upload_staged};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraseOptions {
    pub mode: Mode,
    pub seed: i64,
}

impl Default for EraseOptions {
    fn default() -> Self {
        EraseOptions {
            mode: Mode::Standard,
            seed: 0,
        }
    }
}

impl Validate for EraseOptions {
    fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.mode(self.mode, ERASE_MODES).seed(self.seed);
        report
    }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub image: StateId,
    pub mask: StateId,
    pub options: EraseOptions,
}

#[derive(Debug, Clone)]
pub struct TensorParams {
    pub image: ImageTensor,
    pub mask: MaskTensor,
    pub options: EraseOptions,
}

async fn script(
    ctx: &EditorContext,
    image: StateId,
    mask: StateId,
    options: &EraseOptions,
) -> Result<StateId, NodeError> {
    let request = EraseRequest {
        image_state_id: image,
        mask_state_id: mask,
        mode: options.mode,
        seed: options.seed,
    };
    ctx.call(Skill::Erase, ctx.client().erase(request)).await
}

pub async fn run(ctx: EditorContext, params: Params) -> Result<StateId, NodeError> {
    params.options.validate()?;
    script(&ctx, params.image, params.mask, &params.options).await
}

pub async fn run_tensor(ctx: EditorContext, params: TensorParams) -> Result<ImageTensor, NodeError> {
    params.options.validate()?;
    let (image, mask) = stage_masked_image(&params.image, &params.mask)?;

    let image_id = upload_staged(&ctx, &image).await?;
    let mask_id = upload_staged(&ctx, &mask).await?;
    let erased = script(&ctx, image_id, mask_id, &params.options).await?;
    fetch_image(&ctx, &erased).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_modes_allowed() {
        for mode in [Mode::Premium, Mode::Standard, Mode::Express] {
            let options = EraseOptions { mode, seed: 42 };
            assert!(options.validate().is_ok());
        }
    }

    #[test]
    fn test_seed_out_of_range() {
        let options = EraseOptions {
            mode: Mode::Express,
            seed: 1000,
        };
        assert!(options.validate().unwrap_err().is_validation());
    }
}
