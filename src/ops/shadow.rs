//! Render a cutout with a generated shadow, optionally on a solid background.

use crate::core::client::{BackgroundColorRequest, ShadowRequest};
use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::{BoundingBox, Skill, StateId};
use crate::core::validation::{Validate, ValidationReport};
use crate::imaging::ImageTensor;
use crate::ops::{CUTOUT, fetch_image, stage_image, upload_staged};

/// Background value that keeps the shadow output transparent.
pub const TRANSPARENT: &str = "transparent";

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowOptions {
    pub width: i64,
    pub height: i64,
    pub seed: i64,
    /// `None` and `"transparent"` both skip the background step.
    pub bgcolor: Option<String>,
    /// Placement of the cutout in the output; the service picks one when absent.
    pub bbox: Option<BoundingBox>,
}

impl ShadowOptions {
    pub fn new(width: i64, height: i64) -> Self {
        ShadowOptions {
            width,
            height,
            seed: 0,
            bgcolor: None,
            bbox: None,
        }
    }

    /// The colour to paint behind the shadow, if any.
    pub fn background(&self) -> Option<&str> {
        self.bgcolor
            .as_deref()
            .filter(|color| !color.is_empty() && *color != TRANSPARENT)
    }

    fn resolution(&self) -> Result<(u32, u32), NodeError> {
        let side = |value: i64, field: &str| {
            u32::try_from(value)
                .map_err(|_| NodeError::Validation(format!("{field} {value} is out of range")))
        };
        Ok((side(self.width, "width")?, side(self.height, "height")?))
    }
}

impl Validate for ShadowOptions {
    fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report
            .seed(self.seed)
            .min_side("width", self.width)
            .min_side("height", self.height);
        if self.resolution().is_err() {
            report.add("resolution", "Resolution does not fit 32 bits");
        }
        report
    }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub cutout: StateId,
    pub options: ShadowOptions,
}

#[derive(Debug, Clone)]
pub struct TensorParams {
    /// RGBA cutout.
    pub cutout: ImageTensor,
    pub options: ShadowOptions,
}

async fn script(
    ctx: &EditorContext,
    cutout: StateId,
    options: &ShadowOptions,
) -> Result<StateId, NodeError> {
    let request = ShadowRequest {
        state_id: cutout,
        resolution: options.resolution()?,
        bbox: options.bbox,
        seed: options.seed,
    };
    let shadowed = ctx.call(Skill::Shadow, ctx.client().shadow(request)).await?;

    let Some(background) = options.background() else {
        return Ok(shadowed);
    };
    let request = BackgroundColorRequest {
        state_id: shadowed,
        background: background.to_string(),
    };
    ctx.call(
        Skill::SetBackgroundColor,
        ctx.client().set_background_color(request),
    )
    .await
}

pub async fn run(ctx: EditorContext, params: Params) -> Result<StateId, NodeError> {
    params.options.validate()?;
    script(&ctx, params.cutout, &params.options).await
}

pub async fn run_tensor(ctx: EditorContext, params: TensorParams) -> Result<ImageTensor, NodeError> {
    params.options.validate()?;
    let cutout = stage_image(&params.cutout, CUTOUT, "Cutout")?;

    let cutout_id = upload_staged(&ctx, &cutout).await?;
    let shadowed = script(&ctx, cutout_id, &params.options).await?;
    fetch_image(&ctx, &shadowed).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_selection() {
        let mut options = ShadowOptions::new(512, 512);
        assert_eq!(options.background(), None);

        options.bgcolor = Some(TRANSPARENT.to_string());
        assert_eq!(options.background(), None);

        options.bgcolor = Some("#ffffff".to_string());
        assert_eq!(options.background(), Some("#ffffff"));
    }

    #[test]
    fn test_minimum_side() {
        assert!(ShadowOptions::new(8, 8).validate().is_ok());

        let report = ShadowOptions::new(7, 4).report();
        let fields: Vec<_> = report.issues.iter().map(|issue| issue.field).collect();
        assert_eq!(fields, vec!["width", "height"]);
    }

    #[test]
    fn test_oversized_resolution() {
        let options = ShadowOptions::new(i64::from(u32::MAX) + 1, 64);
        assert!(options.validate().is_err());
    }
}
