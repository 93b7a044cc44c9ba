//! Operation scripts.
//!
//! Every operation is a short sequential pipeline over the skill client:
//! validate, call one to three dependent skills, return. Each module
//! exposes two task bodies suitable for [`EditorContext::run_one_sync`]:
//!
//! - `run` works on [`StateId`] handles (the low-level variant);
//! - `run_tensor` takes tensors, checks their colour modes, uploads them,
//!   runs the very same script as `run` and downloads the result.
//!
//! Validation of an operation's options always happens before the first
//! remote call. A rejected call aborts the script; state created by earlier
//! calls is left to the service.

pub mod bbox;
pub mod blend;
pub mod erase;
pub mod recolor;
pub mod segment;
pub mod shadow;
pub mod subject;
pub mod transfer;

use crate::core::client::DownloadOptions;
use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::{Skill, StateId};
use crate::imaging::{
    self, ColorMode, ImageTensor, MaskTensor, bytes_to_image, image_to_bytes,
};
use image::DynamicImage;

/// Plain images carry no alpha channel.
pub(crate) const PLAIN: &[ColorMode] = &[ColorMode::Rgb];
/// Cutouts isolate a subject on a transparent background.
pub(crate) const CUTOUT: &[ColorMode] = &[ColorMode::Rgba];
pub(crate) const ANY_IMAGE: &[ColorMode] = &[ColorMode::Rgb, ColorMode::Rgba];
pub(crate) const MASK: &[ColorMode] = &[ColorMode::L];

/// Converts an image tensor and checks its colour mode, without touching the network.
pub(crate) fn stage_image(
    tensor: &ImageTensor,
    allowed: &[ColorMode],
    what: &str,
) -> Result<DynamicImage, NodeError> {
    let image = imaging::image_tensor_to_image(tensor)?;
    imaging::expect_mode(&image, allowed, what)?;
    Ok(image)
}

pub(crate) fn stage_mask(mask: &MaskTensor) -> Result<DynamicImage, NodeError> {
    let image = imaging::mask_tensor_to_image(mask)?;
    imaging::expect_mode(&image, MASK, "Mask")?;
    Ok(image)
}

/// Image and mask pair used by erase and recolor.
pub(crate) fn stage_masked_image(
    image: &ImageTensor,
    mask: &MaskTensor,
) -> Result<(DynamicImage, DynamicImage), NodeError> {
    let image = stage_image(image, PLAIN, "Image")?;
    let mask = stage_mask(mask)?;
    imaging::expect_same_size(&image, &mask)?;
    Ok((image, mask))
}

pub(crate) async fn upload_staged(
    ctx: &EditorContext,
    image: &DynamicImage,
) -> Result<StateId, NodeError> {
    let bytes = image_to_bytes(image)?;
    ctx.call(Skill::Upload, ctx.client().upload(bytes)).await
}

pub(crate) async fn fetch(ctx: &EditorContext, state_id: &StateId) -> Result<DynamicImage, NodeError> {
    let options = DownloadOptions::default();
    let bytes = ctx
        .call(Skill::Download, ctx.client().download(state_id, &options))
        .await?;
    bytes_to_image(&bytes)
}

pub(crate) async fn fetch_image(
    ctx: &EditorContext,
    state_id: &StateId,
) -> Result<ImageTensor, NodeError> {
    Ok(imaging::image_to_image_tensor(&fetch(ctx, state_id).await?))
}

pub(crate) async fn fetch_mask(
    ctx: &EditorContext,
    state_id: &StateId,
) -> Result<MaskTensor, NodeError> {
    Ok(imaging::image_to_mask_tensor(&fetch(ctx, state_id).await?))
}
