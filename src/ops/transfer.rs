//! Moving tensors to and from the service.
//!
//! These back the upload and download nodes, which let a graph keep work on
//! the service side across several low-level nodes.

use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::StateId;
use crate::imaging::{ImageTensor, MaskTensor};
use crate::ops::{ANY_IMAGE, fetch_image, fetch_mask, stage_image, stage_mask, upload_staged};

/// Uploads an RGB or RGBA image.
pub async fn upload_image(ctx: EditorContext, image: ImageTensor) -> Result<StateId, NodeError> {
    let image = stage_image(&image, ANY_IMAGE, "Image")?;
    upload_staged(&ctx, &image).await
}

/// Uploads a single-channel mask.
pub async fn upload_mask(ctx: EditorContext, mask: MaskTensor) -> Result<StateId, NodeError> {
    let mask = stage_mask(&mask)?;
    upload_staged(&ctx, &mask).await
}

pub async fn download_image(ctx: EditorContext, state_id: StateId) -> Result<ImageTensor, NodeError> {
    fetch_image(&ctx, &state_id).await
}

/// Downloads a mask; colour results are collapsed to luminance.
pub async fn download_mask(ctx: EditorContext, state_id: StateId) -> Result<MaskTensor, NodeError> {
    fetch_mask(&ctx, &state_id).await
}
