//! Local helper nodes: bounding-box construction and preview, cropping and
//! alpha compositing. None of these call the service.

use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::core::types::BoundingBox;
use crate::imaging::{ImageTensor, MaskTensor};
use crate::nodes::schema::{FieldSpec, InputSchema, NodeSchema, SlotKind};
use crate::nodes::value::{NodeInputs, SlotValue};
use crate::nodes::{EditorNode, UTILS};
use ndarray::{Axis, concatenate, s};

fn coordinate(name: &str) -> FieldSpec {
    FieldSpec::new(name, SlotKind::Int).default(0).min(0.0)
}

fn to_coordinate(inputs: &NodeInputs, name: &str) -> Result<u32, NodeError> {
    let value = inputs.int(name)?;
    u32::try_from(value)
        .map_err(|_| NodeError::Validation(format!("{name} must be a pixel coordinate, got {value}")))
}

/// Clamps `bbox` to a `height` x `width` raster and returns its row and
/// column ranges.
fn clamp(
    bbox: BoundingBox,
    height: usize,
    width: usize,
) -> Result<(std::ops::Range<usize>, std::ops::Range<usize>), NodeError> {
    let left = (bbox.left as usize).min(width);
    let right = (bbox.right as usize).min(width);
    let top = (bbox.top as usize).min(height);
    let bottom = (bbox.bottom as usize).min(height);
    if left >= right || top >= bottom {
        return Err(NodeError::Validation(format!(
            "bounding box {:?} does not overlap a {width}x{height} image",
            bbox.as_tuple()
        )));
    }
    Ok((top..bottom, left..right))
}

/// Crops an NHWC image tensor to `bbox`.
pub fn crop_image(image: &ImageTensor, bbox: BoundingBox) -> Result<ImageTensor, NodeError> {
    let (_, height, width, _) = image.dim();
    let (rows, cols) = clamp(bbox, height, width)?;
    Ok(image.slice(s![.., rows, cols, ..]).to_owned())
}

/// Crops an NHW mask tensor to `bbox`.
pub fn crop_mask(mask: &MaskTensor, bbox: BoundingBox) -> Result<MaskTensor, NodeError> {
    let (_, height, width) = mask.dim();
    let (rows, cols) = clamp(bbox, height, width)?;
    Ok(mask.slice(s![.., rows, cols]).to_owned())
}

/// Parses `#RRGGBB` into channel values in `0.0..=1.0`.
fn parse_hex_color(color: &str) -> Result<[f32; 3], NodeError> {
    let invalid = || NodeError::Validation(format!("color must look like #RRGGBB, got '{color}'"));
    let digits = color.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let mut rgb = [0.0; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        *channel = f32::from(byte) / 255.0;
    }
    Ok(rgb)
}

/// Draws the outline of `bbox` onto every frame of an NHWC image tensor.
///
/// The outline lies inside the box and is at most `thickness` pixels wide.
/// Alpha, if present, is left alone.
pub fn draw_bounding_box(
    image: &ImageTensor,
    bbox: BoundingBox,
    color: [f32; 3],
    thickness: usize,
) -> Result<ImageTensor, NodeError> {
    let (_, height, width, channels) = image.dim();
    if channels < 3 {
        return Err(NodeError::Validation(format!(
            "image must have 3 or 4 channels, got {channels}"
        )));
    }
    let (rows, cols) = clamp(bbox, height, width)?;
    let row_band = thickness.min(rows.len());
    let col_band = thickness.min(cols.len());
    let bands = [
        (rows.start..rows.start + row_band, cols.clone()),
        (rows.end - row_band..rows.end, cols.clone()),
        (rows.clone(), cols.start..cols.start + col_band),
        (rows.clone(), cols.end - col_band..cols.end),
    ];

    let mut drawn = image.clone();
    for (band_rows, band_cols) in bands {
        for (c, value) in color.iter().enumerate() {
            drawn
                .slice_mut(s![.., band_rows.clone(), band_cols.clone(), c])
                .fill(*value);
        }
    }
    Ok(drawn)
}

/// Uses `mask` as the alpha channel of `image`, replacing any existing alpha.
pub fn apply_transparency_mask(
    image: &ImageTensor,
    mask: &MaskTensor,
) -> Result<ImageTensor, NodeError> {
    let (batch, height, width, channels) = image.dim();
    if mask.dim() != (batch, height, width) {
        return Err(NodeError::Validation(format!(
            "Image and mask sizes do not match: {:?} vs {:?}",
            (batch, height, width),
            mask.dim()
        )));
    }
    if channels < 3 {
        return Err(NodeError::Validation(format!(
            "image must have 3 or 4 channels, got {channels}"
        )));
    }
    let rgb = image.slice(s![.., .., .., 0..3]);
    let alpha = mask.view().insert_axis(Axis(3));
    concatenate(Axis(3), &[rgb, alpha])
        .map_err(|err| NodeError::Validation(format!("cannot attach mask: {err}")))
}

pub struct CreateBoundingBoxNode;

impl EditorNode for CreateBoundingBoxNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(coordinate("left"))
            .required(coordinate("top"))
            .required(coordinate("right"))
            .required(coordinate("bottom"));
        NodeSchema::new("Create Bounding Box", UTILS)
            .description("Create a bounding box from its coordinates.")
            .inputs(inputs)
            .output(SlotKind::Bbox, "bbox")
    }

    fn process(&self, _ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let bbox = BoundingBox::new(
            to_coordinate(inputs, "left")?,
            to_coordinate(inputs, "top")?,
            to_coordinate(inputs, "right")?,
            to_coordinate(inputs, "bottom")?,
        );
        Ok(vec![bbox.into()])
    }
}

pub struct ImageCropBoundingBoxNode;

impl EditorNode for ImageCropBoundingBoxNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(FieldSpec::new("image", SlotKind::Image).tooltip("The image to crop"))
            .required(FieldSpec::new("bbox", SlotKind::Bbox).tooltip("The region to keep"));
        NodeSchema::new("Image Crop Bounding Box", UTILS)
            .description("Crop an image to a bounding box.")
            .inputs(inputs)
            .output(SlotKind::Image, "image")
    }

    fn process(&self, _ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let cropped = crop_image(inputs.image("image")?, inputs.bbox("bbox")?)?;
        Ok(vec![cropped.into()])
    }
}

pub struct MaskCropBoundingBoxNode;

impl EditorNode for MaskCropBoundingBoxNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(FieldSpec::new("mask", SlotKind::Mask).tooltip("The mask to crop"))
            .required(FieldSpec::new("bbox", SlotKind::Bbox).tooltip("The region to keep"));
        NodeSchema::new("Mask Crop Bounding Box", UTILS)
            .description("Crop a mask to a bounding box.")
            .inputs(inputs)
            .output(SlotKind::Mask, "mask")
    }

    fn process(&self, _ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let cropped = crop_mask(inputs.mask("mask")?, inputs.bbox("bbox")?)?;
        Ok(vec![cropped.into()])
    }
}

pub struct DrawBoundingBoxNode;

impl EditorNode for DrawBoundingBoxNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(FieldSpec::new("image", SlotKind::Image).tooltip("The image to draw on"))
            .required(FieldSpec::new("bbox", SlotKind::Bbox).tooltip("The box to outline"))
            .required(
                FieldSpec::new("color", SlotKind::String)
                    .default("#FF0000")
                    .tooltip("Outline color as #RRGGBB"),
            )
            .required(
                FieldSpec::new("thickness", SlotKind::Int)
                    .default(2)
                    .min(1.0)
                    .max(64.0)
                    .tooltip("Outline width in pixels"),
            );
        NodeSchema::new("Draw Bounding Box", UTILS)
            .description("Outline a bounding box on an image for preview.")
            .inputs(inputs)
            .output(SlotKind::Image, "image")
    }

    fn process(&self, _ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let color = parse_hex_color(inputs.string("color")?)?;
        let thickness = inputs.int("thickness")?;
        let thickness = usize::try_from(thickness)
            .ok()
            .filter(|t| *t > 0)
            .ok_or_else(|| {
                NodeError::Validation(format!("thickness must be positive, got {thickness}"))
            })?;
        let drawn = draw_bounding_box(inputs.image("image")?, inputs.bbox("bbox")?, color, thickness)?;
        Ok(vec![drawn.into()])
    }
}

pub struct ApplyTransparencyMaskNode;

impl EditorNode for ApplyTransparencyMaskNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(FieldSpec::new("image", SlotKind::Image).tooltip("The image to cut out"))
            .required(
                FieldSpec::new("mask", SlotKind::Mask).tooltip("The mask to use as transparency"),
            );
        NodeSchema::new("Apply Transparency Mask", UTILS)
            .description("Turn an image and a mask into an RGBA cutout.")
            .inputs(inputs)
            .output(SlotKind::Image, "image")
    }

    fn process(&self, _ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let cutout = apply_transparency_mask(inputs.image("image")?, inputs.mask("mask")?)?;
        Ok(vec![cutout.into()])
    }
}
