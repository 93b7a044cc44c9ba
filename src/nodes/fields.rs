//! Inputs shared by the high-level and low-level variants of a node.
//!
//! Both variants of an operation expose the same option widgets and read
//! them the same way; only the image slots differ.

use crate::core::error::NodeError;
use crate::core::types::{BLEND_MODES, ERASE_MODES, Mode};
use crate::core::validation::{MIN_SHADOW_SIDE, ROTATION_LIMIT, SEED_MAX, SEED_MIN};
use crate::nodes::schema::{FieldSpec, InputSchema, SlotKind};
use crate::nodes::value::NodeInputs;
use crate::ops::bbox::BoxOptions;
use crate::ops::blend::BlendOptions;
use crate::ops::erase::EraseOptions;
use crate::ops::recolor::RecolorOptions;
use crate::ops::segment::SegmentOptions;
use crate::ops::shadow::{ShadowOptions, TRANSPARENT};

const MAX_SHADOW_SIDE: f64 = 2048.0;

fn modes(allowed: &[Mode]) -> Vec<&'static str> {
    allowed.iter().map(Mode::as_str).collect()
}

fn seed() -> FieldSpec {
    FieldSpec::new("seed", SlotKind::Int)
        .default(1)
        .min(SEED_MIN as f64)
        .max(SEED_MAX as f64)
        .tooltip("Seed for the random number generator.")
}

fn side(name: &str, tooltip: &str) -> FieldSpec {
    FieldSpec::new(name, SlotKind::Int)
        .default(1024)
        .min(MIN_SHADOW_SIDE as f64)
        .max(MAX_SHADOW_SIDE)
        .step(8.0)
        .tooltip(tooltip)
}

pub(crate) fn segment(schema: InputSchema) -> InputSchema {
    schema
        .required(
            FieldSpec::new("bbox", SlotKind::Bbox).tooltip("Bounding box of the object to segment"),
        )
        .required(
            FieldSpec::new("cropped", SlotKind::Boolean)
                .default(false)
                .tooltip("Crop the mask to the bounding box"),
        )
}

pub(crate) fn segment_options(inputs: &NodeInputs) -> Result<SegmentOptions, NodeError> {
    Ok(SegmentOptions {
        bbox: inputs.bbox("bbox")?,
        cropped: inputs.boolean("cropped")?,
    })
}

pub(crate) fn erase(schema: InputSchema) -> InputSchema {
    schema
        .required(FieldSpec::choice("mode", modes(ERASE_MODES)))
        .required(seed())
}

pub(crate) fn erase_options(inputs: &NodeInputs) -> Result<EraseOptions, NodeError> {
    Ok(EraseOptions {
        mode: inputs.mode("mode")?,
        seed: inputs.int("seed")?,
    })
}

pub(crate) fn recolor(schema: InputSchema) -> InputSchema {
    schema.required(
        FieldSpec::new("color", SlotKind::String)
            .default("#ff0000")
            .tooltip("The color to recolor the object to"),
    )
}

pub(crate) fn recolor_options(inputs: &NodeInputs) -> Result<RecolorOptions, NodeError> {
    Ok(RecolorOptions {
        color: inputs.string("color")?.to_string(),
    })
}

pub(crate) fn blend(schema: InputSchema) -> InputSchema {
    schema
        .required(
            FieldSpec::new("bbox", SlotKind::Bbox)
                .tooltip("Bounding box of where to place the cutout in the scene."),
        )
        .required(FieldSpec::choice("mode", modes(BLEND_MODES)))
        .required(
            FieldSpec::new("flip", SlotKind::Boolean)
                .default(false)
                .tooltip("Flip the cutout horizontally before blending."),
        )
        .required(
            FieldSpec::new("rotation_angle", SlotKind::Float)
                .default(0.0)
                .min(-ROTATION_LIMIT)
                .max(ROTATION_LIMIT)
                .tooltip("Rotate the cutout by the specified angle before blending."),
        )
        .required(seed())
}

pub(crate) fn blend_options(inputs: &NodeInputs) -> Result<BlendOptions, NodeError> {
    Ok(BlendOptions {
        bbox: inputs.bbox("bbox")?,
        flip: inputs.boolean("flip")?,
        rotation_angle: inputs.float("rotation_angle")?,
        mode: inputs.mode("mode")?,
        seed: inputs.int("seed")?,
    })
}

pub(crate) fn shadow(schema: InputSchema) -> InputSchema {
    schema
        .required(side("width", "Width of the output image."))
        .required(side("height", "Height of the output image."))
        .required(seed())
        .required(
            FieldSpec::new("bgcolor", SlotKind::String)
                .default(TRANSPARENT)
                .tooltip("Background color of the shadow."),
        )
        .optional(
            FieldSpec::new("bbox", SlotKind::Bbox)
                .tooltip("Bounding box of where to place the object in the output image."),
        )
}

pub(crate) fn shadow_options(inputs: &NodeInputs) -> Result<ShadowOptions, NodeError> {
    Ok(ShadowOptions {
        width: inputs.int("width")?,
        height: inputs.int("height")?,
        seed: inputs.int("seed")?,
        bgcolor: inputs.optional_string("bgcolor")?.map(str::to_string),
        bbox: inputs.optional_bbox("bbox")?,
    })
}

pub(crate) fn bbox(schema: InputSchema) -> InputSchema {
    schema.required(FieldSpec::new("prompt", SlotKind::String).tooltip("The product name to detect"))
}

pub(crate) fn box_options(inputs: &NodeInputs) -> Result<BoxOptions, NodeError> {
    Ok(BoxOptions {
        prompt: inputs.string("prompt")?.to_string(),
    })
}
