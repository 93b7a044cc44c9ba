//! Nodes that take tensors, upload them, run one operation and download
//! the result.

use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::nodes::fields;
use crate::nodes::schema::{FieldSpec, InputSchema, NodeSchema, SlotKind};
use crate::nodes::value::{NodeInputs, SlotValue};
use crate::nodes::{EditorNode, HIGH_LEVEL};
use crate::ops::{bbox, blend, erase, recolor, segment, shadow, subject};

pub struct SegmentNode;

impl EditorNode for SegmentNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(FieldSpec::new("image", SlotKind::Image).tooltip("The image to segment"));
        NodeSchema::new("Segment", HIGH_LEVEL)
            .description("Segment an object in an image.")
            .inputs(fields::segment(inputs))
            .output(SlotKind::Mask, "mask")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = segment::TensorParams {
            image: inputs.image("image")?.clone(),
            options: fields::segment_options(inputs)?,
        };
        let mask = ctx.run_one_sync(segment::run_tensor, params)?;
        Ok(vec![mask.into()])
    }
}

pub struct EraserNode;

impl EditorNode for EraserNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(
                FieldSpec::new("image", SlotKind::Image).tooltip("The image to erase an object from"),
            )
            .required(
                FieldSpec::new("mask", SlotKind::Mask).tooltip("The mask of the object to erase"),
            );
        NodeSchema::new("Eraser", HIGH_LEVEL)
            .description("Erase an object from an image using a mask.")
            .inputs(fields::erase(inputs))
            .output(SlotKind::Image, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = erase::TensorParams {
            image: inputs.image("image")?.clone(),
            mask: inputs.mask("mask")?.clone(),
            options: fields::erase_options(inputs)?,
        };
        let image = ctx.run_one_sync(erase::run_tensor, params)?;
        Ok(vec![image.into()])
    }
}

pub struct RecolorNode;

impl EditorNode for RecolorNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(
                FieldSpec::new("image", SlotKind::Image)
                    .tooltip("The image to recolor something in"),
            )
            .required(
                FieldSpec::new("mask", SlotKind::Mask).tooltip("The mask of the object to recolor"),
            );
        NodeSchema::new("Recolor", HIGH_LEVEL)
            .description("Recolor a masked object in an image.")
            .inputs(fields::recolor(inputs))
            .output(SlotKind::Image, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = recolor::TensorParams {
            image: inputs.image("image")?.clone(),
            mask: inputs.mask("mask")?.clone(),
            options: fields::recolor_options(inputs)?,
        };
        let image = ctx.run_one_sync(recolor::run_tensor, params)?;
        Ok(vec![image.into()])
    }
}

pub struct BlenderNode;

impl EditorNode for BlenderNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(
                FieldSpec::new("scene", SlotKind::Image)
                    .tooltip("The background scene to blend the cutout into."),
            )
            .required(
                FieldSpec::new("cutout", SlotKind::Image)
                    .tooltip("The object cutout to blend into the scene."),
            );
        NodeSchema::new("Blender", HIGH_LEVEL)
            .description("Blend an object cutout into a scene.")
            .inputs(fields::blend(inputs))
            .output(SlotKind::Image, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = blend::TensorParams {
            scene: inputs.image("scene")?.clone(),
            cutout: inputs.image("cutout")?.clone(),
            options: fields::blend_options(inputs)?,
        };
        let image = ctx.run_one_sync(blend::run_tensor, params)?;
        Ok(vec![image.into()])
    }
}

pub struct ShadowNode;

impl EditorNode for ShadowNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new().required(
            FieldSpec::new("cutout", SlotKind::Image)
                .tooltip("The cutout to create a shadow packshot from"),
        );
        NodeSchema::new("Shadow", HIGH_LEVEL)
            .description("Create a shadow packshot from a cutout.")
            .inputs(fields::shadow(inputs))
            .output(SlotKind::Image, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = shadow::TensorParams {
            cutout: inputs.image("cutout")?.clone(),
            options: fields::shadow_options(inputs)?,
        };
        let image = ctx.run_one_sync(shadow::run_tensor, params)?;
        Ok(vec![image.into()])
    }
}

pub struct BoxNode;

impl EditorNode for BoxNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new().required(
            FieldSpec::new("image", SlotKind::Image).tooltip("The image to detect an object in"),
        );
        NodeSchema::new("Box", HIGH_LEVEL)
            .description("Box an object in an image.")
            .inputs(fields::bbox(inputs))
            .output(SlotKind::Bbox, "bbox")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = bbox::TensorParams {
            image: inputs.image("image")?.clone(),
            options: fields::box_options(inputs)?,
        };
        let found = ctx.run_one_sync(bbox::run_tensor, params)?;
        Ok(vec![found.into()])
    }
}

pub struct InferMainSubjectNode;

impl EditorNode for InferMainSubjectNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new().required(
            FieldSpec::new("image", SlotKind::Image)
                .tooltip("The image to guess the main subject of."),
        );
        NodeSchema::new("Infer Main Subject", HIGH_LEVEL)
            .description("Infer the main subject in an image.")
            .inputs(inputs)
            .output(SlotKind::String, "subject")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = subject::TensorParams {
            image: inputs.image("image")?.clone(),
        };
        let name = ctx.run_one_sync(subject::run_tensor, params)?;
        Ok(vec![name.into()])
    }
}
