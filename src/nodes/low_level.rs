//! Nodes that pass state ids, so a chain of skills can run without moving
//! pixels between steps. Upload and download nodes sit at either end.

use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::nodes::fields;
use crate::nodes::schema::{FieldSpec, InputSchema, NodeSchema, SlotKind};
use crate::nodes::value::{NodeInputs, SlotValue};
use crate::nodes::{EditorNode, LOW_LEVEL};
use crate::ops::{bbox, blend, erase, recolor, segment, shadow, subject, transfer};

fn state(name: &str, tooltip: &str) -> FieldSpec {
    FieldSpec::new(name, SlotKind::StateId).tooltip(tooltip)
}

pub struct LowLevelSegmentNode;

impl EditorNode for LowLevelSegmentNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new().required(state("image", "The image stateid to segment"));
        NodeSchema::new("[Low level] Segment", LOW_LEVEL)
            .description("Segment an object in an image.")
            .inputs(fields::segment(inputs))
            .output(SlotKind::StateId, "mask")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = segment::Params {
            image: inputs.state_id("image")?.clone(),
            options: fields::segment_options(inputs)?,
        };
        Ok(vec![ctx.run_one_sync(segment::run, params)?.into()])
    }
}

pub struct LowLevelEraserNode;

impl EditorNode for LowLevelEraserNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(state("image", "The image stateid to erase an object from"))
            .required(state("mask", "The mask stateid of the object to erase"));
        NodeSchema::new("[Low level] Eraser", LOW_LEVEL)
            .description("Erase an object from an image using a mask.")
            .inputs(fields::erase(inputs))
            .output(SlotKind::StateId, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = erase::Params {
            image: inputs.state_id("image")?.clone(),
            mask: inputs.state_id("mask")?.clone(),
            options: fields::erase_options(inputs)?,
        };
        Ok(vec![ctx.run_one_sync(erase::run, params)?.into()])
    }
}

pub struct LowLevelRecolorNode;

impl EditorNode for LowLevelRecolorNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(state("image", "The image stateid to recolor something in"))
            .required(state("mask", "The mask stateid of the object to recolor"));
        NodeSchema::new("[Low level] Recolor", LOW_LEVEL)
            .description("Recolor a masked object in an image.")
            .inputs(fields::recolor(inputs))
            .output(SlotKind::StateId, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = recolor::Params {
            image: inputs.state_id("image")?.clone(),
            mask: inputs.state_id("mask")?.clone(),
            options: fields::recolor_options(inputs)?,
        };
        Ok(vec![ctx.run_one_sync(recolor::run, params)?.into()])
    }
}

pub struct LowLevelBlenderNode;

impl EditorNode for LowLevelBlenderNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(state("scene", "The background scene stateid to blend the cutout into."))
            .required(state("cutout", "The object cutout stateid to blend into the scene."));
        NodeSchema::new("[Low level] Blender", LOW_LEVEL)
            .description("Blend an object cutout into a scene.")
            .inputs(fields::blend(inputs))
            .output(SlotKind::StateId, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = blend::Params {
            scene: inputs.state_id("scene")?.clone(),
            cutout: inputs.state_id("cutout")?.clone(),
            options: fields::blend_options(inputs)?,
        };
        Ok(vec![ctx.run_one_sync(blend::run, params)?.into()])
    }
}

pub struct LowLevelShadowNode;

impl EditorNode for LowLevelShadowNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new().required(state(
            "cutout",
            "The cutout stateid to create a shadow packshot from",
        ));
        NodeSchema::new("[Low level] Shadow", LOW_LEVEL)
            .description("Create a shadow packshot from a cutout.")
            .inputs(fields::shadow(inputs))
            .output(SlotKind::StateId, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = shadow::Params {
            cutout: inputs.state_id("cutout")?.clone(),
            options: fields::shadow_options(inputs)?,
        };
        Ok(vec![ctx.run_one_sync(shadow::run, params)?.into()])
    }
}

pub struct LowLevelBoxNode;

impl EditorNode for LowLevelBoxNode {
    fn schema(&self) -> NodeSchema {
        let inputs =
            InputSchema::new().required(state("image", "The image stateid to detect an object in"));
        NodeSchema::new("[Low level] Box", LOW_LEVEL)
            .description("Box an object in an image.")
            .inputs(fields::bbox(inputs))
            .output(SlotKind::Bbox, "bbox")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = bbox::Params {
            image: inputs.state_id("image")?.clone(),
            options: fields::box_options(inputs)?,
        };
        Ok(vec![ctx.run_one_sync(bbox::run, params)?.into()])
    }
}

pub struct LowLevelInferMainSubjectNode;

impl EditorNode for LowLevelInferMainSubjectNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(state("image", "The image stateid to guess the main subject of."));
        NodeSchema::new("[Low level] Infer Main Subject", LOW_LEVEL)
            .description("Infer the main subject in an image.")
            .inputs(inputs)
            .output(SlotKind::String, "subject")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let params = subject::Params {
            image: inputs.state_id("image")?.clone(),
        };
        Ok(vec![ctx.run_one_sync(subject::run, params)?.into()])
    }
}

pub struct UploadImageNode;

impl EditorNode for UploadImageNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(FieldSpec::new("image", SlotKind::Image).tooltip("The image to upload"));
        NodeSchema::new("[Low level] Upload Image", LOW_LEVEL)
            .description("Create a new state id from an image.")
            .inputs(inputs)
            .output(SlotKind::StateId, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let image = inputs.image("image")?.clone();
        Ok(vec![ctx.run_one_sync(transfer::upload_image, image)?.into()])
    }
}

pub struct UploadMaskNode;

impl EditorNode for UploadMaskNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new()
            .required(FieldSpec::new("mask", SlotKind::Mask).tooltip("The mask to upload"));
        NodeSchema::new("[Low level] Upload Mask", LOW_LEVEL)
            .description("Create a new state id from a mask.")
            .inputs(inputs)
            .output(SlotKind::StateId, "mask")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let mask = inputs.mask("mask")?.clone();
        Ok(vec![ctx.run_one_sync(transfer::upload_mask, mask)?.into()])
    }
}

pub struct DownloadImageNode;

impl EditorNode for DownloadImageNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new().required(state("image", "The image stateid to download"));
        NodeSchema::new("[Low level] Download Image", LOW_LEVEL)
            .description("Download an image from a state id.")
            .inputs(inputs)
            .output(SlotKind::Image, "image")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let state_id = inputs.state_id("image")?.clone();
        Ok(vec![ctx.run_one_sync(transfer::download_image, state_id)?.into()])
    }
}

pub struct DownloadMaskNode;

impl EditorNode for DownloadMaskNode {
    fn schema(&self) -> NodeSchema {
        let inputs = InputSchema::new().required(state("mask", "The mask stateid to download"));
        NodeSchema::new("[Low level] Download Mask", LOW_LEVEL)
            .description("Download a mask from a state id.")
            .inputs(inputs)
            .output(SlotKind::Mask, "mask")
    }

    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let state_id = inputs.state_id("mask")?.clone();
        Ok(vec![ctx.run_one_sync(transfer::download_mask, state_id)?.into()])
    }
}
