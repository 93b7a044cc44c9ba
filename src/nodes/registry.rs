use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use crate::nodes::EditorNode;
use crate::nodes::high_level::{
    BlenderNode, BoxNode, EraserNode, InferMainSubjectNode, RecolorNode, SegmentNode, ShadowNode,
};
use crate::nodes::low_level::{
    DownloadImageNode, DownloadMaskNode, LowLevelBlenderNode, LowLevelBoxNode,
    LowLevelEraserNode, LowLevelInferMainSubjectNode, LowLevelRecolorNode, LowLevelSegmentNode,
    LowLevelShadowNode, UploadImageNode, UploadMaskNode,
};
use crate::nodes::utils::{
    ApplyTransparencyMaskNode, CreateBoundingBoxNode, DrawBoundingBoxNode,
    ImageCropBoundingBoxNode, MaskCropBoundingBoxNode,
};
use crate::nodes::value::{NodeInputs, SlotValue};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Title-keyed table of nodes, bound to one editor context.
///
/// This is what the host loads: it lists the nodes with their schemas and
/// routes invocations by title.
pub struct NodeRegistry {
    ctx: EditorContext,
    nodes: HashMap<String, Arc<dyn EditorNode>>,
}

impl NodeRegistry {
    pub fn new(ctx: EditorContext) -> Self {
        Self {
            ctx,
            nodes: HashMap::new(),
        }
    }

    /// A registry holding every node this crate ships.
    pub fn with_defaults(ctx: EditorContext) -> Self {
        let mut registry = Self::new(ctx);
        let defaults: Vec<Arc<dyn EditorNode>> = vec![
            // low level
            Arc::new(LowLevelBlenderNode),
            Arc::new(LowLevelBoxNode),
            Arc::new(LowLevelEraserNode),
            Arc::new(LowLevelInferMainSubjectNode),
            Arc::new(LowLevelRecolorNode),
            Arc::new(LowLevelSegmentNode),
            Arc::new(LowLevelShadowNode),
            Arc::new(DownloadImageNode),
            Arc::new(DownloadMaskNode),
            Arc::new(UploadImageNode),
            Arc::new(UploadMaskNode),
            // high level
            Arc::new(BlenderNode),
            Arc::new(BoxNode),
            Arc::new(EraserNode),
            Arc::new(InferMainSubjectNode),
            Arc::new(RecolorNode),
            Arc::new(SegmentNode),
            Arc::new(ShadowNode),
            // utils
            Arc::new(CreateBoundingBoxNode),
            Arc::new(DrawBoundingBoxNode),
            Arc::new(ImageCropBoundingBoxNode),
            Arc::new(MaskCropBoundingBoxNode),
            Arc::new(ApplyTransparencyMaskNode),
        ];
        for node in defaults {
            registry.register(node);
        }
        registry
    }

    /// Adds a node under its title, replacing any node with the same title.
    pub fn register(&mut self, node: Arc<dyn EditorNode>) {
        let title = node.title();
        if self.nodes.insert(title.clone(), node).is_some() {
            log::warn!("Node '{title}' was registered twice; keeping the latest");
        }
    }

    pub fn get(&self, title: &str) -> Option<&Arc<dyn EditorNode>> {
        self.nodes.get(title)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sorted node titles.
    pub fn titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        titles.sort_unstable();
        titles
    }

    /// Title to display name. Nodes are shown under their own titles.
    pub fn display_names(&self) -> HashMap<String, String> {
        self.nodes
            .keys()
            .map(|title| (title.clone(), title.clone()))
            .collect()
    }

    /// Every schema, keyed by title, in the host's JSON layout.
    pub fn schemas_json(&self) -> Value {
        let schemas: Map<String, Value> = self
            .nodes
            .iter()
            .map(|(title, node)| (title.clone(), node.schema().to_json()))
            .collect();
        Value::Object(schemas)
    }

    pub fn invoke(&self, title: &str, inputs: &NodeInputs) -> Result<Vec<SlotValue>, NodeError> {
        let node = self
            .get(title)
            .ok_or_else(|| NodeError::Validation(format!("unknown node '{title}'")))?;
        log::debug!("Invoking node '{title}'");
        node.process(&self.ctx, inputs)
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }
}
