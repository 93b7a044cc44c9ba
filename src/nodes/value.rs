//! Values flowing into and out of node slots.

use crate::core::error::NodeError;
use crate::core::types::{BoundingBox, Mode, StateId};
use crate::imaging::{ImageTensor, MaskTensor};
use crate::nodes::schema::SlotKind;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Image(ImageTensor),
    Mask(MaskTensor),
    StateId(StateId),
    Bbox(BoundingBox),
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl SlotValue {
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotValue::Image(_) => SlotKind::Image,
            SlotValue::Mask(_) => SlotKind::Mask,
            SlotValue::StateId(_) => SlotKind::StateId,
            SlotValue::Bbox(_) => SlotKind::Bbox,
            SlotValue::Int(_) => SlotKind::Int,
            SlotValue::Float(_) => SlotKind::Float,
            SlotValue::Boolean(_) => SlotKind::Boolean,
            SlotValue::String(_) => SlotKind::String,
        }
    }

    pub fn as_image(&self) -> Option<&ImageTensor> {
        match self {
            SlotValue::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_mask(&self) -> Option<&MaskTensor> {
        match self {
            SlotValue::Mask(mask) => Some(mask),
            _ => None,
        }
    }

    pub fn as_state_id(&self) -> Option<&StateId> {
        match self {
            SlotValue::StateId(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_bbox(&self) -> Option<BoundingBox> {
        match self {
            SlotValue::Bbox(bbox) => Some(*bbox),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SlotValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<ImageTensor> for SlotValue {
    fn from(value: ImageTensor) -> Self {
        SlotValue::Image(value)
    }
}

impl From<MaskTensor> for SlotValue {
    fn from(value: MaskTensor) -> Self {
        SlotValue::Mask(value)
    }
}

impl From<StateId> for SlotValue {
    fn from(value: StateId) -> Self {
        SlotValue::StateId(value)
    }
}

impl From<BoundingBox> for SlotValue {
    fn from(value: BoundingBox) -> Self {
        SlotValue::Bbox(value)
    }
}

impl From<i64> for SlotValue {
    fn from(value: i64) -> Self {
        SlotValue::Int(value)
    }
}

impl From<f64> for SlotValue {
    fn from(value: f64) -> Self {
        SlotValue::Float(value)
    }
}

impl From<bool> for SlotValue {
    fn from(value: bool) -> Self {
        SlotValue::Boolean(value)
    }
}

impl From<&str> for SlotValue {
    fn from(value: &str) -> Self {
        SlotValue::String(value.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(value: String) -> Self {
        SlotValue::String(value)
    }
}

/// Named input values for one node invocation.
///
/// Required getters fail with [`NodeError::Validation`] when the input is
/// missing or holds another kind; the `optional_*` getters only fail on the
/// latter.
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    values: HashMap<String, SlotValue>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<SlotValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SlotValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&SlotValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn required(&self, name: &str) -> Result<&SlotValue, NodeError> {
        self.values
            .get(name)
            .ok_or_else(|| NodeError::Validation(format!("missing required input '{name}'")))
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: SlotKind,
        pick: impl Fn(&'a SlotValue) -> Option<T>,
    ) -> Result<T, NodeError> {
        let value = self.required(name)?;
        pick(value).ok_or_else(|| mismatch(name, expected, value))
    }

    fn optional<'a, T>(
        &'a self,
        name: &str,
        expected: SlotKind,
        pick: impl Fn(&'a SlotValue) -> Option<T>,
    ) -> Result<Option<T>, NodeError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) => pick(value)
                .map(Some)
                .ok_or_else(|| mismatch(name, expected, value)),
        }
    }

    pub fn image(&self, name: &str) -> Result<&ImageTensor, NodeError> {
        self.typed(name, SlotKind::Image, SlotValue::as_image)
    }

    pub fn mask(&self, name: &str) -> Result<&MaskTensor, NodeError> {
        self.typed(name, SlotKind::Mask, SlotValue::as_mask)
    }

    pub fn state_id(&self, name: &str) -> Result<&StateId, NodeError> {
        self.typed(name, SlotKind::StateId, SlotValue::as_state_id)
    }

    pub fn bbox(&self, name: &str) -> Result<BoundingBox, NodeError> {
        self.typed(name, SlotKind::Bbox, SlotValue::as_bbox)
    }

    pub fn optional_bbox(&self, name: &str) -> Result<Option<BoundingBox>, NodeError> {
        self.optional(name, SlotKind::Bbox, SlotValue::as_bbox)
    }

    pub fn int(&self, name: &str) -> Result<i64, NodeError> {
        self.typed(name, SlotKind::Int, |value| match value {
            SlotValue::Int(n) => Some(*n),
            _ => None,
        })
    }

    /// Integers are accepted where a float is expected.
    pub fn float(&self, name: &str) -> Result<f64, NodeError> {
        self.typed(name, SlotKind::Float, |value| match value {
            SlotValue::Float(x) => Some(*x),
            SlotValue::Int(n) => Some(*n as f64),
            _ => None,
        })
    }

    pub fn boolean(&self, name: &str) -> Result<bool, NodeError> {
        self.typed(name, SlotKind::Boolean, |value| match value {
            SlotValue::Boolean(b) => Some(*b),
            _ => None,
        })
    }

    pub fn string(&self, name: &str) -> Result<&str, NodeError> {
        self.typed(name, SlotKind::String, SlotValue::as_str)
    }

    pub fn optional_string(&self, name: &str) -> Result<Option<&str>, NodeError> {
        self.optional(name, SlotKind::String, SlotValue::as_str)
    }

    /// A mode given as its lowercase name.
    pub fn mode(&self, name: &str) -> Result<Mode, NodeError> {
        self.string(name)?.parse()
    }
}

fn mismatch(name: &str, expected: SlotKind, found: &SlotValue) -> NodeError {
    NodeError::Validation(format!(
        "input '{name}' must be {}, got {}",
        expected.as_str(),
        found.kind().as_str()
    ))
}
