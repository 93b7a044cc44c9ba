//! Node descriptions handed to the graph host.
//!
//! The host reads a JSON layout where each input maps to a pair of its kind
//! and a metadata object:
//!
//! ```json
//! {"required": {"seed": ["INT", {"default": 1, "min": 0, "max": 999}]}}
//! ```
//!
//! Choice inputs list their options in place of the kind.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Kind of value travelling through a node slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotKind {
    Image,
    Mask,
    #[serde(rename = "STATEID")]
    StateId,
    Bbox,
    Int,
    Float,
    Boolean,
    String,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Image => "IMAGE",
            SlotKind::Mask => "MASK",
            SlotKind::StateId => "STATEID",
            SlotKind::Bbox => "BBOX",
            SlotKind::Int => "INT",
            SlotKind::Float => "FLOAT",
            SlotKind::Boolean => "BOOLEAN",
            SlotKind::String => "STRING",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Slot(SlotKind),
    /// A string picked from a fixed list.
    Choice(Vec<String>),
}

/// One input of a node, with the widget hints the host understands.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub tooltip: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Slot(kind),
            default: None,
            min: None,
            max: None,
            step: None,
            tooltip: None,
        }
    }

    pub fn choice<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: FieldKind::Choice(options.into_iter().map(Into::into).collect()),
            ..Self::new(name, SlotKind::String)
        }
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Integer kinds render their bounds as integers.
    fn number(&self, value: f64) -> Value {
        if self.kind == FieldKind::Slot(SlotKind::Int) {
            json!(value as i64)
        } else {
            json!(value)
        }
    }

    pub fn to_json(&self) -> Value {
        let mut meta = Map::new();
        if let Some(default) = &self.default {
            meta.insert("default".into(), default.clone());
        }
        for (key, bound) in [("min", self.min), ("max", self.max), ("step", self.step)] {
            if let Some(bound) = bound {
                meta.insert(key.into(), self.number(bound));
            }
        }
        if let Some(tooltip) = &self.tooltip {
            meta.insert("tooltip".into(), json!(tooltip));
        }

        let head = match &self.kind {
            FieldKind::Slot(kind) => json!(kind.as_str()),
            FieldKind::Choice(options) => json!(options),
        };
        if meta.is_empty() {
            json!([head])
        } else {
            json!([head, Value::Object(meta)])
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    pub required: Vec<FieldSpec>,
    pub optional: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, field: FieldSpec) -> Self {
        self.required.push(field);
        self
    }

    pub fn optional(mut self, field: FieldSpec) -> Self {
        self.optional.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.required
            .iter()
            .chain(&self.optional)
            .find(|field| field.name == name)
    }

    pub fn to_json(&self) -> Value {
        let group = |fields: &[FieldSpec]| {
            let map: Map<String, Value> = fields
                .iter()
                .map(|field| (field.name.clone(), field.to_json()))
                .collect();
            Value::Object(map)
        };
        let mut layout = Map::new();
        layout.insert("required".into(), group(&self.required));
        if !self.optional.is_empty() {
            layout.insert("optional".into(), group(&self.optional));
        }
        Value::Object(layout)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSlot {
    pub kind: SlotKind,
    pub name: String,
}

/// Everything the host needs to list a node and wire it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSchema {
    pub title: String,
    pub description: String,
    pub category: String,
    pub inputs: InputSchema,
    pub outputs: Vec<OutputSlot>,
}

impl NodeSchema {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: category.into(),
            inputs: InputSchema::new(),
            outputs: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn inputs(mut self, inputs: InputSchema) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn output(mut self, kind: SlotKind, name: impl Into<String>) -> Self {
        self.outputs.push(OutputSlot {
            kind,
            name: name.into(),
        });
        self
    }

    pub fn to_json(&self) -> Value {
        let kinds: Vec<&str> = self.outputs.iter().map(|slot| slot.kind.as_str()).collect();
        let names: Vec<&str> = self.outputs.iter().map(|slot| slot.name.as_str()).collect();
        json!({
            "title": self.title,
            "description": self.description,
            "category": self.category,
            "input": self.inputs.to_json(),
            "output": kinds,
            "output_name": names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_layout() {
        let seed = FieldSpec::new("seed", SlotKind::Int)
            .default(1)
            .min(0.0)
            .max(999.0)
            .tooltip("Seed for the random number generator.");
        assert_eq!(
            seed.to_json(),
            json!(["INT", {
                "default": 1,
                "min": 0,
                "max": 999,
                "tooltip": "Seed for the random number generator."
            }])
        );
    }

    #[test]
    fn test_choice_layout() {
        let mode = FieldSpec::choice("mode", ["standard", "express"]);
        assert_eq!(mode.to_json(), json!([["standard", "express"]]));
    }

    #[test]
    fn test_schema_layout() {
        let schema = NodeSchema::new("Segment", "Skills/high-level")
            .description("Segment an object in an image.")
            .inputs(
                InputSchema::new()
                    .required(FieldSpec::new("image", SlotKind::Image))
                    .optional(FieldSpec::new("bbox", SlotKind::Bbox)),
            )
            .output(SlotKind::Mask, "mask");

        let value = schema.to_json();
        assert_eq!(value["input"]["required"]["image"], json!(["IMAGE"]));
        assert_eq!(value["input"]["optional"]["bbox"], json!(["BBOX"]));
        assert_eq!(value["output"], json!(["MASK"]));
        assert_eq!(value["output_name"], json!(["mask"]));
        assert!(schema.inputs.field("bbox").is_some());
    }

    #[test]
    fn test_state_id_kind_name() {
        assert_eq!(
            serde_json::to_string(&SlotKind::StateId).unwrap(),
            "\"STATEID\""
        );
        assert_eq!(SlotKind::Bbox.as_str(), "BBOX");
    }
}
