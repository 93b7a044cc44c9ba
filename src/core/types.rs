//! Value types shared by the skill client, the operation scripts and the nodes.

use crate::core::error::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque handle to an image or mask held by the remote service.
///
/// Handles are produced by upload and transform calls and consumed by later
/// calls. They are never dereferenced locally and never cached: the remote
/// service owns the state behind them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    pub fn new(id: impl Into<String>) -> Self {
        StateId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(value: &str) -> Self {
        StateId(value.to_string())
    }
}

impl From<String> for StateId {
    fn from(value: String) -> Self {
        StateId(value)
    }
}

/// Axis-aligned rectangle in pixel coordinates of the image it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        BoundingBox {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Returns `(left, top, right, bottom)`, the order the service expects.
    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (self.left, self.top, self.right, self.bottom)
    }
}

impl From<(u32, u32, u32, u32)> for BoundingBox {
    fn from((left, top, right, bottom): (u32, u32, u32, u32)) -> Self {
        BoundingBox::new(left, top, right, bottom)
    }
}

/// Quality tier requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Premium,
    Standard,
    Express,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Premium => "premium",
            Mode::Standard => "standard",
            Mode::Express => "express",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "premium" => Ok(Mode::Premium),
            "standard" => Ok(Mode::Standard),
            "express" => Ok(Mode::Express),
            other => Err(NodeError::Validation(format!("unknown mode '{other}'"))),
        }
    }
}

/// Modes accepted by the eraser.
pub const ERASE_MODES: &[Mode] = &[Mode::Premium, Mode::Standard, Mode::Express];

/// Modes accepted by the blender.
pub const BLEND_MODES: &[Mode] = &[Mode::Standard, Mode::Express];

/// One named remote capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Skill {
    Upload,
    Download,
    Segment,
    Crop,
    Erase,
    Recolor,
    Blend,
    Shadow,
    SetBackgroundColor,
    InferBbox,
    InferMainSubject,
}

impl Skill {
    pub fn name(&self) -> &'static str {
        match self {
            Skill::Upload => "upload",
            Skill::Download => "download",
            Skill::Segment => "segment",
            Skill::Crop => "crop",
            Skill::Erase => "erase",
            Skill::Recolor => "recolor",
            Skill::Blend => "blend",
            Skill::Shadow => "shadow",
            Skill::SetBackgroundColor => "set-background-color",
            Skill::InferBbox => "infer-bbox",
            Skill::InferMainSubject => "infer-main-subject",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one remote skill call.
///
/// The network layer hands these back untouched; [`CallResult::into_result`]
/// is where a rejected call turns into a [`NodeError`].
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult<T> {
    Success(T),
    Error { message: String },
}

impl<T> CallResult<T> {
    pub fn error(message: impl Into<String>) -> Self {
        CallResult::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallResult<U> {
        match self {
            CallResult::Success(value) => CallResult::Success(f(value)),
            CallResult::Error { message } => CallResult::Error { message },
        }
    }

    pub fn into_result(self, skill: Skill) -> Result<T, NodeError> {
        match self {
            CallResult::Success(value) => Ok(value),
            CallResult::Error { message } => Err(NodeError::Skill { skill, message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("premium".parse::<Mode>().unwrap(), Mode::Premium);
        assert_eq!("express".parse::<Mode>().unwrap(), Mode::Express);
        assert!(matches!(
            "turbo".parse::<Mode>(),
            Err(NodeError::Validation(_))
        ));
    }

    #[test]
    fn test_mode_sets() {
        assert!(ERASE_MODES.contains(&Mode::Premium));
        assert!(!BLEND_MODES.contains(&Mode::Premium));
        assert_eq!(BLEND_MODES, &[Mode::Standard, Mode::Express]);
    }

    #[test]
    fn test_bounding_box_dimensions() {
        let bbox = BoundingBox::new(10, 20, 110, 70);
        assert_eq!(bbox.width(), 100);
        assert_eq!(bbox.height(), 50);
        assert_eq!(bbox.as_tuple(), (10, 20, 110, 70));
        assert_eq!(BoundingBox::from((10, 20, 110, 70)), bbox);
    }

    #[test]
    fn test_call_result_translation() {
        let ok: CallResult<u32> = CallResult::Success(3);
        assert_eq!(ok.into_result(Skill::Segment).unwrap(), 3);

        let rejected: CallResult<u32> = CallResult::error("no object found");
        let err = rejected.into_result(Skill::Crop).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("crop"));
        assert!(text.contains("no object found"));
    }

    #[test]
    fn test_skill_serializes_kebab_case() {
        let json = serde_json::to_string(&Skill::SetBackgroundColor).unwrap();
        assert_eq!(json, "\"set-background-color\"");
        assert_eq!(Skill::InferBbox.to_string(), "infer-bbox");
    }
}
