//! # skill-nodes
//!
//! Node-graph plugin nodes backed by a remote image-editing service.
//!
//! Each node wraps one remote skill (segment, erase, recolor, blend, shadow,
//! box, infer main subject) or moves images to and from the service. Node
//! callbacks are synchronous; the remote client is async. The bridge in
//! between runs every call on one process-wide scheduler and works from
//! any thread, including the scheduler's own.
//!
//! ## Features
//!
//! - **Two node levels**: high-level nodes take and return tensors, low-level
//!   nodes chain remote state ids without moving pixels
//! - **Validation first**: bad seeds, angles, modes or colour modes are
//!   rejected before anything goes over the wire
//! - **Pluggable client**: anything implementing [`SkillClient`]; an HTTP
//!   client ships behind the `http` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skill_nodes::prelude::*;
//!
//! let ctx = EditorContext::new(StubSkillClient::new());
//! let registry = NodeRegistry::with_defaults(ctx.clone());
//!
//! let inputs = NodeInputs::new()
//!     .with("left", 0i64)
//!     .with("top", 0i64)
//!     .with("right", 64i64)
//!     .with("bottom", 64i64);
//! let outputs = registry.invoke("Create Bounding Box", &inputs).unwrap();
//! assert_eq!(outputs.len(), 1);
//!
//! ctx.shutdown();
//! ```
//!
//! ## Module Organization
//!
//! - [`ops`]: operation scripts, one module per skill
//! - [`nodes`]: node adapters, schemas and the registry
//! - [`imaging`]: tensor and image conversion
//! - [`prelude`]: Commonly used types (import with `use skill_nodes::prelude::*`)
//! - [`ops_prelude`]: Only what is needed to drive operations directly

// ============================================================================
// Core Module
// ============================================================================

mod core;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

// Value types and errors
pub use crate::core::error::{NodeError, TransportError};
pub use crate::core::types::{BLEND_MODES, BoundingBox, CallResult, ERASE_MODES, Mode, Skill, StateId};
pub use crate::core::validation::{Validate, ValidationIssue, ValidationReport};

// Remote client contract
pub use crate::core::client::{
    BackgroundColorRequest, BlendRequest, CropRequest, DownloadOptions, EraseRequest,
    InferBboxRequest, RecolorRequest, SegmentRequest, ShadowRequest, SkillClient, SkillResult,
};
pub use crate::core::mock::{RecordedCall, StubSkillClient};

// Task bridge and session
pub use crate::core::bridge::TaskBridge;
pub use crate::core::context::EditorContext;
pub use crate::core::settings::{BridgeSettings, SHUTDOWN_GRACE_ENV, TASK_TIMEOUT_ENV};
pub use crate::core::telemetry::{CallOutcome, CallTrace, MemoryTelemetry, Telemetry};

// ============================================================================
// Operations, Imaging and Nodes
// ============================================================================

pub mod imaging;
pub mod nodes;
pub mod ops;

pub use imaging::{ColorMode, ImageTensor, MaskTensor};
pub use nodes::registry::NodeRegistry;
pub use nodes::schema::{FieldKind, FieldSpec, InputSchema, NodeSchema, OutputSlot, SlotKind};
pub use nodes::value::{NodeInputs, SlotValue};
pub use nodes::EditorNode;

// ============================================================================
// Prelude Modules - Convenient Bulk Imports
// ============================================================================

/// The main prelude: everything needed to build a registry and run nodes.
///
/// # Example
/// ```rust
/// use skill_nodes::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        BoundingBox,
        BridgeSettings,
        // Session
        EditorContext,
        // Nodes
        EditorNode,
        ImageTensor,
        MaskTensor,
        Mode,
        NodeError,
        NodeInputs,
        NodeRegistry,
        NodeSchema,
        SkillClient,
        SlotKind,
        SlotValue,
        // Core
        StateId,
        StubSkillClient,
        TaskBridge,
    };
}

/// Prelude for calling operation scripts without the node layer.
///
/// # Example
/// ```rust
/// use skill_nodes::ops_prelude::*;
/// ```
pub mod ops_prelude {
    pub use super::ops::{bbox, blend, erase, recolor, segment, shadow, subject, transfer};
    pub use super::{
        BoundingBox, EditorContext, ImageTensor, MaskTensor, Mode, NodeError, SkillClient,
        StateId, Validate,
    };
}

// ============================================================================
// HTTP Feature
// ============================================================================

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpSkillClient};

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
