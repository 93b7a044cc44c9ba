//! Node adapters for the graph host.
//!
//! Each node reads its typed inputs, builds the matching operation
//! parameters and drives the operation through
//! [`EditorContext::run_one_sync`]. Nodes hold no state of their own.

mod fields;
pub mod high_level;
pub mod low_level;
pub mod registry;
pub mod schema;
pub mod utils;
pub mod value;

use crate::core::context::EditorContext;
use crate::core::error::NodeError;
use schema::NodeSchema;
use value::{NodeInputs, SlotValue};

/// Category of nodes that take and return tensors.
pub const HIGH_LEVEL: &str = "Skills/high-level";
/// Category of nodes that pass state ids between each other.
pub const LOW_LEVEL: &str = "Skills/low-level";
/// Category of local helper nodes that never call the service.
pub const UTILS: &str = "Skills/utils";

/// A node the host can list and invoke.
pub trait EditorNode: Send + Sync {
    fn schema(&self) -> NodeSchema;

    /// Runs the node synchronously and returns one value per output slot.
    fn process(&self, ctx: &EditorContext, inputs: &NodeInputs)
    -> Result<Vec<SlotValue>, NodeError>;

    fn title(&self) -> String {
        self.schema().title
    }
}
