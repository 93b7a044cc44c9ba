use crate::core::types::Skill;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// How a single skill call ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum CallOutcome {
    Success,
    Rejected(String),
    TransportFailed(String),
}

/// One entry per remote skill call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTrace {
    pub timestamp: u64,
    pub skill: Skill,
    pub elapsed_ms: u64,
    pub outcome: CallOutcome,
}

/// Trait for recording skill call traces.
pub trait Telemetry: Send + Sync {
    fn record(&self, entry: CallTrace);
    fn flush(&self);
}

/// Simple in-memory collector for traces.
#[derive(Default)]
pub struct MemoryTelemetry {
    traces: Mutex<Vec<CallTrace>>,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_traces(&self) -> Vec<CallTrace> {
        self.traces.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Telemetry for MemoryTelemetry {
    fn record(&self, entry: CallTrace) {
        self.traces.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }

    fn flush(&self) {
        // Nothing buffered outside the vector
    }
}
