use crate::core::error::NodeError;
use crate::core::types::Mode;

/// Smallest accepted seed.
pub const SEED_MIN: i64 = 0;
/// Largest accepted seed.
pub const SEED_MAX: i64 = 999;
/// Rotation angles are accepted in `[-ROTATION_LIMIT, ROTATION_LIMIT]`.
pub const ROTATION_LIMIT: f64 = 360.0;
/// Smallest output side the shadow skill accepts.
pub const MIN_SHADOW_SIDE: i64 = 8;

/// A parameter that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

/// Collects every issue found in one parameter record.
///
/// Checks never short-circuit, so a caller sees all bad fields at once.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field,
            message: message.into(),
        });
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn seed(&mut self, seed: i64) -> &mut Self {
        if !(SEED_MIN..=SEED_MAX).contains(&seed) {
            self.add(
                "seed",
                format!("Seed must be an integer between {SEED_MIN} and {SEED_MAX}, got {seed}"),
            );
        }
        self
    }

    pub fn rotation_angle(&mut self, angle: f64) -> &mut Self {
        if !(-ROTATION_LIMIT..=ROTATION_LIMIT).contains(&angle) {
            self.add(
                "rotation_angle",
                format!("Rotation angle must be between -360 and 360, got {angle}"),
            );
        }
        self
    }

    pub fn min_side(&mut self, field: &'static str, value: i64) -> &mut Self {
        if value < MIN_SHADOW_SIDE {
            self.add(
                field,
                format!("{field} must be at least {MIN_SHADOW_SIDE}, got {value}"),
            );
        }
        self
    }

    pub fn mode(&mut self, mode: Mode, allowed: &[Mode]) -> &mut Self {
        if !allowed.contains(&mode) {
            let names: Vec<&str> = allowed.iter().map(Mode::as_str).collect();
            self.add(
                "mode",
                format!("Mode must be one of {names:?}, got '{mode}'"),
            );
        }
        self
    }

    pub fn non_empty(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.add(field, format!("{field} must not be empty"));
        }
        self
    }

    /// Turns the collected issues into a single validation error.
    pub fn into_result(self) -> Result<(), NodeError> {
        if self.is_valid() {
            return Ok(());
        }
        let message = self
            .issues
            .iter()
            .map(|issue| issue.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(NodeError::Validation(message))
    }
}

/// Implemented by every operation's option record.
pub trait Validate {
    fn report(&self) -> ValidationReport;

    fn validate(&self) -> Result<(), NodeError> {
        self.report().into_result()
    }
}
