pub mod bridge;
pub mod client;
pub mod context;
pub mod error;
pub mod mock;
pub mod settings;
pub mod telemetry;
pub mod types;
pub mod validation;
