//! `air-planner` - AI trip planning service
//!
//! This library turns a structured trip request into a prompt, asks a
//! generative model for a JSON itinerary, and falls back through an ordered
//! list of model candidates until one of them answers.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod planner;
pub mod prompt;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use llm::{GeminiClient, ModelClient, ModelError};
pub use models::{Activity, DayPlan, TripPlan, TripRequest};
pub use planner::{ModelCandidates, PlanBody, PlanOutcome, ResponseCheck, TripPlanner};
pub use prompt::build_prompt;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;
