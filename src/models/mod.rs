//! Data models for the trip planner
//!
//! This module contains the request and response shapes organized by concern:
//! - Trip: the traveller's request as received over HTTP
//! - Plan: the itinerary returned by the model and the fallback sentinel

pub mod plan;
pub mod trip;

// Re-export all public types for convenient access
pub use plan::{Activity, DayPlan, TripPlan};
pub use trip::TripRequest;
