//! Trip request model received from callers

use serde::{Deserialize, Serialize};

use crate::PlannerError;

/// Traveller's request for an itinerary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TripRequest {
    /// Where the trip goes
    pub destination: String,
    /// Trip length in days
    pub duration: String,
    /// Budget per person per day
    pub budget: String,
    /// Modes of travel, in the order given by the caller
    pub transport: Vec<String>,
    /// Travel style (relaxed, packed, foodie, ...)
    pub style: String,
    /// Free-form extra wishes
    pub preference: String,
}

impl TripRequest {
    /// Transport modes as a single comma separated list
    #[must_use]
    pub fn transport_list(&self) -> String {
        self.transport.join(", ")
    }

    /// Reject requests that cannot produce a meaningful plan.
    ///
    /// Destination, duration and budget must be filled in and at least one
    /// transport mode must be chosen. Style and preference may be empty.
    pub fn validate(&self) -> crate::Result<()> {
        let required = [
            ("destination", &self.destination),
            ("duration", &self.duration),
            ("budget", &self.budget),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(PlannerError::validation(format!("{field} cannot be empty")));
            }
        }

        if !self.transport.iter().any(|mode| !mode.trim().is_empty()) {
            return Err(PlannerError::validation(
                "at least one transport mode is required",
            ));
        }

        Ok(())
    }
}
