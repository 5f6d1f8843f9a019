//! Prompt construction for itinerary generation
//!
//! The schema block is advisory text for the model. Nothing here validates
//! what comes back; see [`crate::planner::ResponseCheck`] for that.

use crate::models::TripRequest;

/// Build the instruction sent to the model for a trip request.
///
/// Every request field is embedded verbatim. Costs are requested in
/// `currency`.
#[must_use]
pub fn build_prompt(request: &TripRequest, currency: &str) -> String {
    format!(
        r#"You are a veteran travel planner with 20 years of experience.
Using the traveller's details below, design the most efficient and realistic trip plan possible.

[Traveller details]
- Destination: {destination}
- Trip length: {duration} days
- Budget (per person, per day): {budget} {currency}
- Transport: {transport}
- Travel style: {style}
- Additional preferences: {preference}

[Mission]
1. Budget realism score (0-5): weigh local prices and the chosen transport and score the budget strictly.
2. Route optimisation: order the stops so that no travel time is wasted.
3. Cost estimation: estimate the cost of every activity in {currency}.
4. Output format: respond strictly in the JSON schema below.
5. Accuracy: base places, times and costs on facts.

[JSON response schema]
{schema}
"#,
        destination = request.destination,
        duration = request.duration,
        budget = request.budget,
        transport = request.transport_list(),
        style = request.style,
        preference = request.preference,
        currency = currency,
        schema = response_schema(currency),
    )
}

fn response_schema(currency: &str) -> String {
    format!(
        r#"{{
    "title": "Trip title (witty)",
    "reality_score": integer from 0 to 5,
    "reality_reason": "Reason for the score",
    "total_estimated_cost": "Total estimated cost (e.g. 'about 450,000 {currency}')",
    "planner_comment": "Overall travel advice",
    "daily_plans": [
        {{
            "day": 1,
            "date_theme": "Theme of day 1",
            "activities": [
                {{
                    "time": "Morning/Afternoon/Evening",
                    "place": "Place name",
                    "description": "What to do there (including transport)",
                    "icon": "Emoji",
                    "cost": "Estimated cost (number and {currency})"
                }}
            ]
        }}
    ]
}}"#
    )
}
