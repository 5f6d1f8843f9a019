//! Itinerary models returned to callers

use serde::{Deserialize, Serialize};

/// Highest budget realism score a plan may carry
pub const MAX_REALITY_SCORE: u8 = 5;

/// Complete itinerary for a trip
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TripPlan {
    /// Catchy title for the trip
    pub title: String,
    /// Budget realism score (0-5)
    pub reality_score: u8,
    /// Why the score was given
    pub reality_reason: String,
    /// Estimated total cost, formatted for display
    pub total_estimated_cost: String,
    /// General advice from the planner
    pub planner_comment: String,
    /// One entry per day, in travel order
    pub daily_plans: Vec<DayPlan>,
}

/// Plan for a single day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DayPlan {
    /// Day number, starting at 1
    pub day: u32,
    /// Theme of the day
    pub date_theme: String,
    /// Activities in visiting order
    pub activities: Vec<Activity>,
}

/// One stop in a day plan
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Activity {
    /// Coarse period label (morning, afternoon, evening)
    pub time: String,
    pub place: String,
    pub description: String,
    /// Emoji shown next to the activity
    pub icon: String,
    pub cost: String,
}

impl TripPlan {
    /// The plan returned when no model produced an itinerary.
    ///
    /// Callers recognise it by `reality_score == 0` and empty `daily_plans`;
    /// the HTTP status stays 200.
    #[must_use]
    pub fn fallback_error(currency: &str) -> Self {
        Self {
            title: "Error".to_string(),
            reality_score: 0,
            reality_reason: "The AI service is under heavy load and could not be reached. Please try again in a moment.".to_string(),
            total_estimated_cost: format!("0 {currency}"),
            planner_comment: "None of the AI models are responding.".to_string(),
            daily_plans: Vec::new(),
        }
    }

    /// Check value ranges that the type system does not enforce
    pub fn validate(&self) -> Result<(), String> {
        if self.reality_score > MAX_REALITY_SCORE {
            return Err(format!(
                "reality_score {} exceeds {MAX_REALITY_SCORE}",
                self.reality_score
            ));
        }

        if let Some(day) = self.daily_plans.iter().find(|day| day.day == 0) {
            return Err(format!("day numbers start at 1, got {}", day.day));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "title": "Three days of Jeju sea breeze",
        "reality_score": 4,
        "reality_reason": "Accommodation is affordable off-season",
        "total_estimated_cost": "about 450,000 KRW",
        "planner_comment": "Book the rental car early",
        "daily_plans": [
            {
                "day": 1,
                "date_theme": "East coast",
                "activities": [
                    {"time": "Morning", "place": "Seongsan Ilchulbong", "description": "Sunrise hike, drive from the airport", "icon": "🌅", "cost": "5,000 KRW"},
                    {"time": "Evening", "place": "Dongmun Market", "description": "Street food by bus", "icon": "🍢", "cost": "20,000 KRW"}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_model_plan() {
        let plan: TripPlan = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(plan.reality_score, 4);
        assert_eq!(plan.daily_plans[0].day, 1);
        assert_eq!(plan.daily_plans[0].activities.len(), 2);
        assert_eq!(plan.daily_plans[0].activities[1].place, "Dongmun Market");
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_fallback_error_shape() {
        let plan = TripPlan::fallback_error("KRW");
        assert_eq!(plan.reality_score, 0);
        assert!(plan.daily_plans.is_empty());
        assert_eq!(plan.total_estimated_cost, "0 KRW");
        assert_eq!(plan.title, "Error");
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_fallback_error_is_stable() {
        let first = serde_json::to_string(&TripPlan::fallback_error("KRW")).unwrap();
        let second = serde_json::to_string(&TripPlan::fallback_error("KRW")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let mut plan: TripPlan = serde_json::from_str(SAMPLE).unwrap();
        plan.reality_score = 9;
        assert!(plan.validate().unwrap_err().contains("reality_score"));
    }

    #[test]
    fn test_validate_rejects_day_zero() {
        let mut plan: TripPlan = serde_json::from_str(SAMPLE).unwrap();
        plan.daily_plans[0].day = 0;
        assert!(plan.validate().unwrap_err().contains("day numbers"));
    }
}
