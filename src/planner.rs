//! Trip planning with sequential model fallback
//!
//! A [`TripPlanner`] turns a [`TripRequest`] into a prompt and walks the
//! configured model candidates in priority order. Each candidate gets exactly
//! one attempt, attempts never overlap, and the first usable answer wins.
//! When every candidate fails the caller receives [`TripPlan::fallback_error`]
//! instead of an error, so the HTTP contract stays a 200 with a plan-shaped
//! body.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::PlannerError;
use crate::llm::{ModelClient, ModelError};
use crate::models::{TripPlan, TripRequest};
use crate::prompt::build_prompt;

/// Ordered, non-empty list of model identifiers. Earlier entries are preferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates(Vec<String>);

impl ModelCandidates {
    pub fn new<I, S>(models: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models: Vec<String> = models.into_iter().map(Into::into).collect();

        if models.is_empty() {
            return Err(PlannerError::config("model candidate list cannot be empty"));
        }
        if models.iter().any(|model| model.trim().is_empty()) {
            return Err(PlannerError::config("model identifiers cannot be blank"));
        }

        Ok(Self(models))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a model answer must satisfy to count as a success
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseCheck {
    /// The text parses as JSON
    #[default]
    Json,
    /// The JSON also deserialises into a [`TripPlan`] with in-range values
    Schema,
}

/// Result of one pass over the candidates
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// A model answered; `plan` is its JSON, untouched
    Generated { model: String, plan: Value },
    /// Every candidate failed
    Exhausted { attempts: usize },
}

/// Response body for the plan endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanBody {
    Generated(Value),
    Fallback(TripPlan),
}

impl PlanOutcome {
    /// Turn the outcome into what the caller sees
    #[must_use]
    pub fn into_body(self, currency: &str) -> PlanBody {
        match self {
            PlanOutcome::Generated { plan, .. } => PlanBody::Generated(plan),
            PlanOutcome::Exhausted { .. } => PlanBody::Fallback(TripPlan::fallback_error(currency)),
        }
    }
}

/// Generates itineraries by trying model candidates one after another
pub struct TripPlanner {
    client: Arc<dyn ModelClient>,
    candidates: ModelCandidates,
    currency: String,
    check: ResponseCheck,
}

impl TripPlanner {
    pub fn new(client: Arc<dyn ModelClient>, candidates: ModelCandidates) -> Self {
        Self {
            client,
            candidates,
            currency: "KRW".to_string(),
            check: ResponseCheck::default(),
        }
    }

    /// Currency for cost estimates and the fallback plan
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    #[must_use]
    pub fn with_response_check(mut self, check: ResponseCheck) -> Self {
        self.check = check;
        self
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    #[must_use]
    pub fn candidates(&self) -> &ModelCandidates {
        &self.candidates
    }

    /// Build the prompt for `request` and run the fallback loop
    #[instrument(skip_all, fields(destination = %request.destination, duration = %request.duration))]
    pub async fn plan(&self, request: &TripRequest) -> PlanOutcome {
        info!(
            "Trip plan requested: {} ({} days)",
            request.destination, request.duration
        );
        let prompt = build_prompt(request, &self.currency);
        self.generate(&prompt).await
    }

    /// Try each candidate in order until one returns an acceptable answer.
    ///
    /// Every attempt is awaited before the next starts. Failures of any kind
    /// are logged and move the loop on; they never reach the caller.
    pub async fn generate(&self, prompt: &str) -> PlanOutcome {
        let total = self.candidates.len();

        for (index, model) in self.candidates.iter().enumerate() {
            let attempt = index + 1;
            info!(model, attempt, total, "Requesting plan from model");

            match self.attempt(model, prompt).await {
                Ok(plan) => {
                    info!(model, attempt, "Plan generated");
                    return PlanOutcome::Generated {
                        model: model.to_string(),
                        plan,
                    };
                }
                Err(e) => {
                    if attempt < total {
                        warn!(model, attempt, error = %e, "Model attempt failed, switching to next model");
                    } else {
                        warn!(model, attempt, error = %e, "Model attempt failed");
                    }
                }
            }
        }

        error!(attempts = total, "All model candidates failed");
        PlanOutcome::Exhausted { attempts: total }
    }

    async fn attempt(&self, model: &str, prompt: &str) -> Result<Value, ModelError> {
        let text = self.client.generate_json(model, prompt).await?;
        let plan: Value = serde_json::from_str(&text)?;

        if self.check == ResponseCheck::Schema {
            let parsed: TripPlan = serde_json::from_value(plan.clone())
                .map_err(|e| ModelError::Schema(e.to_string()))?;
            parsed.validate().map_err(ModelError::Schema)?;
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rstest::rstest;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers per model id; unknown models fail with a 404
    #[derive(Default)]
    struct ScriptedClient {
        answers: HashMap<String, Result<String, u16>>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedClient {
        fn answer(mut self, model: &str, text: &str) -> Self {
            self.answers.insert(model.to_string(), Ok(text.to_string()));
            self
        }

        fn fail(mut self, model: &str, status: u16) -> Self {
            self.answers.insert(model.to_string(), Err(status));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn generate_json(&self, model: &str, _prompt: &str) -> Result<String, ModelError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(model.to_string());
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.answers.get(model) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(status)) => Err(ModelError::Status {
                    status: *status,
                    message: "scripted failure".to_string(),
                }),
                None => Err(ModelError::Status {
                    status: 404,
                    message: format!("model {model} not found"),
                }),
            }
        }
    }

    fn plan_json(title: &str) -> String {
        json!({
            "title": title,
            "reality_score": 3,
            "reality_reason": "tight but doable",
            "total_estimated_cost": "300,000 KRW",
            "planner_comment": "pack light",
            "daily_plans": [{
                "day": 1,
                "date_theme": "Old town",
                "activities": [{
                    "time": "Morning",
                    "place": "Gamcheon Culture Village",
                    "description": "Walk from the subway",
                    "icon": "🎨",
                    "cost": "0 KRW"
                }]
            }]
        })
        .to_string()
    }

    fn planner(client: Arc<ScriptedClient>) -> TripPlanner {
        TripPlanner::new(client, ModelCandidates::new(["model-a", "model-b"]).unwrap())
    }

    fn request() -> TripRequest {
        TripRequest {
            destination: "Busan".to_string(),
            duration: "2".to_string(),
            budget: "150000".to_string(),
            transport: vec!["subway".to_string()],
            style: "relaxed".to_string(),
            preference: "sea view".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let client = Arc::new(
            ScriptedClient::default()
                .answer("model-a", &plan_json("A"))
                .answer("model-b", &plan_json("B")),
        );

        let outcome = planner(client.clone()).generate("prompt").await;

        match outcome {
            PlanOutcome::Generated { model, plan } => {
                assert_eq!(model, "model-a");
                assert_eq!(plan["title"], "A");
            }
            other => panic!("expected a generated plan, got {other:?}"),
        }
        assert_eq!(client.calls(), vec!["model-a"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_model() {
        let client = Arc::new(
            ScriptedClient::default()
                .fail("model-a", 503)
                .answer("model-b", &plan_json("B")),
        );

        let outcome = planner(client.clone()).generate("prompt").await;

        let expected: Value = serde_json::from_str(&plan_json("B")).unwrap();
        assert_eq!(
            outcome,
            PlanOutcome::Generated {
                model: "model-b".to_string(),
                plan: expected
            }
        );
        assert_eq!(client.calls(), vec!["model-a", "model-b"]);
    }

    #[tokio::test]
    async fn test_all_failures_return_sentinel() {
        let client = Arc::new(ScriptedClient::default().fail("model-a", 429).fail("model-b", 500));

        let planner = planner(client.clone());
        let outcome = planner.generate("prompt").await;

        assert_eq!(outcome, PlanOutcome::Exhausted { attempts: 2 });
        let body = serde_json::to_value(outcome.into_body(planner.currency())).unwrap();
        assert_eq!(body["reality_score"], 0);
        assert_eq!(body["daily_plans"], json!([]));
        assert_eq!(body, serde_json::to_value(TripPlan::fallback_error("KRW")).unwrap());
        assert_eq!(client.calls(), vec!["model-a", "model-b"]);
    }

    #[rstest]
    #[case::prose("Sure! Here is your plan: ...")]
    #[case::truncated("{\"title\": \"Half a plan\"")]
    #[case::markdown_fence("```json\n{}\n```")]
    #[tokio::test]
    async fn test_invalid_json_falls_through(#[case] text: &str) {
        let client = Arc::new(
            ScriptedClient::default()
                .answer("model-a", text)
                .answer("model-b", &plan_json("B")),
        );

        let outcome = planner(client.clone()).generate("prompt").await;

        assert!(matches!(outcome, PlanOutcome::Generated { ref model, .. } if model == "model-b"));
    }

    #[tokio::test]
    async fn test_json_check_accepts_any_json() {
        let client = Arc::new(ScriptedClient::default().answer("model-a", r#"{"unexpected": true}"#));

        let outcome = planner(client).generate("prompt").await;

        assert!(matches!(outcome, PlanOutcome::Generated { .. }));
    }

    #[tokio::test]
    async fn test_schema_check_rejects_wrong_shape() {
        let client = Arc::new(
            ScriptedClient::default()
                .answer("model-a", r#"{"unexpected": true}"#)
                .answer("model-b", &plan_json("B")),
        );

        let outcome = planner(client.clone())
            .with_response_check(ResponseCheck::Schema)
            .generate("prompt")
            .await;

        assert!(matches!(outcome, PlanOutcome::Generated { ref model, .. } if model == "model-b"));
    }

    #[tokio::test]
    async fn test_schema_check_rejects_out_of_range_score() {
        let mut plan: Value = serde_json::from_str(&plan_json("A")).unwrap();
        plan["reality_score"] = json!(7);
        let client = Arc::new(ScriptedClient::default().answer("model-a", &plan.to_string()));

        let outcome = planner(client)
            .with_response_check(ResponseCheck::Schema)
            .generate("prompt")
            .await;

        assert_eq!(outcome, PlanOutcome::Exhausted { attempts: 2 });
    }

    #[tokio::test]
    async fn test_attempts_never_overlap() {
        let client = Arc::new(ScriptedClient::default().fail("model-a", 500).fail("model-b", 500));

        let _ = planner(client.clone()).generate("prompt").await;

        assert_eq!(client.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_candidates_follow_configured_order() {
        let client = Arc::new(ScriptedClient::default());
        let planner = TripPlanner::new(
            client.clone(),
            ModelCandidates::new(["third", "first", "second"]).unwrap(),
        );

        let _ = planner.generate("prompt").await;

        assert_eq!(client.calls(), vec!["third", "first", "second"]);
        assert_eq!(
            planner.candidates().iter().collect::<Vec<_>>(),
            client.calls()
        );
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        for client in [
            ScriptedClient::default().fail("model-a", 500).answer("model-b", &plan_json("B")),
            ScriptedClient::default(),
        ] {
            let planner = planner(Arc::new(client));
            let first = serde_json::to_string(&planner.generate("prompt").await.into_body("KRW")).unwrap();
            let second = serde_json::to_string(&planner.generate("prompt").await.into_body("KRW")).unwrap();
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn test_plan_builds_prompt_and_generates() {
        let client = Arc::new(ScriptedClient::default().answer("model-a", &plan_json("A")));

        let outcome = planner(client).with_currency("EUR").plan(&request()).await;

        assert!(matches!(outcome, PlanOutcome::Generated { .. }));
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let err = ModelCandidates::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, PlannerError::Config { .. }));
        assert!(ModelCandidates::new(["ok", " "]).is_err());
    }

    #[test]
    fn test_fallback_body_uses_currency() {
        let body = PlanOutcome::Exhausted { attempts: 1 }.into_body("EUR");
        assert_eq!(body, PlanBody::Fallback(TripPlan::fallback_error("EUR")));
    }
}
