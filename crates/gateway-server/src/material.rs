//! Study plan generation.

use gateway_core::{GatewayError, InvocationRequest};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::state::AppState;

/// Instructions appended to every study plan prompt
pub const STUDY_PLAN_PROMPT: &str = "You are a study planner assistant. Given a topic, number of days, start date, and daily hours, \
distribute the key subtopics to study for the topic, assigning each day a subtopic. \
Respond ONLY as a JSON object mapping dates (YYYY-MM-DD) to the subtopic(s) to study on that day. \
Do not include any explanation or extra text. Example: {\"2025-04-27\": \"Intro to ML\", \"2025-04-28\": \"Supervised Learning\"}";

/// Inputs for one study plan
#[derive(Debug, Clone)]
pub struct PlanParams {
    /// Topic to study
    pub topic_name: Value,
    /// Number of days
    pub no_of_days: Value,
    /// First day (YYYY-MM-DD)
    pub start_date: Value,
    /// Hours per day
    pub daily_hours: Value,
    /// Explicit credential
    pub api_key: Option<String>,
    /// Provider name
    pub provider: String,
    /// Model name
    pub model: String,
}

/// Why plan generation failed
#[derive(Debug, Error)]
pub enum PlanError {
    /// The gateway call failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// The AI text was not a JSON object
    #[error("Invalid study plan from AI service: {0}")]
    InvalidPlan(String),
}

/// Render a JSON scalar the way it reads in prose
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the study plan prompt
#[must_use]
pub fn build_plan_prompt(params: &PlanParams) -> String {
    format!(
        "Topic: {}. Number of days: {}. Start date: {}. Daily hours: {}. {STUDY_PLAN_PROMPT}",
        display(&params.topic_name),
        display(&params.no_of_days),
        display(&params.start_date),
        display(&params.daily_hours),
    )
}

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````)
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}

/// Parse the cleaned text into a date → subtopic map
///
/// # Errors
/// Returns an error if the text is not a JSON object
pub fn parse_plan(text: &str) -> Result<Map<String, Value>, PlanError> {
    match serde_json::from_str::<Value>(strip_code_fences(text)) {
        Ok(Value::Object(plan)) => Ok(plan),
        Ok(other) => Err(PlanError::InvalidPlan(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(PlanError::InvalidPlan(e.to_string())),
    }
}

/// Ask the gateway for a study plan
pub async fn generate_plan(state: &AppState, params: &PlanParams) -> Result<Map<String, Value>, PlanError> {
    let request = InvocationRequest::new(build_plan_prompt(params), &params.provider, &params.model)
        .with_optional_credential(params.api_key.clone());

    let result = state.gateway.invoke(request).await?;
    info!(
        provider = %result.provider,
        attempts = result.attempts,
        "Study plan text received"
    );

    parse_plan(&result.text)
}
