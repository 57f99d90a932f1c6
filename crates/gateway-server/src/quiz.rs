//! Quiz generation: prompt, AI call and structural validation.

use gateway_core::{GatewayError, InvocationRequest};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::state::AppState;

/// Default difficulty
pub const DEFAULT_DIFFICULTY: &str = "medium";

/// Default number of questions
pub const DEFAULT_NUM_QUESTIONS: u32 = 5;

/// Inputs for one quiz
#[derive(Debug, Clone)]
pub struct QuizParams {
    /// Quiz topic
    pub topic: String,
    /// Source material the questions are based on
    pub content: String,
    /// Difficulty label
    pub difficulty: String,
    /// Number of questions requested
    pub num_questions: u32,
    /// Explicit credential
    pub api_key: Option<String>,
    /// Provider name
    pub provider: String,
    /// Model name
    pub model: String,
}

/// Why quiz generation failed
#[derive(Debug, Error)]
pub enum QuizError {
    /// The gateway call failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// The AI text was not JSON
    #[error("Invalid response format from AI service: {0}")]
    InvalidJson(String),
    /// The AI JSON was not a valid quiz
    #[error("Invalid quiz structure: {0}")]
    InvalidStructure(String),
}

/// Build the quiz prompt
#[must_use]
pub fn build_quiz_prompt(topic: &str, content: &str, difficulty: &str, num_questions: u32) -> String {
    format!(
        r#"Generate a {difficulty} difficulty quiz with {num_questions} questions about {topic}.
The questions should be based on the following content:

{content}

Return the quiz in JSON format with the following structure:
{{
    "questions": [
        {{
            "question": "...",
            "options": ["...", "...", "...", "..."],
            "correct_answer": 0,
            "explanation": "..."
        }}
    ]
}}"#
    )
}

/// Check that a value is a well-formed quiz
///
/// # Errors
/// Returns a message naming the first offending question (1-indexed)
pub fn validate_quiz(quiz: &Value) -> Result<(), String> {
    let object = quiz
        .as_object()
        .ok_or_else(|| "Quiz data must be an object".to_string())?;

    let questions = object
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| "Quiz must contain a 'questions' list".to_string())?;

    for (i, question) in questions.iter().enumerate() {
        let n = i + 1;
        let has_all = ["question", "options", "correct_answer", "explanation"]
            .iter()
            .all(|field| question.get(field).is_some());
        if !has_all {
            return Err(format!("Question {n} is missing required fields"));
        }

        let options = question["options"]
            .as_array()
            .filter(|o| o.len() >= 2)
            .ok_or_else(|| format!("Question {n} must have at least 2 options"))?;

        let in_range = question["correct_answer"]
            .as_u64()
            .and_then(|idx| usize::try_from(idx).ok())
            .is_some_and(|idx| idx < options.len());
        if !in_range {
            return Err(format!("Question {n} has invalid correct_answer index"));
        }
    }

    Ok(())
}

/// Ask the gateway for a quiz and validate it
pub async fn generate_quiz(state: &AppState, params: &QuizParams) -> Result<Value, QuizError> {
    let prompt = build_quiz_prompt(
        &params.topic,
        &params.content,
        &params.difficulty,
        params.num_questions,
    );

    let request = InvocationRequest::new(prompt, &params.provider, &params.model)
        .with_optional_credential(params.api_key.clone());

    let result = state.gateway.invoke(request).await?;
    info!(
        provider = %result.provider,
        model = %result.model,
        attempts = result.attempts,
        "Quiz text received"
    );

    let quiz: Value = serde_json::from_str(result.text.trim()).map_err(|e| {
        error!(error = %e, "Failed to parse AI response as JSON");
        QuizError::InvalidJson(e.to_string())
    })?;

    validate_quiz(&quiz).map_err(QuizError::InvalidStructure)?;
    Ok(quiz)
}

/// Assignment template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Title
    pub title: String,
    /// What the learner should do
    pub description: String,
    /// `written` or `practical`
    #[serde(rename = "type")]
    pub kind: String,
}

/// The two assignments returned for every subtopic
#[must_use]
pub fn template_assignments(subtopic: &str) -> Vec<Assignment> {
    vec![
        Assignment {
            title: format!("Summarize {subtopic}"),
            description: "Write a 1-2 paragraph summary and 3 key takeaways.".to_string(),
            kind: "written".to_string(),
        },
        Assignment {
            title: format!("Practical Task: {subtopic}"),
            description: "Create a small example or mini-project demonstrating the concept."
                .to_string(),
            kind: "practical".to_string(),
        },
    ]
}

/// Question used when no AI quiz is available
#[must_use]
pub fn template_question(subtopic: &str) -> Value {
    json!({
        "question": format!("Briefly explain: {subtopic}?"),
        "options": ["Definition", "Example", "Both", "Neither"],
        "correct_answer": 2,
        "explanation": format!("Covers basics of {subtopic}."),
    })
}
