//! HTTP request handlers for the front-end services.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::{
    error::ApiError,
    extractors::{JsonBody, RequestId},
    material::{self, PlanError, PlanParams},
    quiz::{self, QuizError, QuizParams, DEFAULT_DIFFICULTY, DEFAULT_NUM_QUESTIONS},
    response::{success, timestamp},
    state::AppState,
    validation::{count_field, str_field, validate_non_empty_fields, validate_required_fields},
};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Service name
    pub service: &'static str,
    /// Version
    pub version: &'static str,
    /// UTC timestamp
    pub timestamp: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: state.service_name(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: timestamp(),
    })
}

fn quiz_error(err: &QuizError) -> ApiError {
    match err {
        QuizError::Gateway(e) => ApiError::from_gateway("Failed to generate quiz", e),
        QuizError::InvalidJson(_) | QuizError::InvalidStructure(_) => {
            ApiError::bad_gateway("Failed to generate quiz").with_details(json!({
                "kind": "invalid_ai_response",
                "error": err.to_string(),
            }))
        }
    }
}

/// `POST /generate`: AI-generated quiz
#[instrument(skip(state, body))]
pub async fn generate_quiz(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.service_name();
    let with_service = |e: ApiError| e.with_service(service);

    validate_required_fields(&body, &["topic", "content"]).map_err(with_service)?;

    let provider = state.provider_for(str_field(&body, "provider"));
    let params = QuizParams {
        topic: display_field(&body, "topic"),
        content: display_field(&body, "content"),
        difficulty: str_field(&body, "difficulty")
            .unwrap_or(DEFAULT_DIFFICULTY)
            .to_string(),
        num_questions: count_field(&body, "num_questions")
            .map_err(with_service)?
            .unwrap_or(DEFAULT_NUM_QUESTIONS),
        api_key: state.request_credential(str_field(&body, "api_key")),
        model: state.model_for(str_field(&body, "model"), &provider),
        provider,
    };

    debug!(topic = %params.topic, provider = %params.provider, model = %params.model, "Generating quiz");

    let quiz = quiz::generate_quiz(&state, &params)
        .await
        .map_err(|e| with_service(quiz_error(&e)))?;

    Ok(success(
        service,
        json!({
            "quiz": quiz,
            "metadata": {
                "topic": params.topic,
                "num_questions": params.num_questions,
                "difficulty": params.difficulty,
            }
        }),
    ))
}

/// `POST /generate_quiz_and_assignments`: quiz questions plus assignment templates
///
/// Falls back to a template question when no credential is available or the
/// AI call fails.
#[instrument(skip(state, body))]
pub async fn generate_quiz_and_assignments(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.service_name();

    let subtopic = str_field(&body, "subtopic")
        .or_else(|| str_field(&body, "topic"))
        .ok_or_else(|| ApiError::bad_request("'subtopic' is required").with_service(service))?
        .to_string();
    let notes = str_field(&body, "study_notes")
        .or_else(|| str_field(&body, "content"))
        .map_or_else(|| format!("Generate questions about {subtopic}"), str::to_string);

    let provider = state.provider_for(str_field(&body, "provider"));
    let api_key = str_field(&body, "api_key");

    let quizzes = if state.has_credential(api_key, &provider) {
        let params = QuizParams {
            topic: subtopic.clone(),
            content: notes,
            difficulty: str_field(&body, "difficulty")
                .unwrap_or(DEFAULT_DIFFICULTY)
                .to_string(),
            num_questions: count_field(&body, "num_questions")
                .ok()
                .flatten()
                .unwrap_or(DEFAULT_NUM_QUESTIONS),
            api_key: state.request_credential(api_key),
            model: state.model_for(str_field(&body, "model"), &provider),
            provider,
        };

        match quiz::generate_quiz(&state, &params).await {
            Ok(quiz) => quiz["questions"].as_array().cloned().unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "AI quiz generation failed, using template question");
                vec![quiz::template_question(&subtopic)]
            }
        }
    } else {
        debug!(provider = %provider, "No credential available, using template question");
        vec![quiz::template_question(&subtopic)]
    };

    Ok(success(
        service,
        json!({
            "quizzes": quizzes,
            "assignments": quiz::template_assignments(&subtopic),
        }),
    ))
}

/// `POST /generate_material`: day-by-day study plan
#[instrument(skip(state, body))]
pub async fn generate_material(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.service_name();

    validate_non_empty_fields(&body, &["topic_name", "no_of_days", "start_date", "daily_hours"])
        .map_err(|e| e.with_service(service))?;

    let provider = state.provider_for(str_field(&body, "provider"));
    let params = PlanParams {
        topic_name: body["topic_name"].clone(),
        no_of_days: body["no_of_days"].clone(),
        start_date: body["start_date"].clone(),
        daily_hours: body["daily_hours"].clone(),
        api_key: state.request_credential(str_field(&body, "api_key")),
        model: state.model_for(str_field(&body, "model"), &provider),
        provider,
    };

    let plan = material::generate_plan(&state, &params).await.map_err(|e| {
        let details = match &e {
            PlanError::Gateway(g) => g.detail(),
            PlanError::InvalidPlan(_) => e.to_string(),
        };
        ApiError::internal("Failed to generate study material")
            .with_service(service)
            .with_details(details)
            .with_field(
                "request_data",
                json!({
                    "topic": params.topic_name,
                    "days": params.no_of_days,
                    "start_date": params.start_date,
                    "daily_hours": params.daily_hours,
                }),
            )
    })?;

    Ok(Json(json!({
        "topic_name": params.topic_name,
        "no_of_days": params.no_of_days,
        "start_date": params.start_date,
        "daily_hours": params.daily_hours,
        "plan": plan,
        "status": "Study plan generated",
    })))
}

/// String form of a required field (non-strings rendered as JSON)
fn display_field(body: &Value, field: &str) -> String {
    match &body[field] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
