use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde_json::json;

use gemini_tools_api::caption::{self, CaptionRequest, DEFAULT_MIME_TYPE};
use gemini_tools_api::config::AppConfig;
use gemini_tools_api::gateway::{GeminiGateway, ModelGateway};
use gemini_tools_api::models::{
    CaptionApiRequest, CaptionApiResponse, QuizApiRequest, QuizApiResponse,
};
use gemini_tools_api::quiz::{self, QuizRequest, MAX_QUESTIONS, MIN_QUESTIONS};
use gemini_tools_api::ServiceError;

type SharedGateway = Arc<dyn ModelGateway>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let gateway: SharedGateway = Arc::new(GeminiGateway::new(
        config.api_key.clone(),
        config.model.clone(),
    ));

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/generate-caption", post(caption_endpoint))
        .route("/api/generate-quiz", post(quiz_endpoint))
        .with_state(gateway);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!(model = %config.model, "listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn caption_endpoint(
    State(gateway): State<SharedGateway>,
    Json(req): Json<CaptionApiRequest>,
) -> Response {
    let image_data = match base64::engine::general_purpose::STANDARD.decode(req.image_base64.trim())
    {
        Ok(data) => data,
        Err(_) => {
            return error_response(ServiceError::Validation(
                "imageBase64 is not valid base64".to_string(),
            ))
        }
    };

    let request = CaptionRequest {
        image_data,
        mime_type: req
            .mime_type
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
    };

    match caption::generate_caption(gateway.as_ref(), request).await {
        Ok(caption) => (StatusCode::OK, Json(CaptionApiResponse { caption })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn quiz_endpoint(
    State(gateway): State<SharedGateway>,
    Json(req): Json<QuizApiRequest>,
) -> Response {
    // The service passes the count through literally; clamping is this
    // caller's job.
    let request = QuizRequest {
        topic: req.topic,
        difficulty: req.difficulty,
        count: req.count.clamp(MIN_QUESTIONS, MAX_QUESTIONS),
    };

    match quiz::generate_questions(gateway.as_ref(), request).await {
        Ok(questions) => (StatusCode::OK, Json(QuizApiResponse { questions })).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_status(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Configuration(_)
        | ServiceError::Upstream(_)
        | ServiceError::Parse(_)
        | ServiceError::EmptyResult(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: ServiceError) -> Response {
    let status = error_status(&error);
    if status.is_server_error() {
        tracing::error!(%error, "request failed");
    }
    (status, Json(json!({"error": error.to_string()}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        let status = error_status(&ServiceError::Validation("topic is required".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn everything_else_is_a_server_error() {
        for error in [
            ServiceError::Configuration("no key".to_string()),
            ServiceError::Upstream("503".to_string()),
            ServiceError::Parse("bad json".to_string()),
            ServiceError::EmptyResult("no questions generated".to_string()),
        ] {
            assert_eq!(error_status(&error), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn requested_count_is_clamped_to_the_allowed_range() {
        assert_eq!(2u32.clamp(MIN_QUESTIONS, MAX_QUESTIONS), 5);
        assert_eq!(8u32.clamp(MIN_QUESTIONS, MAX_QUESTIONS), 8);
        assert_eq!(50u32.clamp(MIN_QUESTIONS, MAX_QUESTIONS), 12);
    }
}
