//! HTTP handlers, request parsing and CORS.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::rejection::JsonRejection,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use utoipa::ToSchema;

use crate::config::CorsOrigins;
use crate::emotion::{self, Classification};

/// Request body for `/analyze`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReflectionInput {
    #[schema(example = "I feel so lonely and sad")]
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Errors surfaced to HTTP clients. The classifier itself cannot fail, so
/// only request parsing ends up here.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
    #[error("Expected a JSON body, got content type {0:?}")]
    NotJson(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            // 400 malformed JSON, 422 missing or non-string `text`
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::NotJson(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
        };
        tracing::warn!(status = %status, "rejected request: {}", detail);
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// A body is read as JSON when no content type is sent, or when it is
/// `application/json` or a `+json` subtype.
fn is_json_content_type(headers: &HeaderMap) -> Result<(), String> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(());
    };

    let raw = value.to_str().unwrap_or_default();
    let essence = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    if essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json")) {
        Ok(())
    } else {
        Err(raw.to_string())
    }
}

fn parse_reflection(headers: &HeaderMap, body: &Bytes) -> Result<ReflectionInput, ApiError> {
    is_json_content_type(headers).map_err(ApiError::NotJson)?;
    let Json(input) = Json::<ReflectionInput>::from_bytes(body)?;
    Ok(input)
}

/// Classify a reflection
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = ReflectionInput,
    responses(
        (status = 200, description = "Detected emotion", body = Classification),
        (status = 400, description = "Malformed JSON body", body = ErrorResponse),
        (status = 422, description = "Missing or non-string `text`, or a non-JSON content type", body = ErrorResponse)
    ),
    tag = "emotion"
)]
pub async fn analyze_emotion(
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Classification>, ApiError> {
    let input = parse_reflection(&headers, &body)?;
    let result = emotion::classify(&input.text);
    tracing::debug!(emotion = %result.emotion, confidence = result.confidence, "classified reflection");
    Ok(Json(result))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "emotion"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn cors_layer(origins: &CorsOrigins) -> Result<CorsLayer> {
    match origins {
        // Wildcard origin cannot be combined with credentials.
        CorsOrigins::Any => Ok(CorsLayer::permissive()),
        CorsOrigins::List(list) => {
            let values = list
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin)
                        .with_context(|| format!("invalid CORS origin {:?}", origin))
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(CorsLayer::new()
                .allow_origin(AllowOrigin::list(values))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(content_type: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type(&headers_with(None)).is_ok());
        assert!(is_json_content_type(&headers_with(Some("application/json"))).is_ok());
        assert!(is_json_content_type(&headers_with(Some("Application/JSON; charset=utf-8"))).is_ok());
        assert!(is_json_content_type(&headers_with(Some("application/vnd.api+json"))).is_ok());
    }

    #[test]
    fn test_non_json_content_types() {
        assert_eq!(
            is_json_content_type(&headers_with(Some("text/plain"))),
            Err("text/plain".to_string())
        );
        assert!(is_json_content_type(&headers_with(Some("application/x-www-form-urlencoded"))).is_err());
    }

    #[test]
    fn test_parse_reflection_without_content_type() {
        let body = Bytes::from_static(br#"{"text": "I feel so lonely and sad"}"#);
        let input = parse_reflection(&headers_with(None), &body).unwrap();
        assert_eq!(input.text, "I feel so lonely and sad");
    }

    #[test]
    fn test_parse_reflection_rejections() {
        let missing = parse_reflection(&headers_with(None), &Bytes::from_static(b"{}")).unwrap_err();
        assert_eq!(missing.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let malformed = parse_reflection(&headers_with(None), &Bytes::from_static(b"{\"text\": ")).unwrap_err();
        assert_eq!(malformed.into_response().status(), StatusCode::BAD_REQUEST);

        let plain = parse_reflection(
            &headers_with(Some("text/plain")),
            &Bytes::from_static(br#"{"text": "sad"}"#),
        )
        .unwrap_err();
        assert!(matches!(plain, ApiError::NotJson(_)));
        assert_eq!(plain.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let origins = CorsOrigins::List(vec!["bad\norigin".to_string()]);
        assert!(cors_layer(&origins).is_err());
    }
}
