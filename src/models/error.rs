use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use serde_json::Value;

#[derive(Debug)]
pub struct ApiError {
    pub code: StatusCode,
    pub body: Json<Value>,
}

impl ApiError {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            body: Json(json!({"message": message})),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code, self.body).into_response()
    }
}

impl From<(StatusCode, &str)> for ApiError {
    fn from((code, msg): (StatusCode, &str)) -> Self {
        Self::new(code, msg)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            &format!("upstream request failed: {error}"),
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            &format!("upstream returned a malformed payload: {error}"),
        )
    }
}
