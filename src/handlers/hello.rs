use axum::{extract::Path, response::IntoResponse, Json};
use http::StatusCode;
use serde_json::json;

pub async fn say_hello(Path(name): Path<String>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"message": format!("Hello {name}")}))).into_response()
}
