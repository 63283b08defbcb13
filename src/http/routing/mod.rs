use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::{json, Value};

use crate::http::types::ApiError;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Mounts the welcome endpoint next to the todo router and wraps everything
/// in the CORS/content-type policy.
pub fn app(router: Router) -> Router {
    Router::new()
        .route("/", any(welcome))
        .merge(router)
        .layer(middleware::from_fn(cors))
}

/// Only `GET /` is served; `any` keeps axum from also answering `HEAD`.
async fn welcome(method: Method) -> Result<Json<Value>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::not_found("Not Found"));
    }
    Ok(Json(json!({
        "message": "Welcome to Todo API",
        "endpoints": { "/todos": "GET, POST", "/todos/:id": "GET, PUT, DELETE" },
    })))
}

/// Answers preflight requests directly and stamps the CORS and content-type
/// headers onto every other response.
async fn cors(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let mut res = if method == Method::OPTIONS { StatusCode::OK.into_response() } else { next.run(req).await };

    let headers = res.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    headers
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));

    tracing::info!(%method, %path, status = res.status().as_u16(), "request");
    res
}
