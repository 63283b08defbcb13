use axum::{body::Bytes, extract::{rejection::BytesRejection, State}, Router};
use axum::http::{Method, StatusCode, Uri};
use serde::de::DeserializeOwned;

use crate::domain::{repository::TodoRepository, todo::{CreateTodo, TodoId, UpdateTodo}};
use crate::http::types::{ApiError, Reply};

pub const COLLECTION_PATH: &str = "/todos";

#[derive(Clone)]
pub struct AppState<R: TodoRepository> { pub store: R }

/// Every path not claimed elsewhere lands in [`dispatch`], which owns the
/// `/todos` decision tree and answers 404 for anything outside it.
pub fn router<R: TodoRepository + Clone>(state: AppState<R>) -> Router {
    Router::new()
        .fallback(handle::<R>)
        .with_state(state)
}

async fn handle<R: TodoRepository + Clone>(State(state): State<AppState<R>>, method: Method, uri: Uri, body: Result<Bytes, BytesRejection>) -> Result<Reply, ApiError> {
    // oversized or unreadable bodies would otherwise get axum's plain-text reply
    let body = body.map_err(|e| {
        tracing::debug!(error = %e, "failed to read request body");
        ApiError::new(e.status(), "Invalid request body")
    })?;
    dispatch(&state.store, &method, uri.path(), &body)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target<'a> { Collection, Item(&'a str) }

fn target(path: &str) -> Option<Target<'_>> {
    match path.strip_prefix(COLLECTION_PATH)? {
        "" => Some(Target::Collection),
        rest if rest.starts_with('/') => Some(Target::Item(rest)),
        _ => None,
    }
}

/// Maps one request onto exactly one store operation and forms the reply.
pub fn dispatch<R: TodoRepository>(store: &R, method: &Method, path: &str, body: &[u8]) -> Result<Reply, ApiError> {
    let not_found = || ApiError::not_found("Not Found");
    let target = target(path).ok_or_else(not_found)?;
    match (method.as_str(), target) {
        ("GET", Target::Collection) => Reply::json(StatusCode::OK, &store.list()),
        ("GET", Target::Item(rest)) => {
            let id = parse_id(rest)?;
            Reply::json(StatusCode::OK, &store.get(id)?)
        }
        ("POST", Target::Collection) => {
            let input: CreateTodo = decode(body)?;
            require_title(&input.title)?;
            Reply::json(StatusCode::CREATED, &store.create(input)?)
        }
        ("PUT", Target::Item(rest)) => {
            let id = parse_id(rest)?;
            let input: UpdateTodo = decode(body)?;
            require_title(&input.title)?;
            Reply::json(StatusCode::OK, &store.update(id, input)?)
        }
        ("DELETE", Target::Item(rest)) => {
            let id = parse_id(rest)?;
            store.delete(id)?;
            Ok(Reply::empty(StatusCode::NO_CONTENT))
        }
        _ => Err(not_found()),
    }
}

/// `rest` is the item-level remainder, `/` followed by the id segment.
pub fn parse_id(rest: &str) -> Result<TodoId, ApiError> {
    let invalid = || ApiError::bad_request("Invalid ID");
    let digits = rest.strip_prefix('/').ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match digits.parse::<u64>() {
        Ok(n) if n > 0 => Ok(TodoId(n)),
        _ => Err(invalid()),
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        ApiError::bad_request("Invalid request body")
    })
}

fn require_title(title: &str) -> Result<(), ApiError> {
    if title.is_empty() { Err(ApiError::bad_request("Title is required")) } else { Ok(()) }
}

#[cfg(test)]
#[path = "todos_tests.rs"]
mod tests;
