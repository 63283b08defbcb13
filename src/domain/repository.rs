use thiserror::Error;

use super::todo::{CreateTodo, TodoId, TodoItem, UpdateTodo};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Authoritative storage for todo items.
///
/// Implementations own every item; callers only ever see clones.
/// All operations are synchronous and must be linearizable.
pub trait TodoRepository: Send + Sync + 'static {
    /// Snapshot of all items in ascending id order.
    fn list(&self) -> Vec<TodoItem>;
    fn get(&self, id: TodoId) -> StoreResult<TodoItem>;
    fn create(&self, input: CreateTodo) -> StoreResult<TodoItem>;
    fn update(&self, id: TodoId, input: UpdateTodo) -> StoreResult<TodoItem>;
    fn delete(&self, id: TodoId) -> StoreResult<()>;
}
