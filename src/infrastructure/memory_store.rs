use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::domain::{
    repository::{StoreError, StoreResult, TodoRepository},
    todo::{CreateTodo, TodoId, TodoItem, UpdateTodo},
};

const TITLE_REQUIRED: &str = "title is required";

#[derive(Debug)]
struct Inner {
    items: BTreeMap<TodoId, TodoItem>,
    next_id: u64,
}

/// Process-local todo store guarded by a single readers-writer lock.
///
/// Cloning yields another handle to the same collection.
#[derive(Debug, Clone)]
pub struct InMemoryTodoStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(Inner { items: BTreeMap::new(), next_id: 1 })) }
    }

    // Critical sections never leave `Inner` half-updated, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryTodoStore {
    fn default() -> Self { Self::new() }
}

impl TodoRepository for InMemoryTodoStore {
    fn list(&self) -> Vec<TodoItem> {
        self.read().items.values().cloned().collect()
    }

    fn get(&self, id: TodoId) -> StoreResult<TodoItem> {
        self.read().items.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn create(&self, input: CreateTodo) -> StoreResult<TodoItem> {
        if input.title.is_empty() {
            return Err(StoreError::InvalidInput(TITLE_REQUIRED));
        }
        let todo = {
            let mut inner = self.write();
            let now = Utc::now();
            let id = TodoId(inner.next_id);
            inner.next_id += 1;
            let todo = TodoItem { id, title: input.title, completed: false, created_at: now, updated_at: now };
            inner.items.insert(id, todo.clone());
            todo
        };
        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    fn update(&self, id: TodoId, input: UpdateTodo) -> StoreResult<TodoItem> {
        if input.title.is_empty() {
            return Err(StoreError::InvalidInput(TITLE_REQUIRED));
        }
        let todo = {
            let mut inner = self.write();
            let todo = inner.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            todo.title = input.title;
            todo.completed = input.completed;
            // keeps updated_at >= created_at even if the wall clock steps back
            todo.updated_at = Utc::now().max(todo.updated_at);
            todo.clone()
        };
        tracing::debug!(%id, completed = todo.completed, "todo updated");
        Ok(todo)
    }

    fn delete(&self, id: TodoId) -> StoreResult<()> {
        self.write().items.remove(&id).ok_or(StoreError::NotFound(id))?;
        tracing::debug!(%id, "todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn create(store: &InMemoryTodoStore, title: &str) -> TodoItem {
        store.create(CreateTodo { title: title.into() }).unwrap()
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let store = InMemoryTodoStore::new();
        let ids: Vec<u64> = (0..5).map(|i| create(&store, &format!("t{i}")).id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn deleted_ids_are_never_reused() {
        let store = InMemoryTodoStore::new();
        create(&store, "a");
        let b = create(&store, "b");
        store.delete(b.id).unwrap();
        assert_eq!(create(&store, "c").id, TodoId(3));
    }

    #[test]
    fn create_then_get_round_trips() {
        let store = InMemoryTodoStore::new();
        let created = create(&store, "A");
        let got = store.get(created.id).unwrap();
        assert_eq!(got.title, "A");
        assert!(!got.completed);
        assert_eq!(got.created_at, got.updated_at);
        assert_eq!(got, created);
    }

    #[test]
    fn create_rejects_empty_title() {
        let store = InMemoryTodoStore::new();
        let err = store.create(CreateTodo { title: String::new() }).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(store.list().is_empty());
        assert_eq!(create(&store, "first").id, TodoId(1));
    }

    #[test]
    fn repeated_update_is_stable() {
        let store = InMemoryTodoStore::new();
        let created = create(&store, "A");
        let input = UpdateTodo { title: "B".into(), completed: true };
        let first = store.update(created.id, input.clone()).unwrap();
        let second = store.update(created.id, input).unwrap();
        assert_eq!((first.title.as_str(), first.completed), ("B", true));
        assert_eq!((second.title.as_str(), second.completed), ("B", true));
        assert!(first.updated_at >= created.updated_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.created_at, created.created_at);
    }

    #[test]
    fn update_with_empty_title_leaves_item_untouched() {
        let store = InMemoryTodoStore::new();
        let created = create(&store, "A");
        let err = store.update(created.id, UpdateTodo { title: String::new(), completed: true }).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert_eq!(store.get(created.id).unwrap(), created);
    }

    #[test]
    fn delete_is_final() {
        let store = InMemoryTodoStore::new();
        let id = create(&store, "A").id;
        store.delete(id).unwrap();
        assert_eq!(store.get(id), Err(StoreError::NotFound(id)));
        assert_eq!(
            store.update(id, UpdateTodo { title: "B".into(), completed: false }),
            Err(StoreError::NotFound(id))
        );
        assert_eq!(store.delete(id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn list_is_ordered_by_id() {
        let store = InMemoryTodoStore::new();
        for title in ["c", "a", "b"] {
            create(&store, title);
        }
        store.delete(TodoId(2)).unwrap();
        let ids: Vec<TodoId> = store.list().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TodoId(1), TodoId(3)]);
    }

    #[test]
    fn list_is_a_snapshot() {
        let store = InMemoryTodoStore::new();
        create(&store, "a");
        let snapshot = store.list();
        store.update(TodoId(1), UpdateTodo { title: "changed".into(), completed: true }).unwrap();
        create(&store, "b");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "a");
    }

    #[test]
    fn concurrent_creates_get_distinct_sequential_ids() {
        let store = InMemoryTodoStore::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    (0..25).map(|i| create(&store, &format!("{t}-{i}")).id.0).collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
        assert_eq!(store.list().len(), 200);
    }

    #[test]
    fn readers_share_the_lock() {
        let store = InMemoryTodoStore::new();
        create(&store, "a");
        // a held read guard must not stop other readers
        let guard = store.read();
        let handle = {
            let store = store.clone();
            thread::spawn(move || store.list().len())
        };
        assert_eq!(handle.join().unwrap(), 1);
        drop(guard);
    }
}
