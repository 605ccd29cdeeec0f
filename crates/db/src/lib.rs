use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

pub mod events;
pub mod models;
pub mod types;

use models::{board::Board, column::Column, task::Task, user::User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    RecordNotFound(&'static str),
}

/// In-memory entity store. The persistence engine proper is an external
/// collaborator; everything above this seam talks to the store through the
/// model functions (create / find / save / delete plus filtered queries), so
/// a durable engine can replace the map-backed collections without touching
/// the services.
///
/// Reads hand out owned snapshots. Mutations are read-modify-write and
/// last-write-wins; nothing here serializes concurrent writers.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Collections>,
}

#[derive(Default)]
struct Collections {
    users: DashMap<Uuid, User>,
    boards: DashMap<Uuid, Board>,
    columns: DashMap<Uuid, Column>,
    tasks: DashMap<Uuid, Task>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn users(&self) -> &DashMap<Uuid, User> {
        &self.inner.users
    }

    pub(crate) fn boards(&self) -> &DashMap<Uuid, Board> {
        &self.inner.boards
    }

    pub(crate) fn columns(&self) -> &DashMap<Uuid, Column> {
        &self.inner.columns
    }

    pub(crate) fn tasks(&self) -> &DashMap<Uuid, Task> {
        &self.inner.tasks
    }
}

#[derive(Clone, Default)]
pub struct DBService {
    pub store: Store,
}

impl DBService {
    pub fn new() -> DBService {
        DBService {
            store: Store::new(),
        }
    }
}
