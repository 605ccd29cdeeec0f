use std::sync::Arc;

use db::DBService;
use secrecy::SecretString;
use services::services::{
    board::BoardService, column::ColumnService, events::EventService, task::TaskService,
};

pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod test_support;

/// Shared application state. Every service receives its collaborators here,
/// at construction time; handlers reach them through the accessors.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    events: Arc<EventService>,
    boards: BoardService,
    columns: ColumnService,
    tasks: TaskService,
    jwt_secret: Arc<SecretString>,
}

impl AppState {
    pub fn new(db: DBService, jwt_secret: SecretString) -> Self {
        let events = Arc::new(EventService::new());
        Self {
            boards: BoardService::new(db.clone()),
            columns: ColumnService::new(db.clone(), events.clone()),
            tasks: TaskService::new(db.clone(), events.clone()),
            db,
            events,
            jwt_secret: Arc::new(jwt_secret),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn events(&self) -> &Arc<EventService> {
        &self.events
    }

    pub fn boards(&self) -> &BoardService {
        &self.boards
    }

    pub fn columns(&self) -> &ColumnService {
        &self.columns
    }

    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }

    pub fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }
}
