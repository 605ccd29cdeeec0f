use std::sync::Arc;

use db::{
    DBService, StoreError,
    events::{BoardEvent, ColumnDeleted},
    models::{
        column::{Column, CreateColumn, UpdateColumn},
        user::User,
    },
};
use thiserror::Error;
use uuid::Uuid;

use super::{events::EventService, policy};

#[derive(Debug, Error)]
pub enum ColumnServiceError {
    #[error("Column not found")]
    ColumnNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct ColumnService {
    db: DBService,
    events: Arc<EventService>,
}

impl ColumnService {
    pub fn new(db: DBService, events: Arc<EventService>) -> Self {
        Self { db, events }
    }

    pub fn create(&self, data: &CreateColumn, user: &User) -> Result<Column, ColumnServiceError> {
        self.check_role(user)?;
        if data.name.trim().is_empty() {
            return Err(ColumnServiceError::Validation(
                "Name and boardId are required".to_string(),
            ));
        }
        let column = Column::create(&self.db.store, data, Uuid::new_v4());
        self.events.publish(BoardEvent::ColumnCreated(column.clone()));
        Ok(column)
    }

    pub fn list(&self, board_id: Uuid) -> Vec<Column> {
        Column::find_by_board_id(&self.db.store, board_id)
    }

    pub fn update(
        &self,
        column_id: Uuid,
        patch: &UpdateColumn,
        user: &User,
    ) -> Result<Column, ColumnServiceError> {
        self.check_role(user)?;
        let mut column = Column::find_by_id(&self.db.store, column_id)
            .ok_or(ColumnServiceError::ColumnNotFound)?;

        if let Some(name) = patch.name.as_ref().filter(|name| !name.trim().is_empty()) {
            column.name = name.clone();
        }
        if let Some(order) = patch.order {
            column.order = Some(order);
        }
        let column = Column::save(&self.db.store, column)?;
        self.events.publish(BoardEvent::ColumnUpdated(column.clone()));
        Ok(column)
    }

    pub fn delete(&self, column_id: Uuid, user: &User) -> Result<(), ColumnServiceError> {
        self.check_role(user)?;
        let column = Column::find_by_id(&self.db.store, column_id)
            .ok_or(ColumnServiceError::ColumnNotFound)?;
        Column::delete(&self.db.store, column_id)?;
        self.events.publish(BoardEvent::ColumnDeleted(ColumnDeleted {
            id: column.id,
            board_id: column.board_id,
        }));
        Ok(())
    }

    fn check_role(&self, user: &User) -> Result<(), ColumnServiceError> {
        if !policy::is_admin_or_manager(user.role) {
            return Err(ColumnServiceError::Forbidden(
                "Only Admin and Manager can manage columns".to_string(),
            ));
        }
        Ok(())
    }
}
