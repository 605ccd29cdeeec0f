use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: Uuid,
    pub name: String,
    pub board_id: Uuid,
    pub order: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumn {
    pub name: String,
    pub board_id: Uuid,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumn {
    pub name: Option<String>,
    pub order: Option<i64>,
}

impl Column {
    pub fn create(store: &Store, data: &CreateColumn, id: Uuid) -> Column {
        let now = Utc::now();
        let column = Column {
            id,
            name: data.name.clone(),
            board_id: data.board_id,
            order: data.order,
            created_at: now,
            updated_at: now,
        };
        store.columns().insert(id, column.clone());
        column
    }

    pub fn find_by_id(store: &Store, id: Uuid) -> Option<Column> {
        store.columns().get(&id).map(|column| column.value().clone())
    }

    /// Columns of a board, ordered by creation time.
    pub fn find_by_board_id(store: &Store, board_id: Uuid) -> Vec<Column> {
        let mut columns: Vec<Column> = store
            .columns()
            .iter()
            .filter(|column| column.board_id == board_id)
            .map(|column| column.value().clone())
            .collect();
        columns.sort_by_key(|column| (column.created_at, column.id));
        columns
    }

    pub fn save(store: &Store, mut column: Column) -> Result<Column, StoreError> {
        if !store.columns().contains_key(&column.id) {
            return Err(StoreError::RecordNotFound("Column"));
        }
        column.updated_at = Utc::now();
        store.columns().insert(column.id, column.clone());
        Ok(column)
    }

    pub fn delete(store: &Store, id: Uuid) -> Result<(), StoreError> {
        store
            .columns()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RecordNotFound("Column"))
    }

    pub fn delete_by_board_id(store: &Store, board_id: Uuid) -> u64 {
        let ids: Vec<Uuid> = store
            .columns()
            .iter()
            .filter(|column| column.board_id == board_id)
            .map(|column| column.id)
            .collect();
        let mut removed = 0;
        for id in ids {
            if store.columns().remove(&id).is_some() {
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_column(store: &Store, name: &str, board_id: Uuid) -> Column {
        Column::create(
            store,
            &CreateColumn {
                name: name.to_string(),
                board_id,
                order: None,
            },
            Uuid::new_v4(),
        )
    }

    #[test]
    fn listing_is_scoped_and_creation_ordered() {
        let store = Store::new();
        let board_id = Uuid::new_v4();
        let todo = create_column(&store, "Todo", board_id);
        let doing = create_column(&store, "Doing", board_id);
        create_column(&store, "Other", Uuid::new_v4());

        let names: Vec<Uuid> = Column::find_by_board_id(&store, board_id)
            .into_iter()
            .map(|column| column.id)
            .collect();
        assert_eq!(names, vec![todo.id, doing.id]);
    }

    #[test]
    fn delete_by_board_removes_only_that_board() {
        let store = Store::new();
        let board_id = Uuid::new_v4();
        create_column(&store, "Todo", board_id);
        create_column(&store, "Doing", board_id);
        let other = create_column(&store, "Other", Uuid::new_v4());

        assert_eq!(Column::delete_by_board_id(&store, board_id), 2);
        assert!(Column::find_by_board_id(&store, board_id).is_empty());
        assert!(Column::find_by_id(&store, other.id).is_some());
    }
}
