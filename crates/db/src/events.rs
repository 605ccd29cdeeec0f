use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::models::{column::Column, task::TaskWithUsers};

/// Board-scoped realtime events. Each is published to the affected board's
/// channel immediately after a successful store mutation, never before and
/// never on failure. Mutation events carry the full record; deletions carry
/// only the ids.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum BoardEvent {
    ColumnCreated(Column),
    ColumnUpdated(Column),
    ColumnDeleted(ColumnDeleted),
    TaskCreated(Box<TaskWithUsers>),
    TaskUpdated(Box<TaskWithUsers>),
    TaskDeleted(TaskDeleted),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDeleted {
    pub id: Uuid,
    pub board_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TaskDeleted {
    pub id: Uuid,
    pub board_id: Uuid,
}

impl BoardEvent {
    /// The board whose subscribers receive this event.
    pub fn board_id(&self) -> Uuid {
        match self {
            BoardEvent::ColumnCreated(column) | BoardEvent::ColumnUpdated(column) => {
                column.board_id
            }
            BoardEvent::ColumnDeleted(deleted) => deleted.board_id,
            BoardEvent::TaskCreated(task) | BoardEvent::TaskUpdated(task) => task.board_id,
            BoardEvent::TaskDeleted(deleted) => deleted.board_id,
        }
    }
}
