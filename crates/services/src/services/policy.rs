//! Access decisions. Pure functions, no side effects; every service checks
//! here before touching the store.

use db::{
    models::{board::Board, task::{Task, UpdateTask}},
    types::Role,
};
use uuid::Uuid;

pub fn is_admin_or_manager(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Manager)
}

pub fn can_create_board(role: Role) -> bool {
    is_admin_or_manager(role)
}

/// Only the creator may rename, describe or delete a board. Role is
/// deliberately not consulted here; the route-level Admin/Manager gate runs
/// first as a separate filter.
pub fn can_mutate_board(board: &Board, user_id: Uuid) -> bool {
    board.created_by == user_id
}

pub fn can_create_task(role: Role) -> bool {
    is_admin_or_manager(role)
}

pub fn can_delete_task(role: Role) -> bool {
    is_admin_or_manager(role)
}

pub fn can_update_task(role: Role, task: &Task, user_id: Uuid) -> bool {
    is_admin_or_manager(role) || task.assigned_to == Some(user_id)
}

pub fn can_control_timer(role: Role, task: &Task, user_id: Uuid) -> bool {
    is_admin_or_manager(role) || task.assigned_to == Some(user_id)
}

/// Admin/Manager patches are unrestricted. An assigned Member may only move
/// the task and toggle completion: any other field present in the patch
/// rejects the whole update, nothing is applied partially.
pub fn update_fields_allowed(role: Role, patch: &UpdateTask) -> bool {
    if is_admin_or_manager(role) {
        return true;
    }
    patch.title.is_none()
        && patch.description.is_none()
        && patch.assigned_to.is_none()
        && patch.priority.is_none()
        && patch.due_date.is_none()
}
