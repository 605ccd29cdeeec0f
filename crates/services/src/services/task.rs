use std::sync::Arc;

use chrono::Utc;
use db::{
    DBService, StoreError,
    events::{BoardEvent, TaskDeleted},
    models::{
        board::Board,
        task::{AssigneeRef, CreateTask, Task, TaskWithUsers, TimerStatus, UpdateTask},
        user::User,
    },
};
use thiserror::Error;
use uuid::Uuid;

use super::{events::EventService, policy, timer};

#[derive(Debug, Error)]
pub enum TaskServiceError {
    #[error("Missing required fields!")]
    MissingFields,
    #[error("Task not found")]
    TaskNotFound,
    #[error("Board not found")]
    BoardNotFound,
    #[error("User not found: {0}")]
    AssigneeNotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct TaskService {
    db: DBService,
    events: Arc<EventService>,
}

impl TaskService {
    pub fn new(db: DBService, events: Arc<EventService>) -> Self {
        Self { db, events }
    }

    /// Creates a task. The assignee arrives as an identity string; an
    /// unknown identity is tolerated and the task is created unassigned.
    /// Updates are strict about this, creation is not.
    pub fn create(&self, data: &CreateTask, user: &User) -> Result<TaskWithUsers, TaskServiceError> {
        if !policy::can_create_task(user.role) {
            return Err(TaskServiceError::Forbidden(
                "Only Admin and Manager can create tasks".to_string(),
            ));
        }
        if data.title.trim().is_empty() {
            return Err(TaskServiceError::MissingFields);
        }

        let store = &self.db.store;
        let assignee = data
            .assigned_to
            .as_deref()
            .map(str::trim)
            .filter(|identity| !identity.is_empty())
            .and_then(|identity| {
                let resolved = User::find_by_identity(store, identity);
                if resolved.is_none() {
                    tracing::debug!(identity, "assignee not resolved, creating task unassigned");
                }
                resolved
            });

        if let Some(assignee) = &assignee {
            Board::ensure_member(store, data.board_id, assignee.id);
        }

        let task = Task::create(
            store,
            data,
            Uuid::new_v4(),
            user.id,
            assignee.map(|assignee| assignee.id),
        );
        tracing::debug!(task_id = %task.id, board_id = %task.board_id, "task created");

        let task = task.with_users(store);
        self.events
            .publish(BoardEvent::TaskCreated(Box::new(task.clone())));
        Ok(task)
    }

    /// Admin/Manager see every task on the board; a Member sees only tasks
    /// assigned to them.
    pub fn list(&self, board_id: Uuid, user: &User) -> Result<Vec<TaskWithUsers>, TaskServiceError> {
        let store = &self.db.store;
        Board::find_by_id(store, board_id).ok_or(TaskServiceError::BoardNotFound)?;

        let tasks = if policy::is_admin_or_manager(user.role) {
            Task::find_by_board_id(store, board_id)
        } else {
            Task::find_by_board_id_and_assignee(store, board_id, user.id)
        };
        Ok(tasks
            .into_iter()
            .map(|task| task.with_users(store))
            .collect())
    }

    pub fn update(
        &self,
        task_id: Uuid,
        patch: &UpdateTask,
        user: &User,
    ) -> Result<TaskWithUsers, TaskServiceError> {
        let store = &self.db.store;
        let mut task = Task::find_by_id(store, task_id).ok_or(TaskServiceError::TaskNotFound)?;

        if !policy::can_update_task(user.role, &task, user.id) {
            return Err(TaskServiceError::Forbidden(
                "You don't have permission to update this task".to_string(),
            ));
        }
        if !policy::update_fields_allowed(user.role, patch) {
            return Err(TaskServiceError::Forbidden(
                "Members can only move tasks between columns. Contact Admin/Manager for other changes."
                    .to_string(),
            ));
        }

        // Resolve the assignee before applying anything, so a bad reference
        // leaves the task untouched.
        if let Some(assignee) = &patch.assigned_to {
            let assigned_to = match assignee {
                Some(reference) => Some(self.resolve_assignee(reference)?),
                None => None,
            };
            if let Some(user_id) = assigned_to {
                Board::ensure_member(store, task.board_id, user_id);
            }
            task.assigned_to = assigned_to;
        }

        if let Some(title) = patch.title.as_ref().filter(|title| !title.trim().is_empty()) {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(column_id) = patch.column_id {
            task.column_id = column_id;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(is_completed) = patch.is_completed {
            task.is_completed = is_completed;
        }
        if let Some(completed_at) = patch.completed_at {
            task.completed_at = completed_at;
        }

        let task = Task::save(store, task)?.with_users(store);
        self.events
            .publish(BoardEvent::TaskUpdated(Box::new(task.clone())));
        Ok(task)
    }

    fn resolve_assignee(&self, reference: &AssigneeRef) -> Result<Uuid, TaskServiceError> {
        let store = &self.db.store;
        match reference {
            AssigneeRef::ById(id) => User::find_by_id(store, *id)
                .map(|user| user.id)
                .ok_or_else(|| TaskServiceError::AssigneeNotFound(id.to_string())),
            AssigneeRef::ByIdentity(identity) => User::find_by_identity(store, identity.trim())
                .map(|user| user.id)
                .ok_or_else(|| TaskServiceError::AssigneeNotFound(identity.clone())),
        }
    }

    pub fn delete(&self, task_id: Uuid, user: &User) -> Result<(), TaskServiceError> {
        if !policy::can_delete_task(user.role) {
            return Err(TaskServiceError::Forbidden(
                "Only Admin and Manager can delete tasks".to_string(),
            ));
        }
        let store = &self.db.store;
        let task = Task::find_by_id(store, task_id).ok_or(TaskServiceError::TaskNotFound)?;
        Task::delete(store, task_id)?;
        self.events.publish(BoardEvent::TaskDeleted(TaskDeleted {
            id: task.id,
            board_id: task.board_id,
        }));
        Ok(())
    }

    /// Timer transitions return the task without broadcasting; clients poll
    /// status instead of receiving pushes.
    pub fn start_timer(&self, task_id: Uuid, user: &User) -> Result<Task, TaskServiceError> {
        let store = &self.db.store;
        let mut task = Task::find_by_id(store, task_id).ok_or(TaskServiceError::TaskNotFound)?;
        if !policy::can_control_timer(user.role, &task, user.id) {
            return Err(TaskServiceError::Forbidden(
                "You can only start timer for your assigned tasks".to_string(),
            ));
        }
        if task.timer.is_running {
            return Ok(task);
        }
        timer::start(&mut task.timer, Utc::now());
        Ok(Task::save(store, task)?)
    }

    pub fn stop_timer(&self, task_id: Uuid, user: &User) -> Result<Task, TaskServiceError> {
        let store = &self.db.store;
        let mut task = Task::find_by_id(store, task_id).ok_or(TaskServiceError::TaskNotFound)?;
        if !policy::can_control_timer(user.role, &task, user.id) {
            return Err(TaskServiceError::Forbidden(
                "You can only stop timer for your assigned tasks".to_string(),
            ));
        }
        if !task.timer.is_running {
            return Ok(task);
        }
        timer::stop(&mut task.timer, Utc::now());
        Ok(Task::save(store, task)?)
    }

    pub fn timer_status(&self, task_id: Uuid) -> Result<TimerStatus, TaskServiceError> {
        let task =
            Task::find_by_id(&self.db.store, task_id).ok_or(TaskServiceError::TaskNotFound)?;
        Ok(TimerStatus {
            is_running: task.timer.is_running,
            total_seconds: timer::current_duration(&task.timer, Utc::now()),
            sessions: task.timer.sessions,
            started_at: task.timer.started_at,
        })
    }
}
