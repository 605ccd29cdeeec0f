use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{Store, StoreError, models::user::User, types::TaskPriority};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub board_id: Uuid,
    pub column_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub timer: TaskTimer,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Work-timer sub-record.
///
/// Invariants, maintained by the timer engine as the single writer:
/// running implies `started_at` is set and the last session is open;
/// stopped implies `started_at` is cleared and every session is closed.
/// `total_seconds` is the cached sum of closed session durations; the live
/// increment of a running timer is computed on read, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TaskTimer {
    pub is_running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub total_seconds: i64,
    pub sessions: Vec<TimerSession>,
}

/// One contiguous interval during which the timer was running.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
}

/// Snapshot returned by the timer-status endpoint. `total_seconds` includes
/// the live increment when the timer is running.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub is_running: bool,
    pub total_seconds: i64,
    pub sessions: Vec<TimerSession>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub board_id: Uuid,
    pub column_id: Uuid,
    /// Identity string (email or display name) of the assignee. Resolution
    /// happens in the task service; an unknown identity leaves the task
    /// unassigned.
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Assignee reference accepted on update: either a user id or an identity
/// string to resolve. A well-formed UUID is treated as an id.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(untagged)]
pub enum AssigneeRef {
    ById(Uuid),
    ByIdentity(String),
}

/// Patch applied by task update. Absent fields are left unchanged; the
/// double `Option` keeps "absent" distinct from an explicit null for the
/// nullable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub column_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_to: Option<Option<AssigneeRef>>,
    pub priority: Option<TaskPriority>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub is_completed: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

/// Deserialize helper that maps a present field (including an explicit `null`)
/// to `Some(..)`, keeping it distinct from an absent field (`None` via
/// `#[serde(default)]`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Task with assignee and creator resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithUsers {
    #[serde(flatten)]
    #[ts(flatten)]
    pub task: Task,
    pub assigned_to_user: Option<User>,
    pub created_by_user: Option<User>,
}

impl std::ops::Deref for TaskWithUsers {
    type Target = Task;
    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

impl Task {
    pub fn create(
        store: &Store,
        data: &CreateTask,
        id: Uuid,
        creator_id: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Task {
        let now = Utc::now();
        let task = Task {
            id,
            title: data.title.clone(),
            description: data.description.clone().unwrap_or_default(),
            board_id: data.board_id,
            column_id: data.column_id,
            assigned_to,
            created_by: creator_id,
            priority: data.priority,
            due_date: data.due_date,
            timer: TaskTimer::default(),
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        store.tasks().insert(id, task.clone());
        task
    }

    pub fn find_by_id(store: &Store, id: Uuid) -> Option<Task> {
        store.tasks().get(&id).map(|task| task.value().clone())
    }

    /// Tasks of a board, ordered by creation time.
    pub fn find_by_board_id(store: &Store, board_id: Uuid) -> Vec<Task> {
        Self::find_sorted(store, |task| task.board_id == board_id)
    }

    pub fn find_by_board_id_and_assignee(
        store: &Store,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Vec<Task> {
        Self::find_sorted(store, |task| {
            task.board_id == board_id && task.assigned_to == Some(user_id)
        })
    }

    pub fn find_by_assignee(store: &Store, user_id: Uuid) -> Vec<Task> {
        Self::find_sorted(store, |task| task.assigned_to == Some(user_id))
    }

    fn find_sorted(store: &Store, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = store
            .tasks()
            .iter()
            .filter(|task| predicate(task.value()))
            .map(|task| task.value().clone())
            .collect();
        tasks.sort_by_key(|task| (task.created_at, task.id));
        tasks
    }

    pub fn save(store: &Store, mut task: Task) -> Result<Task, StoreError> {
        if !store.tasks().contains_key(&task.id) {
            return Err(StoreError::RecordNotFound("Task"));
        }
        task.updated_at = Utc::now();
        store.tasks().insert(task.id, task.clone());
        Ok(task)
    }

    pub fn delete(store: &Store, id: Uuid) -> Result<(), StoreError> {
        store
            .tasks()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RecordNotFound("Task"))
    }

    pub fn delete_by_board_id(store: &Store, board_id: Uuid) -> u64 {
        let ids: Vec<Uuid> = store
            .tasks()
            .iter()
            .filter(|task| task.board_id == board_id)
            .map(|task| task.id)
            .collect();
        let mut removed = 0;
        for id in ids {
            if store.tasks().remove(&id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn with_users(self, store: &Store) -> TaskWithUsers {
        let assigned_to_user = self.assigned_to.and_then(|id| User::find_by_id(store, id));
        let created_by_user = User::find_by_id(store, self.created_by);
        TaskWithUsers {
            task: self,
            assigned_to_user,
            created_by_user,
        }
    }
}
