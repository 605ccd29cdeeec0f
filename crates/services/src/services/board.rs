use std::collections::HashSet;

use db::{
    DBService, StoreError,
    models::{
        board::{Board, BoardWithCreator, CreateBoard, UpdateBoard},
        column::Column,
        task::Task,
        user::User,
    },
};
use thiserror::Error;
use uuid::Uuid;

use super::policy;

#[derive(Debug, Error)]
pub enum BoardServiceError {
    #[error("Board not found")]
    BoardNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct BoardService {
    db: DBService,
}

impl BoardService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub fn create(&self, data: &CreateBoard, user: &User) -> Result<Board, BoardServiceError> {
        if !policy::can_create_board(user.role) {
            return Err(BoardServiceError::Forbidden(
                "Only Admin and Manager can create boards".to_string(),
            ));
        }
        if data.name.trim().is_empty() {
            return Err(BoardServiceError::Validation(
                "Board name is required".to_string(),
            ));
        }
        let board = Board::create(&self.db.store, data, Uuid::new_v4(), user.id);
        tracing::info!(board_id = %board.id, user_id = %user.id, "board created");
        Ok(board)
    }

    /// Boards the user belongs to, plus boards the user only has assigned
    /// work on. Someone handed a task on a board they were never added to
    /// must still see that board.
    pub fn list_for_user(&self, user_id: Uuid) -> Vec<BoardWithCreator> {
        let store = &self.db.store;
        let mut boards = Board::find_member_of(store, user_id);
        let mut seen: HashSet<Uuid> = boards.iter().map(|board| board.id).collect();

        for task in Task::find_by_assignee(store, user_id) {
            if seen.insert(task.board_id) {
                if let Some(board) = Board::find_by_id(store, task.board_id) {
                    boards.push(board);
                }
            }
        }

        boards
            .into_iter()
            .map(|board| board.with_creator(store))
            .collect()
    }

    /// Only name and description are mutable; absent or blank fields are
    /// left unchanged rather than cleared.
    pub fn update(
        &self,
        board: Board,
        patch: &UpdateBoard,
        user: &User,
    ) -> Result<Board, BoardServiceError> {
        self.check_mutation_allowed(&board, user, "update")?;

        let mut board = board;
        if let Some(name) = patch.name.as_ref().filter(|name| !name.trim().is_empty()) {
            board.name = name.clone();
        }
        if let Some(description) = patch
            .description
            .as_ref()
            .filter(|description| !description.is_empty())
        {
            board.description = Some(description.clone());
        }
        Ok(Board::save(&self.db.store, board)?)
    }

    /// Cascade is sequential, not transactional: columns, then tasks, then
    /// the board itself. A failure partway can leave orphans.
    pub fn delete(&self, board: Board, user: &User) -> Result<(), BoardServiceError> {
        self.check_mutation_allowed(&board, user, "delete")?;

        let store = &self.db.store;
        let columns = Column::delete_by_board_id(store, board.id);
        let tasks = Task::delete_by_board_id(store, board.id);
        Board::delete(store, board.id)?;
        tracing::info!(board_id = %board.id, columns, tasks, "board deleted with cascade");
        Ok(())
    }

    fn check_mutation_allowed(
        &self,
        board: &Board,
        user: &User,
        verb: &str,
    ) -> Result<(), BoardServiceError> {
        if !policy::is_admin_or_manager(user.role) {
            return Err(BoardServiceError::Forbidden(
                "Only Admin and Manager can manage boards".to_string(),
            ));
        }
        if !policy::can_mutate_board(board, user.id) {
            return Err(BoardServiceError::Forbidden(format!(
                "Not authorized to {verb} this board"
            )));
        }
        Ok(())
    }
}
