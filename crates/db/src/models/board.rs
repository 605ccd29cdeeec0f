use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{Store, StoreError, models::user::User};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoard {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoard {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Board with its creator resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct BoardWithCreator {
    #[serde(flatten)]
    #[ts(flatten)]
    pub board: Board,
    pub created_by_user: Option<User>,
}

impl std::ops::Deref for BoardWithCreator {
    type Target = Board;
    fn deref(&self) -> &Self::Target {
        &self.board
    }
}

impl Board {
    /// The creator is always the first member.
    pub fn create(store: &Store, data: &CreateBoard, id: Uuid, creator_id: Uuid) -> Board {
        let now = Utc::now();
        let board = Board {
            id,
            name: data.name.clone(),
            description: data.description.clone(),
            created_by: creator_id,
            members: vec![creator_id],
            created_at: now,
            updated_at: now,
        };
        store.boards().insert(id, board.clone());
        board
    }

    pub fn find_by_id(store: &Store, id: Uuid) -> Option<Board> {
        store.boards().get(&id).map(|board| board.value().clone())
    }

    pub fn find_member_of(store: &Store, user_id: Uuid) -> Vec<Board> {
        let mut boards: Vec<Board> = store
            .boards()
            .iter()
            .filter(|board| board.members.contains(&user_id))
            .map(|board| board.value().clone())
            .collect();
        boards.sort_by_key(|board| (board.created_at, board.id));
        boards
    }

    pub fn save(store: &Store, mut board: Board) -> Result<Board, StoreError> {
        if !store.boards().contains_key(&board.id) {
            return Err(StoreError::RecordNotFound("Board"));
        }
        board.updated_at = Utc::now();
        store.boards().insert(board.id, board.clone());
        Ok(board)
    }

    /// Adds the user to the member list if not already present. Missing
    /// boards are skipped silently; assignment is what drives this call and
    /// must not fail on a dangling board reference.
    pub fn ensure_member(store: &Store, board_id: Uuid, user_id: Uuid) {
        if let Some(mut board) = store.boards().get_mut(&board_id) {
            if !board.members.contains(&user_id) {
                board.members.push(user_id);
                board.updated_at = Utc::now();
            }
        }
    }

    pub fn delete(store: &Store, id: Uuid) -> Result<(), StoreError> {
        store
            .boards()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RecordNotFound("Board"))
    }

    pub fn with_creator(self, store: &Store) -> BoardWithCreator {
        let created_by_user = User::find_by_id(store, self.created_by);
        BoardWithCreator {
            board: self,
            created_by_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_board(store: &Store, name: &str, creator_id: Uuid) -> Board {
        Board::create(
            store,
            &CreateBoard {
                name: name.to_string(),
                description: None,
            },
            Uuid::new_v4(),
            creator_id,
        )
    }

    #[test]
    fn creator_is_initial_member() {
        let store = Store::new();
        let creator_id = Uuid::new_v4();
        let board = create_board(&store, "Roadmap", creator_id);
        assert_eq!(board.members, vec![creator_id]);
        assert_eq!(board.created_by, creator_id);
    }

    #[test]
    fn ensure_member_is_idempotent() {
        let store = Store::new();
        let creator_id = Uuid::new_v4();
        let board = create_board(&store, "Roadmap", creator_id);

        let user_id = Uuid::new_v4();
        Board::ensure_member(&store, board.id, user_id);
        Board::ensure_member(&store, board.id, user_id);

        let board = Board::find_by_id(&store, board.id).unwrap();
        assert_eq!(board.members, vec![creator_id, user_id]);
    }

    #[test]
    fn ensure_member_tolerates_missing_board() {
        let store = Store::new();
        Board::ensure_member(&store, Uuid::new_v4(), Uuid::new_v4());
    }

    #[test]
    fn save_rejects_deleted_board() {
        let store = Store::new();
        let board = create_board(&store, "Roadmap", Uuid::new_v4());
        Board::delete(&store, board.id).unwrap();
        assert!(matches!(
            Board::save(&store, board),
            Err(StoreError::RecordNotFound("Board"))
        ));
    }

    #[test]
    fn member_listing_is_scoped_to_user() {
        let store = Store::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        create_board(&store, "Alice's", alice);
        let shared = create_board(&store, "Shared", bob);
        Board::ensure_member(&store, shared.id, alice);

        let boards = Board::find_member_of(&store, alice);
        assert_eq!(boards.len(), 2);
        let boards = Board::find_member_of(&store, bob);
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].id, shared.id);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let store = Store::new();
        let board = create_board(&store, "Roadmap", Uuid::new_v4());
        let value = serde_json::to_value(&board).unwrap();
        assert!(value.get("createdBy").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_by").is_none());
    }
}
