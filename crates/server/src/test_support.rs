//! Helpers for exercising the full router in tests: a fresh state, seeded
//! users and signed tokens.

use chrono::Duration;
use db::{DBService, models::user::User, types::Role};
use secrecy::SecretString;
use utils::jwt;
use uuid::Uuid;

use crate::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn test_state() -> AppState {
    AppState::new(DBService::new(), SecretString::from(TEST_JWT_SECRET.to_string()))
}

pub fn seed_user(state: &AppState, name: &str, email: &str, role: Role) -> User {
    User::create(
        &state.db().store,
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        },
    )
}

pub fn bearer_for(user: &User) -> String {
    let token = jwt::sign(user.id, TEST_JWT_SECRET, Duration::hours(1)).unwrap();
    format!("Bearer {token}")
}
