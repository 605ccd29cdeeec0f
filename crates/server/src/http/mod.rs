use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, routes};

pub mod auth;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::boards::router(&state))
        .merge(routes::columns::router())
        .merge(routes::tasks::router())
        .merge(routes::events::router())
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use db::types::Role;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::test_support::{bearer_for, seed_user, test_state};

    async fn body_json(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, bearer: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, bearer)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with(uri: &str, bearer: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, bearer)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = super::router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_rejects_missing_and_bogus_tokens() {
        let state = test_state();
        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/boards")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["success"], json!(false));
        assert_eq!(json["message"], json!("Unauthorized"));

        let response = app
            .oneshot(get_with("/api/boards", "Bearer bogus"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn board_create_and_list_round_trip() {
        let state = test_state();
        let admin = seed_user(&state, "Alice", "alice@example.com", Role::Admin);
        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/boards",
                &bearer_for(&admin),
                json!({"name": "Launch", "description": "Q3 push"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["success"], json!(true));
        let board_id = created["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(get_with("/api/boards", &bearer_for(&admin)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed["data"][0]["id"].as_str().unwrap(), board_id);
        assert_eq!(
            listed["data"][0]["createdByUser"]["email"],
            json!("alice@example.com")
        );
    }

    #[tokio::test]
    async fn member_cannot_create_boards_or_columns() {
        let state = test_state();
        let member = seed_user(&state, "Bob", "bob@example.com", Role::Member);
        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/boards",
                &bearer_for(&member),
                json!({"name": "Nope"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(post_json(
                "/api/columns",
                &bearer_for(&member),
                json!({"name": "Todo", "boardId": uuid::Uuid::new_v4()}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn task_flow_assignment_restriction_and_timer() {
        let state = test_state();
        let admin = seed_user(&state, "Alice", "alice@example.com", Role::Admin);
        let bob = seed_user(&state, "Bob", "bob@example.com", Role::Member);
        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/boards",
                &bearer_for(&admin),
                json!({"name": "Launch"}),
            ))
            .await
            .unwrap();
        let board = body_json(response).await;
        let board_id = board["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/columns",
                &bearer_for(&admin),
                json!({"name": "Todo", "boardId": board_id}),
            ))
            .await
            .unwrap();
        let column = body_json(response).await;
        let column_id = column["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/tasks",
                &bearer_for(&admin),
                json!({
                    "title": "Ship the release",
                    "boardId": board_id,
                    "columnId": column_id,
                    "assignedTo": "bob@example.com",
                    "priority": "Urgent"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let task = body_json(response).await;
        let task_id = task["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(task["data"]["assignedToUser"]["name"], json!("Bob"));

        // Assignment pulled Bob into the board's membership.
        let response = app
            .clone()
            .oneshot(get_with("/api/boards", &bearer_for(&bob)))
            .await
            .unwrap();
        let boards = body_json(response).await;
        assert_eq!(boards["data"][0]["members"].as_array().unwrap().len(), 2);

        // A Member patching priority is rejected outright.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/tasks/{task_id}"))
                    .header(header::AUTHORIZATION, bearer_for(&bob))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"priority": "High"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // But driving the timer on their own task is allowed.
        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/tasks/{task_id}/start-timer"),
                &bearer_for(&bob),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let started = body_json(response).await;
        assert_eq!(started["data"]["timer"]["isRunning"], json!(true));

        let response = app
            .clone()
            .oneshot(get_with(
                &format!("/api/tasks/{task_id}/timer"),
                &bearer_for(&bob),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let status = body_json(response).await;
        assert_eq!(status["data"]["isRunning"], json!(true));
        assert_eq!(status["data"]["sessions"].as_array().unwrap().len(), 1);

        // Member listing shows only Bob's tasks.
        let response = app
            .clone()
            .oneshot(get_with(&format!("/api/tasks/{board_id}"), &bearer_for(&bob)))
            .await
            .unwrap();
        let tasks = body_json(response).await;
        assert_eq!(tasks["data"].as_array().unwrap().len(), 1);

        let response = app
            .oneshot(get_with(
                &format!("/api/tasks/{}", uuid::Uuid::new_v4()),
                &bearer_for(&admin),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn board_delete_cascades_over_http() {
        let state = test_state();
        let admin = seed_user(&state, "Alice", "alice@example.com", Role::Admin);
        let app = super::router(state);
        let bearer = bearer_for(&admin);

        let response = app
            .clone()
            .oneshot(post_json("/api/boards", &bearer, json!({"name": "Temp"})))
            .await
            .unwrap();
        let board = body_json(response).await;
        let board_id = board["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/columns",
                &bearer,
                json!({"name": "Todo", "boardId": board_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/boards/{board_id}"))
                    .header(header::AUTHORIZATION, bearer.as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let deleted = body_json(response).await;
        assert_eq!(deleted["message"], json!("Board deleted successfully"));

        let response = app
            .clone()
            .oneshot(get_with(&format!("/api/columns/{board_id}"), &bearer))
            .await
            .unwrap();
        let columns = body_json(response).await;
        assert_eq!(columns["data"].as_array().unwrap().len(), 0);

        // The board itself is gone.
        let response = app
            .oneshot(get_with(&format!("/api/tasks/{board_id}"), &bearer))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn websocket_upgrade_requires_token() {
        let state = test_state();
        let admin = seed_user(&state, "Alice", "alice@example.com", Role::Admin);
        let app = super::router(state);

        let token = utils::jwt::sign(
            admin.id,
            crate::test_support::TEST_JWT_SECRET,
            chrono::Duration::hours(1),
        )
        .unwrap();

        let make_ws_request = |uri: String| {
            Request::builder()
                .method("GET")
                .uri(uri)
                .version(axum::http::Version::HTTP_11)
                .header(header::HOST, "localhost")
                .header(header::CONNECTION, "Upgrade")
                .header(header::UPGRADE, "websocket")
                .header("sec-websocket-version", "13")
                .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
                .body(Body::empty())
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(make_ws_request("/api/events/ws".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(make_ws_request(format!("/api/events/ws?token={token}")))
            .await
            .unwrap();

        // `oneshot` requests don't include Hyper's `OnUpgrade` extension, so
        // axum rejects the handshake with 426 even when the headers are
        // valid. Anything but 401 means auth passed.
        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    }
}
