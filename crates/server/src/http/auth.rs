use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::user::User;
use secrecy::ExposeSecret;
use url::form_urlencoded;
use utils::{jwt, response::ApiResponse};

use crate::AppState;

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn extract_query_token(req: &Request) -> Option<String> {
    let query = req.uri().query()?;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == "token" {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some(trimmed.to_string());
        }
    }
    None
}

fn is_websocket_request(req: &Request) -> bool {
    req.headers()
        .get(header::UPGRADE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("websocket"))
}

fn extract_request_token(req: &Request) -> Option<String> {
    // 1) Authorization: Bearer <token>
    if let Some(value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
    {
        return Some(value.to_string());
    }

    // 2) Query param token for WebSocket upgrades, where browsers cannot set
    //    headers.
    if is_websocket_request(req) {
        return extract_query_token(req);
    }

    None
}

/// Verifies the bearer token and loads the caller's user record into the
/// request extensions. Identity issuance is external; a token whose subject
/// has no user record here is rejected the same as a bad signature.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = extract_request_token(&req) else {
        return unauthorized(&req, "missing_token");
    };

    let claims = match jwt::verify(&token, state.jwt_secret().expose_secret()) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "token verification failed");
            return unauthorized(&req, "invalid_token");
        }
    };

    let Some(user) = User::find_by_id(&state.db().store, claims.sub) else {
        return unauthorized(&req, "unknown_user");
    };

    req.extensions_mut().insert(user);
    next.run(req).await
}

fn unauthorized(req: &Request, reason: &'static str) -> Response {
    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        reason,
        "Unauthorized API request"
    );
    let response = ApiResponse::<()>::error("Unauthorized");
    (StatusCode::UNAUTHORIZED, Json(response)).into_response()
}
