//! REST API endpoint handlers.
//!
//! Each handler decodes its body, performs exactly one
//! [`SessionStore`](groupboard_core::SessionStore) operation, and returns
//! the result. Accepted mutations are pushed to `WebSocket` observers by the
//! store itself.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/health` | Liveness, observer count, revision |
//! | `GET` | `/api/session` | Current session snapshot |
//! | `POST` | `/api/create-session` | Replace the session with fresh groups |
//! | `POST` | `/api/join` | Join a group by name |
//! | `POST` | `/api/remove-member` | Remove a member (idempotent) |
//! | `POST` | `/api/update-settings` | Reconfigure group count and capacity |
//! | `POST` | `/api/reset-members` | Empty every group |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{Html, IntoResponse};
use groupboard_core::{SessionError, rules};
use groupboard_types::{GroupId, MemberId, SessionSettings};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/create-session` and `POST /api/update-settings`.
///
/// Non-integer or negative values fail body decoding.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    /// Number of groups.
    pub group_count: Option<usize>,
    /// Capacity of each group.
    pub capacity: Option<usize>,
}

impl SettingsRequest {
    fn into_settings(self) -> Result<SessionSettings, SessionError> {
        match (self.group_count, self.capacity) {
            (Some(group_count), Some(capacity)) => Ok(SessionSettings {
                group_count,
                capacity,
            }),
            _ => Err(SessionError::invalid("groupCount and capacity are required")),
        }
    }
}

/// Request body for `POST /api/join`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Display name to join under.
    pub name: Option<String>,
    /// Target group id.
    pub group_id: Option<String>,
}

/// Request body for `POST /api/remove-member`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMemberRequest {
    /// Group the member belongs to.
    pub group_id: Option<String>,
    /// Member to remove.
    pub member_id: Option<String>,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct Accepted {
    success: bool,
}

const ACCEPTED: Accepted = Accepted { success: true };

/// Resolve a client-supplied group id.
///
/// An id that does not parse cannot name any group, so it is reported the
/// same way as an unknown one.
fn parse_group_id(raw: &str) -> Result<GroupId, SessionError> {
    raw.parse::<GroupId>()
        .ok()
        .ok_or_else(|| SessionError::GroupNotFound(raw.to_owned()))
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing session status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.store.snapshot().await;
    let session_id = session.id;
    let revision = session.revision;
    let group_count = session.groups.len();
    let member_count = session.member_count();
    let observers = state.observer_count();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Groupboard</title>
    <style>
        body {{ font-family: system-ui, sans-serif; padding: 2rem; max-width: 720px; margin: 0 auto; }}
        .metric {{ display: inline-block; border: 1px solid #ccc; border-radius: 6px; padding: 0.75rem 1.25rem; margin: 0.25rem; }}
        .label {{ color: #666; font-size: 0.85rem; }}
        .value {{ font-size: 1.4rem; font-weight: bold; }}
        code {{ background: #f4f4f4; padding: 0 0.25rem; }}
    </style>
</head>
<body>
    <h1>Groupboard</h1>
    <p>Session <code>{session_id}</code></p>
    <div>
        <div class="metric"><div class="label">Revision</div><div class="value">{revision}</div></div>
        <div class="metric"><div class="label">Groups</div><div class="value">{group_count}</div></div>
        <div class="metric"><div class="label">Members</div><div class="value">{member_count}</div></div>
        <div class="metric"><div class="label">Observers</div><div class="value">{observers}</div></div>
    </div>
    <h2>API</h2>
    <ul>
        <li><a href="/api/session">GET /api/session</a></li>
        <li><a href="/api/health">GET /api/health</a></li>
        <li>POST /api/join, /api/remove-member</li>
        <li>POST /api/create-session, /api/update-settings, /api/reset-members</li>
        <li><code>ws://host:port/ws/session</code> -- live <code>session_update</code> stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Report liveness, connected observers, and the current revision.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let revision = state.store.revision().await;
    Json(serde_json::json!({
        "status": "ok",
        "observers": state.observer_count(),
        "revision": revision,
        "startedAt": state.started_at,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/session
// ---------------------------------------------------------------------------

/// Return the current session snapshot.
pub async fn get_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.snapshot().await)
}

// ---------------------------------------------------------------------------
// POST /api/create-session
// ---------------------------------------------------------------------------

/// Discard the current session and create `groupCount` empty groups.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SettingsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let session = state.store.create_session(body.into_settings()?).await?;
    Ok(Json(session))
}

// ---------------------------------------------------------------------------
// POST /api/join
// ---------------------------------------------------------------------------

/// Join a group by name.
pub async fn join(
    State(state): State<Arc<AppState>>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let (Some(name), Some(group_id)) = (body.name, body.group_id) else {
        return Err(SessionError::invalid("name and groupId are required").into());
    };
    rules::validate_name(&name, state.store.limits())?;
    let group_id = parse_group_id(&group_id)?;

    let member = state.store.join(group_id, &name).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "member": member,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/remove-member
// ---------------------------------------------------------------------------

/// Remove a member from a group. Removing an absent member succeeds.
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RemoveMemberRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let (Some(group_id), Some(member_id)) = (body.group_id, body.member_id) else {
        return Err(SessionError::invalid("groupId and memberId are required").into());
    };
    let group_id = parse_group_id(&group_id)?;
    // The nil id is never issued, so an unparseable member id matches no one.
    let member_id = member_id
        .parse::<MemberId>()
        .unwrap_or_else(|_| MemberId::from(Uuid::nil()));

    state.store.remove_member(group_id, member_id).await?;
    Ok(Json(ACCEPTED))
}

// ---------------------------------------------------------------------------
// POST /api/update-settings
// ---------------------------------------------------------------------------

/// Reconfigure group count and capacity, keeping existing groups.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SettingsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let session = state.store.update_settings(body.into_settings()?).await?;
    Ok(Json(session))
}

// ---------------------------------------------------------------------------
// POST /api/reset-members
// ---------------------------------------------------------------------------

/// Empty every group.
pub async fn reset_members(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.store.reset_members().await;
    Json(ACCEPTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_require_both_fields() {
        let missing = SettingsRequest {
            group_count: Some(2),
            capacity: None,
        };
        assert!(missing.into_settings().is_err());

        let complete = SettingsRequest {
            group_count: Some(2),
            capacity: Some(3),
        };
        assert_eq!(
            complete.into_settings().ok(),
            Some(SessionSettings {
                group_count: 2,
                capacity: 3
            })
        );
    }

    #[test]
    fn malformed_group_id_is_not_found() {
        let err = parse_group_id("nope").err();
        assert_eq!(err, Some(SessionError::GroupNotFound(String::from("nope"))));
    }

    #[test]
    fn negative_counts_fail_to_decode() {
        let parsed: Result<SettingsRequest, _> =
            serde_json::from_str(r#"{"groupCount": -1, "capacity": 2}"#);
        assert!(parsed.is_err());
        let parsed: Result<SettingsRequest, _> =
            serde_json::from_str(r#"{"groupCount": 1.5, "capacity": 2}"#);
        assert!(parsed.is_err());
    }
}
