use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use rusqlite::Connection;
use uuid::Uuid;

use sharespace_api::{UserResponse, crypto, db};

use crate::config::AppConfig;
use crate::db_helpers::{execute, query_opt};
use crate::error::ApiErr;
use crate::storage::{Db, UserRow, user_from_row};

// ---------------------------------------------------------------------------
// Auth extractor
// ---------------------------------------------------------------------------

/// Authenticated user resolved from the `Authorization: Bearer <jwt>` header.
///
/// The token's subject is mapped to a local user, which is created the first
/// time the subject is seen.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    pub created_at: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Db: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        if !config.auth_enabled() {
            return Err(ApiErr::internal("JWT secret not configured"));
        }

        let token = bearer_token(parts)
            .ok_or_else(|| ApiErr::unauthorized("missing or invalid Authorization header"))?;

        let identity = crypto::verify_jwt(
            token,
            &config.jwt_secret,
            &config.jwt_audience,
            now_unix(),
        )?;

        let db = Db::from_ref(state);
        let conn = db.conn();
        let user = resolve_user(&conn, &identity.subject, identity.email.as_deref())?;

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            created_at: user.created_at,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Map a token subject to a local user, creating it on first sight.
pub fn resolve_user(
    conn: &Connection,
    subject: &str,
    email: Option<&str>,
) -> Result<UserRow, ApiErr> {
    if let Some(user) = query_opt(conn, &db::users::get_by_subject(subject), user_from_row)
        .map_err(ApiErr::from_db("load user"))?
    {
        return Ok(user);
    }

    let email = email.map(|e| e.trim().to_lowercase());
    let id = Uuid::new_v4().to_string();
    let inserted = execute(
        conn,
        &db::users::insert_if_absent(&id, subject, email.as_deref()),
    )
    .map_err(ApiErr::from_db("create user"))?;
    if inserted > 0 {
        tracing::info!(user_id = %id, "created user on first sign-in");
    }

    query_opt(conn, &db::users::get_by_subject(subject), user_from_row)
        .map_err(ApiErr::from_db("load user"))?
        .ok_or_else(|| ApiErr::internal("internal server error"))
}

// ---------------------------------------------------------------------------
// Me
// ---------------------------------------------------------------------------

/// GET /me: the local user behind the bearer token.
pub async fn me(user: AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        id: user.user_id,
        email: user.email,
        created_at: user.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_db;

    #[test]
    fn first_sight_creates_exactly_one_user() {
        let dir = tempfile::tempdir().unwrap();
        let db = init_db(dir.path()).unwrap();
        let conn = db.conn();

        let first = resolve_user(&conn, "sub-1", Some("User1@Example.com")).unwrap();
        assert_eq!(first.email.as_deref(), Some("user1@example.com"));

        let again = resolve_user(&conn, "sub-1", Some("other@example.com")).unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.email, first.email);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn distinct_subjects_get_distinct_users() {
        let dir = tempfile::tempdir().unwrap();
        let db = init_db(dir.path()).unwrap();
        let conn = db.conn();

        let a = resolve_user(&conn, "sub-a", None).unwrap();
        let b = resolve_user(&conn, "sub-b", None).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.email, None);
    }
}
