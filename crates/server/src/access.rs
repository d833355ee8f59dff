//! Workspace access evaluation.
//!
//! Every workspace-scoped handler goes through [`require_access`] or
//! [`require_owner`]: the workspace is resolved first (404 if missing), then
//! the caller's role decides (403 if insufficient).

use rusqlite::Connection;
use sharespace_api::{Role, db, service};

use crate::db_helpers::{self, query_opt};
use crate::error::ApiErr;
use crate::storage::{WorkspaceRow, workspace_from_row};

/// Look up a workspace by id.
pub fn load_workspace(conn: &Connection, workspace_id: &str) -> Result<WorkspaceRow, ApiErr> {
    query_opt(conn, &db::workspaces::get_by_id(workspace_id), workspace_from_row)
        .map_err(ApiErr::from_db("load workspace"))?
        .ok_or_else(|| ApiErr::not_found("workspace not found"))
}

/// The caller's role in `workspace`: owner, member, or nothing.
pub fn role_of(
    conn: &Connection,
    workspace: &WorkspaceRow,
    user_id: &str,
) -> Result<Option<Role>, ApiErr> {
    if workspace.owner_id == user_id {
        return Ok(Some(Role::Owner));
    }
    let membership: Option<String> = query_opt(
        conn,
        &db::members::role_of(&workspace.id, user_id),
        |row| row.get(0),
    )
    .map_err(ApiErr::from_db("load membership"))?;
    Ok(service::resolve_role(
        &workspace.owner_id,
        user_id,
        membership.as_deref(),
    ))
}

/// True iff the caller has any role in `workspace`.
pub fn has_access(
    conn: &Connection,
    workspace: &WorkspaceRow,
    user_id: &str,
) -> Result<bool, ApiErr> {
    Ok(role_of(conn, workspace, user_id)?.is_some())
}

/// Resolve the workspace and require read/write access to it.
pub fn require_access(
    conn: &Connection,
    workspace_id: &str,
    user_id: &str,
) -> Result<(WorkspaceRow, Role), ApiErr> {
    let workspace = load_workspace(conn, workspace_id)?;
    let role = service::require_access(role_of(conn, &workspace, user_id)?)?;
    Ok((workspace, role))
}

/// Resolve the workspace and require the caller to own it.
pub fn require_owner(
    conn: &Connection,
    workspace_id: &str,
    user_id: &str,
    action: &str,
) -> Result<WorkspaceRow, ApiErr> {
    let workspace = load_workspace(conn, workspace_id)?;
    service::require_owner(role_of(conn, &workspace, user_id)?, action)?;
    Ok(workspace)
}

/// Whether `user_id` already has a membership row in the workspace.
pub fn is_member(conn: &Connection, workspace_id: &str, user_id: &str) -> Result<bool, ApiErr> {
    db_helpers::exists(conn, &db::members::exists(workspace_id, user_id))
        .map_err(ApiErr::from_db("check membership"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::db_helpers::execute;
    use crate::storage::{Db, init_db};

    fn seeded() -> (tempfile::TempDir, Db) {
        let dir = tempfile::tempdir().unwrap();
        let db = init_db(dir.path()).unwrap();
        {
            let conn = db.conn();
            for (id, subject) in [("owner", "s-owner"), ("member", "s-member"), ("stranger", "s-stranger")] {
                execute(&conn, &db::users::insert_if_absent(id, subject, None)).unwrap();
            }
            execute(&conn, &db::workspaces::insert("ws-a", "A", "owner")).unwrap();
            execute(&conn, &db::workspaces::insert("ws-b", "B", "stranger")).unwrap();
            execute(&conn, &db::members::insert("m1", "ws-a", "member", "member")).unwrap();
        }
        (dir, db)
    }

    #[test]
    fn roles_follow_ownership_then_membership() {
        let (_dir, db) = seeded();
        let conn = db.conn();
        let ws = load_workspace(&conn, "ws-a").unwrap();
        assert_eq!(role_of(&conn, &ws, "owner").unwrap(), Some(Role::Owner));
        assert_eq!(role_of(&conn, &ws, "member").unwrap(), Some(Role::Member));
        assert_eq!(role_of(&conn, &ws, "stranger").unwrap(), None);
        assert!(has_access(&conn, &ws, "member").unwrap());
        assert!(!has_access(&conn, &ws, "stranger").unwrap());
    }

    #[test]
    fn access_to_one_workspace_does_not_leak_to_another() {
        let (_dir, db) = seeded();
        let conn = db.conn();
        let err = require_access(&conn, "ws-b", "member").unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        let err = require_access(&conn, "ws-b", "owner").unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(require_access(&conn, "ws-b", "stranger").is_ok());
    }

    #[test]
    fn owner_only_actions_reject_members() {
        let (_dir, db) = seeded();
        let conn = db.conn();
        assert!(require_owner(&conn, "ws-a", "owner", "delete the workspace").is_ok());
        let err = require_owner(&conn, "ws-a", "member", "delete the workspace").unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_workspace_is_not_found() {
        let (_dir, db) = seeded();
        let conn = db.conn();
        let err = require_access(&conn, "nope", "owner").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn membership_check() {
        let (_dir, db) = seeded();
        let conn = db.conn();
        assert!(is_member(&conn, "ws-a", "member").unwrap());
        assert!(!is_member(&conn, "ws-a", "owner").unwrap());
    }
}
