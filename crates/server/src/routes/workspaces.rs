use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use sharespace_api::{
    AddMemberRequest, CreateWorkspaceRequest, ListMembersResponse, ListWorkspacesResponse,
    MemberResponse, OkResponse, Role, WorkspaceResponse, db, service,
};

use crate::access;
use crate::db_helpers::{execute, query_all, query_opt};
use crate::error::ApiErr;
use crate::routes::auth::AuthUser;
use crate::storage::{Db, user_from_row, workspace_from_row};

// ---------------------------------------------------------------------------
// Create workspace
// ---------------------------------------------------------------------------

/// POST /workspaces: create a workspace owned by the caller.
pub async fn create_workspace(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<WorkspaceResponse>), ApiErr> {
    let name = service::validate_workspace_name(&req.name)?;
    let id = Uuid::new_v4().to_string();

    let conn = db.conn();
    execute(&conn, &db::workspaces::insert(&id, &name, &user.user_id))
        .map_err(ApiErr::from_db("create workspace"))?;

    let workspace = access::load_workspace(&conn, &id)?;
    tracing::info!(workspace_id = %id, owner_id = %user.user_id, "workspace created");

    Ok((StatusCode::CREATED, Json(workspace.into_response(Role::Owner))))
}

// ---------------------------------------------------------------------------
// List my workspaces
// ---------------------------------------------------------------------------

/// GET /workspaces: workspaces the caller owns, then those shared with them.
pub async fn list_workspaces(
    State(db): State<Db>,
    user: AuthUser,
) -> Result<Json<ListWorkspacesResponse>, ApiErr> {
    let conn = db.conn();

    let owned = query_all(&conn, &db::workspaces::list_owned(&user.user_id), workspace_from_row)
        .map_err(ApiErr::from_db("list owned workspaces"))?;

    let shared = query_all(&conn, &db::workspaces::list_shared(&user.user_id), |row| {
        Ok((workspace_from_row(row)?, row.get::<_, String>(4)?))
    })
    .map_err(ApiErr::from_db("list shared workspaces"))?;

    let mut workspaces: Vec<WorkspaceResponse> = owned
        .into_iter()
        .map(|w| w.into_response(Role::Owner))
        .collect();
    workspaces.extend(shared.into_iter().filter_map(|(w, role)| {
        let role = service::resolve_role(&w.owner_id, &user.user_id, Some(role.as_str()))?;
        Some(w.into_response(role))
    }));

    Ok(Json(ListWorkspacesResponse { workspaces }))
}

// ---------------------------------------------------------------------------
// Get workspace
// ---------------------------------------------------------------------------

/// GET /workspaces/:id: workspace detail with the caller's role.
pub async fn get_workspace(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<WorkspaceResponse>, ApiErr> {
    let conn = db.conn();
    let (workspace, role) = access::require_access(&conn, &id, &user.user_id)?;
    Ok(Json(workspace.into_response(role)))
}

// ---------------------------------------------------------------------------
// Delete workspace (owner only)
// ---------------------------------------------------------------------------

/// DELETE /workspaces/:id: delete a workspace with its members and items.
pub async fn delete_workspace(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    let mut conn = db.conn();
    access::require_owner(&conn, &id, &user.user_id, "delete the workspace")?;

    let tx = conn
        .transaction()
        .map_err(ApiErr::from_db("begin delete workspace"))?;
    let items = execute(&tx, &db::items::delete_for_workspace(&id))
        .map_err(ApiErr::from_db("delete workspace items"))?;
    let members = execute(&tx, &db::members::delete_for_workspace(&id))
        .map_err(ApiErr::from_db("delete workspace members"))?;
    execute(&tx, &db::workspaces::delete(&id)).map_err(ApiErr::from_db("delete workspace"))?;
    tx.commit().map_err(ApiErr::from_db("commit delete workspace"))?;

    tracing::info!(workspace_id = %id, items, members, "workspace deleted");
    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// List members
// ---------------------------------------------------------------------------

/// GET /workspaces/:id/members: the owner first, then members by join time.
pub async fn list_members(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ListMembersResponse>, ApiErr> {
    let conn = db.conn();
    let (workspace, _) = access::require_access(&conn, &id, &user.user_id)?;

    let owner = query_opt(&conn, &db::users::get_by_id(&workspace.owner_id), user_from_row)
        .map_err(ApiErr::from_db("load owner"))?;

    let mut members = vec![MemberResponse {
        id: workspace.owner_id.clone(),
        user_id: workspace.owner_id.clone(),
        role: Role::Owner,
        email: owner.and_then(|o| o.email),
        joined_at: None,
    }];

    let rows = query_all(&conn, &db::members::list(&id), |row| {
        Ok((
            row.get::<_, String>(0)?,         // id
            row.get::<_, String>(1)?,         // user_id
            row.get::<_, String>(2)?,         // role
            row.get::<_, Option<String>>(3)?, // email
            row.get::<_, String>(4)?,         // joined_at
        ))
    })
    .map_err(ApiErr::from_db("list members"))?;

    members.extend(
        rows.into_iter()
            .filter_map(|(member_id, user_id, role, email, joined_at)| {
                Some(MemberResponse {
                    id: member_id,
                    role: Role::parse(&role)?,
                    user_id,
                    email,
                    joined_at: Some(joined_at),
                })
            }),
    );

    Ok(Json(ListMembersResponse { members }))
}

// ---------------------------------------------------------------------------
// Add member (owner only, by email)
// ---------------------------------------------------------------------------

/// POST /workspaces/:id/members: share the workspace with an existing user.
pub async fn add_member(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiErr> {
    let email = service::validate_email(&req.email)?;

    let conn = db.conn();
    let workspace = access::require_owner(&conn, &id, &user.user_id, "add members")?;

    let target = query_opt(&conn, &db::users::get_by_email(&email), user_from_row)
        .map_err(ApiErr::from_db("find user by email"))?
        .ok_or_else(|| ApiErr::not_found("user not found"))?;

    let already = access::is_member(&conn, &id, &target.id)?;
    service::check_new_member(&workspace.owner_id, &target.id, already)?;

    let member_id = Uuid::new_v4().to_string();
    let role = Role::Member;
    execute(
        &conn,
        &db::members::insert(&member_id, &id, &target.id, role.as_str()),
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ApiErr::bad_request("user is already a member")
        }
        e => ApiErr::from_db("add member")(e),
    })?;

    let joined_at: Option<String> =
        query_opt(&conn, &db::members::joined_at(&member_id), |row| row.get(0))
            .map_err(ApiErr::from_db("load membership"))?;

    tracing::info!(workspace_id = %id, user_id = %target.id, "member added");

    Ok((
        StatusCode::CREATED,
        Json(MemberResponse {
            id: member_id,
            user_id: target.id,
            role,
            email: target.email,
            joined_at,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Remove member (owner only)
// ---------------------------------------------------------------------------

/// DELETE /workspaces/:id/members/:member_id: revoke a membership.
pub async fn remove_member(
    State(db): State<Db>,
    user: AuthUser,
    Path((id, member_id)): Path<(String, String)>,
) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    access::require_owner(&conn, &id, &user.user_id, "remove members")?;

    let affected = execute(&conn, &db::members::delete(&member_id, &id))
        .map_err(ApiErr::from_db("remove member"))?;
    if affected == 0 {
        return Err(ApiErr::not_found("member not found"));
    }

    tracing::info!(workspace_id = %id, member_id = %member_id, "member removed");
    Ok(Json(OkResponse { ok: true }))
}
