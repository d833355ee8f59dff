use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use uuid::Uuid;

use sharespace_api::{
    CreateItemRequest, ItemListQuery, ItemResponse, ListItemsResponse, OkResponse,
    UpdateItemRequest, WorkspaceScopeQuery, db, service,
};

use crate::access;
use crate::db_helpers::{execute, query_all, query_opt};
use crate::error::ApiErr;
use crate::routes::auth::AuthUser;
use crate::storage::{Db, item_from_row};

/// Load an item and check the caller can access its workspace.
fn load_accessible_item(
    conn: &Connection,
    item_id: &str,
    user_id: &str,
) -> Result<ItemResponse, ApiErr> {
    let item = query_opt(conn, &db::items::get_by_id(item_id), item_from_row)
        .map_err(ApiErr::from_db("load item"))?
        .ok_or_else(|| ApiErr::not_found("item not found"))?;
    access::require_access(conn, &item.workspace_id, user_id)?;
    Ok(item)
}

fn reload_item(conn: &Connection, item_id: &str) -> Result<ItemResponse, ApiErr> {
    query_opt(conn, &db::items::get_by_id(item_id), item_from_row)
        .map_err(ApiErr::from_db("load item"))?
        .ok_or_else(|| ApiErr::not_found("item not found"))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /items?workspace_id=…: create an item in a workspace the caller can access.
pub async fn create_item(
    State(db): State<Db>,
    user: AuthUser,
    Query(scope): Query<WorkspaceScopeQuery>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiErr> {
    let workspace_id = service::require_workspace_id(scope.workspace_id.as_deref())?;
    let title = service::validate_item_title(&req.title)?;

    let conn = db.conn();
    access::require_access(&conn, workspace_id, &user.user_id)?;

    let id = Uuid::new_v4().to_string();
    execute(
        &conn,
        &db::items::insert(&id, workspace_id, &title, req.description.as_deref()),
    )
    .map_err(ApiErr::from_db("create item"))?;

    Ok((StatusCode::CREATED, Json(reload_item(&conn, &id)?)))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /items[?workspace_id=&skip=&limit=]: one workspace's items, or every
/// item the caller can reach when no workspace is given.
pub async fn list_items(
    State(db): State<Db>,
    user: AuthUser,
    Query(q): Query<ItemListQuery>,
) -> Result<Json<ListItemsResponse>, ApiErr> {
    let conn = db.conn();

    let built = match q.workspace_id.as_deref().map(str::trim) {
        Some(workspace_id) if !workspace_id.is_empty() => {
            access::require_access(&conn, workspace_id, &user.user_id)?;
            db::items::list_for_workspace(workspace_id, q.offset(), q.limit())
        }
        _ => db::items::list_accessible(&user.user_id, q.offset(), q.limit()),
    };

    let items = query_all(&conn, &built, item_from_row).map_err(ApiErr::from_db("list items"))?;
    Ok(Json(ListItemsResponse { items }))
}

// ---------------------------------------------------------------------------
// Read / update / delete
// ---------------------------------------------------------------------------

/// GET /items/:id
pub async fn get_item(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiErr> {
    let conn = db.conn();
    Ok(Json(load_accessible_item(&conn, &id, &user.user_id)?))
}

/// PUT /items/:id: update title and/or description (`null` clears it).
pub async fn update_item(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiErr> {
    let title = req
        .title
        .as_deref()
        .map(service::validate_item_title)
        .transpose()?;

    let conn = db.conn();
    load_accessible_item(&conn, &id, &user.user_id)?;

    execute(
        &conn,
        &db::items::update(
            &id,
            title.as_deref(),
            req.description.as_ref().map(|d| d.as_deref()),
        ),
    )
    .map_err(ApiErr::from_db("update item"))?;

    Ok(Json(reload_item(&conn, &id)?))
}

/// DELETE /items/:id
pub async fn delete_item(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    load_accessible_item(&conn, &id, &user.user_id)?;

    execute(&conn, &db::items::delete(&id)).map_err(ApiErr::from_db("delete item"))?;
    Ok(Json(OkResponse { ok: true }))
}
