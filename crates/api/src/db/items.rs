//! Item query builders.

use sea_query::{Cond, Expr, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::{Items, WorkspaceMembers, Workspaces};

/// Column list for item SELECT queries:
/// `id, workspace_id, title, description, created_at, updated_at`.
fn item_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.column((Items::Table, Items::Id))
        .column((Items::Table, Items::WorkspaceId))
        .column((Items::Table, Items::Title))
        .column((Items::Table, Items::Description))
        .column((Items::Table, Items::CreatedAt))
        .column((Items::Table, Items::UpdatedAt))
}

fn oldest_first(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.order_by((Items::Table, Items::CreatedAt), Order::Asc)
        .order_by_expr(Expr::cust("\"items\".\"rowid\""), Order::Asc)
}

/// INSERT a new item.
pub fn insert(id: &str, workspace_id: &str, title: &str, description: Option<&str>) -> Built {
    Query::insert()
        .into_table(Items::Table)
        .columns([Items::Id, Items::WorkspaceId, Items::Title, Items::Description])
        .values_panic([
            id.into(),
            workspace_id.into(),
            title.into(),
            description.map(|s| s.to_string()).into(),
        ])
        .build(SqliteQueryBuilder)
}

/// SELECT a single item by id.
pub fn get_by_id(id: &str) -> Built {
    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    q.from(Items::Table)
        .and_where(Expr::col((Items::Table, Items::Id)).eq(id))
        .build(SqliteQueryBuilder)
}

/// One page of a workspace's items, oldest first.
pub fn list_for_workspace(workspace_id: &str, offset: u64, limit: u64) -> Built {
    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    q.from(Items::Table)
        .and_where(Expr::col((Items::Table, Items::WorkspaceId)).eq(workspace_id));
    oldest_first(&mut q);
    q.limit(limit).offset(offset).build(SqliteQueryBuilder)
}

/// One page of items across every workspace the user owns or is a member of.
pub fn list_accessible(user_id: &str, offset: u64, limit: u64) -> Built {
    let owned = Query::select()
        .column(Workspaces::Id)
        .from(Workspaces::Table)
        .and_where(Expr::col(Workspaces::OwnerId).eq(user_id))
        .to_owned();
    let shared = Query::select()
        .column(WorkspaceMembers::WorkspaceId)
        .from(WorkspaceMembers::Table)
        .and_where(Expr::col(WorkspaceMembers::UserId).eq(user_id))
        .to_owned();

    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    q.from(Items::Table).cond_where(
        Cond::any()
            .add(Expr::col((Items::Table, Items::WorkspaceId)).in_subquery(owned))
            .add(Expr::col((Items::Table, Items::WorkspaceId)).in_subquery(shared)),
    );
    oldest_first(&mut q);
    q.limit(limit).offset(offset).build(SqliteQueryBuilder)
}

/// Update an item's title and/or description and bump `updated_at`.
/// `None` leaves a field unchanged; `Some(None)` clears the description.
pub fn update(id: &str, title: Option<&str>, description: Option<Option<&str>>) -> Built {
    let mut q = Query::update();
    q.table(Items::Table)
        .value(Items::UpdatedAt, Expr::cust("datetime('now')"));
    if let Some(title) = title {
        q.value(Items::Title, title);
    }
    if let Some(description) = description {
        q.value(Items::Description, description.map(str::to_string));
    }
    q.and_where(Expr::col(Items::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// DELETE an item.
pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Items::Table)
        .and_where(Expr::col(Items::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// DELETE every item of a workspace.
pub fn delete_for_workspace(workspace_id: &str) -> Built {
    Query::delete()
        .from_table(Items::Table)
        .and_where(Expr::col(Items::WorkspaceId).eq(workspace_id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_sets_given_fields() {
        let (sql, values) = update("i1", Some("New"), None);
        assert!(sql.contains("\"title\" = ?"), "{sql}");
        assert!(!sql.contains("\"description\""), "{sql}");
        assert!(sql.contains("datetime('now')"), "{sql}");
        assert_eq!(values.0.len(), 2);
    }

    #[test]
    fn update_can_clear_description() {
        let (sql, values) = update("i1", None, Some(None));
        assert!(sql.contains("\"description\" = ?"), "{sql}");
        assert!(!sql.contains("\"title\""), "{sql}");
        assert_eq!(values.0.len(), 2);
        assert_eq!(values.0[0], sea_query::Value::String(None));
    }

    #[test]
    fn accessible_listing_covers_owned_and_shared() {
        let (sql, _) = list_accessible("u1", 0, 100);
        assert!(sql.contains("\"workspaces\""), "{sql}");
        assert!(sql.contains("\"workspace_members\""), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains("LIMIT"), "{sql}");
    }
}
