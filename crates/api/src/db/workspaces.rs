//! Workspace query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::{WorkspaceMembers, Workspaces};

/// Column list for workspace SELECT queries: `id, name, owner_id, created_at`.
fn workspace_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.column((Workspaces::Table, Workspaces::Id))
        .column((Workspaces::Table, Workspaces::Name))
        .column((Workspaces::Table, Workspaces::OwnerId))
        .column((Workspaces::Table, Workspaces::CreatedAt))
}

/// INSERT a new workspace.
pub fn insert(id: &str, name: &str, owner_id: &str) -> Built {
    Query::insert()
        .into_table(Workspaces::Table)
        .columns([Workspaces::Id, Workspaces::Name, Workspaces::OwnerId])
        .values_panic([id.into(), name.into(), owner_id.into()])
        .build(SqliteQueryBuilder)
}

/// SELECT a single workspace by id.
pub fn get_by_id(id: &str) -> Built {
    let mut q = Query::select().to_owned();
    workspace_columns(&mut q);
    q.from(Workspaces::Table)
        .and_where(Expr::col((Workspaces::Table, Workspaces::Id)).eq(id))
        .build(SqliteQueryBuilder)
}

/// Workspaces owned by a user, oldest first.
pub fn list_owned(user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    workspace_columns(&mut q);
    q.from(Workspaces::Table)
        .and_where(Expr::col((Workspaces::Table, Workspaces::OwnerId)).eq(user_id))
        .order_by((Workspaces::Table, Workspaces::CreatedAt), Order::Asc)
        .order_by_expr(Expr::cust("\"workspaces\".\"rowid\""), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Workspaces shared with a user through a membership row, with the stored
/// role as a fifth column. Workspaces the user owns are excluded.
pub fn list_shared(user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    workspace_columns(&mut q);
    q.column((WorkspaceMembers::Table, WorkspaceMembers::Role))
        .from(Workspaces::Table)
        .inner_join(
            WorkspaceMembers::Table,
            Expr::col((WorkspaceMembers::Table, WorkspaceMembers::WorkspaceId))
                .equals((Workspaces::Table, Workspaces::Id)),
        )
        .and_where(Expr::col((WorkspaceMembers::Table, WorkspaceMembers::UserId)).eq(user_id))
        .and_where(Expr::col((Workspaces::Table, Workspaces::OwnerId)).ne(user_id))
        .order_by((WorkspaceMembers::Table, WorkspaceMembers::JoinedAt), Order::Asc)
        .order_by_expr(Expr::cust("\"workspace_members\".\"rowid\""), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// DELETE a workspace. Members and items go first in the same transaction.
pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Workspaces::Table)
        .and_where(Expr::col(Workspaces::Id).eq(id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_listing_excludes_owned_workspaces() {
        let (sql, values) = list_shared("u1");
        assert!(sql.contains("INNER JOIN \"workspace_members\""), "{sql}");
        assert!(sql.contains("<>"), "{sql}");
        assert_eq!(values.0.len(), 2);
    }
}
