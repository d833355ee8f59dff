//! Workspace membership query builders.

use sea_query::{Alias, Asterisk, Expr, Func, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::{Users, WorkspaceMembers};

/// INSERT a membership row.
pub fn insert(id: &str, workspace_id: &str, user_id: &str, role: &str) -> Built {
    Query::insert()
        .into_table(WorkspaceMembers::Table)
        .columns([
            WorkspaceMembers::Id,
            WorkspaceMembers::WorkspaceId,
            WorkspaceMembers::UserId,
            WorkspaceMembers::Role,
        ])
        .values_panic([
            id.into(),
            workspace_id.into(),
            user_id.into(),
            role.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Get the role stored on a user's membership row.
pub fn role_of(workspace_id: &str, user_id: &str) -> Built {
    Query::select()
        .column(WorkspaceMembers::Role)
        .from(WorkspaceMembers::Table)
        .and_where(Expr::col(WorkspaceMembers::WorkspaceId).eq(workspace_id))
        .and_where(Expr::col(WorkspaceMembers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Check if a user has a membership row in a workspace.
pub fn exists(workspace_id: &str, user_id: &str) -> Built {
    Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(WorkspaceMembers::Table)
        .and_where(Expr::col(WorkspaceMembers::WorkspaceId).eq(workspace_id))
        .and_where(Expr::col(WorkspaceMembers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// List members of a workspace (joins with users for the email).
///
/// Columns: `id, user_id, role, email, joined_at`.
pub fn list(workspace_id: &str) -> Built {
    Query::select()
        .column((WorkspaceMembers::Table, WorkspaceMembers::Id))
        .column((WorkspaceMembers::Table, WorkspaceMembers::UserId))
        .column((WorkspaceMembers::Table, WorkspaceMembers::Role))
        .column((Users::Table, Users::Email))
        .column((WorkspaceMembers::Table, WorkspaceMembers::JoinedAt))
        .from(WorkspaceMembers::Table)
        .left_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id))
                .equals((WorkspaceMembers::Table, WorkspaceMembers::UserId)),
        )
        .and_where(Expr::col((WorkspaceMembers::Table, WorkspaceMembers::WorkspaceId)).eq(workspace_id))
        .order_by((WorkspaceMembers::Table, WorkspaceMembers::JoinedAt), Order::Asc)
        .order_by_expr(Expr::cust("\"workspace_members\".\"rowid\""), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Get a membership's `joined_at` timestamp.
pub fn joined_at(id: &str) -> Built {
    Query::select()
        .column(WorkspaceMembers::JoinedAt)
        .from(WorkspaceMembers::Table)
        .and_where(Expr::col(WorkspaceMembers::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// DELETE a membership row, scoped to its workspace.
pub fn delete(id: &str, workspace_id: &str) -> Built {
    Query::delete()
        .from_table(WorkspaceMembers::Table)
        .and_where(Expr::col(WorkspaceMembers::Id).eq(id))
        .and_where(Expr::col(WorkspaceMembers::WorkspaceId).eq(workspace_id))
        .build(SqliteQueryBuilder)
}

/// DELETE every membership row of a workspace.
pub fn delete_for_workspace(workspace_id: &str) -> Built {
    Query::delete()
        .from_table(WorkspaceMembers::Table)
        .and_where(Expr::col(WorkspaceMembers::WorkspaceId).eq(workspace_id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_is_scoped_to_workspace() {
        let (sql, values) = delete("m1", "w1");
        assert!(sql.contains("\"workspace_id\" = ?"), "{sql}");
        assert_eq!(values.0.len(), 2);
    }
}
