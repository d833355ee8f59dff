//! User query builders.

use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::Users;

/// Column list for user SELECT queries: `id, email, created_at`.
fn user_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.column(Users::Id)
        .column(Users::Email)
        .column(Users::CreatedAt)
}

/// Find user by the identity provider's subject claim.
pub fn get_by_subject(subject: &str) -> Built {
    let mut q = Query::select().to_owned();
    user_columns(&mut q);
    q.from(Users::Table)
        .and_where(Expr::col(Users::Subject).eq(subject))
        .build(SqliteQueryBuilder)
}

/// Find user by id.
pub fn get_by_id(user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    user_columns(&mut q);
    q.from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Find user by (normalized) email. Oldest account wins if several share it.
pub fn get_by_email(email: &str) -> Built {
    let mut q = Query::select().to_owned();
    user_columns(&mut q);
    q.from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .order_by(Users::CreatedAt, sea_query::Order::Asc)
        .limit(1)
        .build(SqliteQueryBuilder)
}

/// Insert a user on first sight of a subject. A concurrent insert for the
/// same subject is ignored; callers re-select afterwards.
pub fn insert_if_absent(id: &str, subject: &str, email: Option<&str>) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([Users::Id, Users::Subject, Users::Email])
        .values_panic([
            id.into(),
            subject.into(),
            email.map(|s| s.to_string()).into(),
        ])
        .on_conflict(OnConflict::column(Users::Subject).do_nothing().to_owned())
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_ignores_subject_conflicts() {
        let (sql, values) = insert_if_absent("u1", "sub", None);
        assert!(sql.contains("ON CONFLICT"), "{sql}");
        assert!(sql.contains("DO NOTHING"), "{sql}");
        assert_eq!(values.0.len(), 3);
    }

    #[test]
    fn lookup_by_email_returns_single_row() {
        let (sql, _) = get_by_email("a@example.com");
        assert!(sql.contains("LIMIT"), "{sql}");
    }
}
