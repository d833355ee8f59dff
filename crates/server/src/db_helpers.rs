//! Run sea-query statements on rusqlite.

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use sharespace_api::db::Built;

/// Convert `sea_query::Values` into rusqlite bind params.
pub fn values_to_sql(values: &sea_query::Values) -> Vec<SqlValue> {
    values
        .0
        .iter()
        .map(|v| match v {
            sea_query::Value::Bool(Some(b)) => SqlValue::Integer(i64::from(*b)),
            sea_query::Value::TinyInt(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::SmallInt(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::Int(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::BigInt(Some(i)) => SqlValue::Integer(*i),
            sea_query::Value::TinyUnsigned(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::SmallUnsigned(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::Unsigned(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::BigUnsigned(Some(i)) => {
                SqlValue::Integer(i64::try_from(*i).unwrap_or(i64::MAX))
            }
            sea_query::Value::Float(Some(f)) => SqlValue::Real(f64::from(*f)),
            sea_query::Value::Double(Some(f)) => SqlValue::Real(*f),
            sea_query::Value::String(Some(s)) => SqlValue::Text(s.as_str().to_string()),
            sea_query::Value::Char(Some(c)) => SqlValue::Text(c.to_string()),
            sea_query::Value::Bytes(Some(b)) => SqlValue::Blob(b.as_slice().to_vec()),
            _ => SqlValue::Null,
        })
        .collect()
}

/// Execute a built statement, returning the number of affected rows.
pub fn execute(conn: &Connection, (sql, values): &Built) -> rusqlite::Result<usize> {
    conn.execute(sql, params_from_iter(values_to_sql(values)))
}

/// Query a single row; `Ok(None)` when nothing matches.
pub fn query_opt<T>(
    conn: &Connection,
    (sql, values): &Built,
    map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Option<T>> {
    conn.query_row(sql, params_from_iter(values_to_sql(values)), map)
        .optional()
}

/// Query every matching row.
pub fn query_all<T>(
    conn: &Connection,
    (sql, values): &Built,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(values_to_sql(values)), map)?;
    rows.collect()
}

/// Run a `COUNT(*)` query and report whether it found anything.
pub fn exists(conn: &Connection, built: &Built) -> rusqlite::Result<bool> {
    Ok(query_opt(conn, built, |row| row.get::<_, i64>(0))?.unwrap_or(0) > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_common_values() {
        let values = sea_query::Values(vec![
            "text".into(),
            42i64.into(),
            7u64.into(),
            true.into(),
            Option::<String>::None.into(),
        ]);
        let sql = values_to_sql(&values);
        assert_eq!(sql[0], SqlValue::Text("text".into()));
        assert_eq!(sql[1], SqlValue::Integer(42));
        assert_eq!(sql[2], SqlValue::Integer(7));
        assert_eq!(sql[3], SqlValue::Integer(1));
        assert_eq!(sql[4], SqlValue::Null);
    }

    #[test]
    fn runs_built_statements() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY, n INTEGER);")
            .unwrap();
        let insert = (
            "INSERT INTO t (id, n) VALUES (?, ?)".to_string(),
            sea_query::Values(vec!["a".into(), 1i64.into()]),
        );
        assert_eq!(execute(&conn, &insert).unwrap(), 1);

        let select = (
            "SELECT n FROM t WHERE id = ?".to_string(),
            sea_query::Values(vec!["a".into()]),
        );
        let n = query_opt(&conn, &select, |row| row.get::<_, i64>(0)).unwrap();
        assert_eq!(n, Some(1));

        let missing = (
            "SELECT n FROM t WHERE id = ?".to_string(),
            sea_query::Values(vec!["b".into()]),
        );
        assert_eq!(query_opt(&conn, &missing, |row| row.get::<_, i64>(0)).unwrap(), None);

        let count = (
            "SELECT COUNT(*) FROM t".to_string(),
            sea_query::Values(vec![]),
        );
        assert!(exists(&conn, &count).unwrap());
    }
}
