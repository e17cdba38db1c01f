//! Predicate composer on top of `sqlx::QueryBuilder`.
//!
//! Values are always bound, never spliced; only column and table names (all
//! compile-time constants) are pushed as raw SQL.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

/// A statement whose WHERE clause grows one optional predicate at a time.
pub(crate) struct Filtered<'q> {
    qb: QueryBuilder<'q, Postgres>,
    has_where: bool,
}

impl<'q> Filtered<'q> {
    pub(crate) fn new(head: &str) -> Self {
        Self {
            qb: QueryBuilder::new(head),
            has_where: false,
        }
    }

    /// `AND column = $n`, only when `value` is present.
    pub(crate) fn eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'q + Encode<'q, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.qb.push(if self.has_where { " AND " } else { " WHERE " });
            self.has_where = true;
            self.qb.push(column).push(" = ").push_bind(value);
        }
        self
    }

    pub(crate) fn order_by(mut self, clause: &str) -> QueryBuilder<'q, Postgres> {
        self.qb.push(" ORDER BY ").push(clause);
        self.qb
    }

    #[cfg(test)]
    pub(crate) fn finish(self) -> QueryBuilder<'q, Postgres> {
        self.qb
    }
}

/// `UPDATE table SET a = $1, b = $2 WHERE id = $n`.
pub(crate) struct Assignments<'q> {
    qb: QueryBuilder<'q, Postgres>,
    first: bool,
}

impl<'q> Assignments<'q> {
    pub(crate) fn update(table: &str) -> Self {
        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(table).push(" SET ");
        Self { qb, first: true }
    }

    pub(crate) fn set<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: 'q + Encode<'q, Postgres> + Type<Postgres> + Send,
    {
        if !self.first {
            self.qb.push(", ");
        }
        self.first = false;
        self.qb.push(column).push(" = ").push_bind(value);
        self
    }

    pub(crate) fn where_id(mut self, id: i64) -> QueryBuilder<'q, Postgres> {
        self.qb.push(" WHERE id = ").push_bind(id);
        self.qb
    }
}

/// `INSERT INTO table (columns) VALUES (...) RETURNING id`, the values pushed
/// by `bind`.
pub(crate) fn insert<'q, F>(table: &str, columns: &[&str], bind: F) -> QueryBuilder<'q, Postgres>
where
    F: FnOnce(&mut sqlx::query_builder::Separated<'_, 'q, Postgres, &'static str>),
{
    let mut qb = QueryBuilder::new("INSERT INTO ");
    qb.push(table)
        .push(" (")
        .push(columns.join(", "))
        .push(") VALUES (");
    {
        let mut values = qb.separated(", ");
        bind(&mut values);
    }
    qb.push(") RETURNING id");
    qb
}

pub(crate) fn delete_by_id<'q>(table: &str, id: i64) -> QueryBuilder<'q, Postgres> {
    let mut qb = QueryBuilder::new("DELETE FROM ");
    qb.push(table).push(" WHERE id = ").push_bind(id);
    qb
}
