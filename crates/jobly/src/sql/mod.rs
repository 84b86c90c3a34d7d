//! SQL text + parameter carriers.
//!
//! - [`Query`] holds a complete SQL string that is already numbered `$1, $2...`
//!   (e.g. one assembled around a [`PartialUpdate`](crate::PartialUpdate)).
//! - [`Sql`] composes SQL piecewise and numbers placeholders itself, which is
//!   what the filtered finders use.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql;
//!
//! let mut q = sql("SELECT handle, name FROM companies");
//! if let Some(min) = min_employees {
//!     q.push(" WHERE num_employees >= ").push_bind(min);
//! }
//! q.push(" ORDER BY name");
//!
//! let companies: Vec<Company> = q.fetch_all_as(&conn).await?;
//! ```

#[macro_use]
mod exec_macros;

mod builder;
mod parts;
mod query;

#[cfg(test)]
mod tests;

pub use builder::Sql;
pub use query::Query;

/// Build a SQL query from a pre-numbered SQL string (`$1, $2, ...`).
pub fn query(initial_sql: impl Into<String>) -> Query {
    Query::new(initial_sql)
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}
