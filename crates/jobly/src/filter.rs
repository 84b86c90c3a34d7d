//! Filtered-finder predicates.
//!
//! Each optional filter a caller supplies becomes one [`Predicate`]; the
//! predicates are joined with `AND` into a `WHERE` clause. Absent filters add
//! nothing, so an empty predicate list leaves the base query unrestricted.

use crate::sql::Sql;

/// A single `WHERE` condition over one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring match: `column ILIKE '%needle%'`.
    Contains {
        column: &'static str,
        needle: String,
    },
    /// Inclusive lower bound: `column >= value`.
    AtLeast { column: &'static str, value: i32 },
    /// Inclusive upper bound: `column <= value`.
    AtMost { column: &'static str, value: i32 },
    /// Present and strictly positive: `column IS NOT NULL AND column > 0`.
    Positive { column: &'static str },
}

impl Predicate {
    pub fn contains(column: &'static str, needle: impl Into<String>) -> Self {
        Self::Contains {
            column,
            needle: needle.into(),
        }
    }

    pub fn at_least(column: &'static str, value: i32) -> Self {
        Self::AtLeast { column, value }
    }

    pub fn at_most(column: &'static str, value: i32) -> Self {
        Self::AtMost { column, value }
    }

    pub fn positive(column: &'static str) -> Self {
        Self::Positive { column }
    }

    /// Render this predicate as a SQL fragment with its own bound parameter.
    pub fn to_sql(&self) -> Sql {
        let mut sql = Sql::empty();
        match self {
            Self::Contains { column, needle } => {
                sql.push(column)
                    .push(" ILIKE ")
                    .push_bind(format!("%{needle}%"));
            }
            Self::AtLeast { column, value } => {
                sql.push(column).push(" >= ").push_bind(*value);
            }
            Self::AtMost { column, value } => {
                sql.push(column).push(" <= ").push_bind(*value);
            }
            Self::Positive { column } => {
                sql.push(column)
                    .push(" IS NOT NULL AND ")
                    .push(column)
                    .push(" > 0");
            }
        }
        sql
    }
}

/// Append ` WHERE p1 AND p2 ...` to `base`; no-op for an empty list.
pub fn push_where(base: &mut Sql, predicates: &[Predicate]) {
    base.push_joined(" WHERE ", " AND ", predicates.iter().map(Predicate::to_sql));
}
