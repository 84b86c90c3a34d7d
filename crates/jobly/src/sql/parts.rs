/// One piece of a [`Sql`](super::Sql) statement.
#[derive(Debug, Clone)]
pub(super) enum SqlPart {
    /// Literal SQL text.
    Raw(String),
    /// A `$n` placeholder, numbered when the statement is rendered.
    Param,
}
