/// Generate the query execution methods for a type that can provide
/// `(sql: String, params: Vec<&(dyn ToSql + Sync)>, tag: Option<&str>)`.
///
/// Usage:
/// ```ignore
/// impl_query_exec! {
///     prepare(self) {
///         self.validate()?;
///         let sql = self.to_sql();
///         let params = self.params_ref();
///         let tag = self.tag.as_deref();
///         (sql, params, tag)
///     }
/// }
/// ```
macro_rules! impl_query_exec {
    (prepare($this:ident) $prepare:block) => {

        /// Execute the SQL and return all rows.
        pub async fn fetch_all(&$this, conn: &impl $crate::client::GenericClient) -> $crate::error::JoblyResult<Vec<tokio_postgres::Row>> {
            let (sql, params, tag) = $prepare;
            match tag {
                Some(tag) => conn.query_tagged(tag, &sql, &params).await,
                None => conn.query(&sql, &params).await,
            }
        }

        /// Execute the SQL and return all rows mapped to `T`.
        pub async fn fetch_all_as<T: $crate::row::FromRow>(&$this, conn: &impl $crate::client::GenericClient) -> $crate::error::JoblyResult<Vec<T>> {
            let rows = $this.fetch_all(conn).await?;
            rows.iter().map(T::from_row).collect()
        }

        /// Execute the SQL and return the **first** row.
        ///
        /// Zero rows is [`JoblyError::NotFound`](crate::JoblyError::NotFound).
        pub async fn fetch_one(&$this, conn: &impl $crate::client::GenericClient) -> $crate::error::JoblyResult<tokio_postgres::Row> {
            let (sql, params, tag) = $prepare;
            match tag {
                Some(tag) => conn.query_one_tagged(tag, &sql, &params).await,
                None => conn.query_one(&sql, &params).await,
            }
        }

        /// Execute the SQL and return the **first** row mapped to `T`.
        pub async fn fetch_one_as<T: $crate::row::FromRow>(&$this, conn: &impl $crate::client::GenericClient) -> $crate::error::JoblyResult<T> {
            let row = $this.fetch_one(conn).await?;
            T::from_row(&row)
        }

        /// Execute the SQL and return the first row, if any.
        pub async fn fetch_opt(&$this, conn: &impl $crate::client::GenericClient) -> $crate::error::JoblyResult<Option<tokio_postgres::Row>> {
            let (sql, params, tag) = $prepare;
            match tag {
                Some(tag) => conn.query_opt_tagged(tag, &sql, &params).await,
                None => conn.query_opt(&sql, &params).await,
            }
        }

        /// Execute the SQL and return at most one row mapped to `T`.
        pub async fn fetch_opt_as<T: $crate::row::FromRow>(&$this, conn: &impl $crate::client::GenericClient) -> $crate::error::JoblyResult<Option<T>> {
            let row = $this.fetch_opt(conn).await?;
            row.as_ref().map(T::from_row).transpose()
        }

        /// Execute the SQL and return affected row count.
        pub async fn execute(&$this, conn: &impl $crate::client::GenericClient) -> $crate::error::JoblyResult<u64> {
            let (sql, params, tag) = $prepare;
            match tag {
                Some(tag) => conn.execute_tagged(tag, &sql, &params).await,
                None => conn.execute(&sql, &params).await,
            }
        }

        /// Check if any rows exist by wrapping the query in `SELECT EXISTS(...)`.
        pub async fn exists(&$this, conn: &impl $crate::client::GenericClient) -> $crate::error::JoblyResult<bool> {
            let (sql, params, tag) = $prepare;
            let inner_sql = sql.trim_end();
            let inner_sql = inner_sql.strip_suffix(';').unwrap_or(inner_sql).trim_end();

            let wrapped_sql = format!("SELECT EXISTS({inner_sql})");
            let row = match tag {
                Some(tag) => conn.query_one_tagged(tag, &wrapped_sql, &params).await?,
                None => conn.query_one(&wrapped_sql, &params).await?,
            };
            row.try_get(0)
                .map_err(|e| $crate::error::JoblyError::decode("0", e.to_string()))
        }
    };
}
