//! SQL statement logging.
//!
//! [`LoggedClient`] wraps any [`GenericClient`] and emits one `tracing` event
//! per statement on target `jobly.sql`: the query tag, the SQL text
//! (truncated), the parameter count, the row count and the elapsed time.
//! Statements slower than the configured threshold are logged at `WARN`.
//!
//! ```ignore
//! let config = DbConfig::from_env()?;
//! let pool = jobly::create_pool(&config)?;
//! let client = LoggedClient::from_config(pool.get().await?, &config);
//! let companies = Company::find_all(&client, &filter).await?;
//! ```

use crate::client::GenericClient;
use crate::config::DbConfig;
use crate::error::JoblyResult;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// A client wrapper that logs every statement it runs.
#[derive(Debug, Clone)]
pub struct LoggedClient<C> {
    client: C,
    level: Level,
    max_sql_length: Option<usize>,
    slow_query_threshold: Option<Duration>,
}

impl<C: GenericClient> LoggedClient<C> {
    /// Wrap `client`, logging at `DEBUG` with SQL truncated to 200 bytes.
    pub fn new(client: C) -> Self {
        Self {
            client,
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }

    /// Wrap `client` with the slow-statement threshold from `config`, if any.
    pub fn from_config(client: C, config: &DbConfig) -> Self {
        let logged = Self::new(client);
        match config.slow_query_threshold() {
            Some(threshold) => logged.slow_query_threshold(threshold),
            None => logged,
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Log statements taking at least `threshold` at `WARN`.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Get the inner client, consuming this wrapper.
    pub fn into_inner(self) -> C {
        self.client
    }

    fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    /// Level for a successful statement, and whether it counts as slow.
    fn event_level(&self, elapsed: Duration) -> (Level, bool) {
        let slow = self
            .slow_query_threshold
            .is_some_and(|threshold| elapsed >= threshold);
        (if slow { Level::WARN } else { self.level }, slow)
    }

    async fn observe<T, F>(
        &self,
        tag: Option<&str>,
        sql: &str,
        param_count: usize,
        rows: impl Fn(&T) -> u64,
        fut: F,
    ) -> JoblyResult<T>
    where
        F: Future<Output = JoblyResult<T>>,
    {
        let start = Instant::now();
        let result = fut.await;
        let elapsed = start.elapsed();

        let tag = tag.unwrap_or("-");
        let sql = self.display_sql(sql);
        match &result {
            Ok(value) => {
                let (level, slow) = self.event_level(elapsed);
                emit_at_level!(
                    level,
                    target: "jobly.sql",
                    tag,
                    params = param_count,
                    rows = rows(value),
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    slow,
                    sql = %sql,
                    "sql"
                );
            }
            Err(err) => {
                tracing::warn!(
                    target: "jobly.sql",
                    tag,
                    params = param_count,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    error = %err,
                    sql = %sql,
                    "sql failed"
                );
            }
        }
        result
    }
}

impl<C: GenericClient> GenericClient for LoggedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.observe(None, sql, params.len(), row_count, self.client.query(sql, params))
            .await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        self.observe(
            Some(tag),
            sql,
            params.len(),
            row_count,
            self.client.query_tagged(tag, sql, params),
        )
        .await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.observe(None, sql, params.len(), |n| *n, self.client.execute(sql, params))
            .await
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<u64> {
        self.observe(
            Some(tag),
            sql,
            params.len(),
            |n| *n,
            self.client.execute_tagged(tag, sql, params),
        )
        .await
    }
}

#[allow(clippy::ptr_arg)]
fn row_count(rows: &Vec<Row>) -> u64 {
    rows.len() as u64
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoblyError;

    struct StubClient {
        delay: Duration,
        fail: bool,
    }

    impl StubClient {
        fn ok() -> Self {
            Self {
                delay: Duration::ZERO,
                fail: false,
            }
        }
    }

    impl GenericClient for StubClient {
        async fn query(&self, _: &str, _: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(JoblyError::bad_request("Duplicate company: c1"));
            }
            Ok(vec![])
        }

        async fn execute(&self, _: &str, _: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(JoblyError::not_found("No job: 7"));
            }
            Ok(3)
        }
    }

    #[test]
    fn level_defaults_to_debug_without_threshold() {
        let client = LoggedClient::new(StubClient::ok());
        assert_eq!(client.event_level(Duration::from_secs(60)), (Level::DEBUG, false));
    }

    #[test]
    fn configured_level_applies_below_threshold() {
        let client = LoggedClient::new(StubClient::ok())
            .level(Level::INFO)
            .slow_query_threshold(Duration::from_millis(100));
        assert_eq!(client.event_level(Duration::from_millis(5)), (Level::INFO, false));
        assert_eq!(client.event_level(Duration::from_millis(100)), (Level::WARN, true));
    }

    #[test]
    fn zero_threshold_marks_everything_slow() {
        let client = LoggedClient::new(StubClient::ok())
            .level(Level::TRACE)
            .slow_query_threshold(Duration::ZERO);
        assert_eq!(client.event_level(Duration::ZERO), (Level::WARN, true));
    }

    #[test]
    fn from_config_carries_slow_threshold() {
        let mut config = DbConfig::new("postgres://localhost/jobly");
        let plain = LoggedClient::from_config(StubClient::ok(), &config);
        assert_eq!(plain.slow_query_threshold, None);

        config.slow_query_ms = Some(250);
        let logged = LoggedClient::from_config(StubClient::ok(), &config);
        assert_eq!(logged.slow_query_threshold, Some(Duration::from_millis(250)));
        assert_eq!(logged.event_level(Duration::from_millis(300)), (Level::WARN, true));
    }

    #[tokio::test]
    async fn slow_statements_pass_results_through() {
        let client = LoggedClient::new(StubClient {
            delay: Duration::from_millis(20),
            fail: false,
        })
        .slow_query_threshold(Duration::from_millis(5));

        assert!(client.query("SELECT 1", &[]).await.unwrap().is_empty());
        assert_eq!(client.execute_tagged("jobs.remove", "DELETE", &[]).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn failures_pass_errors_through() {
        let client = LoggedClient::new(StubClient {
            delay: Duration::ZERO,
            fail: true,
        });

        let err = client.query_tagged("companies.create", "INSERT", &[]).await.unwrap_err();
        assert!(matches!(&err, JoblyError::BadRequest(msg) if msg == "Duplicate company: c1"));

        let err = client.execute("DELETE", &[]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn default_methods_route_through_wrapper() {
        let client = LoggedClient::new(StubClient::ok()).max_sql_length(4);
        assert!(client.query_opt("SELECT 1", &[]).await.unwrap().is_none());
        assert!(client.query_one("SELECT 1", &[]).await.unwrap_err().is_not_found());
        assert_eq!(client.display_sql("SELECT 1"), "SELE...");
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; cutting inside it backs off.
        assert_eq!(truncate_sql_bytes("é", 1), "");
    }
}
