//! Connection pool utilities

use crate::config::DbConfig;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a `NoTls` connection pool sized from `config`.
///
/// ```ignore
/// let pool = jobly::create_pool(&DbConfig::from_env()?)?;
/// let client = pool.get().await?;
/// let companies = Company::find_all(&client, &CompanyFilter::default()).await?;
/// ```
pub fn create_pool(config: &DbConfig) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(config.max_pool_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_url() {
        let err = create_pool(&DbConfig::new("not a url ===")).unwrap_err();
        assert!(matches!(err, JoblyError::Connection(_)));
    }

    #[tokio::test]
    async fn builds_lazily_without_connecting() {
        let pool = create_pool(&DbConfig::new("postgres://nobody@127.0.0.1:1/none")).unwrap();
        assert_eq!(pool.status().max_size, 16);
    }
}
