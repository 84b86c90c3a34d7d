//! # jobly
//!
//! The companies and jobs model layer of a job board, on PostgreSQL.
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns the supplied fields
//!   of a patch into a `SET` fragment plus its ordered parameter values.
//! - **Filtered finders**: optional name/title substring, numeric bounds and
//!   equity filters compile into a single parameterized `WHERE` clause.
//! - **Explicit errors**: missing rows, bad input and missing credentials are
//!   distinct [`JoblyError`] variants a routing layer maps to 404/400/401.
//! - **Injected connections**: every operation takes a [`GenericClient`], so a
//!   pooled connection, a bare client or a transaction all work.
//!
//! ```ignore
//! use jobly::{Company, CompanyFilter, CompanyPatch, DbConfig, LoggedClient};
//!
//! let pool = jobly::create_pool(&DbConfig::from_env()?)?;
//! let conn = LoggedClient::new(pool.get().await?);
//!
//! let filter = CompanyFilter::from_json(serde_json::json!({ "name": "net" }))?;
//! let companies = Company::find_all(&conn, &filter).await?;
//!
//! let patch = CompanyPatch::from_json(serde_json::json!({ "numEmployees": 10 }))?;
//! let updated = Company::update(&conn, "c1", patch).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod monitor;
pub mod partial_update;
pub mod row;
pub mod sql;
pub mod validate;
pub mod value;

pub use auth::Caller;
pub use client::GenericClient;
pub use config::DbConfig;
pub use error::{JoblyError, JoblyResult};
pub use filter::Predicate;
pub use models::{
    Company, CompanyDetail, CompanyFilter, CompanyPatch, Job, JobDetail, JobFilter, JobListing,
    JobPatch, JobSummary, NewCompany, NewJob,
};
pub use monitor::LoggedClient;
pub use partial_update::{PartialUpdate, sql_for_partial_update};
pub use row::{FromRow, RowExt};
pub use sql::{Query, Sql, query, sql};
pub use validate::{ValidationError, ValidationErrors};
pub use value::FieldValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;
