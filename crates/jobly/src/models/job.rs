use super::company::Company;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{Predicate, push_where};
use crate::partial_update::sql_for_partial_update;
use crate::row::{FromRow, RowExt};
use crate::sql::{query, sql};
use crate::validate::ValidationErrors;
use crate::value::FieldValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::debug;

const COLUMNS: &str = "id, title, salary, equity, company_handle";

/// A job as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Fraction of the company offered, serialized as a decimal string.
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// A job row in a listing, with the owning company's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub company_name: String,
}

impl FromRow for JobListing {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            job: Job::from_row(row)?,
            company_name: row.try_get_column("company_name")?,
        })
    }
}

/// A job without its company reference, as nested under a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for JobSummary {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A job together with its company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: JobSummary,
    pub company: Company,
}

/// Body of a create-job request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    /// Deserialize and validate a JSON body.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        let new: Self = serde_json::from_value(body)?;
        new.validate()?;
        Ok(new)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_len("title", &self.title, 1, None);
        errors.check_len("companyHandle", &self.company_handle, 1, Some(25));
        if let Some(salary) = self.salary {
            errors.check_non_negative("salary", salary);
        }
        if let Some(equity) = self.equity {
            errors.check_fraction("equity", equity);
        }
        errors.into_result()
    }
}

/// Body of an update-job request.
///
/// `id` and `companyHandle` are immutable and are rejected as unknown fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default, deserialize_with = "super::present")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "super::present")]
    pub equity: Option<Option<Decimal>>,
}

impl JobPatch {
    /// Deserialize and validate a JSON body.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        let patch: Self = serde_json::from_value(body)?;
        patch.validate()?;
        Ok(patch)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(title) = &self.title {
            errors.check_len("title", title, 1, None);
        }
        if let Some(Some(salary)) = self.salary {
            errors.check_non_negative("salary", salary);
        }
        if let Some(Some(equity)) = self.equity {
            errors.check_fraction("equity", equity);
        }
        errors.into_result()
    }

    /// Supplied fields in declaration order. Job field names match columns.
    pub fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        let mut fields = Vec::new();
        if let Some(title) = self.title {
            fields.push(("title", title.into()));
        }
        if let Some(salary) = self.salary {
            fields.push(("salary", salary.into()));
        }
        if let Some(equity) = self.equity {
            fields.push(("equity", equity.into()));
        }
        fields
    }
}

/// Optional filters for [`Job::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the job title.
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    /// `true` keeps only jobs with non-null, non-zero equity; `false` is no filter.
    pub has_equity: Option<bool>,
}

impl JobFilter {
    /// Deserialize and validate filter parameters.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        let filter: Self = serde_json::from_value(body)?;
        filter.validate()?;
        Ok(filter)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(min) = self.min_salary {
            errors.check_non_negative("minSalary", min);
        }
        errors.into_result()
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(title) = &self.title {
            predicates.push(Predicate::contains("j.title", title.as_str()));
        }
        if let Some(min) = self.min_salary {
            predicates.push(Predicate::at_least("j.salary", min));
        }
        if self.has_equity == Some(true) {
            predicates.push(Predicate::positive("j.equity"));
        }
        predicates
    }
}

impl Job {
    /// Insert a job. An unknown company handle is a bad request.
    pub async fn create(conn: &impl GenericClient, new: &NewJob) -> JoblyResult<Job> {
        new.validate()?;

        debug!(target: "jobly::models", company = %new.company_handle, "creating job");
        query(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ))
        .tag("jobs.create")
        .bind(new.title.clone())
        .bind(new.salary)
        .bind(new.equity)
        .bind(new.company_handle.clone())
        .fetch_one_as(conn)
        .await
    }

    /// All jobs matching `filter`, ordered by title.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &JobFilter,
    ) -> JoblyResult<Vec<JobListing>> {
        let mut q = sql(
            "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, c.name AS company_name \
             FROM jobs j LEFT JOIN companies AS c ON c.handle = j.company_handle",
        )
        .tagged("jobs.find_all");
        push_where(&mut q, &filter.predicates());
        q.push(" ORDER BY j.title, j.id");

        let jobs: Vec<JobListing> = q.fetch_all_as(conn).await?;
        debug!(target: "jobly::models", count = jobs.len(), "found jobs");
        Ok(jobs)
    }

    /// A job and the company offering it.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<JobDetail> {
        let job = query(format!("SELECT {COLUMNS} FROM jobs WHERE id = $1"))
            .tag("jobs.get")
            .bind(id)
            .fetch_opt_as::<Job>(conn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let company = query(
            "SELECT handle, name, description, num_employees, logo_url \
             FROM companies WHERE handle = $1",
        )
        .tag("jobs.get.company")
        .bind(job.company_handle.clone())
        .fetch_one_as::<Company>(conn)
        .await?;

        Ok(JobDetail {
            job: JobSummary {
                id: job.id,
                title: job.title,
                salary: job.salary,
                equity: job.equity,
            },
            company,
        })
    }

    /// Apply `patch` and return the job as stored afterwards.
    ///
    /// An empty patch is a bad request; a missing id is not found and nothing
    /// is written.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: JobPatch) -> JoblyResult<Job> {
        patch.validate()?;
        let update = sql_for_partial_update(patch.into_fields(), &[])?;

        debug!(target: "jobly::models", id, fields = update.values.len(), "updating job");
        query(format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {COLUMNS}",
            update.set_cols,
            update.next_param()
        ))
        .tag("jobs.update")
        .bind_all(update.values)
        .bind(id)
        .fetch_opt_as::<Job>(conn)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Delete a job.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        debug!(target: "jobly::models", id, "removing job");
        query("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .tag("jobs.remove")
            .bind(id)
            .fetch_opt(conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: i32) -> JoblyError {
    JoblyError::not_found(format!("No job: {id}"))
}
