use super::job::JobSummary;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{Predicate, push_where};
use crate::partial_update::sql_for_partial_update;
use crate::row::{FromRow, RowExt};
use crate::sql::{query, sql};
use crate::validate::{ValidationCode, ValidationError, ValidationErrors};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::debug;

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// External field name → storage column, for fields whose names differ.
const JS_TO_SQL: &[(&str, &str)] = &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

const HANDLE_MAX_LEN: usize = 25;

/// A company as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A company together with its jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

/// Body of a create-company request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    /// Deserialize and validate a JSON body.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        let new: Self = serde_json::from_value(body)?;
        new.validate()?;
        Ok(new)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_len("handle", &self.handle, 1, Some(HANDLE_MAX_LEN));
        errors.check_len("name", &self.name, 1, None);
        errors.check_len("description", &self.description, 1, None);
        if let Some(n) = self.num_employees {
            errors.check_non_negative("numEmployees", n);
        }
        if let Some(url) = &self.logo_url {
            errors.check_url("logoUrl", url);
        }
        errors.into_result()
    }
}

/// Body of an update-company request.
///
/// `handle` is immutable and is rejected as an unknown field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    #[serde(default, deserialize_with = "super::present")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "super::present")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyPatch {
    /// Deserialize and validate a JSON body.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        let patch: Self = serde_json::from_value(body)?;
        patch.validate()?;
        Ok(patch)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check_len("name", name, 1, None);
        }
        if let Some(description) = &self.description {
            errors.check_len("description", description, 1, None);
        }
        if let Some(Some(n)) = self.num_employees {
            errors.check_non_negative("numEmployees", n);
        }
        if let Some(Some(url)) = &self.logo_url {
            errors.check_url("logoUrl", url);
        }
        errors.into_result()
    }

    /// Supplied fields in declaration order, keyed by external name.
    pub fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(("name", name.into()));
        }
        if let Some(description) = self.description {
            fields.push(("description", description.into()));
        }
        if let Some(n) = self.num_employees {
            fields.push(("numEmployees", n.into()));
        }
        if let Some(url) = self.logo_url {
            fields.push(("logoUrl", url.into()));
        }
        fields
    }
}

/// Optional filters for [`Company::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the company name.
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    /// Deserialize and validate filter parameters.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        let filter: Self = serde_json::from_value(body)?;
        filter.validate()?;
        Ok(filter)
    }

    /// Rejects negative bounds and `minEmployees > maxEmployees`.
    ///
    /// Callers run this before [`Company::find_all`], which does not re-check.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(min) = self.min_employees {
            errors.check_non_negative("minEmployees", min);
        }
        if let Some(max) = self.max_employees {
            errors.check_non_negative("maxEmployees", max);
        }
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                errors.push(ValidationError::new(
                    "minEmployees",
                    ValidationCode::Range,
                    "Min employees cannot be greater than max",
                ));
            }
        }
        errors.into_result()
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(name) = &self.name {
            predicates.push(Predicate::contains("name", name.as_str()));
        }
        if let Some(min) = self.min_employees {
            predicates.push(Predicate::at_least("num_employees", min));
        }
        if let Some(max) = self.max_employees {
            predicates.push(Predicate::at_most("num_employees", max));
        }
        predicates
    }
}

impl Company {
    /// Insert a company. A taken handle is a bad request.
    pub async fn create(conn: &impl GenericClient, new: &NewCompany) -> JoblyResult<Company> {
        new.validate()?;

        let taken = query("SELECT handle FROM companies WHERE handle = $1")
            .tag("companies.create.dup_check")
            .bind(new.handle.clone())
            .exists(conn)
            .await?;
        if taken {
            return Err(JoblyError::bad_request(format!(
                "Duplicate company: {}",
                new.handle
            )));
        }

        debug!(target: "jobly::models", handle = %new.handle, "creating company");
        query(format!(
            "INSERT INTO companies ({COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .tag("companies.create")
        .bind(new.handle.clone())
        .bind(new.name.clone())
        .bind(new.description.clone())
        .bind(new.num_employees)
        .bind(new.logo_url.clone())
        .fetch_one_as(conn)
        .await
    }

    /// All companies matching `filter`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        let mut q = sql(format!("SELECT {COLUMNS} FROM companies")).tagged("companies.find_all");
        push_where(&mut q, &filter.predicates());
        q.push(" ORDER BY name");

        let companies: Vec<Company> = q.fetch_all_as(conn).await?;
        debug!(target: "jobly::models", count = companies.len(), "found companies");
        Ok(companies)
    }

    /// A company and its jobs.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        let company = query(format!("SELECT {COLUMNS} FROM companies WHERE handle = $1"))
            .tag("companies.get")
            .bind(handle.to_string())
            .fetch_opt_as::<Company>(conn)
            .await?
            .ok_or_else(|| not_found(handle))?;

        let jobs: Vec<JobSummary> = query(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .tag("companies.get.jobs")
        .bind(handle.to_string())
        .fetch_all_as(conn)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Apply `patch` and return the company as stored afterwards.
    ///
    /// An empty patch is a bad request; a missing handle is not found and
    /// nothing is written.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        patch: CompanyPatch,
    ) -> JoblyResult<Company> {
        patch.validate()?;
        let update = sql_for_partial_update(patch.into_fields(), JS_TO_SQL)?;

        debug!(target: "jobly::models", handle, fields = update.values.len(), "updating company");
        query(format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COLUMNS}",
            update.set_cols,
            update.next_param()
        ))
        .tag("companies.update")
        .bind_all(update.values)
        .bind(handle.to_string())
        .fetch_opt_as::<Company>(conn)
        .await?
        .ok_or_else(|| not_found(handle))
    }

    /// Delete a company (its jobs go with it).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        debug!(target: "jobly::models", handle, "removing company");
        query("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .tag("companies.remove")
            .bind(handle.to_string())
            .fetch_opt(conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found(handle))
    }
}

fn not_found(handle: &str) -> JoblyError {
    JoblyError::not_found(format!("No company: {handle}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_company_requires_core_fields() {
        let err = NewCompany::from_json(json!({ "handle": "c1", "name": "C1" })).unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn new_company_collects_field_errors() {
        let err = NewCompany::from_json(json!({
            "handle": "",
            "name": "C1",
            "description": "Desc",
            "numEmployees": -3,
            "logoUrl": "nope",
        }))
        .unwrap_err();

        match err {
            JoblyError::Invalid(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["handle", "numEmployees", "logoUrl"]);
            }
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch = CompanyPatch::from_json(json!({ "name": "New", "logoUrl": null })).unwrap();
        assert_eq!(patch.name.as_deref(), Some("New"));
        assert_eq!(patch.num_employees, None);
        assert_eq!(patch.logo_url, Some(None));

        let fields = patch.into_fields();
        assert_eq!(
            fields,
            vec![("name", FieldValue::from("New")), ("logoUrl", FieldValue::Null)]
        );
    }

    #[test]
    fn patch_rejects_handle() {
        let err = CompanyPatch::from_json(json!({ "handle": "new" })).unwrap_err();
        assert!(err.is_bad_request());
        assert!(err.to_string().contains("handle"));
    }

    #[test]
    fn patch_rejects_null_for_required_field() {
        assert!(CompanyPatch::from_json(json!({ "name": null })).is_err());
    }

    #[test]
    fn patch_compiles_with_column_names() {
        let patch = CompanyPatch {
            num_employees: Some(Some(10)),
            logo_url: Some(Some("http://new.img".into())),
            ..Default::default()
        };
        let update = sql_for_partial_update(patch.into_fields(), JS_TO_SQL).unwrap();
        assert_eq!(update.set_cols, r#""num_employees"=$1, "logo_url"=$2"#);
    }

    #[test]
    fn empty_patch_has_no_fields() {
        let patch = CompanyPatch::from_json(json!({})).unwrap();
        assert!(patch.into_fields().is_empty());
    }

    #[test]
    fn filter_rejects_inverted_range() {
        let err = CompanyFilter::from_json(json!({ "minEmployees": 10, "maxEmployees": 2 }))
            .unwrap_err();
        assert!(err.is_bad_request());
        assert!(err.to_string().contains("Min employees cannot be greater than max"));
    }

    #[test]
    fn filter_accepts_equal_bounds() {
        let filter =
            CompanyFilter::from_json(json!({ "minEmployees": 5, "maxEmployees": 5 })).unwrap();
        assert_eq!(filter.predicates().len(), 2);
    }

    #[test]
    fn filter_rejects_unknown_keys() {
        assert!(CompanyFilter::from_json(json!({ "nope": 1 })).is_err());
    }

    #[test]
    fn filter_predicates_only_for_supplied_fields() {
        assert!(CompanyFilter::default().predicates().is_empty());

        let filter = CompanyFilter {
            name: Some("net".into()),
            max_employees: Some(100),
            ..Default::default()
        };
        assert_eq!(
            filter.predicates(),
            vec![
                Predicate::contains("name", "net"),
                Predicate::at_most("num_employees", 100),
            ]
        );
    }

    #[test]
    fn detail_serializes_flat_with_camel_case() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c1".into(),
                name: "C1".into(),
                description: "Desc1".into(),
                num_employees: Some(1),
                logo_url: None,
            },
            jobs: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&detail).unwrap(),
            json!({
                "handle": "c1",
                "name": "C1",
                "description": "Desc1",
                "numEmployees": 1,
                "logoUrl": null,
                "jobs": [],
            })
        );
    }
}
