//! Company and job models.
//!
//! Every operation takes the database client as its first argument; there is
//! no shared connection state.

mod company;
mod job;

pub use company::{Company, CompanyDetail, CompanyFilter, CompanyPatch, NewCompany};
pub use job::{Job, JobDetail, JobFilter, JobListing, JobPatch, JobSummary, NewJob};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that was present in the body.
///
/// Paired with `#[serde(default)]`: an absent field stays `None`, a present
/// one becomes `Some(..)`. For `Option<Option<T>>` fields an explicit `null`
/// becomes `Some(None)`; for `Option<T>` fields with non-nullable `T` an
/// explicit `null` is a deserialization error.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
