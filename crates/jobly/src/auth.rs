//! Caller identity as handed over by the authentication layer.
//!
//! Reads are open to everyone; creating, updating and removing companies or
//! jobs requires an admin. The routing layer verifies the token and builds a
//! [`Caller`]; this module only decides whether that caller may mutate.

use crate::error::{JoblyError, JoblyResult};
use tracing::debug;

/// Who is making the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    /// `None` when no valid credential was presented.
    pub username: Option<String>,
    pub is_admin: bool,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: false,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: true,
        }
    }

    /// Fails with [`JoblyError::Unauthorized`] unless this is a logged-in admin.
    pub fn ensure_admin(&self) -> JoblyResult<()> {
        match &self.username {
            Some(_) if self.is_admin => Ok(()),
            Some(username) => {
                debug!(target: "jobly::auth", username = %username, "admin required");
                Err(JoblyError::unauthorized("Admin required"))
            }
            None => {
                debug!(target: "jobly::auth", "credential required");
                Err(JoblyError::unauthorized("Authentication required"))
            }
        }
    }
}
