//! # Request Context
//!
//! The caller identity every sale operation receives explicitly.
//!
//! Identity is supplied by the authentication collaborator (in `apps/api`,
//! a verified bearer token) and is never read from a request body.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use ts_rs::TS;

// =============================================================================
// Role
// =============================================================================

/// Role of an authenticated caller.
///
/// Anything that is not `admin` is treated as a customer: a generic
/// authenticated actor who may check out and read only their own sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    /// Never fails: unknown roles fall back to [`Role::Customer`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("admin") {
            Ok(Role::Admin)
        } else {
            Ok(Role::Customer)
        }
    }
}

// =============================================================================
// Request Context
// =============================================================================

/// Who is calling, plus request-scoped limits.
///
/// ## Usage
/// ```rust
/// use niaga_core::{RequestContext, Role};
/// use std::time::Duration;
///
/// let ctx = RequestContext::new(7, Role::Customer)
///     .with_timeout(Duration::from_secs(2));
/// assert!(!ctx.is_admin());
/// assert_eq!(ctx.timeout, Some(Duration::from_secs(2)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user id.
    pub user_id: i64,

    /// Role claimed by the verified credential.
    pub role: Role,

    /// Upper bound for the write unit of work. `None` uses the service default.
    pub timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new(user_id: i64, role: Role) -> Self {
        RequestContext {
            user_id,
            role,
            timeout: None,
        }
    }

    /// Shorthand for an admin caller.
    pub fn admin(user_id: i64) -> Self {
        Self::new(user_id, Role::Admin)
    }

    /// Shorthand for a customer caller.
    pub fn customer(user_id: i64) -> Self {
        Self::new(user_id, Role::Customer)
    }

    /// Sets the request-scoped write timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
