//! # Access Guard
//!
//! Who may create and read which sales.
//!
//! ```text
//! ┌──────────────────────┬──────────────────┬──────────────────────────────┐
//! │ Operation            │ admin            │ anyone else                  │
//! ├──────────────────────┼──────────────────┼──────────────────────────────┤
//! │ checkout             │ yes, owns sale   │ yes, owns sale               │
//! │ manual invoice       │ yes              │ Forbidden, before anything   │
//! │ list                 │ all sales        │ sales where user_id == self  │
//! │ read one             │ any sale         │ user_id present and == self  │
//! └──────────────────────┴──────────────────┴──────────────────────────────┘
//! ```

use crate::context::RequestContext;
use crate::error::{CoreError, CoreResult};

/// Which rows a list request may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    OwnedBy(i64),
}

/// Scope of the sales list for this caller.
pub fn list_scope(ctx: &RequestContext) -> ListScope {
    if ctx.is_admin() {
        ListScope::All
    } else {
        ListScope::OwnedBy(ctx.user_id)
    }
}

/// Checks that the caller may read a sale owned by `owner`.
///
/// An ownerless sale is admin-only, whatever its customer fields say.
///
/// ## Example
/// ```rust
/// use niaga_core::access::authorize_read;
/// use niaga_core::RequestContext;
///
/// assert!(authorize_read(&RequestContext::customer(7), Some(7)).is_ok());
/// assert!(authorize_read(&RequestContext::customer(7), Some(8)).is_err());
/// assert!(authorize_read(&RequestContext::customer(7), None).is_err());
/// assert!(authorize_read(&RequestContext::admin(1), None).is_ok());
/// ```
pub fn authorize_read(ctx: &RequestContext, owner: Option<i64>) -> CoreResult<()> {
    if ctx.is_admin() {
        return Ok(());
    }

    match owner {
        Some(owner) if owner == ctx.user_id => Ok(()),
        Some(_) => Err(CoreError::forbidden("this sale belongs to another user")),
        None => Err(CoreError::forbidden("this invoice is only visible to admins")),
    }
}

/// Rejects non-admin callers.
pub fn require_admin(ctx: &RequestContext, action: &str) -> CoreResult<()> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(CoreError::forbidden(format!("only admins may {}", action)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_scope() {
        assert_eq!(list_scope(&RequestContext::admin(1)), ListScope::All);
        assert_eq!(list_scope(&RequestContext::customer(9)), ListScope::OwnedBy(9));
    }

    #[test]
    fn test_customer_reads() {
        let ctx = RequestContext::customer(9);
        assert!(authorize_read(&ctx, Some(9)).is_ok());
        assert!(matches!(
            authorize_read(&ctx, Some(10)),
            Err(CoreError::Forbidden { .. })
        ));
        assert!(matches!(
            authorize_read(&ctx, None),
            Err(CoreError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_admin_reads_everything() {
        let ctx = RequestContext::admin(1);
        assert!(authorize_read(&ctx, Some(9)).is_ok());
        assert!(authorize_read(&ctx, None).is_ok());
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&RequestContext::admin(1), "create manual invoices").is_ok());
        let err = require_admin(&RequestContext::customer(2), "create manual invoices").unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: only admins may create manual invoices");
    }
}
