//! Authorization of administrative operations.
//!
//! Callers pass their principal explicitly. Only the configured admin may
//! resubmit failed tickets or extend an SLA deadline.

use shared_types::{LedgerError, LedgerResult};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    admin_principal: String,
}

impl AccessPolicy {
    pub fn new(admin_principal: impl Into<String>) -> Self {
        Self {
            admin_principal: admin_principal.into(),
        }
    }

    pub fn admin_principal(&self) -> &str {
        &self.admin_principal
    }

    pub fn is_admin(&self, principal: &str) -> bool {
        !principal.is_empty() && principal == self.admin_principal
    }

    /// Fail with `Unauthorized` unless `principal` is the admin.
    pub fn check_admin(&self, principal: &str, operation: &str) -> LedgerResult<()> {
        if self.is_admin(principal) {
            return Ok(());
        }
        warn!(principal, operation, "Rejected unauthorized admin operation");
        Err(LedgerError::Unauthorized(format!(
            "{principal:?} may not {operation}"
        )))
    }
}
