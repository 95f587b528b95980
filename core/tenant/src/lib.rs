//! Tenant identity context.
//!
//! Every command handler in this workspace takes a [`TenantContext`] as its
//! first argument (or embeds one in its request struct), and every query
//! against the store is scoped by `company_id`. [`TenantScoped::company_id`]
//! lets generic code (e.g. the idempotency layer, the posting service)
//! assert that a loaded row actually belongs to the caller's tenant before
//! using it, rather than trusting the caller's `company_id` alone.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub Uuid);

impl CompanyId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity carried through a single request: which tenant, which
/// actor, and a correlation id that ties together every event the request
/// produces.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub company_id: CompanyId,
    pub actor_id: Option<Uuid>,
    pub correlation_id: Uuid,
}

impl TenantContext {
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            actor_id: None,
            correlation_id: Uuid::new_v4(),
        }
    }

    pub fn with_actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

/// Implemented by any row type that carries a `company_id`, so shared code
/// can reject cross-tenant reads without each caller re-deriving the check.
pub trait TenantScoped {
    fn company_id(&self) -> CompanyId;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("tenant-scope-violation: row belongs to company {actual}, caller is company {expected}")]
pub struct TenantScopeViolation {
    pub expected: CompanyId,
    pub actual: CompanyId,
}

/// Assert that a tenant-scoped row actually belongs to `ctx`'s company.
/// Every repository load of a row by id should be followed by this check
/// before the row is handed to business logic — a row fetched by primary
/// key alone says nothing about which tenant it belongs to.
pub fn assert_same_tenant<T: TenantScoped>(
    ctx: &TenantContext,
    row: &T,
) -> Result<(), TenantScopeViolation> {
    if row.company_id() != ctx.company_id {
        return Err(TenantScopeViolation {
            expected: ctx.company_id,
            actual: row.company_id(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        company_id: CompanyId,
    }

    impl TenantScoped for Row {
        fn company_id(&self) -> CompanyId {
            self.company_id
        }
    }

    #[test]
    fn rejects_cross_tenant_row() {
        let ctx = TenantContext::new(CompanyId::new(Uuid::new_v4()));
        let row = Row {
            company_id: CompanyId::new(Uuid::new_v4()),
        };
        assert!(assert_same_tenant(&ctx, &row).is_err());
    }

    #[test]
    fn accepts_same_tenant_row() {
        let company_id = CompanyId::new(Uuid::new_v4());
        let ctx = TenantContext::new(company_id);
        let row = Row { company_id };
        assert!(assert_same_tenant(&ctx, &row).is_ok());
    }

    #[test]
    fn each_context_gets_a_fresh_correlation_id() {
        let company_id = CompanyId::new(Uuid::new_v4());
        let a = TenantContext::new(company_id);
        let b = TenantContext::new(company_id);
        assert_ne!(a.correlation_id, b.correlation_id);
    }
}
