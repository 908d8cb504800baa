//! # Access Policy
//!
//! Decides which principal may perform which operation. Ownership scoping is
//! derived here from the authenticated principal, never from caller input.
//!
//! | Operation | Allowed for |
//! |-----------|-------------|
//! | submit | any authenticated principal |
//! | review | institute principals, never on their own records |
//! | view all records | institute principals |
//! | view own records | any authenticated principal |

use crate::domain::entities::DocumentRecord;
use shared_types::{Principal, PrincipalId, Role};

/// Which records a principal may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordScope {
    /// Every record in the ledger.
    All,
    /// Only records submitted by this principal.
    OwnedBy(PrincipalId),
}

impl RecordScope {
    pub fn admits(&self, record: &DocumentRecord) -> bool {
        match self {
            RecordScope::All => true,
            RecordScope::OwnedBy(owner) => record.is_owned_by(owner),
        }
    }
}

/// Role-based access policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn can_submit(&self, principal: &Principal) -> bool {
        principal.is_authenticated()
    }

    pub fn can_review(&self, principal: &Principal) -> bool {
        principal.is_authenticated() && principal.role == Role::Institute
    }

    pub fn can_view_all(&self, principal: &Principal) -> bool {
        self.can_review(principal)
    }

    /// Scope for listing operations. `None` for unauthenticated callers.
    pub fn scope_for(&self, principal: &Principal) -> Option<RecordScope> {
        if !principal.is_authenticated() {
            return None;
        }
        if self.can_view_all(principal) {
            Some(RecordScope::All)
        } else {
            Some(RecordScope::OwnedBy(principal.id.clone()))
        }
    }

    pub fn can_view(&self, principal: &Principal, record: &DocumentRecord) -> bool {
        self.scope_for(principal)
            .is_some_and(|scope| scope.admits(record))
    }
}
