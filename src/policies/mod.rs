//! Authorization policies
//!
//! Two families of predicates:
//!
//! - [`ResourcePolicy`] guards company-scoped records: the gate must grant
//!   the record's ability, then the user must belong to the record's
//!   company. Invoices additionally refuse updates once they are locked.
//! - [`OwnerPolicy`] guards users and roles: only owners pass.
//!
//! Checks run left to right and stop at the first failure, so the gate is
//! always consulted before company membership.
//!
//! # Example
//!
//! ```rust,ignore
//! let policy = ResourcePolicy::new(&AbilityGate);
//! if policy.update(&user, &invoice) {
//!     // ...
//! }
//! ```

use std::fmt;

use crate::core::error::RequestError;
use crate::core::gate::Gate;
use crate::entities::{CompanyResource, User};

/// Something a user may attempt on a kind of record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    Restore,
    ForceDelete,
    DeleteMultiple,
    Send,
    Invite,
}

impl Action {
    /// Verb of the ability that guards this action
    pub fn verb(self) -> &'static str {
        match self {
            Action::ViewAny | Action::View => "view",
            Action::Create => "create",
            Action::Update => "edit",
            Action::Delete | Action::Restore | Action::ForceDelete | Action::DeleteMultiple => {
                "delete"
            }
            Action::Send => "send",
            Action::Invite => "invite",
        }
    }

    /// Whether the action targets one existing record
    pub fn targets_record(self) -> bool {
        matches!(
            self,
            Action::View
                | Action::Update
                | Action::Delete
                | Action::Restore
                | Action::ForceDelete
                | Action::Send
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::ViewAny => "viewAny",
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Restore => "restore",
            Action::ForceDelete => "forceDelete",
            Action::DeleteMultiple => "deleteMultiple",
            Action::Send => "send",
            Action::Invite => "invite",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Company-scoped records
// =============================================================================

/// Ability + company membership policy for any [`CompanyResource`]
#[derive(Clone, Copy)]
pub struct ResourcePolicy<'a> {
    gate: &'a dyn Gate,
}

impl<'a> ResourcePolicy<'a> {
    pub fn new(gate: &'a dyn Gate) -> Self {
        Self { gate }
    }

    /// Collection-level check (`viewAny`, `create`, `deleteMultiple`)
    pub fn allows_any<R: CompanyResource>(&self, user: &User, action: Action) -> bool {
        self.gate.can(user, &R::ability(action.verb()))
    }

    /// Record-level check
    ///
    /// Gate first, then membership for actions that target the record,
    /// then the record's own edit lock for updates.
    pub fn allows<R: CompanyResource>(&self, user: &User, action: Action, record: &R) -> bool {
        self.allows_any::<R>(user, action)
            && (!action.targets_record() || user.has_company(record.company_id()))
            && (action != Action::Update || record.allows_edit())
    }

    /// [`allows`](Self::allows) as a `Result`, for handlers
    pub fn authorize<R: CompanyResource>(
        &self,
        user: &User,
        action: Action,
        record: Option<&R>,
    ) -> Result<(), RequestError> {
        let allowed = match record {
            Some(record) => self.allows(user, action, record),
            None => self.allows_any::<R>(user, action),
        };

        if allowed {
            Ok(())
        } else {
            tracing::debug!(
                user_id = user.id,
                action = %action,
                resource = R::ability_noun(),
                "policy denied action"
            );
            Err(RequestError::Forbidden {
                ability: R::ability(action.verb()),
            })
        }
    }

    pub fn view_any<R: CompanyResource>(&self, user: &User) -> bool {
        self.allows_any::<R>(user, Action::ViewAny)
    }

    pub fn view<R: CompanyResource>(&self, user: &User, record: &R) -> bool {
        self.allows(user, Action::View, record)
    }

    pub fn create<R: CompanyResource>(&self, user: &User) -> bool {
        self.allows_any::<R>(user, Action::Create)
    }

    pub fn update<R: CompanyResource>(&self, user: &User, record: &R) -> bool {
        self.allows(user, Action::Update, record)
    }

    pub fn delete<R: CompanyResource>(&self, user: &User, record: &R) -> bool {
        self.allows(user, Action::Delete, record)
    }

    pub fn restore<R: CompanyResource>(&self, user: &User, record: &R) -> bool {
        self.allows(user, Action::Restore, record)
    }

    pub fn force_delete<R: CompanyResource>(&self, user: &User, record: &R) -> bool {
        self.allows(user, Action::ForceDelete, record)
    }

    pub fn delete_multiple<R: CompanyResource>(&self, user: &User) -> bool {
        self.allows_any::<R>(user, Action::DeleteMultiple)
    }

    pub fn send<R: CompanyResource>(&self, user: &User, record: &R) -> bool {
        self.allows(user, Action::Send, record)
    }
}

// =============================================================================
// Users and roles
// =============================================================================

/// The owner check every user and role action reduces to
pub fn is_authorized(user: &User) -> bool {
    user.is_owner()
}

/// Owner-only policy for user and role management
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerPolicy {
    Users,
    Roles,
}

impl OwnerPolicy {
    pub fn allows(self, user: &User, _action: Action) -> bool {
        is_authorized(user)
    }

    pub fn authorize(self, user: &User, action: Action) -> Result<(), RequestError> {
        if self.allows(user, action) {
            return Ok(());
        }
        let subject = match self {
            OwnerPolicy::Users => "user",
            OwnerPolicy::Roles => "role",
        };
        Err(RequestError::Forbidden {
            ability: format!("{} {}", action, subject),
        })
    }
}
