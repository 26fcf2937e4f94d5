//! Ability checks
//!
//! Handlers call [`Gate::authorize`] with an ability name such as
//! `"manage modules"` or `"view-invoice"`; a denial becomes a 403.

use crate::core::error::RequestError;
use crate::entities::User;

pub trait Gate: Send + Sync {
    fn can(&self, user: &User, ability: &str) -> bool;

    fn authorize(&self, user: &User, ability: &str) -> Result<(), RequestError> {
        if self.can(user, ability) {
            Ok(())
        } else {
            tracing::debug!(user_id = user.id, ability, "gate denied ability");
            Err(RequestError::Forbidden {
                ability: ability.to_string(),
            })
        }
    }
}

/// Owners may do anything; everybody else needs the ability granted
#[derive(Debug, Clone, Copy, Default)]
pub struct AbilityGate;

impl Gate for AbilityGate {
    fn can(&self, user: &User, ability: &str) -> bool {
        user.is_owner() || user.abilities.contains(ability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Role;

    #[test]
    fn test_owner_passes_every_ability() {
        let owner = User::new(1, "Ada", "ada@example.com", Role::Owner);
        assert!(AbilityGate.can(&owner, "manage modules"));
        assert!(AbilityGate.authorize(&owner, "manage settings").is_ok());
    }

    #[test]
    fn test_member_needs_granted_ability() {
        let member =
            User::new(2, "Bob", "bob@example.com", Role::Member).with_ability("view-invoice");

        assert!(AbilityGate.can(&member, "view-invoice"));
        assert!(!AbilityGate.can(&member, "edit-invoice"));

        match AbilityGate.authorize(&member, "manage modules") {
            Err(RequestError::Forbidden { ability }) => assert_eq!(ability, "manage modules"),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_admin_is_not_implicitly_allowed() {
        let admin = User::new(3, "Cy", "cy@example.com", Role::Admin);
        assert!(!AbilityGate.can(&admin, "manage file disk"));
    }
}
