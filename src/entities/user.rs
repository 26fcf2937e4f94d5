use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{CompanyId, UserId};

/// Role of a user inside the installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owns the installation; every owner-gated action is allowed
    Owner,
    /// Company administrator
    Admin,
    /// Regular member, limited to the abilities granted explicitly
    Member,
}

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,

    /// Companies the user belongs to, in membership order
    #[serde(default)]
    pub companies: Vec<CompanyId>,

    /// Abilities granted to the user (e.g. `view-invoice`)
    #[serde(default)]
    pub abilities: BTreeSet<String>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
            companies: Vec::new(),
            abilities: BTreeSet::new(),
        }
    }

    /// Attach the user to a company
    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        if !self.companies.contains(&company_id) {
            self.companies.push(company_id);
        }
        self
    }

    /// Grant an ability
    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.abilities.insert(ability.into());
        self
    }

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// Owners count as administrators
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Owner | Role::Admin)
    }

    pub fn has_company(&self, company_id: CompanyId) -> bool {
        self.companies.contains(&company_id)
    }

    pub fn first_company(&self) -> Option<CompanyId> {
        self.companies.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_admin() {
        let owner = User::new(1, "Ada", "ada@example.com", Role::Owner);
        assert!(owner.is_owner());
        assert!(owner.is_admin());

        let admin = User::new(2, "Bob", "bob@example.com", Role::Admin);
        assert!(!admin.is_owner());
        assert!(admin.is_admin());

        let member = User::new(3, "Cy", "cy@example.com", Role::Member);
        assert!(!member.is_admin());
    }

    #[test]
    fn test_company_membership_keeps_order() {
        let user = User::new(1, "Ada", "ada@example.com", Role::Member)
            .with_company(101)
            .with_company(102)
            .with_company(101);

        assert_eq!(user.companies, vec![101, 102]);
        assert_eq!(user.first_company(), Some(101));
        assert!(user.has_company(102));
        assert!(!user.has_company(103));
    }

    #[test]
    fn test_user_without_companies() {
        let user = User::new(1, "Ada", "ada@example.com", Role::Member);
        assert_eq!(user.first_company(), None);
    }
}
