use serde::{Deserialize, Serialize};

use super::{CompanyId, UserId};

/// A tenant of the installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub owner_id: Option<UserId>,
}

impl Company {
    pub fn new(id: CompanyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id: None,
        }
    }

    pub fn owned_by(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}
