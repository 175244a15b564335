//! Groups and their member index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Currency, Identifiable, NamedEntity, UserId};

pub const MAX_GROUP_NAME_LEN: usize = 30;
pub const MAX_GROUP_DESCRIPTION_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIndex {
    pub id: UserId,
    pub name: String,
}

impl UserIndex {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub users: Vec<UserIndex>,
}

impl NewGroup {
    pub fn new(name: impl Into<String>, currency: Currency, users: Vec<UserIndex>) -> Self {
        Self {
            name: name.into(),
            description: None,
            currency,
            users,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub users: Option<Vec<UserIndex>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    /// Shareable token letting a new member discover the group.
    pub link_token: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub currency: Currency,
    pub users: Vec<UserIndex>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
}

impl Group {
    pub fn from_new(input: NewGroup) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            link_token: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            currency: input.currency,
            users: input.users,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn member_ids(&self) -> Vec<UserId> {
        self.users.iter().map(|user| user.id).collect()
    }

    pub fn apply(&mut self, update: GroupUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(users) = update.users {
            self.users = users;
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

impl Identifiable for Group {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Group {
    fn name(&self) -> &str {
        &self.name
    }
}
