//! Shared identifiers, traits, and enums for the group ledger.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a group member. Members are indexed per group, not globally.
pub type UserId = u32;

/// Exposes a stable identifier for entities stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
/// Currencies a group or expense can be denominated in.
pub enum Currency {
    #[default]
    Chf,
    Eur,
    Usd,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Chf => "CHF",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CHF" => Some(Currency::Chf),
            "EUR" => Some(Currency::Eur),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Housing,
    Utilities,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FOOD" => Some(ExpenseCategory::Food),
            "TRANSPORT" => Some(ExpenseCategory::Transport),
            "HOUSING" => Some(ExpenseCategory::Housing),
            "UTILITIES" => Some(ExpenseCategory::Utilities),
            "OTHER" => Some(ExpenseCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpenseCategory::Food => "FOOD",
            ExpenseCategory::Transport => "TRANSPORT",
            ExpenseCategory::Housing => "HOUSING",
            ExpenseCategory::Utilities => "UTILITIES",
            ExpenseCategory::Other => "OTHER",
        };
        f.write_str(label)
    }
}
