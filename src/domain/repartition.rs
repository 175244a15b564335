//! How an expense amount is divided among group members.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::common::UserId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
/// Allocation model of a [`PaidDetails`] block.
pub enum RepartitionKind {
    /// Every entry carries the exact amount owed or paid.
    Amount,
    /// Every entry carries a non-negative weight; beneficiaries only.
    Portions,
    /// Even split among listed users. Accepted on the wire but not supported yet.
    Equal,
    /// Any other tag received from a client.
    #[serde(other)]
    Unsupported,
}

impl fmt::Display for RepartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RepartitionKind::Amount => "AMOUNT",
            RepartitionKind::Portions => "PORTIONS",
            RepartitionKind::Equal => "EQUAL",
            RepartitionKind::Unsupported => "UNSUPPORTED",
        };
        f.write_str(label)
    }
}

/// Which side of an expense a repartition describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Who funded the expense.
    PaidBy,
    /// Who benefits from the expense.
    PaidFor,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::PaidBy => f.write_str("paidBy"),
            Direction::PaidFor => f.write_str("paidFor"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ShareValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<f64>,
}

impl ShareValues {
    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            share: None,
        }
    }

    pub fn share(share: f64) -> Self {
        Self {
            amount: None,
            share: Some(share),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.share.is_none()
    }

    /// Amount as a summable number; missing or non-finite values count as zero.
    pub fn amount_or_zero(&self) -> f64 {
        finite_or_zero(self.amount)
    }

    /// Share weight as a summable number; missing or non-finite values count as zero.
    pub fn share_or_zero(&self) -> f64 {
        finite_or_zero(self.share)
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserShare {
    pub user_id: UserId,
    #[serde(default)]
    pub values: ShareValues,
}

impl UserShare {
    pub fn new(user_id: UserId, values: ShareValues) -> Self {
        Self { user_id, values }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// A repartition: an allocation model plus the ordered per-user entries.
pub struct PaidDetails {
    pub repartition_type: RepartitionKind,
    #[serde(default)]
    pub repartition: Vec<UserShare>,
}

impl PaidDetails {
    pub fn new(repartition_type: RepartitionKind, repartition: Vec<UserShare>) -> Self {
        Self {
            repartition_type,
            repartition,
        }
    }

    /// Builds an `AMOUNT` repartition from `(user, amount)` pairs.
    pub fn amounts(entries: &[(UserId, f64)]) -> Self {
        Self::new(
            RepartitionKind::Amount,
            entries
                .iter()
                .map(|&(user, amount)| UserShare::new(user, ShareValues::amount(amount)))
                .collect(),
        )
    }

    /// Builds a `PORTIONS` repartition from `(user, weight)` pairs.
    pub fn portions(entries: &[(UserId, f64)]) -> Self {
        Self::new(
            RepartitionKind::Portions,
            entries
                .iter()
                .map(|&(user, share)| UserShare::new(user, ShareValues::share(share)))
                .collect(),
        )
    }

    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.repartition.iter().map(|entry| entry.user_id)
    }
}
