//! Expense records and the payload used to create or replace them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Currency, ExpenseCategory, Identifiable, NamedEntity};
use super::repartition::PaidDetails;

pub const MAX_EXPENSE_NAME_LEN: usize = 30;

/// Client-submitted expense data, validated before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    #[serde(default)]
    pub group_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub currency: Currency,
    #[serde(rename = "exchange_rate", alias = "exchangeRate", default = "default_rate")]
    pub exchange_rate: f64,
    pub date: NaiveDate,
    pub amount: f64,
    pub paid_by: PaidDetails,
    pub paid_for: PaidDetails,
    #[serde(default)]
    pub images: Vec<String>,
}

fn default_rate() -> f64 {
    1.0
}

impl NewExpense {
    pub fn new(
        group_id: Uuid,
        name: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        paid_by: PaidDetails,
        paid_for: PaidDetails,
    ) -> Self {
        Self {
            group_id: Some(group_id),
            name: name.into(),
            category: ExpenseCategory::default(),
            currency: Currency::default(),
            exchange_rate: default_rate(),
            date,
            amount,
            paid_by,
            paid_for,
            images: Vec::new(),
        }
    }
}

/// A persisted expense. Owned by exactly one group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub category: ExpenseCategory,
    pub currency: Currency,
    #[serde(rename = "exchange_rate")]
    pub exchange_rate: f64,
    pub date: NaiveDate,
    pub amount: f64,
    pub paid_by: PaidDetails,
    pub paid_for: PaidDetails,
    /// Names of blobs held by the image store; not owned by the expense.
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Materializes a validated payload under the given group.
    pub fn from_new(group_id: Uuid, input: NewExpense) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            group_id,
            name: input.name,
            category: input.category,
            currency: input.currency,
            exchange_rate: input.exchange_rate,
            date: input.date,
            amount: input.amount,
            paid_by: input.paid_by,
            paid_for: input.paid_for,
            images: input.images,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields, keeping identity and ownership.
    pub fn apply(&mut self, input: NewExpense) {
        self.name = input.name;
        self.category = input.category;
        self.currency = input.currency;
        self.exchange_rate = input.exchange_rate;
        self.date = input.date;
        self.amount = input.amount;
        self.paid_by = input.paid_by;
        self.paid_for = input.paid_for;
        self.images = input.images;
        self.updated_at = Utc::now();
    }

    pub fn dated_amount(&self) -> DatedAmount {
        DatedAmount {
            amount: self.amount,
            date: self.date,
        }
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Expense {
    fn name(&self) -> &str {
        &self.name
    }
}

/// The only projection of an expense the forecaster reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DatedAmount {
    pub amount: f64,
    pub date: NaiveDate,
}

impl DatedAmount {
    pub fn new(amount: f64, date: NaiveDate) -> Self {
        Self { amount, date }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repartition::RepartitionKind;

    #[test]
    fn payload_accepts_original_field_names() {
        let json = r#"{
            "groupId": "2f9ace4b-9698-403e-b573-11ed9a3f22e0",
            "name": "Groceries",
            "category": "FOOD",
            "currency": "CHF",
            "exchange_rate": 0.9363,
            "date": "2025-08-28",
            "amount": 100,
            "paidBy": { "repartitionType": "AMOUNT", "repartition": [{ "userId": 1, "values": { "amount": 100 } }] },
            "paidFor": { "repartitionType": "PORTIONS", "repartition": [{ "userId": 1, "values": { "share": 1 } }] },
            "images": ["image1.jpg"]
        }"#;
        let payload: NewExpense = serde_json::from_str(json).unwrap();
        assert!(payload.group_id.is_some());
        assert_eq!(payload.category, ExpenseCategory::Food);
        assert_eq!(payload.exchange_rate, 0.9363);
        assert_eq!(payload.paid_for.repartition_type, RepartitionKind::Portions);
        assert_eq!(payload.images, vec!["image1.jpg".to_string()]);
    }

    #[test]
    fn missing_group_id_deserializes_as_none() {
        let json = r#"{
            "name": "Taxi",
            "date": "2025-01-02",
            "amount": 12.5,
            "paidBy": { "repartitionType": "AMOUNT", "repartition": [] },
            "paidFor": { "repartitionType": "AMOUNT", "repartition": [] }
        }"#;
        let payload: NewExpense = serde_json::from_str(json).unwrap();
        assert!(payload.group_id.is_none());
        assert_eq!(payload.exchange_rate, 1.0);
    }
}
