//! Consistency checks for expense payloads and their repartitions.
//!
//! Every check fails fast: the first violated rule is reported and nothing
//! after it is evaluated. Amounts are compared exactly, never within an
//! epsilon, and no value is ever normalized or rewritten.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Direction, NewExpense, PaidDetails, RepartitionKind, UserId, MAX_EXPENSE_NAME_LEN,
};
use crate::errors::{Result, SplitError};

/// Shape of a standalone split-validation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub total_amount: f64,
    pub paid_by: PaidDetails,
    pub paid_for: PaidDetails,
    #[serde(default)]
    pub group_id: Option<Uuid>,
}

impl From<&NewExpense> for ValidationRequest {
    fn from(expense: &NewExpense) -> Self {
        Self {
            total_amount: expense.amount,
            paid_by: expense.paid_by.clone(),
            paid_for: expense.paid_for.clone(),
            group_id: expense.group_id,
        }
    }
}

/// Stateless validator for the `paidBy` / `paidFor` pair of an expense.
pub struct RepartitionValidator;

impl RepartitionValidator {
    /// Validates both directions against the total, then checks membership.
    pub fn validate(
        total_amount: f64,
        paid_by: &PaidDetails,
        paid_for: &PaidDetails,
        members: &[UserId],
    ) -> Result<()> {
        Self::validate_direction(Direction::PaidBy, paid_by, total_amount)?;
        Self::validate_direction(Direction::PaidFor, paid_for, total_amount)?;
        Self::ensure_members(paid_by, paid_for, members)
    }

    /// Runs a full request: the group id must be present before anything else is looked at.
    pub fn validate_request(request: &ValidationRequest, members: &[UserId]) -> Result<Uuid> {
        let group_id = require_group_id(request.group_id)?;
        Self::validate(
            request.total_amount,
            &request.paid_by,
            &request.paid_for,
            members,
        )?;
        Ok(group_id)
    }

    pub fn validate_direction(
        direction: Direction,
        details: &PaidDetails,
        total_amount: f64,
    ) -> Result<()> {
        if details.repartition.iter().any(|entry| entry.values.is_empty()) {
            return Err(SplitError::invalid(format!(
                "Each user share in {direction} must define an amount or a share"
            )));
        }
        Self::ensure_unique_users(direction, details)?;

        match (details.repartition_type, direction) {
            (RepartitionKind::Amount, _) => {
                let sum: f64 = details
                    .repartition
                    .iter()
                    .map(|entry| entry.values.amount_or_zero())
                    .sum();
                if sum != total_amount {
                    return Err(SplitError::invalid(format!(
                        "Sum of {direction} amounts ({sum}) does not match expense amount ({total_amount})"
                    )));
                }
                Ok(())
            }
            (RepartitionKind::Portions, Direction::PaidBy) => Err(SplitError::invalid(
                "PORTIONS not allowed for paidBy",
            )),
            (RepartitionKind::Portions, Direction::PaidFor) => {
                if let Some(entry) = details
                    .repartition
                    .iter()
                    .find(|entry| entry.values.share.is_some_and(|share| share < 0.0))
                {
                    return Err(SplitError::invalid(format!(
                        "Negative share for user {} in {direction}",
                        entry.user_id
                    )));
                }
                let total: f64 = details
                    .repartition
                    .iter()
                    .map(|entry| entry.values.share_or_zero())
                    .sum();
                if total < 1.0 {
                    return Err(SplitError::invalid(format!(
                        "Total shares in {direction} must be at least 1"
                    )));
                }
                Ok(())
            }
            (RepartitionKind::Equal | RepartitionKind::Unsupported, _) => Err(
                SplitError::invalid(format!("Invalid repartition type for {direction}")),
            ),
        }
    }

    /// Rejects any referenced user that is not a member of the owning group.
    pub fn ensure_members(
        paid_by: &PaidDetails,
        paid_for: &PaidDetails,
        members: &[UserId],
    ) -> Result<()> {
        let members: HashSet<UserId> = members.iter().copied().collect();
        let outsiders: Vec<String> = concerned_user_ids(paid_by, paid_for)
            .into_iter()
            .filter(|id| !members.contains(id))
            .map(|id| id.to_string())
            .collect();
        if outsiders.is_empty() {
            Ok(())
        } else {
            Err(SplitError::invalid(format!(
                "Users not in group: {}",
                outsiders.join(", ")
            )))
        }
    }

    fn ensure_unique_users(direction: Direction, details: &PaidDetails) -> Result<()> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for id in details.user_ids() {
            if !seen.insert(id) && !duplicates.contains(&id) {
                duplicates.push(id);
            }
        }
        if duplicates.is_empty() {
            return Ok(());
        }
        let listed: Vec<String> = duplicates.iter().map(ToString::to_string).collect();
        Err(SplitError::invalid(format!(
            "Duplicate user ids in {direction}: {}",
            listed.join(", ")
        )))
    }
}

/// Union of the users referenced on both sides, first-seen order, without repeats.
pub fn concerned_user_ids(paid_by: &PaidDetails, paid_for: &PaidDetails) -> Vec<UserId> {
    let mut seen = HashSet::new();
    paid_by
        .user_ids()
        .chain(paid_for.user_ids())
        .filter(|id| seen.insert(*id))
        .collect()
}

pub fn require_group_id(group_id: Option<Uuid>) -> Result<Uuid> {
    group_id.ok_or_else(|| SplitError::invalid("groupId is required"))
}

/// Field-level checks on an expense payload. Returns the owning group id.
pub fn validate_expense_payload(expense: &NewExpense) -> Result<Uuid> {
    let group_id = require_group_id(expense.group_id)?;
    let name = expense.name.trim();
    if name.is_empty() {
        return Err(SplitError::invalid("Expense name must not be empty"));
    }
    if name.chars().count() > MAX_EXPENSE_NAME_LEN {
        return Err(SplitError::invalid(format!(
            "Expense name must be at most {MAX_EXPENSE_NAME_LEN} characters"
        )));
    }
    if !expense.exchange_rate.is_finite() || expense.exchange_rate <= 0.0 {
        return Err(SplitError::invalid("Exchange rate must be a positive number"));
    }
    if !expense.amount.is_finite() {
        return Err(SplitError::invalid("Amount must be a finite number"));
    }
    Ok(group_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ShareValues, UserShare};

    const MEMBERS: &[UserId] = &[1, 2, 3];

    fn reason(result: Result<()>) -> String {
        result.expect_err("validation should fail").reason().to_string()
    }

    #[test]
    fn exact_amount_split_is_accepted() {
        let paid_by = PaidDetails::amounts(&[(1, 100.0)]);
        let paid_for = PaidDetails::amounts(&[(1, 50.0), (2, 50.0)]);
        RepartitionValidator::validate(100.0, &paid_by, &paid_for, MEMBERS)
            .expect("balanced split");
    }

    #[test]
    fn amount_off_by_a_cent_is_rejected() {
        let paid_by = PaidDetails::amounts(&[(1, 100.0)]);
        let paid_for = PaidDetails::amounts(&[(1, 50.0), (2, 49.99)]);
        let message = reason(RepartitionValidator::validate(
            100.0, &paid_by, &paid_for, MEMBERS,
        ));
        assert!(message.contains("paidFor"), "unexpected: {message}");
        assert!(message.contains("does not match"), "unexpected: {message}");
    }

    #[test]
    fn amount_sum_is_exact_not_epsilon_tolerant() {
        let paid_by = PaidDetails::amounts(&[(1, 0.1), (2, 0.2)]);
        let paid_for = PaidDetails::amounts(&[(3, 0.3)]);
        // 0.1 + 0.2 != 0.3 in binary floating point
        assert!(RepartitionValidator::validate(0.3, &paid_by, &paid_for, MEMBERS).is_err());
    }

    #[test]
    fn portions_are_accepted_for_beneficiaries() {
        let paid_by = PaidDetails::amounts(&[(1, 30.0)]);
        let paid_for = PaidDetails::portions(&[(1, 1.0), (2, 0.0), (3, 2.0)]);
        RepartitionValidator::validate(30.0, &paid_by, &paid_for, MEMBERS).expect("portions");
    }

    #[test]
    fn portions_total_below_one_is_rejected() {
        let paid_by = PaidDetails::amounts(&[(1, 30.0)]);
        let paid_for = PaidDetails::portions(&[(1, 0.5), (2, 0.25)]);
        let message = reason(RepartitionValidator::validate(
            30.0, &paid_by, &paid_for, MEMBERS,
        ));
        assert_eq!(message, "Total shares in paidFor must be at least 1");
    }

    #[test]
    fn negative_share_is_rejected_even_when_total_is_large() {
        let paid_by = PaidDetails::amounts(&[(1, 30.0)]);
        let paid_for = PaidDetails::portions(&[(1, 5.0), (2, -1.0)]);
        let message = reason(RepartitionValidator::validate(
            30.0, &paid_by, &paid_for, MEMBERS,
        ));
        assert_eq!(message, "Negative share for user 2 in paidFor");
    }

    #[test]
    fn portions_for_payers_are_always_rejected() {
        let paid_by = PaidDetails::portions(&[(1, 1.0), (2, 1.0)]);
        let paid_for = PaidDetails::amounts(&[(1, 10.0)]);
        let message = reason(RepartitionValidator::validate(
            10.0, &paid_by, &paid_for, MEMBERS,
        ));
        assert_eq!(message, "PORTIONS not allowed for paidBy");
    }

    #[test]
    fn unsupported_kind_names_the_direction() {
        let paid_by = PaidDetails::amounts(&[(1, 10.0)]);
        let paid_for = PaidDetails::new(
            RepartitionKind::Equal,
            vec![UserShare::new(1, ShareValues::share(1.0))],
        );
        let message = reason(RepartitionValidator::validate(
            10.0, &paid_by, &paid_for, MEMBERS,
        ));
        assert_eq!(message, "Invalid repartition type for paidFor");
    }

    #[test]
    fn entry_without_values_is_rejected_before_kind_checks() {
        let paid_by = PaidDetails::new(
            RepartitionKind::Portions,
            vec![UserShare::new(1, ShareValues::default())],
        );
        let paid_for = PaidDetails::amounts(&[(1, 10.0)]);
        let message = reason(RepartitionValidator::validate(
            10.0, &paid_by, &paid_for, MEMBERS,
        ));
        assert_eq!(
            message,
            "Each user share in paidBy must define an amount or a share"
        );
    }

    #[test]
    fn duplicate_user_within_direction_is_rejected() {
        let paid_by = PaidDetails::amounts(&[(1, 5.0), (1, 5.0)]);
        let paid_for = PaidDetails::amounts(&[(2, 10.0)]);
        let message = reason(RepartitionValidator::validate(
            10.0, &paid_by, &paid_for, MEMBERS,
        ));
        assert_eq!(message, "Duplicate user ids in paidBy: 1");
    }

    #[test]
    fn same_user_on_both_sides_is_fine() {
        let paid_by = PaidDetails::amounts(&[(1, 10.0)]);
        let paid_for = PaidDetails::amounts(&[(1, 10.0)]);
        RepartitionValidator::validate(10.0, &paid_by, &paid_for, MEMBERS).expect("valid");
    }

    #[test]
    fn outsiders_are_listed_in_the_rejection() {
        let paid_by = PaidDetails::amounts(&[(7, 10.0)]);
        let paid_for = PaidDetails::amounts(&[(1, 5.0), (9, 5.0)]);
        let message = reason(RepartitionValidator::validate(
            10.0, &paid_by, &paid_for, MEMBERS,
        ));
        assert_eq!(message, "Users not in group: 7, 9");
    }

    #[test]
    fn missing_group_id_fails_first() {
        let request = ValidationRequest {
            total_amount: 10.0,
            paid_by: PaidDetails::portions(&[(1, 1.0)]),
            paid_for: PaidDetails::amounts(&[(99, 1.0)]),
            group_id: None,
        };
        let err = RepartitionValidator::validate_request(&request, MEMBERS).unwrap_err();
        assert_eq!(err.reason(), "groupId is required");
    }

    #[test]
    fn concerned_ids_are_deduplicated_in_order() {
        let paid_by = PaidDetails::amounts(&[(2, 1.0), (1, 1.0)]);
        let paid_for = PaidDetails::amounts(&[(1, 1.0), (3, 1.0)]);
        assert_eq!(concerned_user_ids(&paid_by, &paid_for), vec![2, 1, 3]);
    }

    #[test]
    fn payload_checks_reject_bad_fields() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut expense = NewExpense::new(
            Uuid::new_v4(),
            "Dinner",
            date,
            10.0,
            PaidDetails::amounts(&[(1, 10.0)]),
            PaidDetails::amounts(&[(1, 10.0)]),
        );
        assert!(validate_expense_payload(&expense).is_ok());

        expense.exchange_rate = 0.0;
        assert!(validate_expense_payload(&expense).is_err());

        expense.exchange_rate = 1.0;
        expense.name = "x".repeat(MAX_EXPENSE_NAME_LEN + 1);
        assert!(validate_expense_payload(&expense).is_err());
    }
}
