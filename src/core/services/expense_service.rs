//! Validated expense lifecycle scoped to an owning group.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::services::ServiceResult;
use crate::core::validation::{validate_expense_payload, RepartitionValidator, ValidationRequest};
use crate::domain::{Expense, NewExpense};
use crate::errors::SplitError;
use crate::storage::{ExpenseRepository, GroupRepository, ImageStore};

pub struct ExpenseService {
    groups: Arc<dyn GroupRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    images: Option<Arc<dyn ImageStore>>,
}

impl ExpenseService {
    pub fn new(groups: Arc<dyn GroupRepository>, expenses: Arc<dyn ExpenseRepository>) -> Self {
        Self {
            groups,
            expenses,
            images: None,
        }
    }

    pub fn with_images(mut self, images: Arc<dyn ImageStore>) -> Self {
        self.images = Some(images);
        self
    }

    /// Validates a standalone split request against the members of its group.
    pub async fn validate(&self, request: &ValidationRequest) -> ServiceResult<()> {
        let group_id = crate::core::validation::require_group_id(request.group_id)?;
        let members = self.groups.group_member_ids(group_id).await?;
        RepartitionValidator::validate_request(request, &members)?;
        Ok(())
    }

    pub async fn create(&self, input: NewExpense) -> ServiceResult<Expense> {
        let group_id = self.check(&input).await?;
        let expense = self
            .expenses
            .insert_expense(Expense::from_new(group_id, input))
            .await?;
        info!(expense = %expense.id, group = %group_id, amount = expense.amount, "expense created");
        Ok(expense)
    }

    /// Same as [`ExpenseService::create`] for a group addressed separately from the payload.
    pub async fn create_in_group(&self, group_id: Uuid, input: NewExpense) -> ServiceResult<Expense> {
        if input.group_id.is_some_and(|id| id != group_id) {
            return Err(SplitError::invalid("Group id does not match"));
        }
        let input = NewExpense {
            group_id: Some(group_id),
            ..input
        };
        self.create(input).await
    }

    /// Replaces an expense. The payload must stay in the expense's group.
    pub async fn update(&self, id: Uuid, input: NewExpense) -> ServiceResult<Expense> {
        let mut expense = self.find(id).await?;
        let group_id = self.check(&input).await?;
        if group_id != expense.group_id {
            return Err(SplitError::invalid("Group id does not match"));
        }
        expense.apply(input);
        self.expenses.update_expense(expense).await
    }

    pub async fn find(&self, id: Uuid) -> ServiceResult<Expense> {
        self.expenses
            .find_expense(id)
            .await?
            .ok_or_else(|| SplitError::NotFound("Expense not found".into()))
    }

    pub async fn list_for_group(&self, group_id: Uuid) -> ServiceResult<Vec<Expense>> {
        if self.groups.find_group(group_id).await?.is_none() {
            return Err(SplitError::GroupNotFound("Group not found".into()));
        }
        self.expenses.list_for_group(group_id).await
    }

    pub async fn remove(&self, id: Uuid) -> ServiceResult<Expense> {
        let expense = self
            .expenses
            .delete_expense(id)
            .await?
            .ok_or_else(|| SplitError::NotFound("Expense not found".into()))?;
        if let Some(images) = &self.images {
            for name in &expense.images {
                if let Err(err) = images.delete_image(name) {
                    warn!(image = %name, error = %err, "could not delete image");
                }
            }
        }
        info!(expense = %id, "expense removed");
        Ok(expense)
    }

    /// Payload checks, group lookup, then the repartition rules against the members.
    async fn check(&self, input: &NewExpense) -> ServiceResult<Uuid> {
        let group_id = validate_expense_payload(input)?;
        let group = self
            .groups
            .find_group(group_id)
            .await?
            .ok_or_else(|| SplitError::GroupNotFound("Group not found".into()))?;
        RepartitionValidator::validate(
            input.amount,
            &input.paid_by,
            &input.paid_for,
            &group.member_ids(),
        )?;
        Ok(group_id)
    }
}
