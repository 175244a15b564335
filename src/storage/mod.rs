//! Persistence collaborators for the service layer.
//!
//! Repositories are async because real backends fetch over I/O; the image
//! store is synchronous file access.

pub mod images;
pub mod json_backend;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{DatedAmount, Expense, Group, UserId};
use crate::errors::Result;

/// Storage of groups and their member index.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn insert_group(&self, group: Group) -> Result<Group>;
    async fn update_group(&self, group: Group) -> Result<Group>;
    async fn find_group(&self, id: Uuid) -> Result<Option<Group>>;
    async fn find_by_link_token(&self, token: Uuid) -> Result<Option<Group>>;
    /// Returns whether a group was removed.
    async fn delete_group(&self, id: Uuid) -> Result<bool>;
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Member ids of a group; empty when the group is unknown or has no members.
    async fn group_member_ids(&self, id: Uuid) -> Result<Vec<UserId>> {
        Ok(self
            .find_group(id)
            .await?
            .map(|group| group.member_ids())
            .unwrap_or_default())
    }
}

/// Storage of expenses, always scoped by their owning group.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn insert_expense(&self, expense: Expense) -> Result<Expense>;
    async fn update_expense(&self, expense: Expense) -> Result<Expense>;
    async fn find_expense(&self, id: Uuid) -> Result<Option<Expense>>;
    /// Expenses of one group ordered by date.
    async fn list_for_group(&self, group_id: Uuid) -> Result<Vec<Expense>>;
    async fn delete_expense(&self, id: Uuid) -> Result<Option<Expense>>;
    /// Removes every expense of a group and returns them.
    async fn delete_for_group(&self, group_id: Uuid) -> Result<Vec<Expense>>;

    /// `(amount, date)` pairs of a group's expenses dated on or after `since`.
    async fn list_expenses(&self, group_id: Uuid, since: NaiveDate) -> Result<Vec<DatedAmount>> {
        Ok(self
            .list_for_group(group_id)
            .await?
            .iter()
            .filter(|expense| expense.date >= since)
            .map(Expense::dated_amount)
            .collect())
    }
}

/// Blob storage for receipts attached to expenses.
pub trait ImageStore: Send + Sync {
    /// Stores an upload and returns the generated file name.
    fn save_image(&self, original_name: &str, content_type: &str, bytes: &[u8]) -> Result<String>;
    fn read_image(&self, name: &str) -> Result<Vec<u8>>;
    fn delete_image(&self, name: &str) -> Result<()>;
}

pub use images::FsImageStore;
pub use json_backend::{load_snapshot, save_snapshot, LedgerSnapshot};
pub use memory::InMemoryStore;
