use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Expense, Group};
use crate::errors::{Result, SplitError};

use super::{json_backend::LedgerSnapshot, ExpenseRepository, GroupRepository};

/// Process-local repository backing both groups and expenses.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    groups: RwLock<HashMap<Uuid, Group>>,
    expenses: RwLock<HashMap<Uuid, Expense>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let groups = snapshot
            .groups
            .into_iter()
            .map(|group| (group.id, group))
            .collect();
        let expenses = snapshot
            .expenses
            .into_iter()
            .map(|expense| (expense.id, expense))
            .collect();
        Self {
            groups: RwLock::new(groups),
            expenses: RwLock::new(expenses),
        }
    }

    /// Copies the current contents into a serializable snapshot, groups by name.
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        let mut groups: Vec<Group> = read(&self.groups)?.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        let mut expenses: Vec<Expense> = read(&self.expenses)?.values().cloned().collect();
        sort_expenses(&mut expenses);
        Ok(LedgerSnapshot::new(groups, expenses))
    }

    /// Replaces the whole content with `snapshot`.
    pub fn restore(&self, snapshot: LedgerSnapshot) -> Result<()> {
        let restored = Self::from_snapshot(snapshot);
        let groups = restored
            .groups
            .into_inner()
            .map_err(|_| poisoned())?;
        let expenses = restored
            .expenses
            .into_inner()
            .map_err(|_| poisoned())?;
        *write(&self.groups)? = groups;
        *write(&self.expenses)? = expenses;
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn insert_group(&self, group: Group) -> Result<Group> {
        let mut groups = write(&self.groups)?;
        if groups.contains_key(&group.id) {
            return Err(SplitError::Storage(format!("group {} already exists", group.id)));
        }
        groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn update_group(&self, group: Group) -> Result<Group> {
        let mut groups = write(&self.groups)?;
        match groups.get_mut(&group.id) {
            Some(slot) => {
                *slot = group.clone();
                Ok(group)
            }
            None => Err(SplitError::GroupNotFound(group.id.to_string())),
        }
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>> {
        Ok(read(&self.groups)?.get(&id).cloned())
    }

    async fn find_by_link_token(&self, token: Uuid) -> Result<Option<Group>> {
        Ok(read(&self.groups)?
            .values()
            .find(|group| group.link_token == token)
            .cloned())
    }

    async fn delete_group(&self, id: Uuid) -> Result<bool> {
        Ok(write(&self.groups)?.remove(&id).is_some())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = read(&self.groups)?.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryStore {
    async fn insert_expense(&self, expense: Expense) -> Result<Expense> {
        let mut expenses = write(&self.expenses)?;
        if expenses.contains_key(&expense.id) {
            return Err(SplitError::Storage(format!(
                "expense {} already exists",
                expense.id
            )));
        }
        expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn update_expense(&self, expense: Expense) -> Result<Expense> {
        let mut expenses = write(&self.expenses)?;
        match expenses.get_mut(&expense.id) {
            Some(slot) => {
                *slot = expense.clone();
                Ok(expense)
            }
            None => Err(SplitError::NotFound(format!("expense {}", expense.id))),
        }
    }

    async fn find_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        Ok(read(&self.expenses)?.get(&id).cloned())
    }

    async fn list_for_group(&self, group_id: Uuid) -> Result<Vec<Expense>> {
        let mut expenses: Vec<Expense> = read(&self.expenses)?
            .values()
            .filter(|expense| expense.group_id == group_id)
            .cloned()
            .collect();
        sort_expenses(&mut expenses);
        Ok(expenses)
    }

    async fn delete_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        Ok(write(&self.expenses)?.remove(&id))
    }

    async fn delete_for_group(&self, group_id: Uuid) -> Result<Vec<Expense>> {
        let mut expenses = write(&self.expenses)?;
        let ids: Vec<Uuid> = expenses
            .values()
            .filter(|expense| expense.group_id == group_id)
            .map(|expense| expense.id)
            .collect();
        let mut removed: Vec<Expense> = ids
            .into_iter()
            .filter_map(|id| expenses.remove(&id))
            .collect();
        sort_expenses(&mut removed);
        Ok(removed)
    }
}

fn sort_expenses(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| poisoned())
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| poisoned())
}

fn poisoned() -> SplitError {
    SplitError::Storage("in-memory store lock poisoned".into())
}
