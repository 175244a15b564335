//! Group lifecycle: creation, membership, joining by link and cascading removal.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::services::ServiceResult;
use crate::domain::{
    Expense, Group, GroupUpdate, NewGroup, UserId, UserIndex, MAX_GROUP_DESCRIPTION_LEN,
    MAX_GROUP_NAME_LEN,
};
use crate::errors::SplitError;
use crate::storage::{ExpenseRepository, GroupRepository, ImageStore};

/// A group together with the expenses it owns.
#[derive(Debug, Clone)]
pub struct GroupWithExpenses {
    pub group: Group,
    pub expenses: Vec<Expense>,
}

pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    images: Option<Arc<dyn ImageStore>>,
}

impl GroupService {
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

    pub async fn create(&self, input: NewGroup) -> ServiceResult<Group> {
        validate_name(&input.name)?;
        validate_description(input.description.as_deref())?;
        ensure_unique_members(&input.users)?;
        let group = self.groups.insert_group(Group::from_new(input)).await?;
        info!(group = %group.id, members = group.users.len(), "group created");
        Ok(group)
    }

    pub async fn find(&self, id: Uuid) -> ServiceResult<Group> {
        self.groups
            .find_group(id)
            .await?
            .ok_or_else(group_not_found)
    }

    pub async fn find_with_expenses(&self, id: Uuid) -> ServiceResult<GroupWithExpenses> {
        let group = self.find(id).await?;
        let expenses = self.expenses.list_for_group(id).await?;
        Ok(GroupWithExpenses { group, expenses })
    }

    pub async fn list(&self) -> ServiceResult<Vec<Group>> {
        self.groups.list_groups().await
    }

    pub async fn update(&self, id: Uuid, update: GroupUpdate) -> ServiceResult<Group> {
        let mut group = self.find(id).await?;
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        validate_description(update.description.as_deref())?;
        if let Some(users) = &update.users {
            ensure_unique_members(users)?;
        }
        group.apply(update);
        self.groups.update_group(group).await
    }

    /// Member ids of a group; empty when the group does not exist.
    pub async fn member_ids(&self, id: Uuid) -> ServiceResult<Vec<UserId>> {
        self.groups.group_member_ids(id).await
    }

    /// Resolves a shared link token to the id of the group it opens.
    pub async fn join(&self, link_token: Uuid) -> ServiceResult<Uuid> {
        self.groups
            .find_by_link_token(link_token)
            .await?
            .map(|group| group.id)
            .ok_or_else(group_not_found)
    }

    /// Deletes the group and everything it owns. Image cleanup is best effort.
    pub async fn remove(&self, id: Uuid) -> ServiceResult<Group> {
        let group = self.find(id).await?;
        let expenses = self.expenses.delete_for_group(id).await?;
        self.groups.delete_group(id).await?;
        if let Some(images) = &self.images {
            for name in expenses.iter().flat_map(|expense| expense.images.iter()) {
                if let Err(err) = images.delete_image(name) {
                    warn!(image = %name, error = %err, "could not delete image");
                }
            }
        }
        info!(group = %id, expenses = expenses.len(), "group removed");
        Ok(group)
    }
}

fn group_not_found() -> SplitError {
    SplitError::GroupNotFound("Group not found".into())
}

fn validate_name(name: &str) -> ServiceResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SplitError::invalid("Group name must not be empty"));
    }
    if trimmed.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(SplitError::invalid(format!(
            "Group name must be at most {MAX_GROUP_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> ServiceResult<()> {
    match description {
        Some(text) if text.chars().count() > MAX_GROUP_DESCRIPTION_LEN => Err(SplitError::invalid(
            format!("Group description must be at most {MAX_GROUP_DESCRIPTION_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

fn ensure_unique_members(users: &[UserIndex]) -> ServiceResult<()> {
    let mut seen = HashSet::new();
    if users.iter().all(|user| seen.insert(user.id)) {
        Ok(())
    } else {
        Err(SplitError::invalid("User ids in a group must be unique"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, NewExpense, PaidDetails};
    use crate::storage::{FsImageStore, InMemoryStore};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn members() -> Vec<UserIndex> {
        vec![UserIndex::new(1, "Ana"), UserIndex::new(2, "Ben")]
    }

    fn service(store: &Arc<InMemoryStore>) -> GroupService {
        GroupService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn duplicate_member_ids_are_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let users = vec![UserIndex::new(1, "Ana"), UserIndex::new(1, "Ann")];
        let err = service(&store)
            .create(NewGroup::new("Trip", Currency::Chf, users))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "User ids in a group must be unique");
    }

    #[tokio::test]
    async fn overlong_name_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let err = service(&store)
            .create(NewGroup::new("x".repeat(31), Currency::Chf, members()))
            .await
            .unwrap_err();
        assert!(err.reason().contains("at most 30"));
    }

    #[tokio::test]
    async fn join_resolves_link_token() {
        let store = Arc::new(InMemoryStore::new());
        let groups = service(&store);
        let group = groups
            .create(NewGroup::new("Trip", Currency::Chf, members()))
            .await
            .unwrap();
        assert_eq!(groups.join(group.link_token).await.unwrap(), group.id);
        let err = groups.join(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.reason(), "Group not found");
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let store = Arc::new(InMemoryStore::new());
        let groups = service(&store);
        let group = groups
            .create(NewGroup::new("Trip", Currency::Chf, members()))
            .await
            .unwrap();
        let updated = groups
            .update(
                group.id,
                GroupUpdate {
                    users: Some(vec![UserIndex::new(3, "Cy")]),
                    ..GroupUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(groups.member_ids(group.id).await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn remove_cascades_to_expenses_and_images() {
        let dir = tempdir().unwrap();
        let images = Arc::new(FsImageStore::new(dir.path(), 1024).unwrap());
        let stored = images.save_image("r.png", "image/png", b"x").unwrap();

        let store = Arc::new(InMemoryStore::new());
        let groups = service(&store).with_images(images.clone());
        let group = groups
            .create(NewGroup::new("Trip", Currency::Chf, members()))
            .await
            .unwrap();
        let mut input = NewExpense::new(
            group.id,
            "Taxi",
            NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
            10.0,
            PaidDetails::amounts(&[(1, 10.0)]),
            PaidDetails::amounts(&[(2, 10.0)]),
        );
        input.images = vec![stored.clone(), "already-gone.png".into()];
        store
            .insert_expense(Expense::from_new(group.id, input))
            .await
            .unwrap();

        groups.remove(group.id).await.unwrap();
        assert!(store.find_group(group.id).await.unwrap().is_none());
        assert!(store.list_for_group(group.id).await.unwrap().is_empty());
        assert!(images.read_image(&stored).is_err());
        assert!(groups.member_ids(group.id).await.unwrap().is_empty());
    }
}
