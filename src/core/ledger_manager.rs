use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::core::services::{ExpenseService, ForecastService, GroupService};
use crate::core::time::{Clock, SystemClock};
use crate::errors::{Result, SplitError};
use crate::storage::{load_snapshot, save_snapshot, ImageStore, InMemoryStore};

/// Outcome of loading a snapshot into the manager.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub path: PathBuf,
    pub groups: usize,
    pub expenses: usize,
    pub warnings: Vec<String>,
}

/// Facade that wires the services over one shared store and handles snapshots.
pub struct LedgerManager {
    store: Arc<InMemoryStore>,
    images: Option<Arc<dyn ImageStore>>,
    clock: Arc<dyn Clock>,
    config: Config,
    current_path: Option<PathBuf>,
}

impl LedgerManager {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            images: None,
            clock: Arc::new(SystemClock),
            config,
            current_path: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_images(mut self, images: Arc<dyn ImageStore>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<InMemoryStore> {
        Arc::clone(&self.store)
    }

    pub fn groups(&self) -> GroupService {
        let service = GroupService::new(self.store.clone(), self.store.clone());
        match &self.images {
            Some(images) => service.with_images(Arc::clone(images)),
            None => service,
        }
    }

    pub fn expenses(&self) -> ExpenseService {
        let service = ExpenseService::new(self.store.clone(), self.store.clone());
        match &self.images {
            Some(images) => service.with_images(Arc::clone(images)),
            None => service,
        }
    }

    pub fn forecasts(&self) -> ForecastService {
        ForecastService::new(
            self.store.clone(),
            self.store.clone(),
            Arc::clone(&self.clock),
            self.config.forecast.engine(),
        )
    }

    /// Saves to the last used path.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self
            .current_path
            .clone()
            .ok_or_else(|| SplitError::Storage("no snapshot path selected".into()))?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&mut self, path: &Path) -> Result<()> {
        save_snapshot(&self.store.snapshot()?, path)?;
        self.current_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Replaces the in-memory state with the snapshot at `path`.
    pub fn load_from_path(&mut self, path: &Path) -> Result<LoadMetadata> {
        let snapshot = load_snapshot(path)?;
        let warnings = snapshot
            .orphaned_expenses()
            .iter()
            .map(|expense| {
                format!(
                    "expense {} references unknown group {}",
                    expense.id, expense.group_id
                )
            })
            .collect();
        let metadata = LoadMetadata {
            path: path.to_path_buf(),
            groups: snapshot.groups.len(),
            expenses: snapshot.expenses.len(),
            warnings,
        };
        self.store.restore(snapshot)?;
        self.current_path = Some(path.to_path_buf());
        Ok(metadata)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, NewGroup, UserIndex};
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_then_load_restores_groups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let mut manager = LedgerManager::new(Config::default());
        let group = manager
            .groups()
            .create(NewGroup::new(
                "Trip",
                Currency::Eur,
                vec![UserIndex::new(1, "Ana")],
            ))
            .await
            .unwrap();
        manager.save_to_path(&path).unwrap();

        let mut fresh = LedgerManager::new(Config::default());
        let meta = fresh.load_from_path(&path).unwrap();
        assert_eq!(meta.groups, 1);
        assert!(meta.warnings.is_empty());
        assert_eq!(fresh.groups().find(group.id).await.unwrap().name, "Trip");
        assert_eq!(fresh.current_path(), Some(path.as_path()));
    }

    #[test]
    fn save_without_path_fails() {
        let mut manager = LedgerManager::new(Config::default());
        assert!(manager.save().is_err());
    }
}
