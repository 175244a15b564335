use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Expense, Group},
    errors::{Result, SplitError},
    utils::ensure_dir,
};

const TMP_SUFFIX: &str = "tmp";

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Everything the in-memory store holds, in a form that survives a restart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerSnapshot {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl LedgerSnapshot {
    pub fn new(groups: Vec<Group>, expenses: Vec<Expense>) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            saved_at: Utc::now(),
            groups,
            expenses,
        }
    }

    /// Expenses whose group is missing from the snapshot.
    pub fn orphaned_expenses(&self) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|expense| !self.groups.iter().any(|group| group.id == expense.group_id))
            .collect()
    }
}

/// Writes the snapshot by staging to a sibling temporary file and renaming it into place.
pub fn save_snapshot(snapshot: &LedgerSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = tmp_path(path);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), groups = snapshot.groups.len(), "snapshot saved");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<LedgerSnapshot> {
    if !path.exists() {
        return Err(SplitError::Storage(format!(
            "snapshot `{}` not found",
            path.display()
        )));
    }
    let data = fs::read_to_string(path)?;
    let snapshot: LedgerSnapshot = serde_json::from_str(&data)?;
    if snapshot.schema_version > SNAPSHOT_SCHEMA_VERSION {
        return Err(SplitError::Storage(format!(
            "snapshot `{}` is from a newer schema version",
            path.display()
        )));
    }
    for expense in snapshot.orphaned_expenses() {
        tracing::warn!(expense = %expense.id, group = %expense.group_id, "expense references unknown group");
    }
    Ok(snapshot)
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_file(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
