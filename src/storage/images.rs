use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    errors::{Result, SplitError},
    utils::ensure_dir,
};

use super::ImageStore;

pub const DEFAULT_MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Receipt images kept as flat files under one upload directory.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root, max_bytes })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !is_safe_filename(name) {
            return Err(SplitError::invalid("Invalid filename"));
        }
        Ok(self.root.join(name))
    }
}

impl ImageStore for FsImageStore {
    fn save_image(&self, original_name: &str, content_type: &str, bytes: &[u8]) -> Result<String> {
        if !content_type.starts_with("image/") {
            return Err(SplitError::invalid("Invalid file type, must be an image"));
        }
        if bytes.len() > self.max_bytes {
            return Err(SplitError::invalid(format!(
                "Image exceeds the maximum size of {} bytes",
                self.max_bytes
            )));
        }
        let name = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            sanitize_name(original_name)
        );
        let path = self.resolve(&name)?;
        fs::write(&path, bytes)?;
        tracing::debug!(file = %name, size = bytes.len(), "image stored");
        Ok(name)
    }

    fn read_image(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(SplitError::NotFound("File not found".into()));
        }
        Ok(fs::read(path)?)
    }

    fn delete_image(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(SplitError::NotFound("File not found".into()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

/// Names limited to ASCII letters, digits, `.`, `_` and `-`; no traversal.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn sanitize_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "image".into()
    } else {
        cleaned
    }
}
