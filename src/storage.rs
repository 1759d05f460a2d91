//! Directory-backed key/value blobs, laid out like browser local storage:
//! one file per key holding a JSON document.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

pub const FAMILY_KEY: &str = "smart-fridge-family";
pub const ONBOARDING_KEY: &str = "smart-fridge-onboarding";
pub const INITIALIZED_KEY: &str = "smart-fridge-initialized";
pub const PREFERENCES_KEY: &str = "smart-fridge-preferences";
pub const SHOPPING_LIST_KEY: &str = "smart-fridge-shopping-list";

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("create data dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Raw string value, or `None` when the key was never written.
    pub fn get_item(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    pub fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("replace {}", path.display()))?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", key)),
        }
    }

    /// A corrupt blob reads as absent; the next write replaces it.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(%key, error = %e, "ignoring unreadable local blob");
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value).context("serialize local blob")?;
        self.set_item(key, &raw)
    }

    pub fn get_flag(&self, key: &str) -> bool {
        self.get_item(key).map(|v| v.trim() == "true").unwrap_or(false)
    }
}
