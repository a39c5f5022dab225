//! Key/value store holding the rule settings.

use std::{io::ErrorKind, sync::Arc};

use log::{debug, info, warn};
use mockall::automock;
use parking_lot::RwLock;
use tokio::{sync::Notify, task::JoinHandle};

use crate::{
    error::ConfigReadError,
    rules::{SettingsLoader, StoredSettings},
};

/// Narrow settings interface read by the matcher and written by the console.
///
/// There is no transactional contract across keys: each getter and setter is
/// atomic on its own key only.
#[automock]
pub trait ConfigStore: Send + Sync {
    fn get_keyword(&self) -> String;
    fn set_keyword(&self, keyword: &str);
    /// Enable flag of the source category `id`, `true` when never set.
    fn is_source_enabled(&self, id: &str) -> bool;
    fn set_source_enabled(&self, id: &str, enabled: bool);
    fn get_locked(&self) -> bool;
    fn set_locked(&self, locked: bool);
}

/// [`ConfigStore`] kept in memory and mirrored to a JSON file.
///
/// Writes are visible to readers immediately. Each write wakes the persistence
/// task started by [`FileConfigStore::start_persistence_task`], which flushes
/// the whole settings object through the [`SettingsLoader`].
pub struct FileConfigStore {
    settings: RwLock<StoredSettings>,
    loader: SettingsLoader,
    changed: Notify,
}

impl FileConfigStore {
    /// Opens the store backed by the file at `path`.
    ///
    /// A missing file is a first start; an unreadable or corrupt file is
    /// reported and replaced by the defaults on the next write. Either way the
    /// store starts with an empty keyword, every source enabled and unlocked.
    pub async fn open(path: String) -> Self {
        let loader = SettingsLoader::new(path);

        let settings = match loader.load().await {
            Ok(settings) => settings,
            Err(ConfigReadError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!(
                    "no persisted settings at {}, starting with defaults",
                    loader.path()
                );
                StoredSettings::default()
            }
            Err(e) => {
                warn!("{}, starting with defaults", e);
                StoredSettings::default()
            }
        };

        FileConfigStore {
            settings: RwLock::new(settings),
            loader,
            changed: Notify::new(),
        }
    }

    /// Copy of the current settings.
    pub fn settings(&self) -> StoredSettings {
        self.settings.read().clone()
    }

    /// Writes the current settings to disk.
    pub async fn persist(&self) {
        let settings = self.settings();
        self.loader.persist(&settings).await;
    }

    /// Starts a background task persisting the settings after every write.
    ///
    /// Writes arriving while a flush is in progress are coalesced into the next
    /// flush. The task runs until aborted through the returned handle.
    pub fn start_persistence_task(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                store.changed.notified().await;
                store.persist().await;
            }
        })
    }

    fn update(&self, apply: impl FnOnce(&mut StoredSettings)) {
        apply(&mut *self.settings.write());
        self.changed.notify_one();
    }
}

impl ConfigStore for FileConfigStore {
    fn get_keyword(&self) -> String {
        self.settings.read().keyword.clone()
    }

    fn set_keyword(&self, keyword: &str) {
        debug!("set keyword to {:?}", keyword);
        self.update(|settings| settings.keyword = keyword.to_owned());
    }

    fn is_source_enabled(&self, id: &str) -> bool {
        self.settings.read().sources.get(id).copied().unwrap_or(true)
    }

    fn set_source_enabled(&self, id: &str, enabled: bool) {
        debug!("set source {} enabled={}", id, enabled);
        self.update(|settings| {
            settings.sources.insert(id.to_owned(), enabled);
        });
    }

    fn get_locked(&self) -> bool {
        self.settings.read().locked
    }

    fn set_locked(&self, locked: bool) {
        debug!("set keyword lock to {}", locked);
        self.update(|settings| settings.locked = locked);
    }
}
