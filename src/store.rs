//! Settings lifecycle: load, merge, cache, persist.
//!
//! [`ConfigStore`] owns the process-wide [`AppConfig`]. It is created once
//! at startup by the embedding application and passed by reference to
//! whatever needs settings — there is no global instance, so tests inject
//! fixtures freely.
//!
//! Persistence is behind the [`ConfigPersistence`] trait. The application
//! uses [`JsonConfigFile`] (one pretty-printed JSON record, the same
//! layout the settings have always had); tests use an in-memory fake.
//!
//! # Failure semantics
//! Loading never fails: an unreadable or unparsable record logs a warning
//! and yields the built-in defaults, because refusing to start over a
//! corrupt settings file would be strictly worse than starting fresh.
//! Saving is optimistic: the in-memory value is applied first and a
//! persistence failure is returned to the caller as a warning-level
//! condition. Whether a failed save also rolls the in-memory value back is
//! governed by [`SaveFailurePolicy`]; the shipped default keeps the applied
//! value, matching long-standing behavior.

use std::path::PathBuf;

use tracing::warn;

use crate::config::AppConfig;
use crate::error::PersistError;

/// Where the settings record lives.
///
/// One read, one write, no partial updates — the record is small enough to
/// rewrite wholesale on every change.
pub trait ConfigPersistence: Send {
    /// Read the raw persisted record. `Ok(None)` means nothing has been
    /// persisted yet (first launch).
    fn read(&self) -> Result<Option<String>, PersistError>;

    /// Replace the persisted record.
    fn write(&self, payload: &str) -> Result<(), PersistError>;
}

/// What to do with the in-memory value when a save fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveFailurePolicy {
    /// Keep the new value applied in memory; only the disk copy is stale.
    /// The shipped default.
    #[default]
    KeepApplied,
    /// Restore the previous value, so memory and disk agree again.
    Rollback,
}

/// The single, process-wide settings holder.
///
/// Single-writer by construction: mutation requires `&mut self`, and the
/// embedding application serializes settings changes through its event
/// loop.
pub struct ConfigStore {
    persistence: Box<dyn ConfigPersistence>,
    current: AppConfig,
    save_policy: SaveFailurePolicy,
}

impl ConfigStore {
    /// Load settings by merging the persisted record over the built-in
    /// defaults. Never fails; see the module docs for why.
    pub fn load(persistence: Box<dyn ConfigPersistence>) -> Self {
        let current = match persistence.read() {
            Ok(Some(raw)) => match serde_json::from_str::<AppConfig>(&raw) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!(%err, "settings record is unparsable; using defaults");
                    AppConfig::default()
                }
            },
            Ok(None) => AppConfig::default(),
            Err(err) => {
                warn!(%err, "settings record is unreadable; using defaults");
                AppConfig::default()
            }
        };
        Self {
            persistence,
            current,
            save_policy: SaveFailurePolicy::default(),
        }
    }

    /// Override the save-failure policy (defaults to
    /// [`SaveFailurePolicy::KeepApplied`]).
    pub fn with_save_policy(mut self, policy: SaveFailurePolicy) -> Self {
        self.save_policy = policy;
        self
    }

    /// The last successfully loaded or applied configuration.
    pub fn current(&self) -> &AppConfig {
        &self.current
    }

    /// Apply and persist a new configuration.
    ///
    /// The value is applied in memory first; if persisting fails the error
    /// is returned so the caller can warn the user, and
    /// [`SaveFailurePolicy`] decides whether the applied value stays.
    pub fn replace(&mut self, config: AppConfig) -> Result<(), PersistError> {
        let previous = std::mem::replace(&mut self.current, config);
        let attempt = serde_json::to_string_pretty(&self.current)
            .map_err(|e| PersistError::Encode {
                detail: e.to_string(),
            })
            .and_then(|payload| self.persistence.write(&payload));
        if let Err(err) = attempt {
            match self.save_policy {
                SaveFailurePolicy::KeepApplied => {
                    warn!(%err, "settings save failed; keeping the applied value in memory");
                }
                SaveFailurePolicy::Rollback => {
                    warn!(%err, "settings save failed; rolling back to the previous value");
                    self.current = previous;
                }
            }
            return Err(err);
        }
        Ok(())
    }
}

/// Filesystem persistence: one JSON record at a fixed path.
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional per-user location,
    /// `<os config dir>/mediaforge/config.json`. `None` when the OS
    /// reports no config directory (rare; headless environments).
    pub fn at_default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("mediaforge").join("config.json")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ConfigPersistence for JsonConfigFile {
    fn read(&self) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn write(&self, payload: &str) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, payload).map_err(|e| PersistError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}
