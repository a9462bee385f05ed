use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::io::seed;
use crate::io::store::KeyValueStore;
use crate::model::unit::Unit;
use crate::model::user::User;

pub const UNITS_KEY: &str = "cleancommand_units";
pub const USERS_KEY: &str = "cleancommand_users";
pub const SESSION_KEY: &str = "cleancommand_session";

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access {key}: {source}")]
    Io {
        key: &'static str,
        source: std::io::Error,
    },
    #[error("could not decode {key}: {source}")]
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("could not encode {key}: {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("unit ID already exists: {0}")]
    DuplicateUnit(String),
}

/// Current wall-clock time as epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Record-level persistence over a [`KeyValueStore`].
///
/// Every call reads the whole collection, mutates it, and writes the whole
/// collection back. There is no locking: the last writer wins.
#[derive(Debug)]
pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    /// Open storage, seeding the default users and units if either key is absent.
    pub fn new(store: S) -> Result<Self, StorageError> {
        let storage = Storage { store };
        storage.seed_if_missing()?;
        Ok(storage)
    }

    /// Open storage without writing seed data
    pub fn unseeded(store: S) -> Self {
        Storage { store }
    }

    fn seed_if_missing(&self) -> Result<(), StorageError> {
        if self.raw(UNITS_KEY)?.is_none() {
            debug!(key = UNITS_KEY, "seeding default units");
            self.write(UNITS_KEY, &seed::default_units(now_millis()))?;
        }
        if self.raw(USERS_KEY)?.is_none() {
            debug!(key = USERS_KEY, "seeding default users");
            self.write(USERS_KEY, &seed::default_users())?;
        }
        Ok(())
    }

    fn raw(&self, key: &'static str) -> Result<Option<String>, StorageError> {
        self.store
            .get(key)
            .map_err(|source| StorageError::Io { key, source })
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StorageError> {
        match self.raw(key)? {
            Some(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|source| StorageError::Decode { key, source }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StorageError> {
        let content =
            serde_json::to_string(value).map_err(|source| StorageError::Encode { key, source })?;
        debug!(key, bytes = content.len(), "writing collection");
        self.store
            .set(key, &content)
            .map_err(|source| StorageError::Io { key, source })
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn get_users(&self) -> Result<Vec<User>, StorageError> {
        Ok(self.read(USERS_KEY)?.unwrap_or_default())
    }

    pub fn find_user(&self, user_id: &str) -> Result<Option<User>, StorageError> {
        Ok(self.get_users()?.into_iter().find(|u| u.id == user_id))
    }

    // -----------------------------------------------------------------------
    // Units
    // -----------------------------------------------------------------------

    pub fn get_units(&self) -> Result<Vec<Unit>, StorageError> {
        Ok(self.read(UNITS_KEY)?.unwrap_or_default())
    }

    pub fn get_unit(&self, unit_id: &str) -> Result<Option<Unit>, StorageError> {
        Ok(self.get_units()?.into_iter().find(|u| u.id == unit_id))
    }

    /// Append a new unit. An id that is already stored is refused and nothing is written.
    pub fn add_unit(&self, unit: Unit) -> Result<(), StorageError> {
        let mut units = self.get_units()?;
        if units.iter().any(|u| u.id == unit.id) {
            return Err(StorageError::DuplicateUnit(unit.id));
        }
        units.push(unit);
        self.write(UNITS_KEY, &units)
    }

    /// Overwrite the stored unit with the same id and stamp `last_updated`.
    ///
    /// Returns the stored copy, or `None` (with nothing written) when no unit
    /// has that id.
    pub fn update_unit(&self, unit: &Unit) -> Result<Option<Unit>, StorageError> {
        let mut units = self.get_units()?;
        let Some(slot) = units.iter_mut().find(|u| u.id == unit.id) else {
            debug!(unit = %unit.id, "update of unknown unit ignored");
            return Ok(None);
        };
        *slot = Unit {
            last_updated: now_millis(),
            ..unit.clone()
        };
        let stored = slot.clone();
        self.write(UNITS_KEY, &units)?;
        Ok(Some(stored))
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Log in by email (case-insensitive). A miss leaves any existing session alone.
    pub fn login(&self, email: &str) -> Result<Option<User>, StorageError> {
        let user = self
            .get_users()?
            .into_iter()
            .find(|u| u.email_matches(email));
        if let Some(ref user) = user {
            self.write(SESSION_KEY, user)?;
        }
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        self.store
            .remove(SESSION_KEY)
            .map_err(|source| StorageError::Io {
                key: SESSION_KEY,
                source,
            })
    }

    pub fn get_current_user(&self) -> Result<Option<User>, StorageError> {
        self.read(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::{FileStore, MemoryStore};
    use crate::model::unit::UnitStatus;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn seeded() -> Storage<MemoryStore> {
        Storage::new(MemoryStore::new()).unwrap()
    }

    #[test]
    fn seeds_on_first_open() {
        let storage = seeded();
        let users = storage.get_users().unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].id, "admin-1");
        let units = storage.get_units().unwrap();
        let ids: Vec<_> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["unit-101", "unit-204"]);
        assert_eq!(units[1].status, UnitStatus::Rework);
    }

    #[test]
    fn seeding_never_overwrites_existing_data() {
        let store = MemoryStore::new();
        store.set(UNITS_KEY, "[]").unwrap();
        let storage = Storage::new(&store).unwrap();
        assert!(storage.get_units().unwrap().is_empty());
        // users were absent, so they got seeded
        assert_eq!(storage.get_users().unwrap().len(), 3);

        // reopening does not re-seed units
        let storage = Storage::new(&store).unwrap();
        assert!(storage.get_units().unwrap().is_empty());
    }

    #[test]
    fn missing_keys_read_as_empty() {
        let storage = Storage::unseeded(MemoryStore::new());
        assert!(storage.get_units().unwrap().is_empty());
        assert!(storage.get_users().unwrap().is_empty());
        assert!(storage.get_current_user().unwrap().is_none());
    }

    #[test]
    fn corrupt_blob_is_a_decode_error() {
        let store = MemoryStore::new();
        store.set(UNITS_KEY, "not json {{{").unwrap();
        store.set(USERS_KEY, "[]").unwrap();
        let storage = Storage::new(&store).unwrap();
        let err = storage.get_units().unwrap_err();
        assert!(matches!(err, StorageError::Decode { key: UNITS_KEY, .. }));
    }

    #[test]
    fn find_user_by_id() {
        let storage = seeded();
        assert_eq!(
            storage.find_user("cleaner-2").unwrap().map(|u| u.name),
            Some("Jane Duster".to_string())
        );
        assert!(storage.find_user("cleaner-9").unwrap().is_none());
    }

    #[test]
    fn add_unit_appends() {
        let storage = seeded();
        let mut unit = storage.get_unit("unit-101").unwrap().unwrap();
        unit.id = "u-1".into();
        storage.add_unit(unit).unwrap();
        let units = storage.get_units().unwrap();
        assert_eq!(units.len(), 3);
        assert_eq!(units[2].id, "u-1");
    }

    #[test]
    fn add_unit_refuses_existing_id() {
        let storage = seeded();
        let mut unit = storage.get_unit("unit-101").unwrap().unwrap();
        unit.name = "Impostor".into();
        let err = storage.add_unit(unit).unwrap_err();
        assert!(matches!(err, StorageError::DuplicateUnit(ref id) if id == "unit-101"));
        let units = storage.get_units().unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "Sunset Apt 101");
    }

    #[test]
    fn update_unit_overwrites_and_stamps() {
        let storage = seeded();
        let mut unit = storage.get_unit("unit-101").unwrap().unwrap();
        unit.status = UnitStatus::Submitted;
        unit.last_updated = 0;

        let stored = storage.update_unit(&unit).unwrap().unwrap();
        assert_eq!(stored.status, UnitStatus::Submitted);
        assert!(stored.last_updated > 0);

        let reloaded = storage.get_unit("unit-101").unwrap().unwrap();
        assert_eq!(reloaded, stored);
    }

    #[test]
    fn update_unknown_unit_is_noop() {
        let storage = seeded();
        let before = storage.get_units().unwrap();
        let mut ghost = before[0].clone();
        ghost.id = "unit-999".into();
        assert!(storage.update_unit(&ghost).unwrap().is_none());
        assert_eq!(storage.get_units().unwrap(), before);
    }

    #[test]
    fn login_is_case_insensitive_and_persists_session() {
        let storage = seeded();
        let upper = storage.login("ADMIN@CLEAN.COM").unwrap().unwrap();
        assert_eq!(storage.get_current_user().unwrap(), Some(upper.clone()));

        storage.logout().unwrap();
        let lower = storage.login("admin@clean.com").unwrap().unwrap();
        assert_eq!(upper, lower);
        assert_eq!(storage.get_current_user().unwrap().unwrap().id, "admin-1");
    }

    #[test]
    fn failed_login_keeps_previous_session() {
        let storage = seeded();
        storage.login("john@clean.com").unwrap();
        assert!(storage.login("nobody@clean.com").unwrap().is_none());
        assert_eq!(
            storage.get_current_user().unwrap().map(|u| u.id),
            Some("cleaner-1".to_string())
        );
    }

    #[test]
    fn logout_clears_session() {
        let storage = seeded();
        storage.login("jane@clean.com").unwrap();
        storage.logout().unwrap();
        assert!(storage.get_current_user().unwrap().is_none());
    }

    #[test]
    fn session_survives_reopen_on_disk() {
        let tmp = TempDir::new().unwrap();
        {
            let storage = Storage::new(FileStore::new(tmp.path())).unwrap();
            storage.login("john@clean.com").unwrap();
        }
        let storage = Storage::new(FileStore::new(tmp.path())).unwrap();
        assert_eq!(
            storage.get_current_user().unwrap().map(|u| u.name),
            Some("John Cleaner".to_string())
        );
        assert!(tmp.path().join("cleancommand_session.json").exists());
    }
}
