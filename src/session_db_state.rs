use std::fs;
use std::path::PathBuf;

use lmdb::{Database, DatabaseFlags, Environment, Error as LmdbError, Transaction, WriteFlags};
use log::{info, warn};

use crate::app_response::AppResponse;
use crate::session_storage::SessionStorage;

const SESSION_DB: &str = "session";

/// LMDB environment holding one browsing session.
///
/// The environment lives in `<name>.lmdb`. After [`close_database`] every
/// operation reports a `DatabaseError` instead of touching the closed
/// environment.
///
/// [`close_database`]: SessionDbState::close_database
pub struct SessionDbState {
    env: Option<Environment>,
    db: Database,
    path: PathBuf,
}

impl SessionDbState {
    pub fn init(name: String) -> Result<Self, AppResponse> {
        Self::init_with_map_size(name, 10 * 1024 * 1024)
    }

    pub fn init_with_map_size(name: String, map_size: usize) -> Result<Self, AppResponse> {
        if name.trim().is_empty() {
            return Err(AppResponse::ValidationError("Database name cannot be empty".to_string()));
        }

        let path = PathBuf::from(format!("{name}.lmdb"));
        fs::create_dir_all(&path)?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(&path)?;
        let db = env.create_db(Some(SESSION_DB), DatabaseFlags::empty())?;

        info!("Session store opened at {}", path.display());
        Ok(Self {
            env: Some(env),
            db,
            path,
        })
    }

    pub fn is_open(&self) -> bool {
        self.env.is_some()
    }

    /// Releases the environment. Calling it twice is harmless.
    pub fn close_database(&mut self) -> Result<(), AppResponse> {
        match self.env.take() {
            Some(env) => {
                if let Err(e) = env.sync(true) {
                    warn!("Failed to sync session store before close: {e}");
                }
                info!("Session store at {} closed", self.path.display());
            }
            None => info!("Session store at {} was already closed", self.path.display()),
        }
        Ok(())
    }

    /// Closes the environment and removes its directory from disk.
    pub fn destroy(mut self) -> Result<(), AppResponse> {
        self.close_database()?;
        if self.path.exists() {
            fs::remove_dir_all(&self.path)?;
        }
        Ok(())
    }

    fn env(&self) -> Result<&Environment, AppResponse> {
        self.env
            .as_ref()
            .ok_or_else(|| AppResponse::DatabaseError("Session store is closed".to_string()))
    }
}

impl SessionStorage for SessionDbState {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let env = self.env()?;
        let txn = env.begin_ro_txn()?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(LmdbError::NotFound) => None,
            Err(e) => return Err(AppResponse::from(e)),
        };
        txn.abort();

        match value {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                AppResponse::SerializationError(format!("Invalid UTF-8 stored under '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        if key.is_empty() {
            return Err(AppResponse::ValidationError("Key cannot be empty".to_string()));
        }
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, AppResponse> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        let existed = match txn.del(self.db, &key, None) {
            Ok(()) => true,
            Err(LmdbError::NotFound) => false,
            Err(e) => return Err(AppResponse::from(e)),
        };
        txn.commit()?;
        Ok(existed)
    }

    fn clear(&self) -> Result<(), AppResponse> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        txn.clear_db(self.db)?;
        txn.commit()?;
        info!("Session store at {} cleared", self.path.display());
        Ok(())
    }
}
