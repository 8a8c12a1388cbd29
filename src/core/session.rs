//! Session lifecycle for one CLI invocation.
//!
//! A [`Session`] owns the cache handle and the in-memory configuration, and
//! hands out repositories that borrow the handle. The state machine is
//!
//! ```text
//! Uninitialized --open--> Open --close--> Closed
//!                           \--reset--> Cleared
//! ```
//!
//! `Closed` and `Cleared` are terminal: nothing reopens the cache, so every
//! repository call after them fails with `StoreClosed`.

use crate::core::db::Database;
use crate::core::error::{ApizzaError, Result};
use crate::core::settings::Settings;
use crate::plugins::config::{Config, ConfigRepository};
use crate::plugins::order::OrderRepository;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Open,
    Cleared,
    Closed,
}

pub struct Session {
    settings: Settings,
    db: Option<Database>,
    config: Config,
    config_loaded: bool,
    state: SessionState,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            db: None,
            config: Config::default(),
            config_loaded: false,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open the cache and load the saved configuration.
    pub fn open(&mut self) -> Result<()> {
        self.open_store(true)
    }

    /// Open the cache without reading any record, for a session that will
    /// only [`reset`](Self::reset). The configuration is never written back.
    pub fn open_for_reset(&mut self) -> Result<()> {
        self.open_store(false)
    }

    fn open_store(&mut self, load_config: bool) -> Result<()> {
        if self.state != SessionState::Uninitialized {
            return Err(ApizzaError::StorageOpen(format!(
                "session cannot be reopened from {:?}",
                self.state
            )));
        }
        let db = Database::open(&self.settings.db_path)?;
        if load_config {
            self.config = ConfigRepository::new(&db).load()?;
            self.config_loaded = true;
        }
        info!(path = %db.path().display(), "session opened");
        self.db = Some(db);
        self.state = SessionState::Open;
        Ok(())
    }

    pub fn db(&self) -> Result<&Database> {
        match (&self.db, self.state) {
            (Some(db), SessionState::Open) => Ok(db),
            _ => Err(ApizzaError::StoreClosed),
        }
    }

    pub fn orders(&self) -> Result<OrderRepository<'_>> {
        Ok(OrderRepository::new(self.db()?))
    }

    pub fn config_repo(&self) -> Result<ConfigRepository<'_>> {
        Ok(ConfigRepository::new(self.db()?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Delete the cache file. The session cannot be used for storage afterwards.
    pub fn reset(&mut self, out: &mut dyn Write) -> Result<PathBuf> {
        if self.state != SessionState::Open {
            return Err(ApizzaError::StoreClosed);
        }
        let db = self.db.as_mut().ok_or(ApizzaError::StoreClosed)?;
        self.state = SessionState::Cleared;
        let removed = db.destroy()?;
        writeln!(out, "removing {}", removed.display())?;
        info!(path = %removed.display(), "cache cleared");
        Ok(removed)
    }

    /// Persist the configuration and release the cache. No-op unless open.
    pub fn close(&mut self) -> Result<()> {
        if self.state != SessionState::Open {
            return Ok(());
        }
        self.state = SessionState::Closed;
        let Some(db) = self.db.as_mut() else {
            return Ok(());
        };
        let saved = if self.config_loaded {
            ConfigRepository::new(db).save(&self.config)
        } else {
            Ok(())
        };
        let closed = db.close();
        info!("session closed");
        saved.and(closed)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close session cleanly");
        }
    }
}

/// Open a session, run `f`, and close the session on every exit path. The
/// first error wins.
pub fn with_session<F, R>(settings: Settings, f: F) -> Result<R>
where
    F: FnOnce(&mut Session) -> Result<R>,
{
    let mut session = Session::new(settings);
    session.open()?;
    let result = f(&mut session);
    let closed = session.close();
    match result {
        Ok(value) => closed.map(|_| value),
        Err(e) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "failed to close session after error");
            }
            Err(e)
        }
    }
}

/// Delete the cache file named by `settings`. Works on a cache whose records
/// can no longer be decoded.
pub fn clear_cache(settings: Settings, out: &mut dyn Write) -> Result<PathBuf> {
    let mut session = Session::new(settings);
    session.open_for_reset()?;
    session.reset(out)
}
