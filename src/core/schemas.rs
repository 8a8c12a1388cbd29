//! Centralized storage layout for the apizza cache.
//!
//! The cache is a single SQLite file holding one flat bucket of records.
//! Record kinds share the bucket and are told apart by their key:
//! 1. `config`: the user configuration singleton.
//! 2. `user_order_<name>`: one record per saved order.

/// Default file name of the cache inside the cache directory.
pub const CACHE_DB_NAME: &str = "apizza.db";

/// Directory under `$HOME` that holds the cache.
pub const CACHE_DIR: &str = ".apizza/cache";

pub const BUCKET_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        key TEXT PRIMARY KEY,
        value BLOB NOT NULL
    )
";

/// Key of the configuration record.
pub const CONFIG_KEY: &str = "config";

/// Namespace prefix for saved orders.
pub const ORDER_PREFIX: &str = "user_order_";
