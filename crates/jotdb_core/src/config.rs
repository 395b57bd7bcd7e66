//! Database configuration.

use jotdb_storage::FileOptions;

/// Configuration for opening a file-backed database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the store file if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to write indented JSON.
    pub pretty: bool,

    /// Whether to fsync on every write (safer but slower).
    pub sync_on_write: bool,

    /// Whether inserts and updates are validated against collection schemas.
    pub strict_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            pretty: false,
            sync_on_write: true,
            strict_schema: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the store if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to write indented JSON.
    #[must_use]
    pub const fn pretty(mut self, value: bool) -> Self {
        self.pretty = value;
        self
    }

    /// Sets whether to fsync on every write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether collections validate documents against their schema.
    #[must_use]
    pub const fn strict_schema(mut self, value: bool) -> Self {
        self.strict_schema = value;
        self
    }

    /// Returns the storage-level write options.
    #[must_use]
    pub const fn file_options(&self) -> FileOptions {
        FileOptions {
            pretty: self.pretty,
            sync_on_write: self.sync_on_write,
        }
    }
}
