//! Storage-layer errors for SQLite operations.

/// Errors from the persistence layer. Fatal for the current run: the run
/// transaction aborts without partial commit and previously committed
/// state remains authoritative.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },
}
