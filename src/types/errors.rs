use std::fmt;

// === StoreError ===

/// Errors raised by a key-value persistence backend.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io(String),
    /// The stored record exists but is not valid JSON.
    Corrupt(String),
    /// SQLite operation failed.
    Database(String),
    /// The backend refused the write.
    WriteRejected(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "Store I/O error: {}", msg),
            StoreError::Corrupt(key) => write!(f, "Stored record is corrupt: {}", key),
            StoreError::Database(msg) => write!(f, "Store database error: {}", msg),
            StoreError::WriteRejected(key) => write!(f, "Store rejected write: {}", key),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

// === SettingsError ===

/// Errors related to loading, migrating, or saving the persisted bar settings.
#[derive(Debug)]
pub enum SettingsError {
    /// Serialization or deserialization failed.
    Serialization(String),
    /// The underlying store failed.
    Store(StoreError),
    /// The persisted document has a schema version newer than this build understands.
    UnsupportedVersion(u64),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Serialization(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::Store(e) => write!(f, "Settings store error: {}", e),
            SettingsError::UnsupportedVersion(v) => {
                write!(f, "Unsupported settings schema version: {}", v)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SettingsError {
    fn from(e: StoreError) -> Self {
        SettingsError::Store(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Serialization(e.to_string())
    }
}

// === HostError ===

/// Errors raised while binding to the host application.
#[derive(Debug)]
pub enum HostError {
    /// A capability the core cannot run without is unavailable.
    MissingCapability(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::MissingCapability(name) => {
                write!(f, "Could not find '{}' module", name)
            }
        }
    }
}

impl std::error::Error for HostError {}

// === ShortcutError ===

/// Errors related to keyboard shortcut management.
#[derive(Debug)]
pub enum ShortcutError {
    /// Shortcut for the given action was not found.
    NotFound(String),
    /// The chord conflicts with an existing binding.
    Conflict(String),
    /// The provided chord could not be parsed.
    InvalidKeys(String),
}

impl fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutError::NotFound(action) => {
                write!(f, "Shortcut not found for action: {}", action)
            }
            ShortcutError::Conflict(msg) => write!(f, "Shortcut conflict: {}", msg),
            ShortcutError::InvalidKeys(keys) => write!(f, "Invalid shortcut keys: {}", keys),
        }
    }
}

impl std::error::Error for ShortcutError {}
