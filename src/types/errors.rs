use std::fmt;

// === ViewError ===

/// Errors related to rendering-surface lifecycle and operations.
#[derive(Debug)]
pub enum ViewError {
    /// The engine failed to create a view or attach its event listeners.
    /// Fatal for the affected tab.
    CreateFailed(String),
    /// A URL failed to load. Callers treat this as best-effort and log it.
    LoadFailed(String),
    /// The document source could not be extracted synchronously.
    SourceUnavailable(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::CreateFailed(msg) => write!(f, "View creation failed: {}", msg),
            ViewError::LoadFailed(msg) => write!(f, "Load failed: {}", msg),
            ViewError::SourceUnavailable(msg) => write!(f, "Source unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ViewError {}

// === StoreError ===

/// Errors related to snapshot/bookmark persistence. These are logged at the
/// store boundary and deliberately never propagated to commands.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error occurred while reading or writing a state file.
    Io(String),
    /// Failed to serialize or deserialize persisted JSON.
    Serialization(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "State store I/O error: {}", msg),
            StoreError::Serialization(msg) => {
                write!(f, "State store serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// === CaptureError ===

/// Errors related to headless capture drivers. Always returned to the caller
/// as a structured result, never thrown across the command boundary.
#[derive(Debug)]
pub enum CaptureError {
    /// Failed to launch or connect to the headless engine.
    Launch(String),
    /// Navigation to the target URL failed or timed out.
    Navigation(String),
    /// The screenshot or markup extraction itself failed.
    Capture(String),
    /// Writing the output artifact failed.
    Io(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Launch(msg) => write!(f, "Capture launch failed: {}", msg),
            CaptureError::Navigation(msg) => write!(f, "Capture navigation failed: {}", msg),
            CaptureError::Capture(msg) => write!(f, "Capture failed: {}", msg),
            CaptureError::Io(msg) => write!(f, "Capture I/O error: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

// === ShortcutError ===

/// Errors related to keyboard shortcut bindings.
#[derive(Debug)]
pub enum ShortcutError {
    /// No binding exists for the given action.
    NotFound(String),
    /// The key combination is already bound to another action.
    Conflict(String),
    /// The provided key combination is empty or malformed.
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
