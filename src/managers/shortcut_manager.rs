//! Shortcut manager for WebGlass.
//!
//! Keeps the action-to-key-combo bindings the shell registers globally,
//! with conflict detection and platform-specific modifier adaptation.
//! The reverse lookup (`action_for_keys`) is what the event loop calls
//! when a key chord arrives.

use std::collections::HashMap;

use crate::types::errors::ShortcutError;

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn bind(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError>;
    fn unbind(&mut self, action: &str) -> Result<(), ShortcutError>;
    fn binding_for(&self, action: &str) -> Option<&str>;
    fn action_for_keys(&self, keys: &str) -> Option<&str>;
    fn bindings(&self) -> &HashMap<String, String>;
    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String>;
}

/// In-memory shortcut bindings, seeded with the shell defaults.
pub struct ShortcutManager {
    bindings: HashMap<String, String>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        let mut mgr = Self {
            bindings: HashMap::new(),
        };
        mgr.bindings = default_bindings();
        mgr
    }

    /// Adapts modifier keys for the current platform.
    fn adapt_for_platform(keys: &str) -> String {
        if cfg!(target_os = "macos") {
            keys.replace("Ctrl+", "Cmd+")
        } else {
            keys.to_string()
        }
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn bind(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError> {
        if keys.is_empty() {
            return Err(ShortcutError::InvalidKeys(
                "keys cannot be empty".to_string(),
            ));
        }
        if let Some(conflicting) = self.has_conflict(keys, Some(action)) {
            return Err(ShortcutError::Conflict(format!(
                "'{}' is already bound to '{}'",
                keys, conflicting
            )));
        }
        let adapted = Self::adapt_for_platform(keys);
        self.bindings.insert(action.to_string(), adapted);
        Ok(())
    }

    fn unbind(&mut self, action: &str) -> Result<(), ShortcutError> {
        self.bindings
            .remove(action)
            .map(|_| ())
            .ok_or_else(|| ShortcutError::NotFound(action.to_string()))
    }

    fn binding_for(&self, action: &str) -> Option<&str> {
        self.bindings.get(action).map(|s| s.as_str())
    }

    /// Looks up which action a key chord triggers, if any.
    fn action_for_keys(&self, keys: &str) -> Option<&str> {
        let adapted = Self::adapt_for_platform(keys);
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == adapted)
            .map(|(action, _)| action.as_str())
    }

    fn bindings(&self) -> &HashMap<String, String> {
        &self.bindings
    }

    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String> {
        let adapted = Self::adapt_for_platform(keys);
        for (action, bound_keys) in &self.bindings {
            if bound_keys == &adapted {
                if let Some(exclude) = exclude_action {
                    if action == exclude {
                        continue;
                    }
                }
                return Some(action.clone());
            }
        }
        None
    }
}

/// The shortcuts the shell registers at startup.
pub fn default_bindings() -> HashMap<String, String> {
    let defaults = vec![
        ("focus-address", "Ctrl+L"),
        ("view-source", "Ctrl+U"),
        ("toggle-devtools", "Ctrl+Shift+I"),
        ("new-tab", "Ctrl+T"),
        ("close-tab", "Ctrl+W"),
    ];
    defaults
        .into_iter()
        .map(|(a, k)| (a.to_string(), ShortcutManager::adapt_for_platform(k)))
        .collect()
}
