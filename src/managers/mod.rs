//! Manager modules for WebGlass.

pub mod shortcut_manager;
pub mod state_store;
pub mod tab_registry;

pub use shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
pub use state_store::{StateStore, StateStoreTrait};
pub use tab_registry::{OpenTabOptions, TabRegistry, TabRegistryTrait};
