//! Application state container for WebGlass.

use crossbeam_channel::Sender;
use tracing::warn;

use crate::managers::shortcut_manager::ShortcutManager;
use crate::managers::state_store::StateStore;
use crate::managers::tab_registry::{TabRegistry, TabRegistryTrait};
use crate::types::events::UiEvent;
use crate::view::ViewFactory;

/// Holds the managers shared between the command router, the event loop,
/// and the RPC server. Lives behind a `Mutex` once wiring starts.
pub struct App {
    pub tab_registry: TabRegistry,
    pub shortcut_manager: ShortcutManager,
}

impl App {
    pub fn new(
        store: StateStore,
        factory: Box<dyn ViewFactory>,
        ui_events: Sender<UiEvent>,
    ) -> Self {
        App {
            tab_registry: TabRegistry::new(store, factory, ui_events),
            shortcut_manager: ShortcutManager::new(),
        }
    }

    /// Materializes the persisted session. Called once before the first
    /// command is accepted.
    pub fn startup(&mut self) {
        self.tab_registry.restore_session();
    }

    /// Final write-through of the session before exit.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.tab_registry.flush() {
            warn!(error = %e, "failed to write session on shutdown");
        }
    }
}
