//! Rendering-surface abstraction.
//!
//! The tab registry talks to views through the `View` and `ViewFactory`
//! traits so the core can run against the embedded engine (`gui` feature),
//! the in-memory headless views, or test doubles. Factories are constructed
//! with an event sender; every view created by a factory reports engine
//! events on that sender with its tab id attached as data.

pub mod headless;

use crate::types::errors::ViewError;

/// Vertical space reserved at the top of the window for the UI chrome,
/// in logical pixels.
pub const TOP_CHROME_INSET: u32 = 80;

/// Minimum height a visible view is ever resized to.
pub const MIN_VIEW_HEIGHT: u32 = 200;

/// Position and size of a view within the host window, logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// The host window's content size, logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Computes the bounds of the page area for a given window content size:
/// full width, below the top chrome, height clamped to the minimum floor.
pub fn content_bounds(viewport: Viewport) -> ViewBounds {
    ViewBounds {
        x: 0,
        y: TOP_CHROME_INSET as i32,
        width: viewport.width,
        height: viewport
            .height
            .saturating_sub(TOP_CHROME_INSET)
            .max(MIN_VIEW_HEIGHT),
    }
}

/// One rendering surface, owned by exactly one tab for its lifetime.
///
/// Mutating operations are best-effort: a view whose engine side has died
/// must absorb calls silently rather than panic, since an in-flight command
/// can outlive the tab that issued it.
pub trait View {
    /// Begins loading `url`. Errors are reported so callers can log them,
    /// but navigation failure never fails the surrounding operation.
    fn load_url(&mut self, url: &str) -> Result<(), ViewError>;
    fn reload(&mut self);
    /// No-op when the view has no earlier history entry.
    fn go_back(&mut self);
    /// No-op when the view has no later history entry.
    fn go_forward(&mut self);
    fn open_devtools(&mut self);
    fn close_devtools(&mut self);
    /// Returns the serialized live document, or `SourceUnavailable` when the
    /// engine can only deliver it asynchronously (it then arrives as a
    /// `SourceCaptured` view event).
    fn view_source(&mut self) -> Result<String, ViewError>;
    fn set_bounds(&mut self, bounds: ViewBounds);
    fn set_visible(&mut self, visible: bool);
}

/// Creates rendering surfaces and wires their event streams.
pub trait ViewFactory {
    /// Creates the surface for `tab_id` with its listeners attached.
    /// Failure here is fatal for the tab being opened.
    fn create_view(&mut self, tab_id: &str) -> Result<Box<dyn View>, ViewError>;
}
