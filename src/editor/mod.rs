pub mod reconstruct;
pub mod sampler;
pub mod virtual_editor;

use anyhow::Result;

pub use reconstruct::{EditorReconstructor, ReconstructConfig};
pub use sampler::sample_viewport;
pub use virtual_editor::VirtualEditor;

/// The scrollable element wrapping a virtualized editor.
///
/// Offsets and heights are CSS pixels. All methods take `&self` because the
/// underlying widget is shared UI state owned by the host page.
pub trait ScrollContainer: Send + Sync {
    fn scroll_top(&self) -> Result<f64>;
    fn set_scroll_top(&self, offset: f64) -> Result<()>;
    /// Visible viewport height. Zero when the host cannot report it.
    fn client_height(&self) -> Result<f64>;
    /// Total scrollable height. Zero when the host cannot report it.
    fn scroll_height(&self) -> Result<f64>;
    fn offset_height(&self) -> Result<f64> {
        Ok(0.0)
    }
}

/// A code editor widget that only mounts the rows near its viewport.
pub trait EditorSurface: Send + Sync {
    /// Raw text of every currently-mounted line element, in document order.
    fn mounted_lines(&self) -> Result<Vec<String>>;

    /// `None` when the page has no scroll container for the editor.
    fn scroll_container(&self) -> Option<&dyn ScrollContainer>;
}
