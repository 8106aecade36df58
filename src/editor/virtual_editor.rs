use std::sync::RwLock;

use anyhow::{anyhow, Result};

use super::{EditorSurface, ScrollContainer};

pub const DEFAULT_LINE_HEIGHT: f64 = 19.0;
pub const DEFAULT_VIEWPORT_ROWS: usize = 30;
pub const DEFAULT_OVERSCAN_ROWS: usize = 2;

/// In-memory editor widget that mounts only the rows intersecting its
/// viewport, the way browser code editors virtualize long buffers.
///
/// Spaces render as NBSP, as they do in the DOM of such editors.
#[derive(Debug)]
pub struct VirtualEditor {
    lines: Vec<String>,
    line_height: f64,
    viewport_rows: usize,
    overscan_rows: usize,
    scroll_top: RwLock<f64>,
}

impl VirtualEditor {
    pub fn with_viewport(text: &str, viewport_rows: usize) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            line_height: DEFAULT_LINE_HEIGHT,
            viewport_rows: viewport_rows.max(1),
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            scroll_top: RwLock::new(0.0),
        }
    }

    pub fn overscan(mut self, rows: usize) -> Self {
        self.overscan_rows = rows;
        self
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_rows as f64 * self.line_height
    }

    fn content_height(&self) -> f64 {
        (self.lines.len() as f64 * self.line_height).max(self.viewport_height())
    }

    fn max_scroll_top(&self) -> f64 {
        self.content_height() - self.viewport_height()
    }

    fn current_top(&self) -> Result<f64> {
        self.scroll_top
            .read()
            .map(|guard| *guard)
            .map_err(|_| anyhow!("scroll state poisoned"))
    }

    /// Row range currently mounted, overscan included.
    fn mounted_range(&self) -> Result<std::ops::Range<usize>> {
        let top = self.current_top()?;
        let first_visible = (top / self.line_height).floor() as usize;
        let last_visible = ((top + self.viewport_height()) / self.line_height).ceil() as usize;

        let start = first_visible.saturating_sub(self.overscan_rows);
        let end = (last_visible + self.overscan_rows).min(self.lines.len());
        Ok(start.min(end)..end)
    }
}

impl EditorSurface for VirtualEditor {
    fn mounted_lines(&self) -> Result<Vec<String>> {
        let range = self.mounted_range()?;
        Ok(self.lines[range]
            .iter()
            .map(|line| line.replace(' ', "\u{a0}"))
            .collect())
    }

    fn scroll_container(&self) -> Option<&dyn ScrollContainer> {
        Some(self)
    }
}

impl ScrollContainer for VirtualEditor {
    fn scroll_top(&self) -> Result<f64> {
        self.current_top()
    }

    fn set_scroll_top(&self, offset: f64) -> Result<()> {
        let clamped = offset.clamp(0.0, self.max_scroll_top());
        let mut guard = self
            .scroll_top
            .write()
            .map_err(|_| anyhow!("scroll state poisoned"))?;
        *guard = clamped;
        Ok(())
    }

    fn client_height(&self) -> Result<f64> {
        Ok(self.viewport_height())
    }

    fn scroll_height(&self) -> Result<f64> {
        Ok(self.content_height())
    }
}
