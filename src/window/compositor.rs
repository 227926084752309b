//! Full-screen compositing of the window stack.
//!
//! [`compose`] builds a character buffer from the manager's windows, bottom to
//! top, and [`paint`] blits it to the terminal row by row. An occlusion mask
//! keeps a window from writing cells that a later window or one of its own
//! children will cover. Marks are scoped: a window's "covered by later
//! windows" marks live until its whole subtree is drawn, and the marks for its
//! children are lifted again before the children themselves draw.

use std::io;

use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;

use super::decorator::WindowDecorator;
use super::{WindowId, WindowManager};
use crate::drivers::TerminalControl;

/// Per-cell count of windows claiming a cell above the one being drawn.
#[derive(Debug, Clone)]
pub struct OcclusionMask {
    area: Rect,
    counts: Vec<u16>,
}

impl OcclusionMask {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            counts: vec![0; usize::from(area.width) * usize::from(area.height)],
        }
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        let inside = x >= self.area.x
            && y >= self.area.y
            && x - self.area.x < self.area.width
            && y - self.area.y < self.area.height;
        inside.then(|| {
            usize::from(y - self.area.y) * usize::from(self.area.width)
                + usize::from(x - self.area.x)
        })
    }

    pub fn cover(&mut self, rect: Rect) {
        self.adjust(rect, true);
    }

    pub fn uncover(&mut self, rect: Rect) {
        self.adjust(rect, false);
    }

    fn adjust(&mut self, rect: Rect, cover: bool) {
        let rect = rect.intersection(self.area);
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                if let Some(i) = self.index(x, y) {
                    let count = &mut self.counts[i];
                    *count = if cover {
                        count.saturating_add(1)
                    } else {
                        count.saturating_sub(1)
                    };
                }
            }
        }
    }

    pub fn is_covered(&self, x: u16, y: u16) -> bool {
        self.index(x, y).is_some_and(|i| self.counts[i] > 0)
    }

    pub fn is_clear(&self) -> bool {
        self.counts.iter().all(|c| *c == 0)
    }
}

/// Composites every window of `wm` into a fresh buffer covering the screen.
///
/// The buffer's area is the 1-based screen rect, so cell `(x, y)` is the
/// terminal cell at column `x`, row `y`.
pub fn compose(wm: &WindowManager) -> Buffer {
    let area = wm.screen_area();
    let mut buffer = Buffer::empty(area);
    let mut mask = OcclusionMask::new(area);
    let decorator = wm.decorator();
    let z_order = wm.z_order();

    for (pos, id) in z_order.iter().enumerate() {
        let Some(window) = wm.window(*id) else {
            continue;
        };
        let visible = window.bounds().visible(area);
        if visible.is_empty() {
            continue;
        }
        let above: Vec<Rect> = z_order[pos + 1..]
            .iter()
            .filter_map(|later| wm.window(*later))
            .map(|later| later.bounds().visible(visible))
            .filter(|r| !r.is_empty())
            .collect();
        for rect in &above {
            mask.cover(*rect);
        }
        draw_window(wm, *id, visible, decorator.as_ref(), &mut buffer, &mut mask);
        for rect in &above {
            mask.uncover(*rect);
        }
    }
    debug_assert!(mask.is_clear());
    buffer
}

fn draw_window(
    wm: &WindowManager,
    id: WindowId,
    clip: Rect,
    decorator: &dyn WindowDecorator,
    buffer: &mut Buffer,
    mask: &mut OcclusionMask,
) {
    let Some(window) = wm.window(id) else {
        return;
    };
    let bounds = window.bounds();
    let children: Vec<(WindowId, Rect)> = window
        .children()
        .iter()
        .filter_map(|child| wm.window(*child).map(|w| (*child, w.bounds().visible(clip))))
        .filter(|(_, rect)| !rect.is_empty())
        .collect();

    for (_, rect) in &children {
        mask.cover(*rect);
    }
    for y in clip.y..clip.y + clip.height {
        for x in clip.x..clip.x + clip.width {
            if mask.is_covered(x, y) {
                continue;
            }
            let col = i32::from(x) - bounds.x;
            let row = i32::from(y) - bounds.y;
            let frame = if window.border() {
                decorator.frame_glyph(col as u16, row as u16, bounds.width, bounds.height)
            } else {
                None
            };
            let ch = frame.unwrap_or_else(|| window.content_char(col, row));
            buffer[(x, y)].set_char(ch);
        }
    }
    for (_, rect) in &children {
        mask.uncover(*rect);
    }

    for (child, rect) in children {
        draw_window(wm, child, rect, decorator, buffer, mask);
    }
}

/// Text of screen row `y`, one character per cell.
pub fn row_text(buffer: &Buffer, y: u16) -> String {
    let area = buffer.area;
    (area.x..area.x + area.width)
        .map(|x| buffer[(x, y)].symbol())
        .collect()
}

/// Writes `buffer` to the terminal one row at a time, then homes the cursor.
pub fn paint<T: TerminalControl + ?Sized>(buffer: &Buffer, terminal: &mut T) -> io::Result<()> {
    let area = buffer.area;
    for y in area.y..area.y + area.height {
        terminal.move_cursor(area.x, y)?;
        terminal.write_str(&row_text(buffer, y))?;
    }
    terminal.move_cursor(1, 1)?;
    terminal.flush()
}
