pub mod compositor;
pub mod decorator;

mod window_manager;

use std::fmt;

use ratatui::prelude::Rect;

pub use window_manager::{WindowManager, WindowMessage, WmError};

/// Handle to a window owned by a [`WindowManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u32);

impl WindowId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Screen-relative window rectangle, 1-based.
///
/// The origin is signed so a window may hang off the top or left edge; only
/// the part inside the screen is ever drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge, saturating at `i32::MAX`.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(i32::from(self.width))
    }

    /// Exclusive bottom edge, saturating at `i32::MAX`.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(i32::from(self.height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        !self.is_empty() && x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Portion of these bounds inside `clip`, or an empty rect when disjoint.
    pub fn visible(&self, clip: Rect) -> Rect {
        let x0 = self.x.max(i32::from(clip.x));
        let y0 = self.y.max(i32::from(clip.y));
        let x1 = self.right().min(i32::from(clip.x) + i32::from(clip.width));
        let y1 = self.bottom().min(i32::from(clip.y) + i32::from(clip.height));
        if x1 <= x0 || y1 <= y0 {
            return Rect::default();
        }
        Rect {
            x: x0 as u16,
            y: y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        }
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::new(
            i32::from(rect.x),
            i32::from(rect.y),
            rect.width,
            rect.height,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    bounds: Bounds,
    content: Vec<String>,
    border: bool,
    clickable: bool,
    children: Vec<WindowId>,
    parent: Option<WindowId>,
}

impl Window {
    /// A clickable window. With `border` set the outer ring of cells holds the
    /// frame and content starts one cell in.
    pub fn new(bounds: Bounds, border: bool, content: Vec<String>) -> Self {
        Self {
            bounds,
            content,
            border,
            clickable: true,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Non-clickable windows are never raised or focused by the pointer.
    pub fn with_clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }

    pub fn border(&self) -> bool {
        self.border
    }

    pub fn clickable(&self) -> bool {
        self.clickable
    }

    pub fn children(&self) -> &[WindowId] {
        &self.children
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    pub(crate) fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub(crate) fn set_content(&mut self, content: Vec<String>) {
        self.content = content;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<WindowId>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: WindowId) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: WindowId) {
        self.children.retain(|id| *id != child);
    }

    /// Character of the content grid at window-local `(col, row)`, ignoring
    /// the frame. Cells without content are blank.
    pub fn content_char(&self, col: i32, row: i32) -> char {
        let inset = i32::from(self.border);
        let (col, row) = (col - inset, row - inset);
        if col < 0 || row < 0 {
            return ' ';
        }
        self.content
            .get(row as usize)
            .and_then(|line| line.chars().nth(col as usize))
            .unwrap_or(' ')
    }
}
