use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use ratatui::prelude::Rect;
use thiserror::Error;

use super::compositor;
use super::decorator::{BoxDecorator, WindowDecorator};
use super::{Bounds, Window, WindowId};
use crate::drivers::TerminalControl;
use crate::input::{InputEvent, MouseKind};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WmError {
    #[error("unknown window {0}")]
    UnknownWindow(WindowId),
    #[error("the background window cannot be removed, moved, raised or focused")]
    BackgroundWindow,
    #[error("window {0} is not in the z-order")]
    NotTopLevel(WindowId),
}

/// An input event paired with the window it was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMessage {
    pub event: InputEvent,
    /// Hit-tested window for pointer events, focused window otherwise.
    pub window: Option<WindowId>,
}

/// Owns every window, their stacking order and keyboard focus.
///
/// `z_order` runs bottom to top. Index 0 is always the full-screen background
/// window; the last entry is painted last and hit-tested first. Child windows
/// live in the arena but not in `z_order`; they are stacked with their parent.
pub struct WindowManager {
    screen_size: (u16, u16),
    windows: BTreeMap<WindowId, Window>,
    z_order: Vec<WindowId>,
    focused: Option<WindowId>,
    force_redraw: bool,
    background: WindowId,
    next_id: u32,
    decorator: Arc<dyn WindowDecorator>,
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("screen_size", &self.screen_size)
            .field("z_order", &self.z_order)
            .field("focused", &self.focused)
            .field("force_redraw", &self.force_redraw)
            .finish_non_exhaustive()
    }
}

impl WindowManager {
    pub fn new(width: u16, height: u16) -> Self {
        let background = WindowId::new(0);
        let root = Window::new(Bounds::new(1, 1, width, height), false, Vec::new())
            .with_clickable(false);
        let mut windows = BTreeMap::new();
        windows.insert(background, root);
        Self {
            screen_size: (width, height),
            windows,
            z_order: vec![background],
            focused: None,
            force_redraw: true,
            background,
            next_id: 1,
            decorator: Arc::new(BoxDecorator),
        }
    }

    pub fn screen_size(&self) -> (u16, u16) {
        self.screen_size
    }

    /// The drawable screen as a 1-based rect.
    pub fn screen_area(&self) -> Rect {
        Rect {
            x: 1,
            y: 1,
            width: self.screen_size.0,
            height: self.screen_size.1,
        }
    }

    /// Records a new terminal size, keeping the background full-screen.
    /// Returns whether the size actually changed.
    pub fn set_screen_size(&mut self, width: u16, height: u16) -> bool {
        if self.screen_size == (width, height) {
            return false;
        }
        tracing::debug!(width, height, "screen resized");
        self.screen_size = (width, height);
        let background = self.background;
        if let Some(root) = self.windows.get_mut(&background) {
            root.set_bounds(Bounds::new(1, 1, width, height));
        }
        true
    }

    pub fn background(&self) -> WindowId {
        self.background
    }

    pub fn decorator(&self) -> Arc<dyn WindowDecorator> {
        Arc::clone(&self.decorator)
    }

    pub fn set_decorator(&mut self, decorator: Arc<dyn WindowDecorator>) {
        self.decorator = decorator;
        self.force_redraw = true;
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    /// Bottom-to-top stacking order of top-level windows.
    pub fn z_order(&self) -> &[WindowId] {
        &self.z_order
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    fn allocate_id(&mut self) -> WindowId {
        let id = WindowId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds a top-level window above everything else. Clickable windows
    /// take focus.
    pub fn add_window(&mut self, window: Window) -> WindowId {
        let id = self.allocate_id();
        let clickable = window.clickable();
        tracing::debug!(window_id = %id, bounds = ?window.bounds(), "opened window");
        self.windows.insert(id, window);
        self.z_order.push(id);
        if clickable {
            self.focused = Some(id);
        }
        self.force_redraw = true;
        id
    }

    /// Nests `window` under `parent`. Children paint above their parent,
    /// clipped to it, and are never members of the z-order themselves.
    pub fn add_child(&mut self, parent: WindowId, mut window: Window) -> Result<WindowId, WmError> {
        if !self.windows.contains_key(&parent) {
            return Err(WmError::UnknownWindow(parent));
        }
        let id = self.allocate_id();
        window.set_parent(Some(parent));
        self.windows.insert(id, window);
        if let Some(p) = self.windows.get_mut(&parent) {
            p.push_child(id);
        }
        tracing::debug!(window_id = %id, parent = %parent, "opened child window");
        self.force_redraw = true;
        Ok(id)
    }

    /// Removes a window together with all of its descendants.
    pub fn remove_window(&mut self, id: WindowId) -> Result<Window, WmError> {
        if id == self.background {
            return Err(WmError::BackgroundWindow);
        }
        let window = self.windows.remove(&id).ok_or(WmError::UnknownWindow(id))?;
        tracing::debug!(window_id = %id, "closing window");
        if let Some(parent) = window.parent()
            && let Some(p) = self.windows.get_mut(&parent)
        {
            p.remove_child(id);
        }
        let mut removed = vec![id];
        let mut stack: Vec<WindowId> = window.children().to_vec();
        while let Some(child) = stack.pop() {
            if let Some(w) = self.windows.remove(&child) {
                stack.extend_from_slice(w.children());
                removed.push(child);
            }
        }
        self.z_order.retain(|w| !removed.contains(w));
        if self.focused.is_some_and(|f| removed.contains(&f)) {
            self.focused = self.topmost_clickable();
        }
        self.force_redraw = true;
        Ok(window)
    }

    fn topmost_clickable(&self) -> Option<WindowId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.windows.get(id).is_some_and(Window::clickable))
    }

    /// Replaces a window's content wholesale.
    pub fn set_content(&mut self, id: WindowId, content: Vec<String>) -> Result<(), WmError> {
        let window = self.windows.get_mut(&id).ok_or(WmError::UnknownWindow(id))?;
        window.set_content(content);
        self.force_redraw = true;
        Ok(())
    }

    /// Moves or resizes a window. Children keep their own bounds and stay
    /// clipped to the parent's new area.
    pub fn set_bounds(&mut self, id: WindowId, bounds: Bounds) -> Result<(), WmError> {
        if id == self.background {
            return Err(WmError::BackgroundWindow);
        }
        let window = self.windows.get_mut(&id).ok_or(WmError::UnknownWindow(id))?;
        window.set_bounds(bounds);
        self.force_redraw = true;
        Ok(())
    }

    pub fn set_focus(&mut self, id: WindowId) -> Result<(), WmError> {
        if id == self.background {
            return Err(WmError::BackgroundWindow);
        }
        if !self.windows.contains_key(&id) {
            return Err(WmError::UnknownWindow(id));
        }
        if !self.z_order.contains(&id) {
            return Err(WmError::NotTopLevel(id));
        }
        self.focused = Some(id);
        Ok(())
    }

    /// Moves a top-level window to the top of the stack. The background
    /// always stays at the bottom.
    pub fn bring_to_front(&mut self, id: WindowId) -> Result<(), WmError> {
        if id == self.background {
            return Err(WmError::BackgroundWindow);
        }
        let pos = self
            .z_order
            .iter()
            .position(|w| *w == id)
            .ok_or(WmError::NotTopLevel(id))?;
        let item = self.z_order.remove(pos);
        self.z_order.push(item);
        self.force_redraw = true;
        Ok(())
    }

    /// Topmost z-order window whose bounds contain the 1-based `(x, y)`.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<WindowId> {
        self.z_order.iter().rev().copied().find(|id| {
            self.windows
                .get(id)
                .is_some_and(|w| w.bounds().contains(i32::from(x), i32::from(y)))
        })
    }

    /// Attaches a target window to a decoded event.
    ///
    /// Pointer events go to the window under the pointer; a left press on a
    /// clickable window also raises and focuses it. Pointer events without a
    /// position (a zero coordinate) and everything else go to the focused
    /// window.
    pub fn route(&mut self, event: InputEvent) -> WindowMessage {
        let window = match event {
            InputEvent::Mouse(mouse) if mouse.x > 0 && mouse.y > 0 => {
                let target = self.hit_test(mouse.x, mouse.y);
                if mouse.kind == MouseKind::LeftDown
                    && let Some(id) = target
                    && self.windows.get(&id).is_some_and(Window::clickable)
                {
                    tracing::debug!(window_id = %id, x = mouse.x, y = mouse.y, "raising window");
                    if self.z_order.last() != Some(&id)
                        && let Err(err) = self.bring_to_front(id)
                    {
                        tracing::debug!(window_id = %id, error = %err, "window not raised");
                    }
                    self.focused = Some(id);
                    self.force_redraw = true;
                }
                target
            }
            _ => self.focused,
        };
        WindowMessage { event, window }
    }

    pub fn request_redraw(&mut self) {
        self.force_redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.force_redraw
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.force_redraw)
    }

    /// Composites every window and repaints the whole terminal.
    pub fn render<T: TerminalControl + ?Sized>(&self, terminal: &mut T) -> io::Result<()> {
        let buffer = compositor::compose(self);
        compositor::paint(&buffer, terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, MouseEvent};

    fn boxed(x: i32, y: i32, w: u16, h: u16) -> Window {
        Window::new(Bounds::new(x, y, w, h), true, Vec::new())
    }

    fn click(x: u16, y: u16) -> InputEvent {
        InputEvent::Mouse(MouseEvent {
            kind: MouseKind::LeftDown,
            x,
            y,
        })
    }

    #[test]
    fn background_is_first_and_not_focusable_by_click() {
        let mut wm = WindowManager::new(80, 24);
        assert_eq!(wm.z_order(), &[wm.background()]);
        let msg = wm.route(click(5, 5));
        assert_eq!(msg.window, Some(wm.background()));
        assert_eq!(wm.focused(), None);
        assert_eq!(wm.z_order(), &[wm.background()]);
    }

    #[test]
    fn added_window_is_topmost_and_focused() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 20, 10));
        let b = wm.add_window(boxed(15, 15, 20, 10));
        assert_eq!(wm.z_order(), &[wm.background(), a, b]);
        assert_eq!(wm.focused(), Some(b));
    }

    #[test]
    fn click_raises_and_focuses_hit_window() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 20, 10));
        let b = wm.add_window(boxed(15, 15, 20, 10));
        wm.take_redraw();

        // (12, 12) is only inside A.
        let msg = wm.route(click(12, 12));
        assert_eq!(msg.window, Some(a));
        assert_eq!(wm.z_order(), &[wm.background(), b, a]);
        assert_eq!(wm.focused(), Some(a));
        assert!(wm.take_redraw());

        // Overlap now resolves to A, the new topmost.
        assert_eq!(wm.hit_test(16, 16), Some(a));
    }

    #[test]
    fn non_left_buttons_do_not_restack() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 20, 10));
        let b = wm.add_window(boxed(15, 15, 20, 10));
        let msg = wm.route(InputEvent::Mouse(MouseEvent {
            kind: MouseKind::RightDown,
            x: 12,
            y: 12,
        }));
        assert_eq!(msg.window, Some(a));
        assert_eq!(wm.z_order(), &[wm.background(), a, b]);
        assert_eq!(wm.focused(), Some(b));
    }

    #[test]
    fn non_clickable_window_is_hit_but_not_raised() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 20, 10).with_clickable(false));
        let b = wm.add_window(boxed(40, 10, 20, 10));
        let msg = wm.route(click(12, 12));
        assert_eq!(msg.window, Some(a));
        assert_eq!(wm.z_order(), &[wm.background(), a, b]);
        assert_eq!(wm.focused(), Some(b));
    }

    #[test]
    fn keyboard_goes_to_focus_not_pointer() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 20, 10));
        let _b = wm.add_window(boxed(40, 10, 20, 10));
        wm.set_focus(a).unwrap();
        let msg = wm.route(InputEvent::KeyPress(Key::Char('x')));
        assert_eq!(msg.window, Some(a));
    }

    #[test]
    fn mouse_without_position_goes_to_focus() {
        let mut wm = WindowManager::new(80, 24);
        assert_eq!(wm.route(click(0, 0)).window, None);
        let a = wm.add_window(boxed(1, 1, 20, 10));
        let b = wm.add_window(boxed(40, 1, 20, 10));
        wm.set_focus(a).unwrap();
        assert_eq!(wm.route(click(0, 5)).window, Some(a));
        assert_eq!(wm.route(click(5, 0)).window, Some(a));
        assert_eq!(wm.z_order(), &[wm.background(), a, b]);
    }

    #[test]
    fn remove_window_takes_children_and_refocuses() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 20, 10));
        let b = wm.add_window(boxed(15, 15, 20, 10));
        let child = wm.add_child(b, boxed(16, 16, 5, 3)).unwrap();
        let grandchild = wm.add_child(child, boxed(17, 17, 2, 1)).unwrap();

        wm.remove_window(b).unwrap();
        assert!(!wm.contains(b));
        assert!(!wm.contains(child));
        assert!(!wm.contains(grandchild));
        assert_eq!(wm.z_order(), &[wm.background(), a]);
        assert_eq!(wm.focused(), Some(a));
    }

    #[test]
    fn removing_a_child_detaches_it_from_parent() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 20, 10));
        let child = wm.add_child(a, boxed(11, 11, 5, 3)).unwrap();
        assert_eq!(wm.window(a).unwrap().children(), &[child]);
        assert_eq!(wm.window(child).unwrap().parent(), Some(a));
        wm.remove_window(child).unwrap();
        assert!(wm.window(a).unwrap().children().is_empty());
        assert_eq!(wm.focused(), Some(a));
    }

    #[test]
    fn focus_clears_when_nothing_clickable_remains() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 20, 10));
        wm.remove_window(a).unwrap();
        assert_eq!(wm.focused(), None);
    }

    #[test]
    fn invalid_operations_are_errors() {
        let mut wm = WindowManager::new(80, 24);
        let bg = wm.background();
        assert_eq!(wm.remove_window(bg), Err(WmError::BackgroundWindow));
        let ghost = WindowId::new(99);
        assert_eq!(wm.remove_window(ghost), Err(WmError::UnknownWindow(ghost)));
        assert_eq!(
            wm.add_child(ghost, boxed(1, 1, 1, 1)),
            Err(WmError::UnknownWindow(ghost))
        );
        let a = wm.add_window(boxed(10, 10, 20, 10));
        let child = wm.add_child(a, boxed(11, 11, 5, 3)).unwrap();
        assert_eq!(wm.set_focus(child), Err(WmError::NotTopLevel(child)));
        assert_eq!(wm.bring_to_front(child), Err(WmError::NotTopLevel(child)));
    }

    #[test]
    fn background_stays_at_the_bottom() {
        let mut wm = WindowManager::new(10, 3);
        let a = wm.add_window(Window::new(Bounds::new(1, 1, 10, 3), false, vec!["w".repeat(10)]));
        let bg = wm.background();
        assert_eq!(wm.bring_to_front(bg), Err(WmError::BackgroundWindow));
        assert_eq!(wm.set_focus(bg), Err(WmError::BackgroundWindow));
        assert_eq!(wm.z_order(), &[bg, a]);
        assert_eq!(wm.focused(), Some(a));
        assert_eq!(compositor::row_text(&compositor::compose(&wm), 1), "w".repeat(10));
    }

    #[test]
    fn resize_keeps_background_full_screen() {
        let mut wm = WindowManager::new(80, 24);
        assert!(!wm.set_screen_size(80, 24));
        assert!(wm.set_screen_size(100, 30));
        assert_eq!(wm.screen_area(), Rect::new(1, 1, 100, 30));
        let bg = wm.window(wm.background()).unwrap();
        assert_eq!(bg.bounds(), Bounds::new(1, 1, 100, 30));
    }

    #[test]
    fn moved_window_is_hit_at_new_position() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(boxed(10, 10, 5, 5));
        wm.take_redraw();
        wm.set_bounds(a, Bounds::new(30, 2, 5, 5)).unwrap();
        assert!(wm.take_redraw());
        assert_eq!(wm.hit_test(11, 11), Some(wm.background()));
        assert_eq!(wm.hit_test(31, 3), Some(a));
        assert_eq!(
            wm.set_bounds(wm.background(), Bounds::new(2, 2, 1, 1)),
            Err(WmError::BackgroundWindow)
        );
    }

    #[test]
    fn take_redraw_clears_flag() {
        let mut wm = WindowManager::new(10, 5);
        assert!(wm.take_redraw());
        assert!(!wm.needs_redraw());
        wm.set_content(wm.background(), vec!["x".into()]).unwrap();
        assert!(wm.take_redraw());
        assert!(!wm.take_redraw());
    }
}
