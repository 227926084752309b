/// Supplies the glyphs drawn on a bordered window's outer ring.
pub trait WindowDecorator: std::fmt::Debug + Send + Sync {
    /// Frame glyph for window-local `(col, row)` of a `width` x `height`
    /// window, or `None` when the cell is not on the ring.
    fn frame_glyph(&self, col: u16, row: u16, width: u16, height: u16) -> Option<char>;
}

/// The six glyphs of a rectangular frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGlyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl FrameGlyphs {
    fn glyph(&self, col: u16, row: u16, width: u16, height: u16) -> Option<char> {
        if width == 0 || height == 0 || col >= width || row >= height {
            return None;
        }
        let last_col = width - 1;
        let last_row = height - 1;
        let glyph = if row == 0 {
            if col == 0 {
                self.top_left
            } else if col == last_col {
                self.top_right
            } else {
                self.horizontal
            }
        } else if row == last_row {
            if col == 0 {
                self.bottom_left
            } else if col == last_col {
                self.bottom_right
            } else {
                self.horizontal
            }
        } else if col == 0 || col == last_col {
            self.vertical
        } else {
            return None;
        };
        Some(glyph)
    }
}

/// Single-line box drawing characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoxDecorator;

const BOX: FrameGlyphs = FrameGlyphs {
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
    horizontal: '─',
    vertical: '│',
};

impl WindowDecorator for BoxDecorator {
    fn frame_glyph(&self, col: u16, row: u16, width: u16, height: u16) -> Option<char> {
        BOX.glyph(col, row, width, height)
    }
}

/// Plain ASCII frame for terminals or fonts without box drawing glyphs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiDecorator;

const ASCII: FrameGlyphs = FrameGlyphs {
    top_left: '+',
    top_right: '+',
    bottom_left: '+',
    bottom_right: '+',
    horizontal: '-',
    vertical: '|',
};

impl WindowDecorator for AsciiDecorator {
    fn frame_glyph(&self, col: u16, row: u16, width: u16, height: u16) -> Option<char> {
        ASCII.glyph(col, row, width, height)
    }
}
