//! # Script Buffer
//!
//! The text being edited plus the caret. The caret is a byte offset that
//! always sits on a char boundary (`0..=text.len()`).
//!
//! Editing primitives live here rather than in the editor component so the
//! core can move the caret (diagnostic jumps) without knowing about the TUI.

use unicode_width::UnicodeWidthChar;

/// Tab stops are every `TAB_WIDTH` display columns.
pub const TAB_WIDTH: usize = 4;

/// Display column after drawing `c` at column `col`.
fn advance(col: usize, c: char) -> usize {
    if c == '\t' {
        (col / TAB_WIDTH + 1) * TAB_WIDTH
    } else {
        col + c.width().unwrap_or(0)
    }
}

/// `line` as it appears on screen: tabs expanded to the next tab stop.
pub fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for c in line.chars() {
        let next = advance(col, c);
        if c == '\t' {
            out.extend(std::iter::repeat_n(' ', next - col));
        } else {
            out.push(c);
        }
        col = next;
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptBuffer {
    text: String,
    caret: usize,
}

impl ScriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer seeded with `text`, caret at the start.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            caret: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caret as a byte offset into `text()`.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Caret as a zero-based character index into the flattened buffer.
    pub fn caret_chars(&self) -> usize {
        self.text[..self.caret].chars().count()
    }

    /// Place the caret at a character index, clamped to the buffer end.
    pub fn set_caret_chars(&mut self, offset: usize) {
        self.caret = self
            .text
            .char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
    }

    /// Number of logical lines. An empty buffer has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Zero-based (line, char column) of the caret.
    pub fn caret_line_col(&self) -> (usize, usize) {
        let before = &self.text[..self.caret];
        let line = before.matches('\n').count();
        let start = line_start(&self.text, self.caret);
        (line, self.text[start..self.caret].chars().count())
    }

    /// Display width of the caret's line up to the caret.
    pub fn caret_display_col(&self) -> usize {
        let start = line_start(&self.text, self.caret);
        self.text[start..self.caret].chars().fold(0, advance)
    }

    /// Place the caret on `line` (zero-based) at the character nearest to
    /// display column `display_col`. Out-of-range values clamp.
    pub fn set_caret_line_display_col(&mut self, line: usize, display_col: usize) {
        let line = line.min(self.line_count().saturating_sub(1));
        let start = nth_line_start(&self.text, line);
        let end = line_end(&self.text, start);

        let mut width = 0;
        let mut pos = end;
        for (i, c) in self.text[start..end].char_indices() {
            let next = advance(width, c);
            if next > display_col {
                pos = start + i;
                break;
            }
            width = next;
        }
        self.caret = pos;
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.caret, c);
        self.caret += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.caret, s);
        self.caret += s.len();
    }

    /// Delete the char before the caret. Returns `false` at buffer start.
    pub fn backspace(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let prev = prev_char_boundary(&self.text, self.caret);
        self.text.drain(prev..self.caret);
        self.caret = prev;
        true
    }

    /// Delete the char under the caret. Returns `false` at buffer end.
    pub fn delete(&mut self) -> bool {
        if self.caret >= self.text.len() {
            return false;
        }
        let next = next_char_boundary(&self.text, self.caret);
        self.text.drain(self.caret..next);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        self.caret = prev_char_boundary(&self.text, self.caret);
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.caret >= self.text.len() {
            return false;
        }
        self.caret = next_char_boundary(&self.text, self.caret);
        true
    }

    pub fn move_home(&mut self) -> bool {
        let start = line_start(&self.text, self.caret);
        if self.caret == start {
            return false;
        }
        self.caret = start;
        true
    }

    pub fn move_end(&mut self) -> bool {
        let end = line_end(&self.text, self.caret);
        if self.caret == end {
            return false;
        }
        self.caret = end;
        true
    }

    /// Move one line up or down, keeping the char column where the target
    /// line is long enough. Returns `false` at the first/last line.
    pub fn move_vertically(&mut self, direction: i8) -> bool {
        let (line, col) = self.caret_line_col();
        let target = if direction < 0 {
            if line == 0 {
                return false;
            }
            line - 1
        } else {
            if line + 1 >= self.line_count() {
                return false;
            }
            line + 1
        };

        let start = nth_line_start(&self.text, target);
        let end = line_end(&self.text, start);
        self.caret = self.text[start..end]
            .char_indices()
            .nth(col)
            .map(|(i, _)| start + i)
            .unwrap_or(end);
        true
    }
}

/// Byte offset of the start of the line containing `pos`.
fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Byte offset of the end of the line containing `pos` (before its `\n`).
fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len())
}

/// Byte offset where zero-based line `n` starts. Past the last line this
/// returns the start of the last line.
fn nth_line_start(text: &str, n: usize) -> usize {
    let mut start = 0;
    for _ in 0..n {
        match text[start..].find('\n') {
            Some(i) => start += i + 1,
            None => break,
        }
    }
    start
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
