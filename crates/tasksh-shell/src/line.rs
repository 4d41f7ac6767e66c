//! Fixed-capacity line buffer

/// Backspace control byte
pub const BACKSPACE: u8 = 0x08;
/// Sent by most terminals for the backspace key
pub const DELETE: u8 = 0x7f;
/// Line terminator
pub const NEWLINE: u8 = b'\n';

/// What a pushed byte did to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Byte stored at the end of the line
    Appended(u8),
    /// Last byte removed
    Erased,
    /// Buffer full, byte discarded
    Dropped,
    /// Byte has no effect on the line (carriage return, backspace on an
    /// empty line, other control bytes)
    Ignored,
    /// Terminator seen; the line is ready
    Submitted,
}

/// Line editor state for `C` bytes of storage.
///
/// At most `C - 1` characters are kept; one slot is reserved the way a
/// NUL-terminated buffer would reserve it.
pub struct LineBuffer<const C: usize> {
    buf: [u8; C],
    cursor: usize,
    line_ready: bool,
}

impl<const C: usize> LineBuffer<C> {
    pub const fn new() -> Self {
        Self {
            buf: [0; C],
            cursor: 0,
            line_ready: false,
        }
    }

    /// Feed one input byte
    pub fn push(&mut self, byte: u8) -> Edit {
        if self.line_ready {
            // Nothing is accepted until the submitted line is cleared
            return Edit::Ignored;
        }
        match byte {
            NEWLINE => {
                self.line_ready = true;
                Edit::Submitted
            }
            BACKSPACE | DELETE => {
                if self.cursor == 0 {
                    Edit::Ignored
                } else {
                    self.cursor -= 1;
                    Edit::Erased
                }
            }
            0x20..=0x7e => {
                if self.cursor + 1 < C {
                    self.buf[self.cursor] = byte;
                    self.cursor += 1;
                    Edit::Appended(byte)
                } else {
                    Edit::Dropped
                }
            }
            _ => Edit::Ignored,
        }
    }

    /// The collected characters, without terminator
    pub fn as_str(&self) -> &str {
        // Only printable ASCII is ever stored
        core::str::from_utf8(&self.buf[..self.cursor]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_line_ready(&self) -> bool {
        self.line_ready
    }

    /// Reset for the next line
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.line_ready = false;
    }
}

impl<const C: usize> Default for LineBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}
