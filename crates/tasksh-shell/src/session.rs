//! Shell Session
//!
//! Reads one byte at a time from a polled stream, edits the line in place and
//! hands completed lines to a [`LineHandler`]. `poll` never blocks on input:
//! it drains whatever `read_ready` reports and returns, leaving the caller to
//! sleep between polls.

use embedded_io_async::{Read, ReadReady, Write};

use crate::dispatch::LineHandler;
use crate::line::{Edit, LineBuffer};

/// Erase the character left of the cursor on a terminal
const ERASE: &[u8] = b"\x08 \x08";
const CRLF: &[u8] = b"\r\n";

/// One interactive session over `C` bytes of line storage
pub struct ShellSession<const C: usize> {
    line: LineBuffer<C>,
    prompt: &'static str,
    enabled: bool,
}

impl<const C: usize> ShellSession<C> {
    pub const fn new(prompt: &'static str) -> Self {
        Self {
            line: LineBuffer::new(),
            prompt,
            enabled: true,
        }
    }

    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stop reading input. There is no way back.
    pub fn disable(&mut self) {
        if self.enabled {
            log::debug!("session '{}' disabled", self.prompt);
        }
        self.enabled = false;
    }

    /// Print the banner and the first prompt
    pub async fn start<IO: Write>(&mut self, io: &mut IO, banner: &str) -> Result<(), IO::Error> {
        if !banner.is_empty() {
            io.write_all(banner.as_bytes()).await?;
            io.write_all(CRLF).await?;
        }
        io.write_all(self.prompt.as_bytes()).await?;
        io.flush().await
    }

    /// Consume every byte currently available on `io`.
    ///
    /// Returns the number of bytes read. A disabled session reads nothing,
    /// and a session disabled mid-poll leaves the remaining bytes queued.
    pub async fn poll<IO, H>(&mut self, io: &mut IO, handler: &mut H) -> Result<usize, IO::Error>
    where
        IO: Read + ReadReady + Write,
        H: LineHandler,
    {
        let mut consumed = 0;
        let mut byte = [0u8; 1];

        while self.enabled && io.read_ready()? {
            if io.read(&mut byte).await? == 0 {
                break;
            }
            consumed += 1;

            match self.line.push(byte[0]) {
                Edit::Appended(b) => io.write_all(&[b]).await?,
                Edit::Erased => io.write_all(ERASE).await?,
                Edit::Dropped | Edit::Ignored => {}
                Edit::Submitted => {
                    io.write_all(CRLF).await?;
                    self.dispatch(io, handler).await?;
                }
            }
        }

        if consumed > 0 {
            io.flush().await?;
        }
        Ok(consumed)
    }

    async fn dispatch<IO, H>(&mut self, io: &mut IO, handler: &mut H) -> Result<(), IO::Error>
    where
        IO: Write,
        H: LineHandler,
    {
        let reply = handler.handle_line(self.line.as_str());
        self.line.clear();

        io.write_all(reply.console_text().as_bytes()).await?;
        if !reply.response().is_empty() {
            io.write_all(reply.response().as_bytes()).await?;
            io.write_all(CRLF).await?;
        }

        if reply.disables_session() {
            self.disable();
        } else {
            io.write_all(self.prompt.as_bytes()).await?;
        }
        Ok(())
    }
}
