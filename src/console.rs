//! Console stream
//!
//! Input arrives asynchronously (a UART interrupt, a stdin reader thread) and
//! is queued in an [`InputQueue`]. Sessions read it back through a
//! [`ConsoleIo`], which polls the queue without blocking and forwards output
//! to a [`Sink`].

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_io_async::{ErrorType, Read, ReadReady, Write};
use spinning_top::Spinlock;

/// Bytes received but not yet read by a session
pub struct InputQueue {
    buffer: Spinlock<VecDeque<u8>>,
    closed: AtomicBool,
}

impl InputQueue {
    pub const fn new() -> Self {
        Self {
            buffer: Spinlock::new(VecDeque::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Pushes data into the input buffer.
    pub fn push_input(&self, data: &[u8]) {
        self.buffer.lock().extend(data.iter().copied());
    }

    /// Tries to read data from the input buffer.
    /// Returns number of bytes read.
    pub fn read_input(&self, buf: &mut [u8]) -> usize {
        let mut buffer = self.buffer.lock();
        let n = buf.len().min(buffer.len());
        for (slot, byte) in buf.iter_mut().zip(buffer.drain(..n)) {
            *slot = byte;
        }
        n
    }

    pub fn has_data(&self) -> bool {
        !self.buffer.lock().is_empty()
    }

    pub fn pending(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Drop everything queued so far. Returns how many bytes were dropped.
    pub fn discard(&self) -> usize {
        let mut buffer = self.buffer.lock();
        let n = buffer.len();
        buffer.clear();
        n
    }

    /// The producer will not push any more input
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Closed and fully drained
    pub fn is_finished(&self) -> bool {
        self.closed.load(Ordering::Acquire) && !self.has_data()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination of console output
pub trait Sink {
    fn write_bytes(&mut self, bytes: &[u8]);

    fn flush(&mut self) {}
}

impl Sink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Polled byte stream over an input queue and an output sink
pub struct ConsoleIo<'a, S: Sink> {
    input: &'a InputQueue,
    output: S,
}

impl<'a, S: Sink> ConsoleIo<'a, S> {
    pub fn new(input: &'a InputQueue, output: S) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &S {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut S {
        &mut self.output
    }
}

impl<S: Sink> ErrorType for ConsoleIo<'_, S> {
    type Error = Infallible;
}

impl<S: Sink> Read for ConsoleIo<'_, S> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.input.read_input(buf))
    }
}

impl<S: Sink> ReadReady for ConsoleIo<'_, S> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.input.has_data())
    }
}

impl<S: Sink> Write for ConsoleIo<'_, S> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.write_bytes(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.output.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_fifo() {
        let q = InputQueue::new();
        q.push_input(b"abc");
        let mut buf = [0u8; 2];
        assert_eq!(q.read_input(&mut buf), 2);
        assert_eq!(&buf, b"ab");
        assert_eq!(q.pending(), 1);
        assert_eq!(q.read_input(&mut buf), 1);
        assert_eq!(buf[0], b'c');
        assert_eq!(q.read_input(&mut buf), 0);
    }

    #[test]
    fn test_close_finishes_after_drain() {
        let q = InputQueue::new();
        q.push_input(b"x");
        q.close();
        assert!(!q.is_finished());
        let mut buf = [0u8; 1];
        q.read_input(&mut buf);
        assert!(q.is_finished());
    }

    #[test]
    fn test_discard_drops_queued_input() {
        let q = InputQueue::new();
        q.push_input(b"ps\nps\n");
        q.close();
        assert!(!q.is_finished());
        assert_eq!(q.discard(), 6);
        assert_eq!(q.pending(), 0);
        assert!(q.is_finished());
        assert_eq!(q.discard(), 0);
    }
}
