//! Host console: stdin feeds the input queue, stdout is the sink

use std::io::{Read, Write};
use std::thread;

use tasksh::console::{InputQueue, Sink};

/// Standard output as a console sink
pub struct Stdout;

impl Sink for Stdout {
    fn write_bytes(&mut self, bytes: &[u8]) {
        let _ = std::io::stdout().lock().write_all(bytes);
    }

    fn flush(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

/// Copy stdin into `queue` on a background thread until EOF
pub fn spawn_reader(queue: &'static InputQueue) -> std::io::Result<()> {
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            let mut stdin = std::io::stdin().lock();
            let mut buf = [0u8; 64];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => queue.push_input(&buf[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        log::error!("stdin read failed: {}", e);
                        break;
                    }
                }
            }
            log::info!("stdin closed");
            queue.close();
        })?;
    Ok(())
}
