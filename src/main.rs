//! Host build of the task supervisor
//!
//! Runs the shell over stdin/stdout next to a simulated scheduler. Two
//! cooperative tasks share the supervisor through a spinlock that is only
//! taken inside synchronous sections, never across an await.

mod host;

use core::fmt::Write as _;

use embassy_executor::{Executor, Spawner};
use embassy_time::{Duration, Instant, Timer};
use spinning_top::Spinlock;
use static_cell::StaticCell;

use tasksh::board::SimBoard;
use tasksh::commands::{create_default_dispatcher, create_scanner_dispatcher};
use tasksh::config::{
    BANNER, CMD_BUFFER_SIZE, POLL_INTERVAL_MS, RESPONSE_BUFFER_SIZE, SCANNER_PROMPT, SHELL_PROMPT,
    TICK_INTERVAL_MS,
};
use tasksh::console::{ConsoleIo, InputQueue, Sink};
use tasksh::runtime::SimRuntime;
use tasksh::shell::{Dispatcher, LineHandler, Reply, ShellSession};
use tasksh::supervisor::{SessionKind, Supervisor};

use host::console::Stdout;

static SUPERVISOR: Spinlock<Option<Supervisor>> = Spinlock::new(None);
static INPUT: InputQueue = InputQueue::new();
static EXECUTOR: StaticCell<Executor> = StaticCell::new();

/// Dispatches each line with the supervisor lock held
struct LockedSupervisor<'a> {
    dispatcher: &'a Dispatcher<Supervisor>,
}

impl LineHandler for LockedSupervisor<'_> {
    fn handle_line(&mut self, line: &str) -> Reply {
        match SUPERVISOR.lock().as_mut() {
            Some(sup) => sup.dispatch(self.dispatcher, line),
            None => {
                let mut reply = Reply::new(RESPONSE_BUFFER_SIZE);
                let _ = write!(reply, "Error: supervisor not running");
                reply
            }
        }
    }
}

/// Scan output shown when the bus-scanner session takes over
fn scanner_banner(scanner: &Dispatcher<Supervisor>) -> String {
    let mut banner = String::from("I2C bus scanner, type 'help' for commands\r\n");
    let reply = LockedSupervisor { dispatcher: scanner }.handle_line("scan");
    banner.push_str(reply.console_text());
    banner.push_str(reply.response());
    banner
}

#[embassy_executor::task]
async fn shell_task(mut io: ConsoleIo<'static, Stdout>) {
    let shell = create_default_dispatcher();
    let scanner = create_scanner_dispatcher();

    let mut dispatcher = &shell;
    let mut session: ShellSession<CMD_BUFFER_SIZE> = ShellSession::new(SHELL_PROMPT);
    let _ = session.start(&mut io, BANNER).await;

    loop {
        if !session.is_enabled() {
            let handoff = SUPERVISOR.lock().as_mut().and_then(Supervisor::take_handoff);
            match handoff {
                Some(SessionKind::Scanner) => {
                    dispatcher = &scanner;
                    session = ShellSession::new(SCANNER_PROMPT);
                    let banner = scanner_banner(dispatcher);
                    let _ = session.start(&mut io, &banner).await;
                }
                None => {
                    // Nobody reads input anymore
                    let dropped = INPUT.discard();
                    if dropped > 0 {
                        log::debug!("discarded {} bytes of console input", dropped);
                    }
                }
            }
        }

        if INPUT.is_finished() {
            log::info!("console closed, shutting down");
            std::process::exit(0);
        }

        let mut handler = LockedSupervisor { dispatcher };
        let _ = session.poll(&mut io, &mut handler).await;
        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

#[embassy_executor::task]
async fn scheduler_task(mut out: Stdout) {
    let start = Instant::now();
    loop {
        Timer::after(Duration::from_millis(TICK_INTERVAL_MS)).await;
        let now_ms = start.elapsed().as_millis();
        let printed = SUPERVISOR
            .lock()
            .as_mut()
            .map(|sup| sup.tick(now_ms))
            .unwrap_or_default();
        if !printed.is_empty() {
            out.write_bytes(printed.as_bytes());
            out.flush();
        }
    }
}

fn start_tasks(spawner: Spawner) {
    if let Err(e) = spawner.spawn(shell_task(ConsoleIo::new(&INPUT, Stdout))) {
        log::error!("failed to spawn shell task: {:?}", e);
    }
    if let Err(e) = spawner.spawn(scheduler_task(Stdout)) {
        log::error!("failed to spawn scheduler task: {:?}", e);
    }
}

fn main() {
    if let Err(e) = host::logger::init() {
        eprintln!("logger init failed: {}", e);
    }

    let mut supervisor = Supervisor::new(SimRuntime::new(), Box::new(SimBoard::default()));
    if let Err(e) = supervisor.boot() {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
    *SUPERVISOR.lock() = Some(supervisor);

    if let Err(e) = host::console::spawn_reader(&INPUT) {
        eprintln!("cannot read stdin: {}", e);
        std::process::exit(1);
    }

    log::info!("task starter leaving");
    let executor = EXECUTOR.init(Executor::new());
    executor.run(start_tasks)
}
