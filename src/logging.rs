//! Logging backend which writes to a file from a background thread.

use chrono::Local;
use eyre::{eyre, Result};
use log::{Level, Metadata, Record};
use once_cell::sync::OnceCell;
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    sync::{mpsc, Mutex},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MessageType {
    Normal,
    Error,
    Warning,
    Debug,
}

#[derive(Debug)]
struct Message {
    module: String,
    msg_type: MessageType,
    string: String,
    time: String,
}

impl Message {
    fn from_record(record: &Record) -> Option<Message> {
        let msg_type = match record.level() {
            Level::Error => MessageType::Error,
            Level::Warn => MessageType::Warning,
            Level::Info => MessageType::Normal,
            Level::Debug | Level::Trace => MessageType::Debug,
        };

        let module_path = record.module_path()?;

        Some(Message {
            module: module_path
                .split("::")
                .last()
                .unwrap_or("unknown")
                .to_string(),
            msg_type,
            string: format!("{}", record.args()),
            time: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        })
    }

    /// Formats the message as `[date time] [module] [level] Text`.
    fn line(&self) -> String {
        let level_name = match self.msg_type {
            MessageType::Normal => "info",
            MessageType::Error => "error",
            MessageType::Warning => "warning",
            MessageType::Debug => "debug",
        };

        format!(
            "[{}] [{}] [{}] {}\n",
            self.time, self.module, level_name, self.string
        )
    }
}

pub struct Logger;

impl Logger {
    pub fn commit(&self, record: &log::Record) {
        let message = match Message::from_record(record) {
            Some(message) => message,
            None => return,
        };

        if let Some(sender) = MSG_SENDER.get() {
            if let Ok(sender) = sender.lock() {
                // The receiving thread only goes away with the process.
                let _ = sender.send(message);
            }
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.commit(record);
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;
static MSG_SENDER: OnceCell<Mutex<mpsc::Sender<Message>>> = OnceCell::new();
static PANIC_PATH: OnceCell<PathBuf> = OnceCell::new();

fn panic_hook(info: &std::panic::PanicInfo) {
    let message = info
        .payload()
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "no message".to_string());

    let location = info
        .location()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string());

    let time = Local::now();
    let backtrace = backtrace::Backtrace::new();

    let info_dump = format!(
        "The transmog mod panicked.

Message: {message}
Location: {location}
Time: {time}

{backtrace:?}"
    );

    log::error!("{info_dump}");

    if let Some(path) = PANIC_PATH.get() {
        let _ = std::fs::write(path, info_dump);
    }
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();

    // Log the panic before letting the host handle it however it normally would.
    std::panic::set_hook(Box::new(move |info| {
        panic_hook(info);
        previous(info);
    }));
}

/// Starts logging to `path` at `level`. A panic report is written to `PANIC.txt` in the same
/// directory. Fails if a logger has already been installed.
pub fn init(path: &Path, level: log::LevelFilter) -> Result<()> {
    log::set_logger(&LOGGER).map_err(|err| eyre!("logger already installed: {err}"))?;
    log::set_max_level(level);

    let mut file = File::create(path)?;

    let (sender, receiver) = mpsc::channel::<Message>();

    MSG_SENDER
        .set(Mutex::new(sender))
        .map_err(|_| eyre!("log sender already set"))?;

    if let Some(dir) = path.parent() {
        let _ = PANIC_PATH.set(dir.join("PANIC.txt"));
    }

    install_panic_hook();

    // Writing happens on a background thread so that logging from the game's frame update
    // never waits on the disk.
    std::thread::spawn(move || {
        for msg in receiver {
            let _ = file.write_all(msg.line().as_bytes());
            let _ = file.flush();
        }
    });

    Ok(())
}
