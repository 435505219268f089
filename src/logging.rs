//! Console and persisted-file logging.
//!
//! Both sinks are `env_logger` loggers; [`Tee`] forwards every record to
//! each of them. Records are attributed by target: installer component
//! names, `<component>:rollback`, or `main`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Logger, Target};
use log::{LevelFilter, Log, Metadata, Record};

use crate::constants::log_file::{APP_DIR, BACKUP_COUNT, FILE_NAME, MAX_BYTES};
use crate::constants::targets::MAIN;
use crate::error::{Error, Result};
use crate::ioutils::create_dir_all;

/// Forwards records to several loggers.
pub struct Tee {
    loggers: Vec<Logger>,
}

impl Tee {
    pub fn new(loggers: Vec<Logger>) -> Self {
        Self { loggers }
    }

    /// The most verbose level any sink accepts.
    pub fn max_level(&self) -> LevelFilter {
        self.loggers.iter().map(Logger::filter).max().unwrap_or(LevelFilter::Off)
    }
}

impl Log for Tee {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.loggers.iter().any(|logger| logger.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        for logger in &self.loggers {
            logger.log(record);
        }
    }

    fn flush(&self) {
        for logger in &self.loggers {
            logger.flush();
        }
    }
}

/// `<data dir>/bootstep/bootstep.log`, if the platform has a data directory.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
}

fn backup_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Shifts `path` to `path.1` (and older backups up by one) once it is larger
/// than `max_bytes`. At most `backups` old files are kept.
pub fn rotate(path: &Path, max_bytes: u64, backups: u32) -> Result<()> {
    let Ok(metadata) = fs::metadata(path) else {
        return Ok(());
    };
    if metadata.len() <= max_bytes || backups == 0 {
        return Ok(());
    }

    let oldest = backup_path(path, backups);
    if oldest.exists() {
        fs::remove_file(oldest)?;
    }
    for index in (1..backups).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))?;
    Ok(())
}

/// `<component>: <message>` on stderr.
pub fn console_logger(level: LevelFilter) -> Logger {
    Builder::new()
        .filter_level(level)
        .target(Target::Stderr)
        .format(|buf, record| writeln!(buf, "{}: {}", record.target(), record.args()))
        .build()
}

/// `L | timestamp | component | message`, appended to `path`. The file
/// always receives at least debug records.
pub fn file_logger(level: LevelFilter, path: &Path) -> Result<Logger> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    rotate(path, MAX_BYTES, BACKUP_COUNT)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Ok(Builder::new()
        .filter_level(level.max(LevelFilter::Debug))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            let level = record.level().as_str();
            writeln!(
                buf,
                "{} | {} | {} | {}",
                &level[..1],
                buf.timestamp(),
                record.target(),
                record.args()
            )
        })
        .build())
}

/// Installs the process-wide logger. Must be called at most once.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut loggers = vec![console_logger(level)];
    if let Some(path) = log_file {
        loggers.push(file_logger(level, path)?);
    }

    let tee = Tee::new(loggers);
    let max_level = tee.max_level();
    log::set_boxed_logger(Box::new(tee)).map_err(|e| Error::Other(e.into()))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Like [`init`], but drops the persisted log when it cannot be set up.
///
/// Returns the log file actually in use. When not even the console logger
/// can be installed the reason goes to stderr.
pub fn init_with_fallback(level: LevelFilter, log_file: Option<PathBuf>) -> Option<PathBuf> {
    let err = match init(level, log_file.as_deref()) {
        Ok(()) => return log_file,
        Err(err) => err,
    };
    match init(level, None) {
        Ok(()) => log::warn!(target: MAIN, "Persisted log disabled: {err}"),
        Err(console_err) => {
            eprintln!("Logging disabled: {err}; console logger failed: {console_err}")
        }
    }
    None
}
