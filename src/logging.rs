use std::fs;
use std::io;
use std::path;

use slog::Drain;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Owns the root logger and everything needed to flush it.
///
/// Dropping this joins the async drain thread, so every record logged before
/// the drop is written to both the log file and stdout.
pub struct Logging {
    pub log: slog::Logger,
    _async_guard: slog_async::AsyncGuard,
}

impl Logging {
    /// Logs to the file at `path` (appending) and to standard output, at
    /// `level` and above.
    pub fn init(path: &path::Path, level: slog::Level) -> Result<Self, failure::Error> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                failure::err_msg(format!("cannot open log file {}: {}", path.display(), e))
            })?;

        let file_drain = slog_term::FullFormat::new(slog_term::PlainDecorator::new(file))
            .use_custom_timestamp(timestamp_local)
            .build()
            .fuse();
        let stdout_drain = slog_term::FullFormat::new(slog_term::PlainDecorator::new(io::stdout()))
            .use_custom_timestamp(timestamp_local)
            .build()
            .fuse();

        let drain = slog::Duplicate::new(file_drain, stdout_drain).fuse();
        let drain = slog::LevelFilter::new(drain, level).fuse();
        let (drain, async_guard) = slog_async::Async::new(drain).build_with_guard();

        let log = slog::Logger::root(drain.fuse(), o!());

        Ok(Logging {
            log,
            _async_guard: async_guard,
        })
    }

    /// Routes records that libraries emit through the `log` facade into this
    /// logger until the returned guard is dropped.
    ///
    /// Once the guard is gone the facade must stay silent, so drop it only
    /// after every HTTP client has been dropped.
    pub fn capture_log_facade(&self) -> slog_scope::GlobalLoggerGuard {
        let guard = slog_scope::set_global_logger(self.log.new(o!("source" => "deps")));
        if let Err(e) = slog_stdlog::init() {
            debug!(self.log, "log facade already has a logger"; "error" => %e);
        }
        guard
    }
}

fn timestamp_local(io: &mut dyn io::Write) -> io::Result<()> {
    write!(io, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
}
