#[macro_use]
extern crate failure;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate slog;

use std::path;
use std::process;

use structopt::StructOpt;

pub mod collect;
pub mod config;
pub mod db;
pub mod dewpoint;
pub mod error;
pub mod logging;
pub mod model;
pub mod sensors;
#[cfg(test)]
mod testing;

/// Reads the sensor modules on the local hub and writes their humidity,
/// pressure, temperature and dew point to InfluxDB.
#[derive(Debug, StructOpt)]
#[structopt(name = "meteo-collector")]
struct Opt {
    /// InfluxDB host
    #[structopt(default_value = "localhost")]
    host: String,
    /// InfluxDB HTTP port
    #[structopt(default_value = "8086")]
    port: u16,
    /// InfluxDB database
    #[structopt(default_value = "mydb")]
    db: String,
    /// TOML settings file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<path::PathBuf>,
    /// Log file, appended to
    #[structopt(long, parse(from_os_str))]
    log_file: Option<path::PathBuf>,
    /// Log the records instead of sending them
    #[structopt(long)]
    dry_run: bool,
    /// Stop at the first module that fails
    #[structopt(long)]
    fail_fast: bool,
    /// Log at debug level
    #[structopt(short, long)]
    verbose: bool,
}

fn main() {
    let opt = Opt::from_args();
    // Everything that logs is dropped inside `run`, so the log file is
    // flushed before the process exits.
    let code = run(opt);
    process::exit(code);
}

fn run(opt: Opt) -> i32 {
    let mut config = match config::Config::load(opt.config.as_ref().map(|p| p.as_path())) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("meteo-collector: invalid configuration: {}", e);
            return error::EXIT_STARTUP;
        }
    };
    if let Some(log_file) = opt.log_file.clone() {
        config.log_file = log_file;
    }
    config.fail_fast |= opt.fail_fast;

    let level = if opt.verbose {
        slog::Level::Debug
    } else {
        slog::Level::Info
    };
    let logging = match logging::Logging::init(&config.log_file, level) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("meteo-collector: {}", e);
            return error::EXIT_STARTUP;
        }
    };
    let log = &logging.log;
    let _facade_guard = logging.capture_log_facade();

    let sink: Box<dyn db::Sink> = if opt.dry_run {
        Box::new(db::DryRun::new(log.clone()))
    } else {
        match db::Db::connect(
            log.new(o!("db" => opt.db.clone())),
            &opt.host,
            opt.port,
            &opt.db,
            config.timeout(),
        ) {
            Ok(db) => Box::new(db),
            Err(e) => {
                error!(log, "{}", e);
                return error::EXIT_STARTUP;
            }
        }
    };

    match collect_readings(log, &config, &*sink) {
        Ok(summary) => {
            info!(log, "run complete"; "modules" => summary.published);
            0
        }
        Err(e) => {
            // The cycle already warned about an idle hub.
            if !matches!(e, error::Error::NoModules) {
                error!(log, "{}", e);
            }
            e.exit_code()
        }
    }
}

fn collect_readings(
    log: &slog::Logger,
    config: &config::Config,
    sink: &dyn db::Sink,
) -> Result<collect::Summary, error::Error> {
    let options = collect::Options {
        serial_prefix: config.serial_prefix.clone(),
        measurement: config.measurement.clone(),
        fail_fast: config.fail_fast,
    };

    let hub = sensors::connect_any(log, &config.hubs, config.timeout())?;

    collect::run(log, &hub, sink, &options)
}
