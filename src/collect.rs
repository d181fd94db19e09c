use crate::db;
use crate::error;
use crate::model;
use crate::sensors;

#[derive(Clone, Debug)]
pub struct Options {
    pub serial_prefix: String,
    pub measurement: String,
    /// Stop at the first module that fails instead of carrying on.
    pub fail_fast: bool,
}

/// What happened to the modules of one run.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub published: usize,
    pub read_failures: usize,
    pub transmission_failures: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.published + self.read_failures + self.transmission_failures
    }

    pub fn into_result(self) -> Result<Summary, error::Error> {
        if self.transmission_failures > 0 {
            Err(error::Error::Transmission {
                failed: self.transmission_failures,
                total: self.total(),
            })
        } else if self.read_failures > 0 {
            Err(error::Error::Read {
                failed: self.read_failures,
                total: self.total(),
            })
        } else {
            Ok(self)
        }
    }
}

enum Failure {
    Read(failure::Error),
    Transmission(failure::Error),
}

/// Sensor-bearing modules on the hub, in discovery order.
pub fn discover<H>(
    log: &slog::Logger,
    hub: &H,
    serial_prefix: &str,
) -> Result<Vec<model::Module>, error::Error>
where
    H: sensors::Hub + ?Sized,
{
    let modules = hub
        .modules()
        .map_err(|e| error::Error::HubConnection(format!("cannot list modules: {}", e)))?;

    let modules: Vec<_> = modules
        .into_iter()
        .filter(|m| m.is_sensor(serial_prefix))
        .collect();

    if modules.is_empty() {
        warn!(log, "No online modules found. Closing."; "serial_prefix" => serial_prefix);
        return Err(error::Error::NoModules);
    }

    Ok(modules)
}

/// Reads all three channels of `module`.
pub fn sample<H>(hub: &H, module: &model::Module) -> Result<model::Reading, failure::Error>
where
    H: sensors::Hub + ?Sized,
{
    let humidity = hub.current_value(&module.function(model::Channel::Humidity))?;
    let pressure = hub.current_value(&module.function(model::Channel::Pressure))?;
    let temperature = hub.current_value(&module.function(model::Channel::Temperature))?;

    Ok(model::Reading {
        humidity,
        pressure,
        temperature,
    })
}

/// Runs one collection cycle: discover, then read, derive and publish each
/// module.
pub fn run<H, S>(
    log: &slog::Logger,
    hub: &H,
    sink: &S,
    options: &Options,
) -> Result<Summary, error::Error>
where
    H: sensors::Hub + ?Sized,
    S: db::Sink + ?Sized,
{
    let modules = discover(log, hub, &options.serial_prefix)?;
    let mut summary = Summary::default();

    for module in &modules {
        let log = log.new(o!("serial" => module.serial.clone(),
                             "name" => module.field_prefix().to_owned()));

        match collect_module(&log, hub, sink, module, &options.measurement) {
            Ok(()) => {
                info!(log, "Sensor readings sent to the database.");
                summary.published += 1;
            }
            Err(Failure::Read(e)) => {
                error!(log, "reading sensors failed: {}", e);
                summary.read_failures += 1;
            }
            Err(Failure::Transmission(e)) => {
                error!(log, "{}", e);
                summary.transmission_failures += 1;
            }
        }

        if options.fail_fast && summary.published < summary.total() {
            warn!(log, "stopping at first failure";
                  "skipped" => modules.len() - summary.total());
            break;
        }
    }

    summary.into_result()
}

fn collect_module<H, S>(
    log: &slog::Logger,
    hub: &H,
    sink: &S,
    module: &model::Module,
    measurement: &str,
) -> Result<(), Failure>
where
    H: sensors::Hub + ?Sized,
    S: db::Sink + ?Sized,
{
    info!(log, "Obtaining sensor readings...");
    let reading = sample(hub, module).map_err(Failure::Read)?;
    let dew_point = reading
        .dew_point()
        .map_err(|e| Failure::Read(e.into()))?;
    debug!(log, "sampled";
           "humidity" => reading.humidity,
           "pressure" => reading.pressure,
           "temperature" => reading.temperature,
           "dew_point" => dew_point);

    let record = db::model::WriteRecord::for_module(measurement, module, &reading, dew_point);
    sink.write(&record).map_err(Failure::Transmission)
}
