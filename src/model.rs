use std::fmt;

use crate::dewpoint;

/// A module as reported by the hub during discovery.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub serial: String,
    pub logical_name: String,
    pub online: bool,
}

impl Module {
    /// Whether this module should be sampled: it must be online and belong to
    /// the sensor family identified by `serial_prefix`.
    pub fn is_sensor(&self, serial_prefix: &str) -> bool {
        self.online && self.serial.starts_with(serial_prefix)
    }

    /// Prefix for the field names written for this module.
    ///
    /// Modules leave the factory without a logical name, in which case the
    /// serial number is used so that fields stay distinguishable.
    pub fn field_prefix(&self) -> &str {
        if self.logical_name.is_empty() {
            &self.serial
        } else {
            &self.logical_name
        }
    }

    pub fn function(&self, channel: Channel) -> FunctionId {
        FunctionId {
            serial: self.serial.clone(),
            channel,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Channel {
    Humidity,
    Pressure,
    Temperature,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Humidity => "humidity",
            Channel::Pressure => "pressure",
            Channel::Temperature => "temperature",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hub lookup key for one channel of one module, rendered `<serial>.<channel>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionId {
    pub serial: String,
    pub channel: Channel,
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.serial, self.channel)
    }
}

/// One sample of all three channels of a module.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Pressure, hPa.
    pub pressure: f64,
    /// Temperature, °C.
    pub temperature: f64,
}

impl Reading {
    pub fn dew_point(&self) -> Result<f64, dewpoint::DomainError> {
        dewpoint::dew_point(self.temperature, self.humidity)
    }
}
