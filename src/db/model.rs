//! InfluxDB line protocol records.
//!
//! ```text
//! measurement field1=val1,field2=val2
//! ```
//!
//! See <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>.

use std::fmt;

use crate::model;

/// One line of the write request: a measurement and its float fields, in
/// insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteRecord {
    pub measurement: String,
    pub fields: Vec<(String, f64)>,
}

#[derive(Debug, Fail, PartialEq)]
pub enum RecordError {
    #[fail(display = "a record needs at least one field")]
    NoFields,
    #[fail(display = "field {} has non-finite value {}", _0, _1)]
    NonFinite(String, f64),
}

impl WriteRecord {
    /// The record for one module: humidity, pressure, temperature and dew point
    /// fields, each prefixed with the module's field prefix.
    pub fn for_module(
        measurement: &str,
        module: &model::Module,
        reading: &model::Reading,
        dew_point: f64,
    ) -> Self {
        let name = module.field_prefix();
        WriteRecord {
            measurement: measurement.to_owned(),
            fields: vec![
                (format!("{}_humidity", name), reading.humidity),
                (format!("{}_pressure", name), reading.pressure),
                (format!("{}_temperature", name), reading.temperature),
                (format!("{}_dewpoint", name), dew_point),
            ],
        }
    }

    /// Renders the record as one line without a timestamp; the server stamps it
    /// on arrival.
    pub fn to_line_protocol(&self) -> Result<String, RecordError> {
        if self.fields.is_empty() {
            return Err(RecordError::NoFields);
        }

        let mut line = escape_measurement(&self.measurement);
        line.push(' ');

        for (i, (key, value)) in self.fields.iter().enumerate() {
            if !value.is_finite() {
                return Err(RecordError::NonFinite(key.clone(), *value));
            }
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_field_key(key));
            line.push('=');
            line.push_str(&FloatField(*value).to_string());
        }

        Ok(line)
    }
}

/// Shortest round-trip decimal, always with a fractional part (`45.0`, not `45`).
struct FloatField(f64);

impl fmt::Display for FloatField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Spaces and commas must be escaped.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Commas, equals signs and spaces must be escaped.
fn escape_field_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
