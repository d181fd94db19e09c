//! Dew point from ambient temperature and relative humidity.
//!
//! Uses the Magnus-form approximation with the Sonntag coefficients, see
//! <https://en.wikipedia.org/wiki/Dew_point>.

const B: f64 = 17.5043;
const C: f64 = 241.2;
/// `B * C`, kept as the literal the formula is usually quoted with.
const BC: f64 = 4222.03716;

#[derive(Debug, Fail, PartialEq)]
pub enum DomainError {
    #[fail(display = "relative humidity must be above 0%, got {}", _0)]
    Humidity(f64),
    #[fail(display = "temperature {} is outside the formula's domain", _0)]
    Temperature(f64),
    #[fail(
        display = "dew point is undefined at {} C and {}% humidity",
        temperature, humidity
    )]
    Undefined { temperature: f64, humidity: f64 },
}

/// Dew point in degrees Celsius for `temperature` (°C) and `humidity` (%).
///
/// The result is not rounded.
pub fn dew_point(temperature: f64, humidity: f64) -> Result<f64, DomainError> {
    if !(humidity > 0.0) {
        return Err(DomainError::Humidity(humidity));
    }
    if !temperature.is_finite() || temperature == -C {
        return Err(DomainError::Temperature(temperature));
    }

    let ln_h = (humidity / 100.0).ln();
    let dew = (C * ln_h + (BC * temperature) / (C + temperature))
        / (B - ln_h - (B * temperature) / (C + temperature));

    if dew.is_finite() {
        Ok(dew)
    } else {
        Err(DomainError::Undefined {
            temperature,
            humidity,
        })
    }
}
