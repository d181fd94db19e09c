use std::time;

use crate::error;
use crate::model;

/// A gateway exposing sensor modules.
pub trait Hub {
    /// All modules known to the hub, in the hub's order.
    fn modules(&self) -> Result<Vec<model::Module>, failure::Error>;

    /// The current value of one channel of one module.
    fn current_value(&self, function: &model::FunctionId) -> Result<f64, failure::Error>;
}

/// Talks to a VirtualHub (or YoctoHub) through its REST API.
pub struct VirtualHub {
    log: slog::Logger,
    client: reqwest::blocking::Client,
    base: reqwest::Url,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhitePagesEntry {
    serial_number: String,
    #[serde(default)]
    logical_name: String,
    #[serde(default)]
    product_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionState {
    current_value: f64,
}

impl VirtualHub {
    /// Connects to the hub at `base`, failing if it does not answer.
    pub fn connect(
        log: slog::Logger,
        base: reqwest::Url,
        timeout: time::Duration,
    ) -> Result<Self, failure::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let hub = VirtualHub { log, client, base };

        hub.get(&hub.url("api/module.json")?)?;

        Ok(hub)
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, failure::Error> {
        Ok(self.base.join(path)?)
    }

    fn get(&self, url: &reqwest::Url) -> Result<reqwest::blocking::Response, failure::Error> {
        trace!(self.log, "GET {}", url);
        Ok(self.client.get(url.clone()).send()?.error_for_status()?)
    }

    fn is_online(&self, serial: &str) -> Result<bool, failure::Error> {
        let url = self.url(&format!("bySerial/{}/api/module.json", serial))?;
        match self.client.get(url).send() {
            Ok(response) => Ok(response.status().is_success()),
            Err(ref e) if e.is_timeout() || e.is_connect() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Hub for VirtualHub {
    fn modules(&self) -> Result<Vec<model::Module>, failure::Error> {
        let entries: Vec<WhitePagesEntry> = self
            .get(&self.url("api/services/whitePages.json")?)?
            .json()?;

        entries
            .into_iter()
            .map(|entry| -> Result<model::Module, failure::Error> {
                let online = self.is_online(&entry.serial_number)?;
                debug!(self.log, "found module";
                       "serial" => &entry.serial_number,
                       "name" => &entry.logical_name,
                       "product" => &entry.product_name,
                       "online" => online);
                Ok(model::Module {
                    serial: entry.serial_number,
                    logical_name: entry.logical_name,
                    online,
                })
            })
            .collect()
    }

    fn current_value(&self, function: &model::FunctionId) -> Result<f64, failure::Error> {
        let url = self.url(&format!(
            "bySerial/{}/api/{}.json",
            function.serial, function.channel
        ))?;
        let state: FunctionState = self
            .get(&url)
            .and_then(|r| Ok(r.json::<FunctionState>()?))
            .map_err(|e| failure::err_msg(format!("cannot read {}: {}", function, e)))?;

        Ok(decode_fixed_point(state.current_value))
    }
}

/// Hub values are 16.16 fixed point; keep three decimals like the vendor
/// library does.
fn decode_fixed_point(raw: f64) -> f64 {
    (raw * 1000.0 / 65536.0).round() / 1000.0
}

/// Connects to the first hub in `endpoints` that answers.
pub fn connect_any(
    log: &slog::Logger,
    endpoints: &[reqwest::Url],
    timeout: time::Duration,
) -> Result<VirtualHub, error::Error> {
    let mut failures = Vec::with_capacity(endpoints.len());

    for endpoint in endpoints {
        let hub_log = log.new(o!("hub" => endpoint.to_string()));
        match VirtualHub::connect(hub_log, endpoint.clone(), timeout) {
            Ok(hub) => {
                info!(log, "hub is on"; "url" => %endpoint);
                return Ok(hub);
            }
            Err(e) => {
                info!(log, "hub is off, trying next"; "url" => %endpoint, "error" => %e);
                failures.push(format!("{}: {}", endpoint, e));
            }
        }
    }

    Err(error::Error::HubConnection(failures.join("; ")))
}
