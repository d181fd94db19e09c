use std::path;
use std::time;

use ::config as settings;

pub const DEFAULT_HUB: &str = "http://127.0.0.1:4444";
pub const DEFAULT_SERIAL_PREFIX: &str = "METEOMK";
pub const DEFAULT_MEASUREMENT: &str = "yoctopuce";
pub const DEFAULT_LOG_FILE: &str = "/tmp/yoctopuce.log";
const DEFAULT_TIMEOUT_SECS: i64 = 10;
const ENV_PREFIX: &str = "METEO";

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Hub endpoints, tried in order until one answers.
    #[serde(deserialize_with = "deserialize_hubs")]
    pub hubs: Vec<reqwest::Url>,
    pub serial_prefix: String,
    pub measurement: String,
    pub log_file: path::PathBuf,
    pub timeout_secs: u64,
    pub fail_fast: bool,
}

impl Config {
    /// Loads built-in defaults, then `file` if given, then `METEO_*`
    /// environment variables.
    pub fn load(file: Option<&path::Path>) -> Result<Self, failure::Error> {
        let mut s = settings::Config::default();
        s.set_default("hubs", vec![DEFAULT_HUB])?;
        s.set_default("serial_prefix", DEFAULT_SERIAL_PREFIX)?;
        s.set_default("measurement", DEFAULT_MEASUREMENT)?;
        s.set_default("log_file", DEFAULT_LOG_FILE)?;
        s.set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?;
        s.set_default("fail_fast", false)?;

        if let Some(file) = file {
            s.merge(settings::File::from(file).format(settings::FileFormat::Toml))?;
        }
        s.merge(settings::Environment::with_prefix(ENV_PREFIX))?;

        let config: Config = s.try_into()?;
        if config.hubs.is_empty() {
            return Err(failure::err_msg("at least one hub endpoint is required"));
        }
        if config.measurement.is_empty() {
            return Err(failure::err_msg("measurement name must not be empty"));
        }

        Ok(config)
    }

    pub fn timeout(&self) -> time::Duration {
        time::Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_hubs<'de, D>(deserializer: D) -> Result<Vec<reqwest::Url>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = match <OneOrMany as serde::Deserialize>::deserialize(deserializer)? {
        OneOrMany::One(s) => s.split(',').map(|s| s.trim().to_owned()).collect(),
        OneOrMany::Many(v) => v,
    };

    raw.iter()
        .map(|s| parse_hub_url(s).map_err(<D::Error as serde::de::Error>::custom))
        .collect()
}

/// Parses a hub endpoint, normalizing the path to end in `/` so relative API
/// paths join below it.
pub fn parse_hub_url(raw: &str) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(raw)
        .map_err(|e| format!("invalid hub URL {:?}: {}", raw, e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(format!(
                "invalid hub URL {:?}: unsupported scheme {:?}, expected http or https",
                raw, other
            ))
        }
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
