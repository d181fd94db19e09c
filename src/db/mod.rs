use std::time;

pub mod model;

/// Destination for write records.
pub trait Sink {
    fn write(&self, record: &model::WriteRecord) -> Result<(), failure::Error>;
}

/// Writes to an InfluxDB 1.x database over its HTTP `/write` endpoint.
pub struct Db {
    log: slog::Logger,
    client: reqwest::blocking::Client,
    write_url: reqwest::Url,
}

/// The database rejected a write, or could not be reached.
#[derive(Debug, Fail)]
#[fail(display = "write to {} failed: {}", url, detail)]
pub struct TransmissionError {
    pub url: String,
    /// Status line and response body, or the transport error.
    pub detail: String,
}

impl Db {
    pub fn connect(
        log: slog::Logger,
        host: &str,
        port: u16,
        database: &str,
        timeout: time::Duration,
    ) -> Result<Self, failure::Error> {
        let write_url = write_url(host, port, database)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Db {
            log,
            client,
            write_url,
        })
    }
}

impl Sink for Db {
    fn write(&self, record: &model::WriteRecord) -> Result<(), failure::Error> {
        let line = record.to_line_protocol()?;
        debug!(self.log, "writing record"; "url" => %self.write_url, "line" => &line);

        let transmission_error = |detail: String| TransmissionError {
            url: self.write_url.to_string(),
            detail,
        };

        let response = self
            .client
            .post(self.write_url.clone())
            .body(line)
            .send()
            .map_err(|e| transmission_error(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| transmission_error(format!("{}: {}", status, e)))?;

        if status.is_success() {
            debug!(self.log, "database accepted record"; "status" => %status, "response" => &body);
            Ok(())
        } else {
            Err(transmission_error(format!("{}: {}", status, body.trim())).into())
        }
    }
}

/// Logs records instead of sending them.
pub struct DryRun {
    log: slog::Logger,
}

impl DryRun {
    pub fn new(log: slog::Logger) -> Self {
        DryRun { log }
    }
}

impl Sink for DryRun {
    fn write(&self, record: &model::WriteRecord) -> Result<(), failure::Error> {
        let line = record.to_line_protocol()?;
        info!(self.log, "dry run, not sending"; "line" => line);
        Ok(())
    }
}

fn write_url(host: &str, port: u16, database: &str) -> Result<reqwest::Url, failure::Error> {
    let mut url = reqwest::Url::parse(&format!("http://{}:{}/write", host, port))
        .map_err(|e| failure::err_msg(format!("invalid database address {}:{}: {}", host, port, e)))?;
    url.query_pairs_mut().append_pair("db", database);
    Ok(url)
}
