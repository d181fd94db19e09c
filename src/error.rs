/// Exit code for failures before the collection cycle starts (configuration,
/// log file, CLI).
pub const EXIT_STARTUP: i32 = 1;

/// Reasons a collection run ends without publishing every reading.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "could not connect to a hub: {}", _0)]
    HubConnection(String),
    #[fail(display = "no online modules found")]
    NoModules,
    #[fail(
        display = "sending readings failed for {} of {} modules",
        failed, total
    )]
    Transmission { failed: usize, total: usize },
    #[fail(display = "reading sensors failed for {} of {} modules", failed, total)]
    Read { failed: usize, total: usize },
}

impl Error {
    /// The process exit status reported for this outcome.
    pub fn exit_code(&self) -> i32 {
        match *self {
            Error::HubConnection(_) => 255,
            Error::NoModules => 254,
            Error::Transmission { .. } => 253,
            Error::Read { .. } => 252,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            EXIT_STARTUP,
            Error::HubConnection("refused".to_owned()).exit_code(),
            Error::NoModules.exit_code(),
            Error::Transmission {
                failed: 1,
                total: 1,
            }
            .exit_code(),
            Error::Read {
                failed: 1,
                total: 2,
            }
            .exit_code(),
        ];

        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
