use thiserror::Error;

/// Invalid or incomplete configuration, fatal at boot
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Malformed(serde_json_core::de::Error),
    #[error("missing required field `{0}`")]
    Missing(&'static str),
    #[error("`{0}` is out of range")]
    OutOfRange(&'static str),
    #[error("segment values must be a permutation of 1, 1, 2, 3, 5")]
    SegmentValues,
    #[error("layout needs {needed} pixels, at most {capacity} are supported")]
    TooManyPixels { needed: usize, capacity: usize },
    #[error("wiring drives {expected} output lines, {provided} drivers were given")]
    WiringMismatch { expected: usize, provided: usize },
}

/// No segment assignment shows the requested time
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot encode hour {hour12}, minute bucket {minute_bucket}")]
pub struct EncodingError {
    pub hour12: u8,
    pub minute_bucket: u8,
}

/// Terminal failure of the boot time sync
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFailure {
    #[error("network association failed")]
    NetworkFailure,
    #[error("time sync did not finish before the startup deadline")]
    Timeout,
    #[error("time sync retries exhausted")]
    RetriesExhausted,
}

/// Error of a single time protocol request
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    #[error("time server did not answer in time")]
    Timeout,
    #[error("time request failed")]
    Failed,
}

/// Error that stops the device loop
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("LED strip write failed")]
    HardwareFault,
}
