//! Boot-time network association and clock synchronization
//!
//! [`TimeSyncManager`] is a bounded state machine advanced by [`TimeSyncManager::poll`]
//! once per tick. Every attempt has a timeout, attempts are counted and the
//! whole sequence has a deadline, so it always reaches `Synced` or `Failed`.

mod backoff;

use core::fmt::Debug;

pub use backoff::{Backoff, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX};
use embassy_time::{Duration, Instant};
use heapless::String;

use crate::clock::Timestamp;
use crate::error::{FetchError, SyncFailure};
use crate::logging::{debug, error, info, warn};

pub const MAX_SSID_LEN: usize = 32;
pub const MAX_PASSWORD_LEN: usize = 64;
pub const MAX_HOST_LEN: usize = 64;

pub const DEFAULT_NTP_HOST: &str = "ntp.aliyun.com";
pub const DEFAULT_TIMEZONE_OFFSET_MINUTES: i32 = 8 * 60;
pub const DEFAULT_CONNECT_ATTEMPTS: u8 = 3;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SYNC_ATTEMPTS: u8 = 3;
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Station-mode network interface
pub trait NetworkStack {
    type Error: Debug;

    /// Start associating with an access point
    ///
    /// May return before the link is up; completion is observed through
    /// [`NetworkStack::is_connected`]. Must not block longer than `timeout`.
    fn connect(&mut self, ssid: &str, password: &str, timeout: Duration) -> Result<(), Self::Error>;

    fn is_connected(&self) -> bool;
}

/// Network time protocol client
pub trait TimeProtocolClient {
    /// Request the current UTC time from `host`, giving up after `timeout`
    fn fetch(&mut self, host: &str, timeout: Duration) -> Result<Timestamp, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
}

/// Network and time sync settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// No credentials means the device runs offline
    pub credentials: Option<WifiCredentials>,
    pub ntp_host: String<MAX_HOST_LEN>,
    pub timezone_offset_minutes: i32,
    pub connect_attempts: u8,
    pub connect_timeout: Duration,
    pub sync_attempts: u8,
    pub sync_timeout: Duration,
    pub backoff: Backoff,
    /// Deadline of the whole sequence
    pub startup_timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            credentials: None,
            ntp_host: String::try_from(DEFAULT_NTP_HOST).unwrap_or_default(),
            timezone_offset_minutes: DEFAULT_TIMEZONE_OFFSET_MINUTES,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            sync_attempts: DEFAULT_SYNC_ATTEMPTS,
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            backoff: Backoff::default(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }
}

/// Final result of the boot sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Success(Timestamp),
    Timeout,
    NetworkFailure,
    RetriesExhausted,
}

impl From<SyncFailure> for SyncOutcome {
    fn from(failure: SyncFailure) -> Self {
        match failure {
            SyncFailure::NetworkFailure => Self::NetworkFailure,
            SyncFailure::Timeout => Self::Timeout,
            SyncFailure::RetriesExhausted => Self::RetriesExhausted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Connecting,
    Associated,
    Syncing,
    Synced {
        timestamp: Timestamp,
        offset_minutes: i32,
    },
    Failed(SyncFailure),
}

impl SyncState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Synced { .. } | Self::Failed(_))
    }

    /// Outcome of a terminal state
    pub const fn outcome(self) -> Option<SyncOutcome> {
        match self {
            Self::Synced { timestamp, .. } => Some(SyncOutcome::Success(timestamp)),
            Self::Failed(SyncFailure::NetworkFailure) => Some(SyncOutcome::NetworkFailure),
            Self::Failed(SyncFailure::Timeout) => Some(SyncOutcome::Timeout),
            Self::Failed(SyncFailure::RetriesExhausted) => Some(SyncOutcome::RetriesExhausted),
            Self::Idle | Self::Connecting | Self::Associated | Self::Syncing => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Associated => "associated",
            Self::Syncing => "syncing",
            Self::Synced { .. } => "synced",
            Self::Failed(_) => "failed",
        }
    }
}

/// Runs one association and time sync sequence
///
/// The sequence runs once. Only [`TimeSyncManager::restart`] starts another.
#[derive(Debug, Clone)]
pub struct TimeSyncManager {
    settings: SyncSettings,
    state: SyncState,
    started: Option<Instant>,
    attempts: u8,
    attempt_started: Option<Instant>,
    retry_at: Option<Instant>,
}

impl TimeSyncManager {
    pub const fn new(settings: SyncSettings) -> Self {
        Self {
            settings,
            state: SyncState::Idle,
            started: None,
            attempts: 0,
            attempt_started: None,
            retry_at: None,
        }
    }

    pub const fn state(&self) -> SyncState {
        self.state
    }

    /// Attempts made in the current phase
    pub const fn attempts(&self) -> u8 {
        self.attempts
    }

    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Go back to `Idle` so the next poll starts a new sequence
    pub fn restart(&mut self) {
        info!("time sync re-triggered");
        self.started = None;
        self.enter(SyncState::Idle);
    }

    /// Advance the state machine, returns the state after this step
    pub fn poll<N, T>(&mut self, now: Instant, network: &mut N, client: &mut T) -> SyncState
    where
        N: NetworkStack,
        T: TimeProtocolClient,
    {
        if self.state.is_terminal() {
            return self.state;
        }

        if self.state == SyncState::Idle {
            info!("starting time sync");
            self.started = Some(now);
            self.enter(SyncState::Connecting);
        }

        if self
            .started
            .is_some_and(|started| now.saturating_duration_since(started) >= self.settings.startup_timeout)
        {
            error!(
                "time sync still {} after {} ms",
                self.state.as_str(),
                self.settings.startup_timeout.as_millis()
            );
            self.finish(SyncState::Failed(SyncFailure::Timeout));
            return self.state;
        }

        match self.state {
            SyncState::Connecting => self.poll_connecting(now, network),
            SyncState::Associated => self.enter(SyncState::Syncing),
            SyncState::Syncing => self.poll_syncing(now, client),
            SyncState::Idle | SyncState::Synced { .. } | SyncState::Failed(_) => {}
        }

        self.state
    }

    fn poll_connecting<N: NetworkStack>(&mut self, now: Instant, network: &mut N) {
        let Some(credentials) = self.settings.credentials.as_ref() else {
            error!("no network credentials configured");
            self.finish(SyncState::Failed(SyncFailure::NetworkFailure));
            return;
        };

        if network.is_connected() {
            info!("network associated");
            self.enter(SyncState::Associated);
            return;
        }

        if let Some(attempt_started) = self.attempt_started {
            if now.saturating_duration_since(attempt_started) >= self.settings.connect_timeout {
                warn!("association attempt {} timed out", self.attempts);
                self.retry_or_fail(now, self.settings.connect_attempts, SyncFailure::NetworkFailure);
            }
            return;
        }

        if self.retry_at.is_some_and(|retry_at| now < retry_at) {
            return;
        }

        self.attempts += 1;
        debug!(
            "associating with `{}`, attempt {}/{}",
            credentials.ssid, self.attempts, self.settings.connect_attempts
        );
        let result = network.connect(
            &credentials.ssid,
            &credentials.password,
            self.settings.connect_timeout,
        );

        match result {
            Ok(()) if network.is_connected() => {
                info!("network associated");
                self.enter(SyncState::Associated);
            }
            Ok(()) => self.attempt_started = Some(now),
            Err(error) => {
                warn!("association attempt {} failed: {:?}", self.attempts, error);
                self.retry_or_fail(now, self.settings.connect_attempts, SyncFailure::NetworkFailure);
            }
        }
    }

    fn poll_syncing<T: TimeProtocolClient>(&mut self, now: Instant, client: &mut T) {
        if self.retry_at.is_some_and(|retry_at| now < retry_at) {
            return;
        }

        self.attempts += 1;
        debug!(
            "requesting time from {}, attempt {}/{}",
            self.settings.ntp_host, self.attempts, self.settings.sync_attempts
        );

        match client.fetch(&self.settings.ntp_host, self.settings.sync_timeout) {
            Ok(timestamp) => {
                info!("time synced on attempt {}", self.attempts);
                self.finish(SyncState::Synced {
                    timestamp,
                    offset_minutes: self.settings.timezone_offset_minutes,
                });
            }
            Err(error) => {
                warn!("time sync attempt {} failed: {}", self.attempts, error);
                self.retry_or_fail(now, self.settings.sync_attempts, SyncFailure::RetriesExhausted);
            }
        }
    }

    fn retry_or_fail(&mut self, now: Instant, max_attempts: u8, failure: SyncFailure) {
        self.attempt_started = None;
        if self.attempts >= max_attempts {
            error!("{failure} after {} attempts", self.attempts);
            self.finish(SyncState::Failed(failure));
            return;
        }

        let delay = self.settings.backoff.delay(self.attempts);
        debug!("retrying in {} ms", delay.as_millis());
        self.retry_at = Some(now + delay);
    }

    /// Start a phase with a fresh attempt counter
    fn enter(&mut self, state: SyncState) {
        self.state = state;
        self.attempts = 0;
        self.attempt_started = None;
        self.retry_at = None;
    }

    fn finish(&mut self, state: SyncState) {
        self.state = state;
        self.attempt_started = None;
        self.retry_at = None;
    }
}
