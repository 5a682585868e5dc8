#![no_std]

pub mod animation;
pub mod brightness;
pub mod clock;
pub mod color;
pub mod config;
pub mod device;
pub mod encoder;
pub mod error;
pub mod input;
pub mod latch;
pub mod layout;
pub mod logging;
pub mod math8;
pub mod renderer;
pub mod sync;
pub mod ticker;

pub use animation::{AnimationKind, AnimationPlayer, Frames};
pub use brightness::BrightnessController;
pub use clock::{ClockSource, LocalTime, Monotonic, Timestamp};
pub use config::Config;
pub use device::{DeviceLoop, Peripherals, Phase, RunMode, report_config_error};
pub use encoder::{Role, SegmentSet, TimeValue, encode};
pub use error::{ConfigError, DeviceError, EncodingError, FetchError, SyncFailure};
pub use input::{ButtonEdge, EdgeSource, InputPins, PolledButtons};
pub use latch::EdgeLatch;
pub use layout::{StripLayout, Wiring};
pub use renderer::{ClockRenderer, StripOutputs};
pub use sync::{NetworkStack, SyncOutcome, SyncState, TimeProtocolClient, TimeSyncManager};
pub use ticker::Ticker;

pub use color::{ColorMap, Rgb};
pub use embassy_time::{Duration, Instant};

/// Abstract LED strip driver
///
/// Implement this trait to support different hardware platforms.
/// The device loop is generic over this trait.
pub trait StripDriver {
    type Error: core::fmt::Debug;

    /// Write colors to one output line
    fn write(&mut self, colors: &[Rgb]) -> Result<(), Self::Error>;
}
