//! Boot configuration
//!
//! Loaded once from a JSON document and read-only afterwards. Only the
//! layout is required, everything else has a default. Unknown keys and
//! out-of-range values are rejected so a typo never drives the wrong pins.
//!
//! ```json
//! {
//!   "wifi": { "ssid": "home", "password": "secret" },
//!   "timezone_offset_minutes": 480,
//!   "brightness": 0.8,
//!   "layout": {
//!     "wiring": "multi_pin",
//!     "pins": [1, 2, 3, 4, 5],
//!     "segments": [
//!       { "value": 5, "leds": 32 },
//!       { "value": 3, "leds": 12 },
//!       { "value": 2, "leds": 5 },
//!       { "value": 1, "leds": 2 },
//!       { "value": 1, "leds": 2 }
//!     ]
//!   }
//! }
//! ```

use embassy_time::Duration;
use heapless::{String, Vec};
use serde::Deserialize;

use crate::animation::{
    DEFAULT_FAILURE_COLOR, DEFAULT_FAILURE_PULSES, DEFAULT_SWEEP_COLORS, MAX_SWEEP_COLORS,
    SweepColors,
};
use crate::brightness::{DEFAULT_BRIGHTNESS, DEFAULT_STEP, MIN_STEP};
use crate::color::{Palette, Rgb};
use crate::encoder::SEGMENT_COUNT;
use crate::error::ConfigError;
use crate::input::ButtonConfig;
use crate::layout::{PhysicalSegment, StripLayout, Wiring};
use crate::logging::info;
use crate::sync::{
    Backoff, MAX_HOST_LEN, MAX_PASSWORD_LEN, MAX_SSID_LEN, SyncSettings, WifiCredentials,
};
use crate::ticker::{DEFAULT_FRAME_INTERVAL, DEFAULT_TICK_INTERVAL};

/// Largest timezone offset accepted, in minutes
pub const MAX_TIMEZONE_OFFSET_MINUTES: i32 = 14 * 60;

/// Shortest accepted tick or frame interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Longest accepted tick or frame interval
pub const MAX_INTERVAL: Duration = Duration::from_millis(1000);

/// Boot animation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Show the connecting sweep; the failure pulse is always shown
    pub enabled: bool,
    pub colors: SweepColors,
    pub frame_interval: Duration,
    pub failure_color: Rgb,
    pub failure_pulses: u8,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colors: Vec::from_slice(&DEFAULT_SWEEP_COLORS).unwrap_or_default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            failure_color: DEFAULT_FAILURE_COLOR,
            failure_pulses: DEFAULT_FAILURE_PULSES,
        }
    }
}

/// Validated device configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub brightness: f32,
    pub brightness_step: f32,
    pub layout: StripLayout,
    pub palette: Palette,
    pub animation: AnimationConfig,
    pub sync: SyncSettings,
    pub buttons: ButtonConfig,
    pub tick_interval: Duration,
}

impl Config {
    /// Defaults for everything but the layout
    pub fn new(layout: StripLayout) -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            brightness_step: DEFAULT_STEP,
            layout,
            palette: Palette::default(),
            animation: AnimationConfig::default(),
            sync: SyncSettings::default(),
            buttons: ButtonConfig::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        let (raw, _) =
            serde_json_core::from_slice::<RawConfig>(json).map_err(ConfigError::Malformed)?;
        let config = raw.into_config()?;
        config.validate()?;

        info!(
            "configuration loaded: {} pixels, {} output lines",
            config.layout.total_pixels(),
            config.layout.wiring().line_count()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        use ConfigError::OutOfRange;

        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(OutOfRange("brightness"));
        }
        if self.brightness_step.is_nan()
            || self.brightness_step < MIN_STEP
            || self.brightness_step > 1.0
        {
            return Err(OutOfRange("brightness_step"));
        }
        if !interval_in_range(self.tick_interval) {
            return Err(OutOfRange("tick_ms"));
        }
        if let Wiring::MultiPin { pins } = self.layout.wiring()
            && has_duplicates(&pins)
        {
            return Err(OutOfRange("layout.pins"));
        }

        let animation = &self.animation;
        if animation.colors.is_empty() {
            return Err(OutOfRange("animation.colors"));
        }
        if !interval_in_range(animation.frame_interval) {
            return Err(OutOfRange("animation.frame_ms"));
        }
        if animation.failure_pulses == 0 {
            return Err(OutOfRange("animation.failure_pulses"));
        }

        let sync = &self.sync;
        if sync.timezone_offset_minutes.unsigned_abs() > MAX_TIMEZONE_OFFSET_MINUTES.unsigned_abs() {
            return Err(OutOfRange("timezone_offset_minutes"));
        }
        if sync.ntp_host.is_empty() {
            return Err(OutOfRange("sync.ntp_host"));
        }
        if sync.connect_attempts == 0 {
            return Err(OutOfRange("sync.connect_attempts"));
        }
        if sync.sync_attempts == 0 {
            return Err(OutOfRange("sync.sync_attempts"));
        }
        if sync.connect_timeout.as_millis() == 0 {
            return Err(OutOfRange("sync.connect_timeout_ms"));
        }
        if sync.sync_timeout.as_millis() == 0 {
            return Err(OutOfRange("sync.sync_timeout_ms"));
        }
        if sync.backoff.base().as_millis() == 0 {
            return Err(OutOfRange("sync.backoff_ms"));
        }
        if sync.startup_timeout.as_millis() == 0 {
            return Err(OutOfRange("sync.startup_timeout_ms"));
        }

        if self.buttons.decrease_pin == self.buttons.increase_pin {
            return Err(OutOfRange("buttons"));
        }

        Ok(())
    }
}

fn interval_in_range(interval: Duration) -> bool {
    (MIN_INTERVAL..=MAX_INTERVAL).contains(&interval)
}

fn has_duplicates(pins: &[u8]) -> bool {
    pins.iter()
        .enumerate()
        .any(|(index, pin)| pins[index + 1..].contains(pin))
}

type RawColor = [u8; 3];

fn color(raw: RawColor) -> Rgb {
    Rgb::new(raw[0], raw[1], raw[2])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawWiring {
    MultiPin,
    SinglePin,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWifi {
    ssid: Option<String<MAX_SSID_LEN>>,
    password: Option<String<MAX_PASSWORD_LEN>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLayout {
    wiring: Option<RawWiring>,
    pins: Option<[u8; SEGMENT_COUNT]>,
    data_pin: Option<u8>,
    /// Room for one extra entry so a wrong count is reported as such
    segments: Option<Vec<PhysicalSegment, { SEGMENT_COUNT + 1 }>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPalette {
    hour: Option<RawColor>,
    minute: Option<RawColor>,
    both: Option<RawColor>,
    off: Option<RawColor>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnimation {
    enabled: Option<bool>,
    colors: Option<Vec<RawColor, MAX_SWEEP_COLORS>>,
    frame_ms: Option<u64>,
    failure_color: Option<RawColor>,
    failure_pulses: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSync {
    ntp_host: Option<String<MAX_HOST_LEN>>,
    connect_attempts: Option<u8>,
    connect_timeout_ms: Option<u64>,
    sync_attempts: Option<u8>,
    sync_timeout_ms: Option<u64>,
    backoff_ms: Option<u64>,
    backoff_max_ms: Option<u64>,
    startup_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawButtons {
    decrease_pin: Option<u8>,
    increase_pin: Option<u8>,
    debounce_ms: Option<u64>,
    min_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    wifi: Option<RawWifi>,
    timezone_offset_minutes: Option<i32>,
    brightness: Option<f32>,
    brightness_step: Option<f32>,
    layout: Option<RawLayout>,
    palette: Option<RawPalette>,
    animation: Option<RawAnimation>,
    sync: Option<RawSync>,
    buttons: Option<RawButtons>,
    tick_ms: Option<u64>,
}

impl RawLayout {
    fn into_layout(self) -> Result<StripLayout, ConfigError> {
        let wiring = match self.wiring.ok_or(ConfigError::Missing("layout.wiring"))? {
            RawWiring::MultiPin => Wiring::MultiPin {
                pins: self.pins.ok_or(ConfigError::Missing("layout.pins"))?,
            },
            RawWiring::SinglePin => Wiring::SinglePin {
                pin: self.data_pin.ok_or(ConfigError::Missing("layout.data_pin"))?,
            },
        };

        let segments = self
            .segments
            .ok_or(ConfigError::Missing("layout.segments"))?;
        let segments: [PhysicalSegment; SEGMENT_COUNT] = segments
            .as_slice()
            .try_into()
            .map_err(|_| ConfigError::OutOfRange("layout.segments"))?;

        StripLayout::new(wiring, &segments)
    }
}

impl RawConfig {
    fn into_config(self) -> Result<Config, ConfigError> {
        let layout = self
            .layout
            .ok_or(ConfigError::Missing("layout"))?
            .into_layout()?;
        let mut config = Config::new(layout);

        if let Some(brightness) = self.brightness {
            config.brightness = brightness;
        }
        if let Some(step) = self.brightness_step {
            config.brightness_step = step;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval = Duration::from_millis(tick_ms);
        }
        if let Some(offset) = self.timezone_offset_minutes {
            config.sync.timezone_offset_minutes = offset;
        }

        if let Some(wifi) = self.wifi {
            // An empty SSID means offline, like a missing section
            config.sync.credentials = wifi
                .ssid
                .filter(|ssid| !ssid.is_empty())
                .map(|ssid| WifiCredentials {
                    ssid,
                    password: wifi.password.unwrap_or_default(),
                });
        }

        if let Some(palette) = self.palette {
            let target = &mut config.palette;
            target.hour = palette.hour.map_or(target.hour, color);
            target.minute = palette.minute.map_or(target.minute, color);
            target.both = palette.both.map_or(target.both, color);
            target.off = palette.off.map_or(target.off, color);
        }

        if let Some(animation) = self.animation {
            let target = &mut config.animation;
            target.enabled = animation.enabled.unwrap_or(target.enabled);
            if let Some(colors) = animation.colors {
                target.colors = colors.iter().copied().map(color).collect();
            }
            if let Some(frame_ms) = animation.frame_ms {
                target.frame_interval = Duration::from_millis(frame_ms);
            }
            target.failure_color = animation.failure_color.map_or(target.failure_color, color);
            target.failure_pulses = animation.failure_pulses.unwrap_or(target.failure_pulses);
        }

        if let Some(sync) = self.sync {
            apply_sync(&mut config.sync, sync);
        }

        if let Some(buttons) = self.buttons {
            let target = &mut config.buttons;
            target.decrease_pin = buttons.decrease_pin.unwrap_or(target.decrease_pin);
            target.increase_pin = buttons.increase_pin.unwrap_or(target.increase_pin);
            if let Some(debounce_ms) = buttons.debounce_ms {
                target.timings.stable = Duration::from_millis(debounce_ms);
            }
            if let Some(min_interval_ms) = buttons.min_interval_ms {
                target.timings.min_interval = Duration::from_millis(min_interval_ms);
            }
        }

        Ok(config)
    }
}

fn apply_sync(target: &mut SyncSettings, sync: RawSync) {
    if let Some(host) = sync.ntp_host {
        target.ntp_host = host;
    }
    target.connect_attempts = sync.connect_attempts.unwrap_or(target.connect_attempts);
    target.sync_attempts = sync.sync_attempts.unwrap_or(target.sync_attempts);

    let millis = |value: Option<u64>, current: Duration| value.map_or(current, Duration::from_millis);
    target.connect_timeout = millis(sync.connect_timeout_ms, target.connect_timeout);
    target.sync_timeout = millis(sync.sync_timeout_ms, target.sync_timeout);
    target.startup_timeout = millis(sync.startup_timeout_ms, target.startup_timeout);

    let base = millis(sync.backoff_ms, target.backoff.base());
    let max = millis(sync.backoff_max_ms, target.backoff.max());
    target.backoff = Backoff::new(base, max.max(base));
}
