//! Brightness button input
//!
//! Buttons are wired with pull-ups, so a low level means pressed. Levels are
//! sampled once per tick and turned into debounced [`ButtonEdge`]s.

use embassy_time::{Duration, Instant};

/// Default GPIO of the decrease button
pub const DEFAULT_DECREASE_PIN: u8 = 6;

/// Default GPIO of the increase button
pub const DEFAULT_INCREASE_PIN: u8 = 7;

/// Default time the input must stay low before a press is recognized
pub const DEFAULT_STABLE_TIME: Duration = Duration::from_millis(30);

/// Default minimum time between two recognized presses
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Raw GPIO level reader
pub trait InputPins {
    /// Read the pin level, `true` is high
    fn read_level(&mut self, pin: u8) -> bool;
}

/// Source of debounced button edges, consumed once per tick
pub trait EdgeSource {
    fn next_edge(&mut self, now: Instant) -> Option<ButtonEdge>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Decrease,
    Increase,
}

/// Debounced press of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEdge {
    Pressed { button: Button, pin: u8 },
}

impl ButtonEdge {
    pub const fn button(self) -> Button {
        match self {
            Self::Pressed { button, .. } => button,
        }
    }

    pub const fn pin(self) -> u8 {
        match self {
            Self::Pressed { pin, .. } => pin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimings {
    /// How long the input must stay low
    pub stable: Duration,
    /// Minimum spacing of recognized presses
    pub min_interval: Duration,
}

impl Default for DebounceTimings {
    fn default() -> Self {
        Self {
            stable: DEFAULT_STABLE_TIME,
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

/// Falling-edge debouncer for one button
#[derive(Debug, Clone)]
pub struct Debouncer {
    button: Button,
    pin: u8,
    timings: DebounceTimings,
    low_since: Option<Instant>,
    armed: bool,
    last_press: Option<Instant>,
}

impl Debouncer {
    pub const fn new(button: Button, pin: u8, timings: DebounceTimings) -> Self {
        Self {
            button,
            pin,
            timings,
            low_since: None,
            // Held at boot does not count as a press
            armed: false,
            last_press: None,
        }
    }

    pub const fn pin(&self) -> u8 {
        self.pin
    }

    /// Feed one level sample, returns an edge when a press is recognized
    ///
    /// A press needs a release first, then a low level lasting at least the
    /// stable time. A press too close to the previous one is dropped and
    /// needs a fresh release.
    pub fn update(&mut self, level: bool, now: Instant) -> Option<ButtonEdge> {
        if level {
            self.low_since = None;
            self.armed = true;
            return None;
        }

        let low_since = *self.low_since.get_or_insert(now);
        if !self.armed || now.saturating_duration_since(low_since) < self.timings.stable {
            return None;
        }
        self.armed = false;

        if let Some(last) = self.last_press
            && now.saturating_duration_since(last) < self.timings.min_interval
        {
            return None;
        }
        self.last_press = Some(now);

        Some(ButtonEdge::Pressed {
            button: self.button,
            pin: self.pin,
        })
    }

    /// Read the pin and feed the sample
    pub fn sample<P: InputPins>(&mut self, pins: &mut P, now: Instant) -> Option<ButtonEdge> {
        let level = pins.read_level(self.pin);
        self.update(level, now)
    }
}

/// Button pins and debounce settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonConfig {
    pub decrease_pin: u8,
    pub increase_pin: u8,
    pub timings: DebounceTimings,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            decrease_pin: DEFAULT_DECREASE_PIN,
            increase_pin: DEFAULT_INCREASE_PIN,
            timings: DebounceTimings::default(),
        }
    }
}

/// Polls both brightness buttons
///
/// Both buttons are sampled every tick. When both fire in the same tick the
/// decrease button wins and the increase press is dropped.
#[derive(Debug, Clone)]
pub struct ButtonPoller {
    decrease: Debouncer,
    increase: Debouncer,
}

impl ButtonPoller {
    pub const fn new(config: &ButtonConfig) -> Self {
        Self {
            decrease: Debouncer::new(Button::Decrease, config.decrease_pin, config.timings),
            increase: Debouncer::new(Button::Increase, config.increase_pin, config.timings),
        }
    }

    pub fn poll<P: InputPins>(&mut self, pins: &mut P, now: Instant) -> Option<ButtonEdge> {
        let decrease = self.decrease.sample(pins, now);
        let increase = self.increase.sample(pins, now);
        decrease.or(increase)
    }
}

/// Polled buttons on a set of input pins
pub struct PolledButtons<P: InputPins> {
    pins: P,
    poller: ButtonPoller,
}

impl<P: InputPins> PolledButtons<P> {
    pub const fn new(pins: P, config: &ButtonConfig) -> Self {
        Self {
            pins,
            poller: ButtonPoller::new(config),
        }
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }
}

impl<P: InputPins> EdgeSource for PolledButtons<P> {
    fn next_edge(&mut self, now: Instant) -> Option<ButtonEdge> {
        self.poller.poll(&mut self.pins, now)
    }
}
