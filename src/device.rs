//! Top-level device state machine
//!
//! `Boot -> Connecting -> Syncing -> (Failing) -> Running`. One phase owns
//! the strip at a time: the animation player while booting, the clock face
//! afterwards. Buttons are polled on every tick in every phase.

use core::convert::Infallible;

use embassy_time::{Duration, Instant};

use crate::StripDriver;
use crate::animation::{AnimationKind, AnimationPlayer, Frames};
use crate::brightness::BrightnessController;
use crate::clock::{ClockSource, Monotonic, local_time};
use crate::color::{MAGENTA, Rgb, WHITE};
use crate::config::Config;
use crate::encoder::{SegmentSet, encode_or_blank};
use crate::error::{ConfigError, DeviceError, SyncFailure};
use crate::input::EdgeSource;
use crate::logging::{debug, error, info, warn};
use crate::renderer::{ClockRenderer, StripOutputs};
use crate::sync::{NetworkStack, SyncState, TimeProtocolClient, TimeSyncManager};
use crate::ticker::{TickResult, Ticker};

/// Shown at the start of every line when the configuration is rejected
pub const CONFIG_ERROR_COLOR: Rgb = MAGENTA;

/// Shown on the whole strip before halting on a hardware fault
pub const HARDWARE_FAULT_COLOR: Rgb = WHITE;

/// Pixels lit by the configuration error signal, fits the smallest segment
pub const DIAGNOSTIC_PIXELS: usize = 2;

/// Lowest brightness the failure pulse is shown at, so a dimmed clock still
/// shows it
pub const FAILURE_MIN_BRIGHTNESS: f32 = 0.5;

/// Show the configuration error signal
///
/// The layout is unknown at this point, so only the first pixels of every
/// line are lit.
pub fn report_config_error<D: StripDriver>(outputs: &mut StripOutputs<D>, error: &ConfigError) {
    error!("configuration rejected: {error}");
    if let Err(write_error) = outputs.write_each(&[CONFIG_ERROR_COLOR; DIAGNOSTIC_PIXELS]) {
        error!("cannot show configuration error: {:?}", write_error);
    }
}

/// Hardware and services the device loop drives
pub struct Peripherals<D: StripDriver, N, T, E, C> {
    pub outputs: StripOutputs<D>,
    pub network: N,
    pub time_client: T,
    pub inputs: E,
    pub clock: C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Clock was synced at boot
    Online,
    /// Sync failed, the local clock is best-effort
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Boot,
    Connecting,
    Syncing,
    /// Playing the failure indication
    Failing(SyncFailure),
    Running(RunMode),
    /// Stopped after a hardware fault
    Halted,
}

/// The clock device
pub struct DeviceLoop<D, N, T, E, C, const MAX_PIXELS: usize>
where
    D: StripDriver,
    N: NetworkStack,
    T: TimeProtocolClient,
    E: EdgeSource,
    C: ClockSource,
{
    peripherals: Peripherals<D, N, T, E, C>,
    renderer: ClockRenderer<MAX_PIXELS>,
    brightness: BrightnessController,
    animations: AnimationPlayer,
    sync: TimeSyncManager,
    frames: Option<Frames>,
    phase: Phase,
    ticker: Ticker,
    animation_enabled: bool,
    timezone_offset_minutes: i32,
    tick_interval: Duration,
    frame_interval: Duration,
    /// Face and brightness last sent to the strip
    shown: Option<(SegmentSet, f32)>,
}

impl<D, N, T, E, C, const MAX_PIXELS: usize> DeviceLoop<D, N, T, E, C, MAX_PIXELS>
where
    D: StripDriver,
    N: NetworkStack,
    T: TimeProtocolClient,
    E: EdgeSource,
    C: ClockSource,
{
    /// Create the device loop
    ///
    /// Output drivers that do not match the configured wiring, or a layout
    /// larger than the frame buffer, are reported with the configuration
    /// error signal.
    pub fn new(
        config: &Config,
        mut peripherals: Peripherals<D, N, T, E, C>,
    ) -> Result<Self, DeviceError> {
        let expected = config.layout.wiring().line_count();
        let provided = peripherals.outputs.line_count();
        let renderer = if expected == provided {
            ClockRenderer::new(config.layout, config.palette)
        } else {
            Err(ConfigError::WiringMismatch { expected, provided })
        };
        let renderer = match renderer {
            Ok(renderer) => renderer,
            Err(error) => {
                report_config_error(&mut peripherals.outputs, &error);
                return Err(error.into());
            }
        };

        let animations = AnimationPlayer::new(
            config.animation.colors.clone(),
            config.layout.physical_order(),
        )
        .with_failure(config.animation.failure_color, config.animation.failure_pulses);

        Ok(Self {
            peripherals,
            renderer,
            brightness: BrightnessController::new(config.brightness, config.brightness_step),
            animations,
            sync: TimeSyncManager::new(config.sync.clone()),
            frames: None,
            phase: Phase::Boot,
            ticker: Ticker::new(),
            animation_enabled: config.animation.enabled,
            timezone_offset_minutes: config.sync.timezone_offset_minutes,
            tick_interval: config.tick_interval,
            frame_interval: config.animation.frame_interval,
            shown: None,
        })
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn brightness(&self) -> &BrightnessController {
        &self.brightness
    }

    pub const fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    pub const fn peripherals(&self) -> &Peripherals<D, N, T, E, C> {
        &self.peripherals
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<D, N, T, E, C> {
        &mut self.peripherals
    }

    /// Last frame written to the strip
    pub fn frame(&self) -> &[Rgb] {
        self.renderer.frame()
    }

    /// Run one tick and return when the next one is due
    pub fn tick(&mut self, now: Instant) -> Result<TickResult, DeviceError> {
        if self.phase == Phase::Halted {
            return Err(DeviceError::HardwareFault);
        }

        if let Some(edge) = self.peripherals.inputs.next_edge(now) {
            self.brightness.apply(edge);
        }

        match self.phase {
            Phase::Boot => self.boot()?,
            Phase::Connecting | Phase::Syncing => self.step_sync(now)?,
            Phase::Failing(_) => self.step_failure()?,
            Phase::Running(_) => self.step_clock()?,
            Phase::Halted => {}
        }

        let interval = match self.phase {
            Phase::Running(_) => self.tick_interval,
            _ => self.frame_interval,
        };
        Ok(self.ticker.advance(now, interval))
    }

    /// Tick forever, returns only on a hardware fault
    ///
    /// The fault signal is written before returning.
    pub fn run<M: Monotonic>(mut self, timer: &mut M) -> Result<Infallible, DeviceError> {
        loop {
            match self.tick(timer.now()) {
                Ok(tick) => timer.sleep_until(tick.next_deadline),
                Err(error) => {
                    self.halt(&error);
                    return Err(error);
                }
            }
        }
    }

    fn boot(&mut self) -> Result<(), DeviceError> {
        info!("booting");
        self.show_blank()?;
        self.frames = self
            .animation_enabled
            .then(|| self.animations.frames(AnimationKind::Connecting));
        self.phase = Phase::Connecting;
        Ok(())
    }

    fn step_sync(&mut self, now: Instant) -> Result<(), DeviceError> {
        let state = self.sync.poll(
            now,
            &mut self.peripherals.network,
            &mut self.peripherals.time_client,
        );

        match state {
            SyncState::Synced {
                timestamp,
                offset_minutes,
            } => {
                self.peripherals.clock.set(timestamp);
                info!("clock set to {timestamp} with offset {offset_minutes} min");
                self.frames = None;
                self.phase = Phase::Running(RunMode::Online);
            }
            SyncState::Failed(failure) => {
                error!("{failure}, falling back to the local clock");
                self.frames = Some(self.animations.frames(AnimationKind::Failure));
                self.phase = Phase::Failing(failure);
            }
            SyncState::Associated | SyncState::Syncing => {
                self.phase = Phase::Syncing;
                self.advance_animation()?;
            }
            SyncState::Idle | SyncState::Connecting => {
                self.phase = Phase::Connecting;
                self.advance_animation()?;
            }
        }
        Ok(())
    }

    fn step_failure(&mut self) -> Result<(), DeviceError> {
        if self.advance_animation()? {
            return Ok(());
        }
        warn!("running offline, the displayed time may be wrong");
        self.frames = None;
        self.phase = Phase::Running(RunMode::Offline);
        self.show_blank()
    }

    fn step_clock(&mut self) -> Result<(), DeviceError> {
        let local = local_time(self.peripherals.clock.now(), self.timezone_offset_minutes);
        let face = encode_or_blank(local.time_value());
        let brightness = self.brightness.level();

        if self.shown == Some((face, brightness)) {
            return Ok(());
        }

        debug!(
            "showing {:02}:{:02} at brightness {:.1}",
            local.hour, local.minute, brightness
        );
        self.renderer.render(&face, brightness);
        self.transmit()?;
        self.shown = Some((face, brightness));
        Ok(())
    }

    /// Show the next animation frame, returns false once the animation is over
    fn advance_animation(&mut self) -> Result<bool, DeviceError> {
        let Some(frames) = self.frames.as_mut() else {
            return Ok(false);
        };
        let kind = frames.kind();
        let Some(colors) = frames.next() else {
            return Ok(false);
        };

        let brightness = match kind {
            AnimationKind::Connecting => self.brightness.level(),
            AnimationKind::Failure => self.brightness.level().max(FAILURE_MIN_BRIGHTNESS),
        };
        self.renderer.render_colors(&colors, brightness);
        self.transmit()?;
        Ok(true)
    }

    fn show_blank(&mut self) -> Result<(), DeviceError> {
        self.renderer.render(&SegmentSet::blank(), 0.0);
        self.shown = None;
        self.transmit()
    }

    fn transmit(&mut self) -> Result<(), DeviceError> {
        let frame = self.renderer.frame();
        self.peripherals
            .outputs
            .transmit(self.renderer.layout(), frame)
            .map_err(|error| {
                error!("LED strip write failed: {:?}", error);
                DeviceError::HardwareFault
            })
    }

    fn halt(&mut self, error: &DeviceError) {
        error!("halting: {error}");
        self.phase = Phase::Halted;
        self.frames = None;
        self.renderer.render_solid(HARDWARE_FAULT_COLOR, 1.0);
        if self.transmit().is_err() {
            error!("cannot show hardware fault signal");
        }
    }
}
