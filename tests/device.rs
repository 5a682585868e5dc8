mod support;

mod tests {
    use fibonacci_clock::color::{BLACK, GREEN, MAGENTA, WHITE, YELLOW};
    use fibonacci_clock::config::Config;
    use fibonacci_clock::device::{
        DIAGNOSTIC_PIXELS, DeviceLoop, FAILURE_MIN_BRIGHTNESS, Peripherals, Phase, RunMode,
    };
    use fibonacci_clock::encoder::{SegmentSet, TimeValue, encode};
    use fibonacci_clock::error::{ConfigError, DeviceError, SyncFailure};
    use fibonacci_clock::input::{ButtonConfig, PolledButtons};
    use fibonacci_clock::layout::{DEFAULT_PINS, DEFAULT_SEGMENTS, StripLayout, Wiring};
    use fibonacci_clock::renderer::{StripOutputs, scale_color};
    use fibonacci_clock::sync::{SyncState, WifiCredentials};
    use fibonacci_clock::{Duration, Instant, Monotonic};

    use crate::support::{
        ConnectBehavior, FakeClock, FakeNetwork, FakePins, FakeTimeClient, RecordingStrip, ms,
    };

    /// 23:30 UTC, 07:30 at UTC+8
    const SYNCED_AT: u64 = 1_700_004_600;

    type TestDevice = DeviceLoop<
        RecordingStrip,
        FakeNetwork,
        FakeTimeClient,
        PolledButtons<FakePins>,
        FakeClock,
        64,
    >;

    struct Harness {
        device: TestDevice,
        strip: RecordingStrip,
        pins: FakePins,
        clock: FakeClock,
    }

    fn config(online: bool) -> Config {
        let layout =
            StripLayout::new(Wiring::SinglePin { pin: 2 }, &DEFAULT_SEGMENTS).unwrap();
        let mut config = Config::new(layout);
        if online {
            config.sync.credentials = Some(WifiCredentials {
                ssid: "home".try_into().unwrap(),
                password: "secret".try_into().unwrap(),
            });
        }
        config
    }

    fn harness(config: &Config, network: FakeNetwork, client: FakeTimeClient) -> Harness {
        let strip = RecordingStrip::default();
        let pins = FakePins::default();
        let clock = FakeClock::at(0);
        let peripherals = Peripherals {
            outputs: StripOutputs::Single(strip.clone()),
            network,
            time_client: client,
            inputs: PolledButtons::new(pins.clone(), &ButtonConfig::default()),
            clock: clock.clone(),
        };
        let Ok(device) = DeviceLoop::new(config, peripherals) else {
            panic!("device loop rejected a valid configuration");
        };
        Harness {
            device,
            strip,
            pins,
            clock,
        }
    }

    fn online_harness(config: &Config) -> Harness {
        harness(
            config,
            FakeNetwork::always(ConnectBehavior::Associate),
            FakeTimeClient::always(Ok(SYNCED_AT)),
        )
    }

    fn offline_harness(config: &Config) -> Harness {
        harness(
            config,
            FakeNetwork::always(ConnectBehavior::TimeOut),
            FakeTimeClient::always(Ok(SYNCED_AT)),
        )
    }

    fn tick(harness: &mut Harness, at: u64) {
        if harness.device.tick(ms(at)).is_err() {
            panic!("tick at {at} ms failed");
        }
    }

    fn face_at(timestamp: u64) -> SegmentSet {
        let local = fibonacci_clock::clock::local_time(timestamp, 480);
        let time = local.time_value();
        encode(time.hour12(), time.minute_bucket()).unwrap()
    }

    #[test_log::test]
    fn test_boot_shows_sweep_then_clock() {
        let config = config(true);
        let mut harness = online_harness(&config);
        assert_eq!(harness.device.phase(), Phase::Boot);

        tick(&mut harness, 0);
        assert_eq!(harness.device.phase(), Phase::Connecting);
        assert_eq!(harness.strip.count(), 1);
        assert!(harness.strip.last().unwrap().iter().all(|pixel| *pixel == BLACK));

        // Associated, first sweep frame
        tick(&mut harness, 150);
        assert_eq!(harness.device.phase(), Phase::Syncing);
        assert_eq!(harness.strip.count(), 2);
        // Sweep continues while the time is requested
        tick(&mut harness, 300);
        assert_eq!(harness.device.phase(), Phase::Syncing);
        assert_eq!(harness.strip.count(), 3);

        tick(&mut harness, 450);
        assert_eq!(harness.device.phase(), Phase::Running(RunMode::Online));
        assert_eq!(harness.clock.set_calls.borrow().as_slice(), &[SYNCED_AT]);
        assert!(matches!(harness.device.sync_state(), SyncState::Synced { .. }));
        assert_eq!(harness.strip.count(), 3);

        tick(&mut harness, 600);
        assert_eq!(harness.strip.count(), 4);
        let frame = harness.strip.last().unwrap();
        // The five segment is shared by hour and minute, drawn first on the strip
        assert_eq!(frame[0], scale_color(GREEN, 0.8));
        assert_eq!(frame.as_slice(), harness.device.frame());
    }

    #[test]
    fn test_face_matches_time() {
        let face = face_at(SYNCED_AT);
        assert!(face.shows(TimeValue::new(7, 6).unwrap()));
    }

    #[test]
    fn test_unchanged_face_is_not_retransmitted() {
        let mut config = config(true);
        config.animation.enabled = false;
        let mut harness = online_harness(&config);

        for at in (0..=400).step_by(100) {
            tick(&mut harness, at);
        }
        assert_eq!(harness.device.phase(), Phase::Running(RunMode::Online));
        // Blank at boot, then the face
        assert_eq!(harness.strip.count(), 2);

        for at in (500..=1500).step_by(100) {
            tick(&mut harness, at);
        }
        assert_eq!(harness.strip.count(), 2);

        // Next five-minute bucket
        harness.clock.advance(5 * 60);
        tick(&mut harness, 1600);
        assert_eq!(harness.strip.count(), 3);
    }

    #[test]
    fn test_button_press_retransmits() {
        let mut config = config(true);
        config.animation.enabled = false;
        let mut harness = online_harness(&config);

        for at in (0..=400).step_by(100) {
            tick(&mut harness, at);
        }
        assert_eq!(harness.strip.count(), 2);

        harness.pins.press(config.buttons.increase_pin);
        tick(&mut harness, 500);
        assert_eq!(harness.strip.count(), 2);
        tick(&mut harness, 600);
        assert!((harness.device.brightness().level() - 0.9).abs() < 1e-4);
        assert_eq!(harness.strip.count(), 3);

        // Held down, nothing more
        tick(&mut harness, 700);
        tick(&mut harness, 800);
        assert_eq!(harness.strip.count(), 3);
    }

    #[test]
    fn test_buttons_work_while_booting() {
        let config = config(false);
        let mut harness = offline_harness(&config);

        tick(&mut harness, 0);
        harness.pins.press(config.buttons.decrease_pin);
        tick(&mut harness, 100);
        tick(&mut harness, 200);
        assert!(matches!(harness.device.phase(), Phase::Failing(_)));
        assert!((harness.device.brightness().level() - 0.7).abs() < 1e-4);
    }

    #[test_log::test]
    fn test_failure_pulse_then_offline() {
        let config = config(false);
        let mut harness = offline_harness(&config);
        harness.clock.advance(SYNCED_AT);

        tick(&mut harness, 0);
        tick(&mut harness, 150);
        assert_eq!(
            harness.device.phase(),
            Phase::Failing(SyncFailure::NetworkFailure)
        );
        assert_eq!(harness.strip.count(), 1);

        let pulse_frames = usize::from(config.animation.failure_pulses) * 8;
        let mut at = 150;
        for _ in 0..pulse_frames {
            at += 150;
            tick(&mut harness, at);
            assert!(matches!(harness.device.phase(), Phase::Failing(_)));
        }
        assert_eq!(harness.strip.count(), 1 + pulse_frames);

        at += 150;
        tick(&mut harness, at);
        assert_eq!(harness.device.phase(), Phase::Running(RunMode::Offline));
        assert!(harness.strip.last().unwrap().iter().all(|pixel| *pixel == BLACK));

        // Offline still shows the local clock
        at += 100;
        tick(&mut harness, at);
        assert_eq!(harness.strip.count(), 3 + pulse_frames);
        assert_eq!(harness.strip.last().unwrap()[0], scale_color(GREEN, 0.8));
        assert!(harness.clock.set_calls.borrow().is_empty());
    }

    #[test]
    fn test_failure_pulse_plays_without_sweep() {
        let mut config = config(false);
        config.animation.enabled = false;
        let mut harness = offline_harness(&config);

        tick(&mut harness, 0);
        tick(&mut harness, 150);
        assert_eq!(
            harness.device.phase(),
            Phase::Failing(SyncFailure::NetworkFailure)
        );
        assert_eq!(harness.strip.count(), 1);

        let pulse_frames = usize::from(config.animation.failure_pulses) * 8;
        let mut at = 150;
        for frame in 0..pulse_frames {
            at += 150;
            tick(&mut harness, at);
            assert!(matches!(harness.device.phase(), Phase::Failing(_)));
            if frame == 4 {
                let pixels = harness.strip.last().unwrap();
                assert!(pixels.iter().all(|pixel| *pixel == scale_color(YELLOW, 0.8)));
            }
        }
        assert_eq!(harness.strip.count(), 1 + pulse_frames);

        at += 150;
        tick(&mut harness, at);
        assert_eq!(harness.device.phase(), Phase::Running(RunMode::Offline));
    }

    #[test]
    fn test_failure_pulse_visible_when_dimmed() {
        let mut config = config(false);
        config.brightness = 0.0;
        let mut harness = offline_harness(&config);

        tick(&mut harness, 0);
        tick(&mut harness, 150);
        let mut at = 150;
        for _ in 0..5 {
            at += 150;
            tick(&mut harness, at);
        }

        // Fifth pulse frame is the peak of the first pulse
        let pixels = harness.strip.last().unwrap();
        let peak = scale_color(YELLOW, FAILURE_MIN_BRIGHTNESS);
        assert_ne!(peak, BLACK);
        assert!(pixels.iter().all(|pixel| *pixel == peak));
        assert_eq!(harness.device.brightness().level(), 0.0);
    }

    #[test]
    fn test_tick_intervals() {
        let mut config = config(true);
        config.animation.enabled = false;
        let mut harness = online_harness(&config);

        let boot = harness.device.tick(ms(0)).ok().unwrap();
        assert_eq!(boot.next_deadline, ms(0) + config.animation.frame_interval);

        for at in [150, 300, 450] {
            tick(&mut harness, at);
        }
        assert_eq!(harness.device.phase(), Phase::Running(RunMode::Online));
        let running = harness.device.tick(ms(550)).ok().unwrap();
        assert_eq!(running.sleep_duration, Duration::from_millis(100));
    }

    #[test]
    fn test_wiring_mismatch_shows_config_error() {
        let layout = StripLayout::new(
            Wiring::MultiPin { pins: DEFAULT_PINS },
            &DEFAULT_SEGMENTS,
        )
        .unwrap();
        let config = Config::new(layout);
        let strip = RecordingStrip::default();
        let peripherals = Peripherals {
            outputs: StripOutputs::Single(strip.clone()),
            network: FakeNetwork::always(ConnectBehavior::Associate),
            time_client: FakeTimeClient::always(Ok(SYNCED_AT)),
            inputs: PolledButtons::new(FakePins::default(), &ButtonConfig::default()),
            clock: FakeClock::default(),
        };

        let result: Result<TestDevice, _> = DeviceLoop::new(&config, peripherals);
        assert!(matches!(
            result.err(),
            Some(DeviceError::Config(ConfigError::WiringMismatch {
                expected: 5,
                provided: 1
            }))
        ));
        assert_eq!(strip.last().unwrap(), vec![MAGENTA; DIAGNOSTIC_PIXELS]);
    }

    struct FakeTimer {
        now: Instant,
        sleeps: usize,
    }

    impl Monotonic for FakeTimer {
        fn now(&self) -> Instant {
            self.now
        }

        fn sleep_until(&mut self, deadline: Instant) {
            self.sleeps += 1;
            self.now = self.now.max(deadline);
        }
    }

    #[test_log::test]
    fn test_strip_failure_halts() {
        let mut config = config(true);
        config.animation.enabled = false;
        let harness = online_harness(&config);
        let strip = harness.strip.clone();
        let mut timer = FakeTimer {
            now: ms(0),
            sleeps: 0,
        };

        strip.set_failing(true);
        let result = harness.device.run(&mut timer);
        assert!(matches!(result, Err(DeviceError::HardwareFault)));
        assert_eq!(timer.sleeps, 0);

        let last = strip.last().unwrap();
        assert_eq!(last.len(), 53);
        assert!(last.iter().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn test_write_failure_fails_the_tick() {
        let mut config = config(true);
        config.animation.enabled = false;
        let mut harness = online_harness(&config);

        for at in (0..=400).step_by(100) {
            tick(&mut harness, at);
        }
        harness.strip.set_failing(true);
        harness.clock.advance(5 * 60);
        assert!(matches!(
            harness.device.tick(ms(500)),
            Err(DeviceError::HardwareFault)
        ));
    }
}
