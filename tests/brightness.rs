mod tests {
    use fibonacci_clock::brightness::{BrightnessController, DEFAULT_BRIGHTNESS};
    use fibonacci_clock::input::{Button, ButtonEdge};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_default_level() {
        let controller = BrightnessController::default();
        assert!(approx(controller.level(), DEFAULT_BRIGHTNESS));
    }

    #[test]
    fn test_initial_level_is_clamped() {
        assert!(approx(BrightnessController::new(1.7, 0.1).level(), 1.0));
        assert!(approx(BrightnessController::new(-0.3, 0.1).level(), 0.0));
        assert!(approx(BrightnessController::new(f32::NAN, 0.1).level(), 0.0));
    }

    #[test]
    fn test_increase_stops_at_full() {
        let mut controller = BrightnessController::new(0.8, 0.1);
        assert!(controller.increase());
        assert!(controller.increase());
        assert!(approx(controller.level(), 1.0));
        assert!(!controller.increase());
        assert!(approx(controller.level(), 1.0));
    }

    #[test]
    fn test_decrease_stops_at_zero() {
        let mut controller = BrightnessController::new(0.05, 0.1);
        assert!(controller.decrease());
        assert!(approx(controller.level(), 0.0));
        assert!(!controller.decrease());
    }

    #[test]
    fn test_steps_do_not_drift() {
        let mut controller = BrightnessController::new(0.0, 0.1);
        for _ in 0..10 {
            assert!(controller.increase());
        }
        assert!(approx(controller.level(), 1.0));
        assert!(!controller.increase());

        for _ in 0..10 {
            assert!(controller.decrease());
        }
        assert_eq!(controller.level(), 0.0);
    }

    #[test]
    fn test_level_stays_in_range() {
        let mut controller = BrightnessController::new(0.5, 0.3);
        for step in 0..50 {
            if step % 3 == 0 {
                controller.decrease();
            } else {
                controller.increase();
            }
            assert!((0.0..=1.0).contains(&controller.level()));
        }
    }

    #[test_log::test]
    fn test_apply_edges() {
        let mut controller = BrightnessController::new(0.5, 0.1);
        let decrease = ButtonEdge::Pressed {
            button: Button::Decrease,
            pin: 6,
        };
        let increase = ButtonEdge::Pressed {
            button: Button::Increase,
            pin: 7,
        };

        assert!(controller.apply(decrease));
        assert!(approx(controller.level(), 0.4));
        assert!(controller.apply(increase));
        assert!(controller.apply(increase));
        assert!(approx(controller.level(), 0.6));
    }
}
