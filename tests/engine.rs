mod tests {
    use car_light_composer::color::{AMBER, BLUE, Rgb, RgbCct};
    use car_light_composer::engine::{BlinkerConfig, BlinkerMode, CarLight, CarLightConfig};
    use car_light_composer::gamma::{GAMMA8, gamma_correct};
    use car_light_composer::{Command, CommandChannel, Duration, RcParameters, Renderer};

    const N: usize = 20;
    const SETTLE_STEPS: usize = 300;

    fn light() -> CarLight<N> {
        CarLight::new(&CarLightConfig::default())
    }

    fn settled_light() -> CarLight<N> {
        let mut light = light();
        light.turn_on();
        run(&mut light, SETTLE_STEPS);
        light
    }

    fn run(light: &mut CarLight<N>, steps: usize) {
        for _ in 0..steps {
            light.step();
        }
    }

    fn normal_red() -> f64 {
        f64::from(GAMMA8[76]) / 255.0
    }

    fn is_amber(pixel: &RgbCct) -> bool {
        *pixel == RgbCct::from_rgb(AMBER)
    }

    fn is_blue(pixel: &RgbCct) -> bool {
        *pixel == RgbCct::from_rgb(BLUE)
    }

    fn assert_in_range(pixels: &[RgbCct; N]) {
        for pixel in pixels {
            for channel in [pixel.color.r, pixel.color.g, pixel.color.b, pixel.warm, pixel.cold] {
                assert!((0.0..=1.0).contains(&channel), "{channel} out of range");
            }
        }
    }

    #[test]
    fn test_new_light_is_dark() {
        let mut light = light();
        assert!(!light.is_on());
        assert!(!light.is_braking());
        assert!(light.is_smoothing());
        assert_eq!(light.blinker_mode(), BlinkerMode::Off);
        let frame = *light.step();
        assert!(frame.iter().all(|pixel| *pixel == RgbCct::default()));
    }

    #[test]
    fn test_config_with_step() {
        let config = CarLightConfig::default().with_step(Duration::from_millis(10));
        assert!((config.step_time - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_output_stays_in_range() {
        let mut light = light();
        light.turn_on();
        light.set_color(Rgb::new(3.0, -1.0, 0.5));
        light.set_color_brightness(5.0);
        light.set_white_brightness(-2.0);
        light.set_white_temperature(12_000.0);
        for step in 0..200 {
            match step {
                20 => light.turn_on_emergency_brake(),
                60 => light.turn_on_hazard(),
                90 => light.turn_on_police(),
                120 => light.turn_on_brake(),
                150 => light.turn_off(),
                _ => {}
            }
            assert_in_range(light.step());
        }
    }

    #[test]
    fn test_sweep_is_monotonic_and_settles() {
        // Settled means within one pixel of the target
        const SWEEP_EPSILON: f64 = 1.0;

        let config = CarLightConfig::default();
        let mut light: CarLight<N> = CarLight::new(&config);
        light.turn_on();
        assert_eq!(light.sweep_target(), 11.0);

        let time_constant = config.sweep_filter.time_constant();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (5.0 * time_constant / config.step_time).ceil() as usize;

        let mut previous = 0.0;
        for _ in 0..steps {
            light.step();
            assert!(light.sweep_position() >= previous);
            assert!(light.sweep_position() <= light.sweep_target());
            previous = light.sweep_position();
        }
        let error = (light.sweep_position() - light.sweep_target()).abs();
        assert!(error < SWEEP_EPSILON, "error {error} after {steps} steps");
        assert!(light.is_sweep_settled());
    }

    #[test]
    fn test_sweep_is_symmetric() {
        let mut light = light();
        light.turn_on();
        for _ in 0..80 {
            let frame = *light.step();
            for index in 0..N / 2 {
                assert_eq!(frame[index], frame[N - 1 - index]);
            }
        }
    }

    #[test]
    fn test_sweep_lights_edges_first() {
        let mut light = light();
        light.turn_on();
        while light.sweep_position() < 2.0 {
            light.step();
        }
        run(&mut light, 2);
        let frame = light.pixels();
        assert!(frame[0].color.r > 0.0);
        assert!(frame[N - 1].color.r > 0.0);
        assert_eq!(frame[N / 2].color.r, 0.0);
    }

    #[test]
    fn test_settled_light_shows_normal_brightness() {
        let light = settled_light();
        for pixel in light.pixels() {
            assert_eq!(pixel.color.r, normal_red());
            assert_eq!(pixel.color.g, 0.0);
            assert_eq!(pixel.color.b, 0.0);
        }
    }

    #[test]
    fn test_turn_off_goes_dark() {
        let mut light = settled_light();
        light.turn_off();
        assert_eq!(light.sweep_target(), 0.0);
        run(&mut light, SETTLE_STEPS);
        assert!(light.is_sweep_settled());
        assert!(light.pixels().iter().all(|pixel| pixel.color.r == 0.0));
    }

    #[test]
    fn test_brake_is_immediate() {
        let mut light = settled_light();
        light.turn_on_brake();
        assert!(light.is_braking());
        assert!(!light.is_smoothing());
        let frame = *light.step();
        assert!(frame.iter().all(|pixel| pixel.color.r == 1.0));
    }

    #[test]
    fn test_brake_release_restores_smoothing() {
        let mut light = settled_light();
        light.turn_on_brake();
        light.step();
        light.turn_off_brake();
        assert_eq!(light.brightness(), 0.3);

        let frame = *light.step();
        assert!(frame.iter().all(|pixel| pixel.color.r == normal_red()));
        assert!(!light.is_smoothing());

        run(&mut light, SETTLE_STEPS);
        assert!(light.is_smoothing());
    }

    #[test]
    fn test_smoothing_stays_off_while_braking() {
        let mut light = settled_light();
        light.turn_on_brake();
        light.step();
        Command::SetSmoothing(true).apply(&mut light);
        for _ in 0..SETTLE_STEPS {
            assert!(light.step().iter().all(|pixel| pixel.color.r == 1.0));
            assert!(!light.is_smoothing());
        }

        light.turn_off_brake();
        run(&mut light, SETTLE_STEPS);
        assert!(light.is_smoothing());
    }

    #[test]
    fn test_smoothing_stays_off_during_emergency_brake() {
        let mut light = settled_light();
        light.turn_on_emergency_brake();
        light.step();
        // Two-tap filters converge within a couple of steps
        light.set_filter_values(RcParameters::new(10.0, 0.001));
        light.set_smoothing(true);
        for _ in 0..50 {
            let red = light.step()[0].color.r;
            assert!(red == 1.0 || red == normal_red());
            assert!(!light.is_smoothing());
        }

        light.turn_off_emergency_brake();
        run(&mut light, 10);
        assert!(light.is_smoothing());
    }

    #[test]
    fn test_disable_smoothing_while_braking_is_accepted() {
        let mut light = settled_light();
        light.turn_on_brake();
        light.set_smoothing(false);
        run(&mut light, 5);
        assert!(!light.is_smoothing());
        assert!(light.is_braking());
    }

    #[test]
    fn test_brightness_change_while_braking_waits() {
        let mut light = settled_light();
        light.turn_on_brake();
        light.set_color_brightness(0.5);
        assert_eq!(light.brightness(), 1.0);
        assert_eq!(light.normal_brightness(), 0.5);
        light.turn_off_brake();
        assert_eq!(light.brightness(), 0.5);
    }

    #[test]
    fn test_emergency_brake_strobes() {
        let mut light = settled_light();
        light.turn_on_emergency_brake();
        assert!(!light.is_smoothing());

        let mut previous = light.step()[0].color.r;
        assert_eq!(previous, 1.0);
        let mut transitions = 0;
        let mut saw_normal = false;
        for _ in 0..100 {
            let red = light.step()[0].color.r;
            assert!(red == 1.0 || red == normal_red());
            saw_normal |= red == normal_red();
            if red != previous {
                transitions += 1;
            }
            previous = red;
        }
        assert!(saw_normal);
        assert!((16..=20).contains(&transitions), "{transitions} transitions");
    }

    #[test]
    fn test_emergency_brake_release_restores_level() {
        let mut light = settled_light();
        light.turn_on_emergency_brake();
        run(&mut light, 13);
        light.turn_off_emergency_brake();
        assert!(!light.is_emergency_braking());
        assert_eq!(light.brightness(), 0.3);

        let mut light = settled_light();
        light.turn_on_brake();
        light.turn_on_emergency_brake();
        run(&mut light, 13);
        light.turn_off_emergency_brake();
        assert_eq!(light.brightness(), 1.0);
    }

    #[test]
    fn test_blinker_waits_for_pause() {
        let mut light = settled_light();
        light.turn_on_left();
        assert_eq!(light.blinker_mode(), BlinkerMode::Left);
        let frame = *light.step();
        assert!(!frame.iter().any(is_amber));
        assert_eq!(light.blinker_phase(), 0.0);
    }

    #[test]
    fn test_left_blinker_grows_from_last_pixel() {
        let mut light = settled_light();
        light.turn_on_left();

        let mut widest = 0;
        let mut previous = 0;
        for _ in 0..40 {
            let frame = *light.step();
            let amber = frame.iter().filter(|pixel| is_amber(pixel)).count();
            assert!(amber >= previous || amber == 0);
            for (index, pixel) in frame.iter().enumerate() {
                if is_amber(pixel) {
                    assert!(index >= N - amber);
                }
            }
            widest = widest.max(amber);
            previous = amber;
        }
        assert_eq!(widest, 4);
    }

    #[test]
    fn test_right_blinker_grows_from_first_pixel() {
        let mut light = settled_light();
        light.turn_on_right();
        let mut seen = false;
        for _ in 0..40 {
            let frame = *light.step();
            let amber = frame.iter().filter(|pixel| is_amber(pixel)).count();
            for (index, pixel) in frame.iter().enumerate() {
                if is_amber(pixel) {
                    seen = true;
                    assert!(index < amber);
                }
            }
        }
        assert!(seen);
    }

    #[test]
    fn test_hazard_covers_both_edges() {
        let mut light = settled_light();
        light.turn_on_hazard();
        while light.blinker_phase() < 0.15 {
            light.step();
        }
        let frame = light.pixels();
        assert!(is_amber(&frame[0]));
        assert!(is_amber(&frame[N - 1]));
        assert!(!is_amber(&frame[N / 2]));
    }

    #[test]
    fn test_blinker_off_finishes_sweep() {
        let mut light = settled_light();
        light.turn_on_left();
        while light.blinker_phase() < 0.1 {
            light.step();
        }
        light.turn_off_blinker();
        assert!(light.is_blinker_turning_off());

        let mut steps = 0;
        while light.blinker_phase() > 0.0 {
            assert_eq!(light.blinker_mode(), BlinkerMode::Left);
            light.step();
            steps += 1;
            assert!(steps < 100);
        }
        assert_eq!(light.blinker_mode(), BlinkerMode::Off);
        assert!(!light.is_blinker_turning_off());

        let frame = *light.step();
        assert!(!frame.iter().any(is_amber));
    }

    #[test]
    fn test_blinker_reactivation_cancels_turn_off() {
        let mut light = settled_light();
        light.turn_on_left();
        while light.blinker_phase() < 0.1 {
            light.step();
        }
        let phase = light.blinker_phase();
        light.turn_off_blinker();
        light.turn_on_right();
        assert!(!light.is_blinker_turning_off());
        assert_eq!(light.blinker_mode(), BlinkerMode::Right);
        // Switching sides keeps the running sweep
        assert_eq!(light.blinker_phase(), phase);
        run(&mut light, 100);
        assert_eq!(light.blinker_mode(), BlinkerMode::Right);
    }

    #[test]
    fn test_police_cadence() {
        let mut light = settled_light();
        light.turn_on_police();
        assert!(light.is_police_on());

        let mut on_changes = 0;
        let mut side_changes = 0;
        light.step();
        let mut on = light.police_on_phase();
        let mut left = light.police_left_phase();
        for _ in 0..80 {
            light.step();
            if light.police_on_phase() != on {
                on_changes += 1;
                on = light.police_on_phase();
            }
            if light.police_left_phase() != left {
                side_changes += 1;
                left = light.police_left_phase();
            }
        }
        assert_eq!(on_changes, 16);
        assert_eq!(side_changes, 4);
    }

    #[test]
    fn test_police_paints_sides() {
        let mut light = light();
        light.turn_on_police();

        let frame = *light.step();
        for (index, pixel) in frame.iter().enumerate() {
            assert_eq!(is_blue(pixel), (10..14).contains(&index), "pixel {index}");
        }

        // Dark half of the strobe
        run(&mut light, 5);
        assert!(!light.police_on_phase());
        assert!(!light.pixels().iter().any(is_blue));

        // Right side
        run(&mut light, 15);
        assert!(light.police_on_phase());
        assert!(!light.police_left_phase());
        for (index, pixel) in light.pixels().iter().enumerate() {
            assert_eq!(is_blue(pixel), (6..10).contains(&index), "pixel {index}");
        }

        light.turn_off_police();
        let frame = *light.step();
        assert!(!frame.iter().any(is_blue));
    }

    #[test]
    fn test_police_state_is_per_light() {
        let mut first = light();
        let mut second = light();
        first.turn_on_police();
        run(&mut first, 7);
        second.turn_on_police();
        second.step();
        assert!(!first.police_on_phase());
        assert!(second.police_on_phase());
    }

    #[test]
    fn test_blinker_overrides_police() {
        let config = CarLightConfig {
            blinker: BlinkerConfig {
                width: 0.6,
                ..BlinkerConfig::default()
            },
            ..CarLightConfig::default()
        };
        let mut light: CarLight<N> = CarLight::new(&config);
        light.turn_on_police();
        light.turn_on_hazard();

        let mut overlapped = false;
        for _ in 0..400 {
            light.step();
            let bands = light.blinker_mode().bands(light.blinker_phase(), N);
            for (index, pixel) in light.pixels().iter().enumerate() {
                if bands.contains(index) {
                    assert!(is_amber(pixel), "pixel {index}");
                    overlapped |= light.police_on_phase() && (6..14).contains(&index);
                }
            }
        }
        assert!(overlapped);
    }

    #[test]
    fn test_deferred_brightness_waits_for_sweep() {
        let mut light = light();
        light.turn_on();
        light.set_color_brightness_after(0.8);
        light.set_white_brightness_after(0.5);
        light.step();
        assert_eq!(light.normal_brightness(), 0.3);
        assert_eq!(light.white_brightness(), 0.0);

        run(&mut light, 100);
        assert_eq!(light.normal_brightness(), 0.8);
        assert_eq!(light.brightness(), 0.8);
        assert_eq!(light.white_brightness(), 0.5);
    }

    #[test]
    fn test_white_channels() {
        let config = CarLightConfig::default()
            .with_color(RgbCct::new(Rgb::new(1.0, 0.0, 0.0), 0.5, 0.5));
        let mut light: CarLight<N> = CarLight::new(&config);
        assert!((light.white_temperature() - 4750.0).abs() < 1e-9);
        assert_eq!(light.white_brightness(), 1.0);

        light.turn_on();
        run(&mut light, SETTLE_STEPS);
        for pixel in light.pixels() {
            assert_eq!(pixel.warm, gamma_correct(0.5));
            assert_eq!(pixel.cold, gamma_correct(0.5));
        }

        light.set_smoothing(false);
        light.step();
        light.set_white_temperature(3000.0);
        let frame = *light.step();
        assert_eq!(frame[0].warm, 1.0);
        assert_eq!(frame[0].cold, 0.0);
    }

    #[test]
    fn test_white_temperature_defaults_without_white() {
        let light = light();
        assert_eq!(light.white_temperature(), 4000.0);
        assert_eq!(light.white_brightness(), 0.0);
    }

    #[test]
    fn test_set_color_keeps_brightness() {
        let mut light = settled_light();
        light.set_color(Rgb::new(0.0, 0.0, 1.0));
        let frame = *light.step();
        assert_eq!(frame[0].color.b, normal_red());
        assert_eq!(frame[0].color.r, 0.0);
    }

    #[test]
    fn test_disable_smoothing_applies_after_convergence() {
        let mut light = settled_light();
        light.set_smoothing(false);
        assert!(light.is_smoothing());
        light.step();
        assert!(!light.is_smoothing());

        light.set_color_brightness(1.0);
        let frame = *light.step();
        assert!(frame.iter().all(|pixel| pixel.color.r == 1.0));
    }

    #[test]
    fn test_enable_smoothing_waits_for_convergence() {
        let mut light = settled_light();
        light.set_smoothing(false);
        light.step();
        light.set_color_brightness(1.0);
        light.step();

        light.set_smoothing(true);
        light.set_color_brightness(0.3);
        light.step();
        assert!(!light.is_smoothing());
        run(&mut light, SETTLE_STEPS);
        assert!(light.is_smoothing());
    }

    #[test]
    fn test_initial_filter_values() {
        let mut light = light();
        light.set_initial_filter_values(1.0, 1.0);
        let frame = *light.step();
        assert!(frame.iter().all(|pixel| pixel.color.r == 1.0));
    }

    #[test]
    fn test_filter_values_retune_pixels() {
        let mut light = light();
        light.set_initial_filter_values(1.0, 1.0);
        light.set_filter_values(RcParameters::new(10.0, 0.001));

        assert_eq!(light.step()[0].color.r, 1.0);
        assert_eq!(light.step()[0].color.r, gamma_correct(0.5));
        assert_eq!(light.step()[0].color.r, 0.0);
    }

    #[test]
    fn test_renderer_applies_queued_commands() {
        let channel: CommandChannel<8> = CommandChannel::new();
        let mut renderer: Renderer<'_, N, 8> =
            Renderer::new(channel.receiver(), &CarLightConfig::default());
        let sender = channel.sender();

        sender.try_send(Command::TurnOn).unwrap();
        sender.try_send(Command::TurnOnBrake).unwrap();
        assert!(!renderer.light().is_on());

        renderer.render();
        assert!(renderer.light().is_on());
        assert!(renderer.light().is_braking());
        assert!(channel.is_empty());

        for _ in 0..SETTLE_STEPS {
            renderer.render();
        }
        assert!(renderer.pixels().iter().all(|pixel| pixel.color.r == 1.0));

        sender.try_send(Command::power(false)).unwrap();
        renderer.render();
        assert!(!renderer.light().is_on());
    }

    #[test]
    fn test_filter_values_command_seeds_after_retune() {
        let mut light = light();
        Command::SetFilterValues {
            parameters: RcParameters::new(10.0, 0.001),
            initial: Some(car_light_composer::command::FilterSample {
                input: 1.0,
                output: 1.0,
            }),
        }
        .apply(&mut light);
        assert_eq!(light.step()[0].color.r, 1.0);
        assert_eq!(light.step()[0].color.r, gamma_correct(0.5));
    }
}
