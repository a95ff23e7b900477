//! Integration tests for the player lifecycle, driven with virtual time.

use std::cell::Cell;
use std::rc::Rc;

use castplayer::player::input::{handle_event, ProgressBarArea};
use castplayer::player::layout::FIXED_LAYOUT;
use castplayer::player::{
    EmulationModel, InputResult, LayoutResult, MemorySource, PlaybackState, Player,
    PlayerAction, PlayerOptions, Recording, SizePolicy, SurfaceMetrics,
};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::helpers::{
    load_fixture, ms, run_between, run_until_loaded, watch_states, FailingSource, GatedSource,
    ReadySource, RecordingRenderer,
};

fn short_recording() -> Recording {
    Recording::from_outputs(10, 3, &[(0.5, "a"), (1.0, "b")])
}

fn player_with(recording: Recording, options: PlayerOptions) -> Player<RecordingRenderer> {
    Player::new(
        Box::new(ReadySource(recording)),
        RecordingRenderer::default(),
        options,
    )
}

/// Surface whose content box is exactly the 80x24 measurement grid.
fn unit_surface() -> SurfaceMetrics {
    SurfaceMetrics {
        outer_width: 80.0,
        outer_height: 24.0,
        content_width: 80.0,
        content_height: 24.0,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn no_policy_uses_fixed_layout() {
    let mut player = player_with(short_recording(), PlayerOptions::default());
    player.mount(unit_surface(), 640.0, 480.0);
    assert_eq!(player.layout(), Some(FIXED_LAYOUT));
    assert_eq!(
        FIXED_LAYOUT,
        LayoutResult {
            scale: 1.0,
            pixel_width: 200.0,
            pixel_height: 100.0
        }
    );

    // The container is irrelevant without a policy
    player.resize_container(1000.0, 20.0);
    assert_eq!(player.renderer().layouts, vec![FIXED_LAYOUT]);
}

#[test]
fn fit_width_scales_to_container_width() {
    let options = PlayerOptions {
        size_policy: Some(SizePolicy::FitWidth),
        ..PlayerOptions::default()
    };
    let mut player = player_with(short_recording(), options);
    // 10x20 cells on the 80x24 measurement grid
    let surface = SurfaceMetrics {
        outer_width: 800.0,
        outer_height: 480.0,
        content_width: 800.0,
        content_height: 480.0,
    };
    player.mount(surface, 400.0, 300.0);

    let layout = player.layout().unwrap();
    assert_close(layout.scale, 0.5);
    assert_close(layout.pixel_width, 400.0);
    assert_close(layout.pixel_height, 240.0);
}

#[test]
fn unmeasured_surface_defers_layout() {
    let options = PlayerOptions {
        size_policy: Some(SizePolicy::FitBoth),
        ..PlayerOptions::default()
    };
    let mut player = player_with(short_recording(), options);
    player.resize_container(400.0, 300.0);
    assert_eq!(player.layout(), None);
    assert!(player.renderer().layouts.is_empty());

    // A zero-width container cannot decide a scale either
    player.mount(unit_surface(), 0.0, 0.0);
    assert_eq!(player.layout(), None);

    player.resize_container(160.0, 100.0);
    assert!(player.layout().is_some());
}

#[test]
fn fullscreen_fits_both_dimensions() {
    let options = PlayerOptions {
        size_policy: Some(SizePolicy::FitWidth),
        ..PlayerOptions::default()
    };
    let mut player = player_with(short_recording(), options);
    player.mount(unit_surface(), 160.0, 30.0);
    let windowed = player.layout().unwrap();
    assert_close(windowed.scale, 2.0);
    assert_close(windowed.pixel_height, 48.0);

    player.handle_action(PlayerAction::ToggleFullscreen, ms(0));
    assert!(player.is_fullscreen());
    let full = player.layout().unwrap();
    assert_close(full.scale, 1.25);
    assert_close(full.pixel_width, 100.0);
    assert_close(full.pixel_height, 30.0);

    player.toggle_fullscreen();
    assert_eq!(player.layout(), Some(windowed));
    assert_eq!(player.renderer().layouts.len(), 3);
}

#[test]
fn recording_size_and_resize_events_relayout() {
    let options = PlayerOptions {
        size_policy: Some(SizePolicy::FitWidth),
        ..PlayerOptions::default()
    };
    let mut player = Player::new(
        Box::new(MemorySource::new(load_fixture("demo_v2.cast"))),
        RecordingRenderer::default(),
        options,
    );
    player.mount(unit_surface(), 100.0, 50.0);
    assert_close(player.layout().unwrap().scale, 100.0 / 80.0);

    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    assert_eq!(player.grid(), (40, 10));
    assert_close(player.layout().unwrap().scale, 2.5);
    assert_close(player.layout().unwrap().pixel_height, 25.0);

    // The recording resizes to 50x12 at 2s
    run_between(&mut player, 16, 2500, 16);
    assert_eq!(player.grid(), (50, 12));
    let layout = player.layout().unwrap();
    assert_close(layout.scale, 2.0);
    assert_close(layout.pixel_height, 24.0);
    assert_eq!(player.renderer().grid.len(), 12);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn natural_end_pauses_and_notifies_once() {
    let mut player = player_with(short_recording(), PlayerOptions::default());
    let finished = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&finished);
    player.on_finish(move || counter.set(counter.get() + 1));
    let states = watch_states(&mut player);

    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.active_periodic_count(), 3);

    run_between(&mut player, 16, 3000, 16);

    assert_eq!(finished.get(), 1);
    assert_eq!(player.state(), PlaybackState::Paused);
    assert_eq!(player.active_periodic_count(), 0);
    assert_eq!(player.armed_timer_count(), 0);
    assert_eq!(player.next_deadline(), None);

    let timers = player.timers_snapshot().unwrap();
    assert_close(timers.progress, 1.0);
    assert_close(timers.current_time, 1.0);
    assert_close(timers.remaining_time, 0.0);

    assert_eq!(player.renderer().text()[0], "ab");
    assert_eq!(player.renderer().blinks.last(), Some(&true));
    assert!(player.blink_visible());
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            PlaybackState::Loading,
            PlaybackState::Playing,
            PlaybackState::Paused
        ]
    );
}

#[test]
fn pause_inside_last_frame_interval_finishes() {
    let mut player = player_with(short_recording(), PlayerOptions::default());
    let finished = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&finished);
    player.on_finish(move || counter.set(counter.get() + 1));

    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    run_between(&mut player, 16, 992, 16);
    assert_eq!(player.renderer().text()[0], "a");

    // Past the end but before the next tick at 1008ms
    assert!(!player.pause_or_resume(ms(1005)));

    assert_eq!(finished.get(), 1);
    assert_eq!(player.state(), PlaybackState::Paused);
    assert_eq!(player.renderer().text()[0], "ab");
    assert_close(player.timers_snapshot().unwrap().progress, 1.0);
    assert_eq!(player.armed_timer_count(), 0);

    // Nothing else fires afterwards
    run_between(&mut player, 1008, 2000, 16);
    assert_eq!(finished.get(), 1);
}

#[test]
fn pause_catches_grid_up_to_pause_time() {
    let mut player = player_with(short_recording(), PlayerOptions::default());
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    run_between(&mut player, 16, 496, 16);
    assert_eq!(player.renderer().text()[0], "");

    player.pause_or_resume(ms(505));
    assert_eq!(player.state(), PlaybackState::Paused);
    assert_eq!(player.renderer().text()[0], "a");
    assert_close(player.timers_snapshot().unwrap().current_time, 0.505);
}

#[test]
fn resume_after_finish_restarts_from_beginning() {
    let mut player = player_with(short_recording(), PlayerOptions::default());
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    run_between(&mut player, 16, 1200, 16);
    assert_eq!(player.state(), PlaybackState::Paused);

    assert!(player.pause_or_resume(ms(2000)));
    assert_eq!(player.state(), PlaybackState::Playing);
    player.run_due(ms(2000));
    assert_close(player.clock().current_time(ms(2000)), 0.0);
    assert_eq!(player.renderer().text()[0], "");

    run_between(&mut player, 2016, 2600, 16);
    assert_eq!(player.renderer().text()[0], "a");
}

#[test]
fn looping_keeps_playing_without_finish() {
    let options = PlayerOptions {
        loop_playback: true,
        ..PlayerOptions::default()
    };
    let mut player = player_with(short_recording(), options);
    let finished = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&finished);
    player.on_finish(move || counter.set(counter.get() + 1));

    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    run_between(&mut player, 16, 1200, 16);
    let frames_after_first_loop = player.renderer().frames;

    run_between(&mut player, 1216, 2500, 16);

    assert_eq!(finished.get(), 0);
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.active_periodic_count(), 3);
    assert!(player.clock().current_time(ms(2500)) < 1.0);
    assert!(player.renderer().frames > frames_after_first_loop);
}

#[test]
fn slow_load_shows_waiting_then_plays() {
    let (source, gate) = GatedSource::new(short_recording());
    let mut player = Player::new(
        Box::new(source),
        RecordingRenderer::default(),
        PlayerOptions::default(),
    );
    let states = watch_states(&mut player);

    player.play(ms(0));
    player.run_due(ms(500));
    assert_eq!(player.state(), PlaybackState::Loading);
    player.run_due(ms(999));
    assert_eq!(player.state(), PlaybackState::Loading);
    player.run_due(ms(1000));
    assert_eq!(player.state(), PlaybackState::Waiting);

    gate.send(()).unwrap();
    run_until_loaded(&mut player, ms(5000));

    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            PlaybackState::Loading,
            PlaybackState::Waiting,
            PlaybackState::Playing
        ]
    );
    // Playback starts at the moment the load resolved
    assert_close(player.clock().current_time(ms(5000)), 0.0);
}

#[test]
fn fast_load_never_waits() {
    let mut player = player_with(short_recording(), PlayerOptions::default());
    let states = watch_states(&mut player);
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    run_between(&mut player, 16, 1500, 16);
    assert!(!states.lock().unwrap().contains(&PlaybackState::Waiting));
}

#[test]
fn teardown_during_load_cancels_grace_timer() {
    let (source, gate) = GatedSource::new(short_recording());
    let mut player = Player::new(
        Box::new(source),
        RecordingRenderer::default(),
        PlayerOptions::default(),
    );
    let states = watch_states(&mut player);

    player.play(ms(0));
    player.run_due(ms(500));
    player.teardown();
    assert_eq!(player.armed_timer_count(), 0);

    gate.send(()).unwrap();
    std::thread::sleep(ms(20));
    player.run_due(ms(2000));
    player.run_due(ms(5000));

    let seen = states.lock().unwrap();
    assert!(!seen.contains(&PlaybackState::Waiting));
    assert!(!seen.contains(&PlaybackState::Playing));
    assert_eq!(player.active_periodic_count(), 0);
}

#[test]
fn failed_load_ends_in_failed_state() {
    let mut player = Player::new(
        Box::new(FailingSource),
        RecordingRenderer::default(),
        PlayerOptions::default(),
    );
    player.handle_action(PlayerAction::TogglePlay, ms(0));
    run_until_loaded(&mut player, ms(0));

    assert_eq!(player.state(), PlaybackState::Failed);
    assert!(player.load_error().is_some());
    assert_eq!(player.armed_timer_count(), 0);
    assert!(!player.pause_or_resume(ms(100)));
    assert_eq!(player.state(), PlaybackState::Failed);
    assert_eq!(
        player.renderer().statuses.last(),
        Some(&PlaybackState::Failed)
    );
}

#[test]
fn pause_publishes_exact_stop_time() {
    let mut player = player_with(
        Recording::from_outputs(10, 3, &[(5.0, "end")]),
        PlayerOptions::default(),
    );
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    run_between(&mut player, 16, 1280, 16);

    assert!(!player.pause_or_resume(ms(1300)));
    assert_eq!(player.state(), PlaybackState::Paused);
    let timers = player.timers_snapshot().unwrap();
    assert_close(timers.current_time, 1.3);
    assert_close(timers.remaining_time, 3.7);
    assert_eq!(player.renderer().blinks.last(), Some(&true));

    // Time does not move while paused
    player.run_due(ms(4000));
    assert_close(player.clock().current_time(ms(4000)), 1.3);
}

#[test]
fn speed_scales_playback_time() {
    let options = PlayerOptions {
        speed: 2.0,
        ..PlayerOptions::default()
    };
    let mut player = player_with(short_recording(), options);
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    run_between(&mut player, 16, 256, 16);
    assert_eq!(player.renderer().text()[0], "a");
    assert_close(player.clock().current_time(ms(300)), 0.6);
}

#[test]
fn seek_while_paused_repaints() {
    let mut player = player_with(
        Recording::from_outputs(10, 3, &[(0.5, "one\r\n"), (1.0, "two\r\n"), (2.0, "three")]),
        PlayerOptions::default(),
    );
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    player.pause_or_resume(ms(100));
    let frames = player.renderer().frames;

    player.seek(ms(200), 1.5);
    assert_eq!(player.renderer().frames, frames + 1);
    assert_eq!(player.renderer().text()[..2], ["one", "two"]);
    assert_close(player.timers_snapshot().unwrap().current_time, 1.5);

    player.seek_by(ms(300), -5.0);
    assert_close(player.clock().current_time(ms(300)), 0.0);
    assert_eq!(player.renderer().text()[0], "");
    assert_eq!(player.state(), PlaybackState::Paused);
}

#[test]
fn render_errors_do_not_stop_the_frame_loop() {
    let mut player = Player::new(
        Box::new(ReadySource(Recording::from_outputs(10, 3, &[(5.0, "x")]))),
        RecordingRenderer {
            fail_frames: true,
            ..RecordingRenderer::default()
        },
        PlayerOptions::default(),
    );
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    // The first delta is the only one with content; later ticks carry nothing
    assert_eq!(player.renderer().frames, 1);

    player.run_due(ms(16));
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.active_periodic_count(), 3);
    assert_eq!(player.next_deadline(), Some(ms(32)));
}

// ============================================================================
// Host input
// ============================================================================

fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

#[test]
fn host_keys_drive_the_player() {
    let mut player = player_with(
        Recording::from_outputs(10, 3, &[(2.0, "two\r\n"), (8.0, "eight")]),
        PlayerOptions::default(),
    );

    // Modified space is not a play key
    let ctrl_space = key(KeyCode::Char(' '), KeyModifiers::CONTROL);
    assert_eq!(
        handle_event(&ctrl_space, &mut player, ms(0), None),
        InputResult::Continue
    );
    assert_eq!(player.state(), PlaybackState::Initial);

    let space = key(KeyCode::Char(' '), KeyModifiers::NONE);
    handle_event(&space, &mut player, ms(0), None);
    run_until_loaded(&mut player, ms(0));
    assert_eq!(player.state(), PlaybackState::Playing);

    handle_event(&key(KeyCode::Right, KeyModifiers::NONE), &mut player, ms(100), None);
    assert_close(player.clock().current_time(ms(100)), 5.1);
    assert_eq!(player.renderer().text()[0], "two");

    handle_event(&space, &mut player, ms(200), None);
    assert_eq!(player.state(), PlaybackState::Paused);

    handle_event(&key(KeyCode::Char('f'), KeyModifiers::NONE), &mut player, ms(200), None);
    assert!(player.is_fullscreen());

    assert_eq!(
        handle_event(&key(KeyCode::Char('q'), KeyModifiers::NONE), &mut player, ms(300), None),
        InputResult::Quit
    );
    assert_eq!(
        handle_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut player, ms(300), None),
        InputResult::Quit
    );
}

#[test]
fn progress_bar_click_seeks() {
    let mut player = player_with(
        Recording::from_outputs(10, 3, &[(2.0, "two\r\n"), (8.0, "eight")]),
        PlayerOptions::default(),
    );
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));
    player.pause_or_resume(ms(50));

    let bar = ProgressBarArea {
        row: 20,
        start_col: 1,
        width: 40,
    };
    let click = Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 31,
        row: 20,
        modifiers: KeyModifiers::NONE,
    });
    handle_event(&click, &mut player, ms(100), Some(bar));

    // Column 30 of 40 is three quarters of the way through 8s
    assert_close(player.clock().current_time(ms(100)), 6.0);
    assert_eq!(player.renderer().text()[0], "two");

    // No bar on screen (fullscreen): clicks do nothing
    handle_event(&click, &mut player, ms(200), None);
    assert_close(player.clock().current_time(ms(200)), 6.0);
}

// ============================================================================
// Properties
// ============================================================================

/// Small deterministic generator so the sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

#[test]
fn periodic_activities_only_run_while_playing() {
    for seed in 1..=8u64 {
        let mut rng = Lcg(seed);
        let mut player = player_with(
            Recording::from_outputs(10, 3, &[(0.4, "a"), (1.2, "b"), (3.0, "c")]),
            PlayerOptions::default(),
        );
        player.play(ms(0));
        run_until_loaded(&mut player, ms(0));

        let mut now = 0;
        for _ in 0..200 {
            match rng.below(4) {
                0 => {
                    player.pause_or_resume(ms(now));
                }
                1 => player.seek(ms(now), rng.below(4000) as f64 / 1000.0),
                _ => {
                    now += rng.below(300);
                    player.run_due(ms(now));
                }
            }

            let expected = if player.state() == PlaybackState::Playing {
                3
            } else {
                0
            };
            assert_eq!(player.active_periodic_count(), expected, "seed {seed} at {now}ms");
            assert_eq!(player.armed_timer_count(), expected, "seed {seed} at {now}ms");
        }

        player.teardown();
        assert_eq!(player.armed_timer_count(), 0);
    }
}

#[test]
fn applied_deltas_reproduce_the_model_grid() {
    let outputs = [
        (0.1, "$ ls\r\n"),
        (0.3, "\x1b[31mred\x1b[0m plain\r\n"),
        (0.45, "line three\r\n"),
        (0.6, "\x1b[2;1Hover"),
        (0.8, "\x1b[2J\x1b[Hcleared"),
        (1.1, "\r\nnext\r\nand\r\nscrolls\r\npast\r\nthe end"),
        (1.6, "\x1b[1;3Hx\x1b[?25l"),
        (2.0, "\x1b[?25h done"),
    ];
    let mut player = player_with(
        Recording::from_outputs(12, 4, &outputs),
        PlayerOptions::default(),
    );
    player.play(ms(0));
    run_until_loaded(&mut player, ms(0));

    let check = |player: &Player<RecordingRenderer>| {
        let model = player.clock().model().unwrap();
        assert_eq!(player.renderer().grid, model.snapshot());
        assert_eq!(player.renderer().cursor, Some(model.cursor()));
    };

    let mut t = 37;
    while t <= 2100 {
        player.run_due(ms(t));
        check(&player);
        if t == 1184 {
            // Backwards seek rebuilds the grid
            player.seek(ms(t), 0.35);
            check(&player);
        }
        t += 37;
    }
}
