// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted map session.
//!
//! Drives a `ViewportController` through a fixed sequence of gestures on a
//! virtual clock: a fling, a pinch that settles on the double tier, a few
//! taps with the bulldozer and without, and the blink cycle on unpowered
//! zones. Prints the view state after each step and the saved state as JSON
//! at the end.
//!
//! Run:
//! - `cargo run -p cityview_demos --example scripted_session`
//! - `RUST_LOG=cityview_controller=trace cargo run -p cityview_demos --example scripted_session`

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cityview_controller::{
    GestureEvent, GestureRouter, Redraw, TileGlyph, ToolError, ViewConfig, ViewportController,
};
use cityview_demos::{Bulldozer, LoggingConfig, SampleCity, init_logging};
use cityview_view2d::GridLocation;
use kurbo::{Point, Size, Vec2};

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default());

    let mut city = SampleCity::new(120, 100);
    let mut view = ViewportController::new(ViewConfig::default(), Size::new(480.0, 320.0));
    view.set_grid_size(120, 100);

    let inspected = Rc::new(RefCell::new(Vec::new()));
    let failures = Rc::new(RefCell::new(Vec::new()));
    let mut router = GestureRouter::new();
    {
        let inspected = Rc::clone(&inspected);
        router.set_inspector(Some(Box::new(move |loc: GridLocation| {
            inspected.borrow_mut().push(loc);
        })));
        let failures = Rc::clone(&failures);
        router.set_notifier(Some(Box::new(move |err: &ToolError| {
            failures.borrow_mut().push(err.to_string());
        })));
    }

    let mut clock = Duration::ZERO;
    let center = Point::new(240.0, 160.0);
    report("start", &mut view, &city);

    let script = [
        ("down", GestureEvent::Down),
        (
            "drag",
            GestureEvent::Pan {
                delta: Vec2::new(64.0, -32.0),
            },
        ),
        (
            "fling left",
            GestureEvent::Fling {
                velocity: Vec2::new(-800.0, 0.0),
            },
        ),
        (
            "pinch",
            GestureEvent::Pinch {
                focus: Point::new(300.0, 120.0),
                factor: 1.5,
            },
        ),
        (
            "pinch",
            GestureEvent::Pinch {
                focus: Point::new(300.0, 120.0),
                factor: 1.2,
            },
        ),
        ("pinch end", GestureEvent::PinchEnd),
        ("inspect", GestureEvent::Tap { point: center }),
    ];

    for (label, event) in script {
        view.advance_to(clock);
        router.route(&mut view, &mut city, event);
        clock = settle(&mut view, &city, clock);
        report(label, &mut view, &city);
    }

    // Back to 1:1 at the map center, then bulldoze.
    view.set_grid_size(120, 100);
    let mut state = view.save_state();
    state.scale = 1.0;
    view.restore_state(&state);
    router.set_tool(Some(Box::new(Bulldozer::default())));
    let river = view.transform().tile_rect(GridLocation::new(63, 50)).center();
    for (label, point) in [("bulldoze zone", center), ("bulldoze river", river)] {
        view.advance_to(clock);
        router.route(&mut view, &mut city, GestureEvent::Tap { point });
        report(label, &mut view, &city);
    }

    // Let the blink cycle run for a couple of seconds, then power the city.
    clock = run_frames(&mut view, &city, clock, 125);
    city.connect_power();
    clock = run_frames(&mut view, &city, clock, 125);
    println!(
        "after {:?}: blink scheduled = {}, next deadline = {:?}",
        clock,
        view.blink_scheduled(),
        view.next_deadline()
    );

    println!("inspected: {:?}", inspected.borrow());
    println!("tool failures: {:?}", failures.borrow());
    println!("saved state: {}", serde_json::to_string(&view.save_state())?);
    Ok(())
}

/// Fires timers until the momentum slot is idle, drawing a frame whenever a
/// redraw is pending. Returns the time reached.
fn settle(view: &mut ViewportController, city: &SampleCity, mut clock: Duration) -> Duration {
    while !view.momentum().is_idle() {
        let Some(deadline) = view.next_deadline() else {
            break;
        };
        clock = clock.max(deadline);
        view.advance_to(clock);
        draw_if_needed(view, city);
    }
    clock
}

/// Runs `frames` frames of 16 ms.
fn run_frames(
    view: &mut ViewportController,
    city: &SampleCity,
    mut clock: Duration,
    frames: u32,
) -> Duration {
    let mut blinks = 0;
    for _ in 0..frames {
        clock += FRAME;
        let phase = view.blink_phase();
        view.advance_to(clock);
        if view.blink_phase() != phase {
            blinks += 1;
        }
        draw_if_needed(view, city);
    }
    log::info!("{blinks} blink toggles in {frames} frames");
    clock
}

fn draw_if_needed(view: &mut ViewportController, city: &SampleCity) {
    let redraws = view.take_redraws();
    if redraws.is_empty() {
        return;
    }
    let full = redraws.contains(&Redraw::Full);
    let mut drawn = 0;
    let mut unpowered = 0;
    view.draw(city, &mut |_: GridLocation, glyph: TileGlyph<u16>| {
        drawn += 1;
        if matches!(glyph, TileGlyph::Unpowered(_)) {
            unpowered += 1;
        }
    });
    log::trace!(
        "frame: {} ({drawn} tiles, {unpowered} unpowered glyphs)",
        if full { "full" } else { "partial" }
    );
}

fn report(label: &str, view: &mut ViewportController, city: &SampleCity) {
    draw_if_needed(view, city);
    for event in view.take_events() {
        println!("  event: {event:?}");
    }
    let origin = view.origin();
    println!(
        "{label:>14}: origin ({:.1}, {:.1}), scale {:.3}, tile {} px, momentum {}",
        origin.x,
        origin.y,
        view.scale(),
        view.tile_size().get(),
        if view.momentum().is_idle() {
            "idle"
        } else {
            "running"
        }
    );
}
