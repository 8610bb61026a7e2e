// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `cityview_controller` crate.
//!
//! These drive a [`ViewportController`] through a [`GestureRouter`] the way a
//! host would: events in, `advance_to` for time, `draw` and `take_redraws`
//! out.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use cityview_controller::{
    GestureEvent, GestureRouter, MomentumTask, Redraw, TileGlyph, TileGrid, ToolError,
    ViewConfig, ViewEvent, ViewState, ViewportController,
};
use cityview_view2d::{GridLocation, MAX_SCALE, MIN_SCALE, TileSize, ZoomTier};
use kurbo::{Point, Size, Vec2};

struct City {
    width: u32,
    height: u32,
    unpowered: HashSet<GridLocation>,
    bulldozed: Vec<GridLocation>,
}

impl City {
    fn new() -> Self {
        Self {
            width: 120,
            height: 100,
            unpowered: HashSet::new(),
            bulldozed: Vec::new(),
        }
    }
}

impl TileGrid for City {
    type Tile = u16;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tile_at(&self, loc: GridLocation) -> u16 {
        u16::try_from(loc.x + loc.y).unwrap()
    }

    fn is_powered(&self, loc: GridLocation) -> bool {
        !self.unpowered.contains(&loc)
    }
}

const CENTER: Point = Point::new(240.0, 160.0);

fn setup() -> (ViewportController, GestureRouter<City>, City) {
    let mut view = ViewportController::new(ViewConfig::default(), Size::new(480.0, 320.0));
    view.set_grid_size(120, 100);
    (view, GestureRouter::new(), City::new())
}

/// Fires timers until none are left, returning the final time.
fn run_to_idle(view: &mut ViewportController) -> Duration {
    let mut steps = 0;
    while let Some(deadline) = view.next_deadline() {
        view.advance_to(deadline);
        steps += 1;
        assert!(steps < 1000, "timers never ran out");
    }
    view.now()
}

fn settles(events: &[ViewEvent]) -> Vec<ZoomTier> {
    events
        .iter()
        .filter_map(|e| match e {
            ViewEvent::ZoomSettled { tier, .. } => Some(*tier),
            ViewEvent::TileSizeChanged(_) => None,
        })
        .collect()
}

/// Switches to `tile_size` and puts the scale factor back to 1.
fn at_tile_size(view: &mut ViewportController, tile_size: u32) {
    view.set_tile_size(TileSize::new(tile_size).unwrap());
    let mut state = view.save_state();
    state.scale = 1.0;
    view.restore_state(&state);
    view.take_events();
}

#[test]
fn tap_at_viewport_center_hits_map_center() {
    let (mut view, mut router, mut city) = setup();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    router.set_inspector(Some(Box::new(move |loc: GridLocation| {
        sink.borrow_mut().push(loc);
    })));

    assert!(router.route(&mut view, &mut city, GestureEvent::Tap { point: CENTER }));
    assert_eq!(*seen.borrow(), [GridLocation::new(60, 50)]);
}

#[test]
fn fling_ends_in_bounds_and_settles_once() {
    let (mut view, mut router, mut city) = setup();
    view.take_events();
    router.route(&mut view, &mut city, GestureEvent::Down);
    router.route(
        &mut view,
        &mut city,
        GestureEvent::Fling {
            velocity: Vec2::new(-800.0, 0.0),
        },
    );
    assert!(matches!(view.momentum(), MomentumTask::ScrollFling { .. }));
    assert_eq!(view.next_deadline(), Some(Duration::from_millis(100)));

    run_to_idle(&mut view);

    assert!(view.momentum().is_idle());
    // Finger moved left, so the view scrolled right.
    assert!(view.origin().x > 1920.0);
    assert!(view.origin().x <= view.bounds().right());
    assert_eq!(view.origin().y, 1600.0);
    assert_eq!(settles(&view.take_events()), [ZoomTier::Normal]);
}

#[test]
fn fling_near_edge_springs_back_onto_it() {
    let (mut view, mut router, mut city) = setup();
    router.route(
        &mut view,
        &mut city,
        GestureEvent::Pan {
            delta: Vec2::new(1880.0, 0.0),
        },
    );
    assert_eq!(view.origin().x, 3800.0);
    view.take_events();

    router.route(
        &mut view,
        &mut city,
        GestureEvent::Fling {
            velocity: Vec2::new(-8000.0, 0.0),
        },
    );
    let mut peak = 0.0_f64;
    while let Some(deadline) = view.next_deadline() {
        view.advance_to(deadline);
        peak = peak.max(view.origin().x);
    }

    assert!(peak > 3840.0, "fling enters the overscroll slack");
    assert!(peak <= 3840.0 + 4.0 * 32.0, "slack is four tiles");
    assert_eq!(view.origin().x, 3840.0);
    assert_eq!(settles(&view.take_events()), [ZoomTier::Normal]);
}

#[test]
fn pinch_to_1_9_doubles_tile_size() {
    let (mut view, mut router, mut city) = setup();
    at_tile_size(&mut view, 16);

    router.route(
        &mut view,
        &mut city,
        GestureEvent::Pinch {
            focus: Point::new(300.0, 100.0),
            factor: 1.9,
        },
    );
    router.route(&mut view, &mut city, GestureEvent::PinchEnd);
    assert!(matches!(
        view.momentum(),
        MomentumTask::ZoomSettle {
            target: ZoomTier::Double,
            ..
        }
    ));
    run_to_idle(&mut view);

    assert_eq!(view.tile_size(), TileSize::MAX);
    assert_eq!(view.scale(), 1.0);
    assert!(view.bounds().contains(view.origin()));
    assert_eq!(
        view.take_events(),
        [
            ViewEvent::TileSizeChanged(TileSize::MAX),
            ViewEvent::ZoomSettled {
                tier: ZoomTier::Double,
                tile_size: TileSize::MAX,
            },
        ]
    );
}

#[test]
fn pinch_at_largest_tiles_stays_at_double_scale() {
    let (mut view, mut router, mut city) = setup();
    view.take_events();
    router.route(
        &mut view,
        &mut city,
        GestureEvent::Pinch {
            focus: CENTER,
            factor: 1.9,
        },
    );
    router.route(&mut view, &mut city, GestureEvent::PinchEnd);
    run_to_idle(&mut view);

    assert_eq!(view.tile_size(), TileSize::MAX);
    assert_eq!(view.scale(), 2.0);
    assert_eq!(settles(&view.take_events()), [ZoomTier::Double]);
}

#[test]
fn half_tier_at_smallest_tiles_keeps_tile_size() {
    let (mut view, mut router, mut city) = setup();
    at_tile_size(&mut view, 8);

    router.route(
        &mut view,
        &mut city,
        GestureEvent::Pinch {
            focus: CENTER,
            factor: 0.6,
        },
    );
    router.route(&mut view, &mut city, GestureEvent::PinchEnd);
    run_to_idle(&mut view);

    assert_eq!(view.tile_size(), TileSize::MIN);
    assert_eq!(view.scale(), 0.5);
    assert_eq!(
        view.take_events(),
        [ViewEvent::ZoomSettled {
            tier: ZoomTier::Half,
            tile_size: TileSize::MIN,
        }]
    );
}

#[test]
fn settled_scale_is_always_a_tier() {
    for factor in [0.3, 0.55, 0.72, 0.95, 1.2, 1.41, 1.42, 1.7, 3.0] {
        let (mut view, mut router, mut city) = setup();
        at_tile_size(&mut view, 16);
        router.route(&mut view, &mut city, GestureEvent::Pinch { focus: CENTER, factor });
        router.route(&mut view, &mut city, GestureEvent::PinchEnd);
        run_to_idle(&mut view);
        assert!(
            [0.5, 1.0, 2.0].contains(&view.scale()),
            "factor {factor} settled at {}",
            view.scale()
        );
        assert!(view.bounds().contains(view.origin()));
    }
}

#[test]
fn pans_never_leave_bounds() {
    let (mut view, mut router, mut city) = setup();
    let deltas = [
        Vec2::new(50.0, 20.0),
        Vec2::new(-9000.0, 3.0),
        Vec2::new(1.5, -7000.0),
        Vec2::new(12_000.0, 12_000.0),
        Vec2::new(-33.0, 0.25),
        Vec2::new(-1e9, 1e9),
    ];
    for (i, delta) in deltas.into_iter().cycle().take(60).enumerate() {
        if i % 7 == 0 {
            router.route(
                &mut view,
                &mut city,
                GestureEvent::Pinch {
                    focus: CENTER,
                    factor: 0.8,
                },
            );
        }
        router.route(&mut view, &mut city, GestureEvent::Pan { delta });
        assert!(
            view.bounds().contains(view.origin()),
            "{:?} escaped {:?}",
            view.origin(),
            view.bounds()
        );
    }
}

#[test]
fn pinch_scale_stays_in_range() {
    let (mut view, mut router, mut city) = setup();
    for factor in [1.5, 1.5, 1.5, 0.1, 0.9, 0.5, 7.0, 1.01, 0.99] {
        router.route(
            &mut view,
            &mut city,
            GestureEvent::Pinch {
                focus: Point::new(100.0, 250.0),
                factor,
            },
        );
        assert!((MIN_SCALE..=MAX_SCALE).contains(&view.scale()));
    }
}

#[test]
fn oversized_zoom_step_cannot_push_scale_out_of_range() {
    let config = ViewConfig {
        zoom_step: 1.5,
        ..ViewConfig::default()
    };
    let mut view = ViewportController::new(config, Size::new(480.0, 320.0));
    view.set_grid_size(120, 100);
    let (mut router, mut city) = (GestureRouter::new(), City::new());

    router.route(
        &mut view,
        &mut city,
        GestureEvent::Pinch {
            focus: CENTER,
            factor: 1.2,
        },
    );
    router.route(&mut view, &mut city, GestureEvent::PinchEnd);
    for _ in 0..20 {
        let Some(deadline) = view.next_deadline() else {
            break;
        };
        view.advance_to(deadline);
        assert!(
            (MIN_SCALE..=MAX_SCALE).contains(&view.scale()),
            "scale escaped: {}",
            view.scale()
        );
    }
    assert!(view.momentum().is_idle(), "settle should finish");
    assert_eq!(view.scale(), 1.0);
    assert_eq!(settles(&view.take_events()), [ZoomTier::Normal]);
}

#[test]
fn zero_tick_period_still_lets_time_advance() {
    let config = ViewConfig::default().with_tick_period(Duration::ZERO);
    let mut view = ViewportController::new(config, Size::new(480.0, 320.0));
    view.set_grid_size(120, 100);
    assert!(view.config().tick_period > Duration::ZERO);
    let (mut router, mut city) = (GestureRouter::new(), City::new());

    router.route(
        &mut view,
        &mut city,
        GestureEvent::Fling {
            velocity: Vec2::new(-800.0, 0.0),
        },
    );
    view.advance_to(Duration::from_millis(10));
    assert_eq!(view.now(), Duration::from_millis(10));
    assert!(view.origin().x > 1920.0, "the fling has started moving");

    view.advance_to(Duration::from_secs(10));
    assert!(view.momentum().is_idle());
    assert!(view.bounds().contains(view.origin()));
}

#[test]
fn fling_during_zoom_settle_completes_the_settle_first() {
    let (mut view, mut router, mut city) = setup();
    at_tile_size(&mut view, 16);
    router.route(
        &mut view,
        &mut city,
        GestureEvent::Pinch {
            focus: CENTER,
            factor: 1.6,
        },
    );
    router.route(&mut view, &mut city, GestureEvent::PinchEnd);
    assert!(matches!(view.momentum(), MomentumTask::ZoomSettle { .. }));

    router.route(
        &mut view,
        &mut city,
        GestureEvent::Fling {
            velocity: Vec2::new(0.0, 500.0),
        },
    );

    assert_eq!(view.tile_size(), TileSize::MAX);
    assert_eq!(view.scale(), 1.0);
    assert!(matches!(view.momentum(), MomentumTask::ScrollFling { .. }));
    assert_eq!(settles(&view.take_events()), [ZoomTier::Double]);
    assert_eq!(
        view.next_deadline(),
        Some(view.now() + Duration::from_millis(100)),
        "only the fling tick is queued"
    );
}

#[test]
fn down_stops_a_fling_where_it_is() {
    let (mut view, mut router, mut city) = setup();
    router.route(
        &mut view,
        &mut city,
        GestureEvent::Fling {
            velocity: Vec2::new(-2000.0, 0.0),
        },
    );
    view.advance_to(Duration::from_millis(100));
    let stopped_at = view.origin();
    view.take_events();

    router.route(&mut view, &mut city, GestureEvent::Down);
    assert!(view.momentum().is_idle());
    assert_eq!(view.next_deadline(), None);
    view.advance_to(Duration::from_secs(10));
    assert_eq!(view.origin(), stopped_at);
    assert!(view.take_events().is_empty(), "a cancelled fling does not settle");
}

#[test]
fn blink_schedules_once_and_stops_when_powered() {
    let (mut view, _router, mut city) = setup();
    let target = GridLocation::new(60, 50);
    city.unpowered.insert(target);

    let mut glyphs = Vec::new();
    view.draw(&city, &mut |loc: GridLocation, glyph: TileGlyph<u16>| {
        if loc == target {
            glyphs.push(glyph);
        }
    });
    assert!(view.blink_scheduled());
    assert_eq!(view.next_deadline(), Some(Duration::from_millis(500)));

    // A second pass before the toggle does not queue another one.
    view.draw(&city, &mut |_: GridLocation, _: TileGlyph<u16>| {});
    view.take_redraws();
    view.advance_to(Duration::from_millis(500));
    assert!(view.blink_phase(), "exactly one toggle fired");
    assert_eq!(
        view.take_redraws(),
        [Redraw::Region(view.transform().tile_rect(target))]
    );

    view.draw(&city, &mut |loc: GridLocation, glyph: TileGlyph<u16>| {
        if loc == target {
            glyphs.push(glyph);
        }
    });
    assert_eq!(glyphs, [TileGlyph::Normal(110), TileGlyph::Unpowered(110)]);

    // Power restored: the next toggle finds nothing and the cycle stops.
    city.unpowered.clear();
    view.advance_to(Duration::from_millis(1000));
    view.draw(&city, &mut |_: GridLocation, _: TileGlyph<u16>| {});
    assert!(!view.blink_scheduled());
    assert_eq!(view.next_deadline(), None);
}

#[test]
fn blinking_can_be_switched_off() {
    let config = ViewConfig::default().with_blink_unpowered(false);
    let mut view = ViewportController::new(config, Size::new(480.0, 320.0));
    view.set_grid_size(120, 100);
    let mut city = City::new();
    city.unpowered.insert(GridLocation::new(60, 50));

    let mut unpowered = 0;
    view.draw(&city, &mut |_: GridLocation, glyph: TileGlyph<u16>| {
        if matches!(glyph, TileGlyph::Unpowered(_)) {
            unpowered += 1;
        }
    });
    assert_eq!(unpowered, 0);
    assert!(!view.blink_scheduled());
}

#[test]
fn draw_visits_only_visible_cells() {
    let (mut view, _router, city) = setup();
    let mut count = 0;
    view.draw(&city, &mut |loc: GridLocation, _: TileGlyph<u16>| {
        assert!(loc.is_within(120, 100));
        count += 1;
    });
    // 480x320 at 32 px is 15x10 cells, plus the partial row and column.
    assert_eq!(count, 16 * 11);
}

#[test]
fn tool_failure_is_reported_through_notifier() {
    let (mut view, mut router, mut city) = setup();
    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&failures);
    router.set_tool(Some(Box::new(
        |_: &mut City, loc: GridLocation| -> Result<(), ToolError> {
            Err(format!("cannot build at {loc}").into())
        },
    )));
    router.set_notifier(Some(Box::new(move |err: &ToolError| {
        sink.borrow_mut().push(err.message().to_owned());
    })));

    router.route(&mut view, &mut city, GestureEvent::Tap { point: CENTER });
    router.route(&mut view, &mut city, GestureEvent::Pan { delta: Vec2::new(32.0, 0.0) });

    assert_eq!(*failures.borrow(), ["cannot build at (60, 50)"]);
    assert_eq!(view.origin(), Point::new(1952.0, 1600.0), "pipeline keeps going");
}

#[test]
fn tool_is_applied_instead_of_inspect() {
    let (mut view, mut router, mut city) = setup();
    let inspected = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&inspected);
    router.set_inspector(Some(Box::new(move |_: GridLocation| {
        *sink.borrow_mut() += 1;
    })));
    router.set_tool(Some(Box::new(
        |city: &mut City, loc: GridLocation| -> Result<(), ToolError> {
            city.bulldozed.push(loc);
            Ok(())
        },
    )));

    router.route(&mut view, &mut city, GestureEvent::Tap { point: CENTER });
    assert_eq!(city.bulldozed, [GridLocation::new(60, 50)]);
    assert_eq!(*inspected.borrow(), 0);

    router.set_tool(None);
    router.route(&mut view, &mut city, GestureEvent::Tap { point: CENTER });
    assert_eq!(*inspected.borrow(), 1);
}

#[test]
fn tool_failure_without_notifier_is_swallowed() {
    let (mut view, mut router, mut city) = setup();
    router.set_tool(Some(Box::new(
        |_: &mut City, _: GridLocation| -> Result<(), ToolError> { Err("nope".into()) },
    )));
    assert!(router.route(&mut view, &mut city, GestureEvent::Tap { point: CENTER }));
}

#[test]
fn taps_outside_the_map_are_dropped() {
    let (mut view, mut router, mut city) = setup();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    router.set_inspector(Some(Box::new(move |loc: GridLocation| {
        sink.borrow_mut().push(loc);
    })));
    router.route(
        &mut view,
        &mut city,
        GestureEvent::Pan {
            delta: Vec2::new(-1e6, -1e6),
        },
    );
    assert_eq!(view.origin(), Point::ZERO);

    router.route(&mut view, &mut city, GestureEvent::Tap { point: Point::new(10.0, 10.0) });
    assert!(seen.borrow().is_empty());

    router.route(&mut view, &mut city, GestureEvent::Tap { point: Point::new(250.0, 170.0) });
    assert_eq!(*seen.borrow(), [GridLocation::new(0, 0)]);
}

#[test]
fn disabled_router_ignores_everything() {
    let (mut view, mut router, mut city) = setup();
    router.set_touch_enabled(false);
    let before = view.origin();
    assert!(!router.route(
        &mut view,
        &mut city,
        GestureEvent::Pan {
            delta: Vec2::new(100.0, 100.0),
        },
    ));
    assert!(!router.route(
        &mut view,
        &mut city,
        GestureEvent::Fling {
            velocity: Vec2::new(100.0, 100.0),
        },
    ));
    assert_eq!(view.origin(), before);
    assert!(view.momentum().is_idle());
}

#[test]
fn restore_clamps_scale_and_origin() {
    let (mut view, _router, _city) = setup();
    view.restore_state(&ViewState {
        scale: 0.1,
        origin_x: 500.0,
        origin_y: -20.0,
    });
    assert_eq!(view.scale(), 0.5);
    assert_eq!(view.origin(), Point::new(500.0, 0.0));

    view.restore_state(&ViewState {
        scale: f64::NAN,
        origin_x: 700.0,
        origin_y: 800.0,
    });
    assert_eq!(view.scale(), 1.0);
    assert_eq!(view.save_state(), ViewState {
        scale: 1.0,
        origin_x: 700.0,
        origin_y: 800.0,
    });
}

#[test]
fn tile_changes_redraw_one_region() {
    let (mut view, _router, _city) = setup();
    view.take_redraws();
    view.tile_changed(GridLocation::new(61, 50));
    view.tile_changed(GridLocation::new(61, 51));
    let redraws = view.take_redraws();
    assert_eq!(redraws.len(), 2);
    assert!(redraws.iter().all(|r| matches!(r, Redraw::Region(_))));

    view.tile_changed(GridLocation::new(0, 0));
    view.whole_map_changed();
    assert_eq!(view.take_redraws(), [Redraw::Full]);
}

#[cfg(feature = "serde")]
#[test]
fn view_state_round_trips_through_json() {
    let (view, _router, _city) = setup();
    let json = serde_json::to_string(&view.save_state()).unwrap();
    let back: ViewState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, view.save_state());

    let config: ViewConfig = serde_json::from_str(r#"{"overscroll_tiles": 2}"#).unwrap();
    assert_eq!(config.overscroll_tiles, 2);
    assert_eq!(config.tick_period, ViewConfig::default().tick_period);
}
