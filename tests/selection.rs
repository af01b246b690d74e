//! Selection controller behaviour against a recording map surface.

use std::cell::Cell;
use std::collections::BTreeMap;

use geo::{Coord, Rect};
use state_map_rs::camera::{Camera, FitOptions, LatLon, ViewportSize};
use state_map_rs::error::SetupError;
use state_map_rs::regions::RegionId;
use state_map_rs::selection::{
    GestureId, InputEvent, InputKind, MapSurface, RegionStyle, SelectionController,
    SelectionSettings, SelectionState, Transition,
};
use state_map_rs::setup::{self, RetryPolicy, SetupGate, SetupStep};

const A: RegionId = RegionId(0);
const B: RegionId = RegionId(1);
const C: RegionId = RegionId(2);

/// Records styles, handler bindings and camera moves. `revert_styles_on_move`
/// mimics renderers that drop per-shape overrides when the camera moves.
struct RecordingSurface {
    bounds: BTreeMap<RegionId, Rect<f64>>,
    styles: BTreeMap<RegionId, RegionStyle>,
    handlers: BTreeMap<RegionId, usize>,
    camera: Camera,
    fits: Vec<Rect<f64>>,
    revert_styles_on_move: bool,
}

impl RecordingSurface {
    fn three_regions() -> Self {
        let rect = |x0: f64, y0: f64, x1: f64, y1: f64| {
            Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
        };
        let bounds = BTreeMap::from([
            // large, mid-size and tiny
            (A, rect(-73.8, -9.8, -56.1, 2.2)),
            (B, rect(-48.0, -25.0, -44.0, -20.0)),
            (C, rect(-47.95, -15.85, -47.9, -15.8)),
        ]);
        Self {
            bounds,
            styles: BTreeMap::new(),
            handlers: BTreeMap::new(),
            camera: Camera::new(
                LatLon::new(-15.0, -53.0),
                4.5,
                4.5,
                ViewportSize {
                    width: 1280.0,
                    height: 800.0,
                },
            ),
            fits: Vec::new(),
            revert_styles_on_move: false,
        }
    }

    /// User pans/zooms by other means.
    fn pan_zoom(&mut self, center: LatLon, zoom: f64) {
        self.camera.center = center;
        self.camera.zoom = zoom.max(self.camera.min_zoom);
        if self.revert_styles_on_move {
            for style in self.styles.values_mut() {
                *style = RegionStyle::DEFAULT;
            }
        }
    }

    fn highlighted(&self) -> Vec<RegionId> {
        self.styles
            .iter()
            .filter(|(_, s)| **s == RegionStyle::HIGHLIGHT)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl MapSurface for RecordingSurface {
    fn shapes(&self) -> Vec<RegionId> {
        self.bounds.keys().copied().collect()
    }

    fn shape_bounds(&self, id: RegionId) -> Option<Rect<f64>> {
        self.bounds.get(&id).copied()
    }

    fn set_style(&mut self, id: RegionId, style: &RegionStyle) {
        self.styles.insert(id, *style);
    }

    fn bind_activation(&mut self, id: RegionId) {
        *self.handlers.entry(id).or_default() += 1;
    }

    fn unbind_activation(&mut self, id: RegionId) {
        self.handlers.remove(&id);
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, fit: &FitOptions) {
        self.fits.push(bounds);
        self.camera.fit_bounds(bounds, fit);
        if self.revert_styles_on_move {
            for style in self.styles.values_mut() {
                *style = RegionStyle::DEFAULT;
            }
        }
    }
}

fn ready_controller() -> SelectionController<RecordingSurface> {
    let mut controller =
        SelectionController::new(RecordingSurface::three_regions(), SelectionSettings::default());
    controller.attach_handlers().unwrap();
    controller
}

#[test]
fn default_state_on_load() {
    let controller = ready_controller();
    assert_eq!(controller.state(), SelectionState::Idle);
    let surface = controller.surface();
    assert_eq!(surface.styles.len(), 3);
    assert!(surface.styles.values().all(|s| *s == RegionStyle::DEFAULT));
    assert!(surface.fits.is_empty());
}

#[test]
fn toggle_idempotence_for_every_region() {
    for region in [A, B, C] {
        let mut controller = ready_controller();
        controller.activate(region);
        controller.activate(region);
        assert_eq!(controller.state(), SelectionState::Idle);
        assert!(
            controller
                .surface()
                .styles
                .values()
                .all(|s| *s == RegionStyle::DEFAULT)
        );
    }
}

#[test]
fn exclusivity_for_every_pair() {
    for first in [A, B, C] {
        for second in [A, B, C] {
            if first == second {
                continue;
            }
            let mut controller = ready_controller();
            controller.activate(first);
            controller.activate(second);
            assert_eq!(controller.surface().highlighted(), vec![second]);
            assert_eq!(controller.surface().styles[&first], RegionStyle::DEFAULT);
            assert_eq!(controller.state(), SelectionState::Selected(second));
        }
    }
}

#[test]
fn highlight_survives_pan_and_zoom() {
    let mut controller = ready_controller();
    controller.surface_mut().revert_styles_on_move = true;

    controller.activate(B);
    controller.on_viewport_change();
    assert_eq!(controller.surface().highlighted(), vec![B]);

    for (lat, lon, zoom) in [(-10.0, -50.0, 6.0), (-20.0, -40.0, 5.0), (0.0, -60.0, 8.5)] {
        controller.surface_mut().pan_zoom(LatLon::new(lat, lon), zoom);
        controller.on_viewport_change();
        assert_eq!(controller.surface().highlighted(), vec![B]);
        assert_eq!(controller.surface().styles[&B], RegionStyle::HIGHLIGHT);
    }
}

#[test]
fn zoom_ceiling_holds_for_every_region() {
    let mut controller = ready_controller();
    for region in [A, B, C] {
        controller.activate(region);
        assert!(controller.surface().camera.zoom <= 7.0);
        controller.activate(region);
    }
    // the tiny region lands exactly on the ceiling
    controller.activate(C);
    assert_eq!(controller.surface().camera.zoom, 7.0);
}

#[test]
fn scenario_select_switch_deselect() {
    let mut controller = ready_controller();

    assert_eq!(
        controller.activate(A),
        Some(Transition::Selected { id: A, previous: None })
    );
    assert_eq!(controller.surface().highlighted(), vec![A]);
    assert_eq!(controller.surface().fits.last(), Some(&controller.surface().bounds[&A]));
    assert_eq!(controller.state(), SelectionState::Selected(A));

    assert_eq!(
        controller.activate(B),
        Some(Transition::Selected { id: B, previous: Some(A) })
    );
    assert_eq!(controller.surface().styles[&A], RegionStyle::DEFAULT);
    assert_eq!(controller.surface().highlighted(), vec![B]);
    assert_eq!(controller.surface().fits.last(), Some(&controller.surface().bounds[&B]));
    assert_eq!(controller.state(), SelectionState::Selected(B));

    let camera_before = controller.surface().camera;
    assert_eq!(controller.activate(B), Some(Transition::Deselected(B)));
    assert_eq!(controller.surface().styles[&B], RegionStyle::DEFAULT);
    assert_eq!(controller.surface().camera, camera_before);
    assert_eq!(controller.surface().fits.len(), 2);
    assert_eq!(controller.state(), SelectionState::Idle);
}

#[test]
fn one_touch_gesture_activates_once() {
    let mut controller = ready_controller();
    let gesture = GestureId(7);
    let events = [InputKind::TouchStart, InputKind::Tap, InputKind::Click];

    let transitions: Vec<_> = events
        .into_iter()
        .filter_map(|kind| {
            controller.handle(InputEvent {
                region: A,
                kind,
                gesture,
            })
        })
        .collect();

    assert_eq!(transitions, vec![Transition::Selected { id: A, previous: None }]);
    assert_eq!(controller.state(), SelectionState::Selected(A));
}

#[test]
fn separate_gestures_toggle() {
    let mut controller = ready_controller();
    for gesture in 0..2 {
        controller.handle(InputEvent {
            region: C,
            kind: InputKind::Click,
            gesture: GestureId(gesture),
        });
    }
    assert_eq!(controller.state(), SelectionState::Idle);
}

#[test]
fn deferred_setup_attaches_once_available() {
    let mut gate = SetupGate::new(RetryPolicy::default());
    let settings = SelectionSettings::default();

    assert!(matches!(
        gate.poll::<RecordingSurface>(None, settings),
        SetupStep::Retry(_)
    ));
    assert!(matches!(
        gate.poll::<RecordingSurface>(None, settings),
        SetupStep::Retry(_)
    ));

    let mut controller = match gate.poll(Some(RecordingSurface::three_regions()), settings) {
        SetupStep::Ready(controller) => controller,
        _ => panic!("surface was available"),
    };
    assert_eq!(gate.attempts(), 3);
    assert!(controller.surface().handlers.values().all(|&n| n == 1));

    // a re-render re-attaches without stacking handlers
    controller.attach_handlers().unwrap();
    assert!(controller.surface().handlers.values().all(|&n| n == 1));

    // a single activation is a single transition
    assert_eq!(
        controller.activate(B),
        Some(Transition::Selected { id: B, previous: None })
    );
    assert_eq!(controller.surface().fits.len(), 1);
}

#[test]
fn setup_gives_up_after_bounded_attempts() {
    let policy = RetryPolicy {
        initial_delay_ms: 1,
        factor: 2,
        max_attempts: 3,
    };
    let mut gate = SetupGate::new(policy);
    let settings = SelectionSettings::default();

    let mut steps = Vec::new();
    for _ in 0..3 {
        steps.push(gate.poll::<RecordingSurface>(None, settings));
    }
    assert!(matches!(steps[0], SetupStep::Retry(_)));
    assert!(matches!(steps[1], SetupStep::Retry(_)));
    assert!(matches!(
        steps[2],
        SetupStep::Disabled(SetupError::MapUnavailable { attempts: 3 })
    ));
}

#[test]
fn setup_without_shapes_is_disabled() {
    let mut surface = RecordingSurface::three_regions();
    surface.bounds.clear();
    let mut gate = SetupGate::new(RetryPolicy::default());
    match gate.poll(Some(surface), SelectionSettings::default()) {
        SetupStep::Disabled(e) => assert_eq!(e, SetupError::NoRegions),
        _ => panic!("expected setup to be disabled"),
    }
}

#[tokio::test]
async fn wait_for_surface_retries_until_ready() {
    let settings = SelectionSettings {
        retry: RetryPolicy {
            initial_delay_ms: 1,
            factor: 2,
            max_attempts: 5,
        },
        ..SelectionSettings::default()
    };
    let polls = Cell::new(0);
    let controller = setup::wait_for_surface(settings, || {
        polls.set(polls.get() + 1);
        (polls.get() >= 3).then(RecordingSurface::three_regions)
    })
    .await
    .unwrap();

    assert_eq!(polls.get(), 3);
    assert_eq!(controller.state(), SelectionState::Idle);
}

#[tokio::test]
async fn wait_for_surface_reports_unavailable_map() {
    let settings = SelectionSettings {
        retry: RetryPolicy {
            initial_delay_ms: 1,
            factor: 1,
            max_attempts: 2,
        },
        ..SelectionSettings::default()
    };
    let result = setup::wait_for_surface::<RecordingSurface, _>(settings, || None).await;
    assert_eq!(
        result.err(),
        Some(SetupError::MapUnavailable { attempts: 2 })
    );
}
