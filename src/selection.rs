//! Region selection.
//!
//! One controller per displayed map. It owns the selection state and drives
//! highlight styling and camera framing on whatever [`MapSurface`] it was
//! built with. The browser script embedded in the page runs the same
//! machine against Leaflet, using the styles and fit options serialized from
//! [`SelectionSettings`].

use geo::Rect;
use serde::Serialize;
use tracing::{debug, warn};

use crate::camera::FitOptions;
use crate::error::SetupError;
use crate::regions::RegionId;
use crate::setup::RetryPolicy;

/// Per-shape paint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStyle {
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub color: &'static str,
    pub weight: f64,
    /// Drop-shadow outline cue.
    pub emphasis: bool,
}

impl RegionStyle {
    pub const DEFAULT: Self = Self {
        fill_color: "#8F8E8E",
        fill_opacity: 0.4,
        color: "black",
        weight: 1.5,
        emphasis: false,
    };

    pub const HIGHLIGHT: Self = Self {
        fill_color: "rgba(0, 0, 0, 0.1)",
        fill_opacity: 0.4,
        color: "black",
        weight: 3.0,
        emphasis: true,
    };
}

/// Everything the controller needs besides the surface. Shipped to the
/// browser as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSettings {
    pub default_style: RegionStyle,
    pub highlight_style: RegionStyle,
    pub fit: FitOptions,
    pub retry: RetryPolicy,
    /// Browser-side: a second activation of the same shape within this
    /// window belongs to the same gesture and is dropped.
    pub gesture_window_ms: u64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            default_style: RegionStyle::DEFAULT,
            highlight_style: RegionStyle::HIGHLIGHT,
            fit: FitOptions::default(),
            retry: RetryPolicy::default(),
            gesture_window_ms: 400,
        }
    }
}

/// What the controller drives: region shapes plus a camera.
pub trait MapSurface {
    /// Ids of every region shape currently rendered.
    fn shapes(&self) -> Vec<RegionId>;

    fn shape_bounds(&self, id: RegionId) -> Option<Rect<f64>>;

    fn set_style(&mut self, id: RegionId, style: &RegionStyle);

    /// Subscribe the shape's activation handler and make it interactive.
    fn bind_activation(&mut self, id: RegionId);

    fn unbind_activation(&mut self, id: RegionId);

    fn fit_bounds(&mut self, bounds: Rect<f64>, fit: &FitOptions);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(RegionId),
}

impl SelectionState {
    pub fn selected(self) -> Option<RegionId> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Selected(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Selected {
        id: RegionId,
        previous: Option<RegionId>,
    },
    Deselected(RegionId),
}

/// Raw input kinds a shape can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Pointer click, or the click a browser emulates after a tap.
    Click,
    Tap,
    TouchStart,
}

/// Identifies one physical user gesture. All raw events produced by the
/// same gesture share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub region: RegionId,
    pub kind: InputKind,
    pub gesture: GestureId,
}

pub struct SelectionController<S> {
    surface: S,
    settings: SelectionSettings,
    state: SelectionState,
    last_gesture: Option<GestureId>,
}

impl<S: MapSurface> SelectionController<S> {
    pub fn new(surface: S, settings: SelectionSettings) -> Self {
        Self {
            surface,
            settings,
            state: SelectionState::Idle,
            last_gesture: None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn settings(&self) -> &SelectionSettings {
        &self.settings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// (Re)bind every shape's activation handler and paint it with the
    /// default style. Calling this again after the surface re-renders never
    /// leaves more than one binding per shape.
    ///
    /// A selection whose shape is still present keeps its highlight; one
    /// whose shape disappeared is dropped.
    pub fn attach_handlers(&mut self) -> Result<usize, SetupError> {
        let shapes = self.surface.shapes();
        if shapes.is_empty() {
            return Err(SetupError::NoRegions);
        }

        for &id in &shapes {
            self.surface.unbind_activation(id);
            self.surface.bind_activation(id);
            self.surface.set_style(id, &self.settings.default_style);
        }

        if let SelectionState::Selected(id) = self.state {
            if shapes.contains(&id) {
                self.surface.set_style(id, &self.settings.highlight_style);
            } else {
                debug!(region = %id, "selected shape is gone after re-render");
                self.state = SelectionState::Idle;
            }
        }

        debug!(shapes = shapes.len(), "activation handlers attached");
        Ok(shapes.len())
    }

    /// Route a raw input event. Pointer clicks and touch taps activate;
    /// `touchstart` never does, and only the first event of a gesture counts.
    pub fn handle(&mut self, event: InputEvent) -> Option<Transition> {
        if event.kind == InputKind::TouchStart {
            return None;
        }
        if self.last_gesture == Some(event.gesture) {
            debug!(
                gesture = event.gesture.0,
                kind = ?event.kind,
                "ignoring repeat event for gesture"
            );
            return None;
        }
        self.last_gesture = Some(event.gesture);
        self.activate(event.region)
    }

    /// Toggle `id`: reactivating the selected region clears the selection
    /// and leaves the camera alone; anything else moves the highlight to
    /// `id` and frames it.
    pub fn activate(&mut self, id: RegionId) -> Option<Transition> {
        let Some(bounds) = self.surface.shape_bounds(id) else {
            warn!(region = %id, "activation for unknown region ignored");
            return None;
        };

        if self.state == SelectionState::Selected(id) {
            self.reset_all();
            self.state = SelectionState::Idle;
            debug!(region = %id, "region deselected");
            return Some(Transition::Deselected(id));
        }

        let previous = self.state.selected();
        self.reset_all();
        self.surface.set_style(id, &self.settings.highlight_style);
        self.state = SelectionState::Selected(id);
        self.surface.fit_bounds(bounds, &self.settings.fit);
        debug!(region = %id, ?previous, "region selected");

        Some(Transition::Selected { id, previous })
    }

    /// Pan/zoom finished. Camera moves may drop per-shape style overrides,
    /// so the highlight is painted again.
    pub fn on_viewport_change(&mut self) {
        if let SelectionState::Selected(id) = self.state {
            self.surface.set_style(id, &self.settings.highlight_style);
        }
    }

    fn reset_all(&mut self) {
        for id in self.surface.shapes() {
            self.surface.set_style(id, &self.settings.default_style);
        }
    }
}
