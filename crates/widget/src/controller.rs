use compute::{TargetingConfig, TargetingError, compute_transform};
use formats::MapData;
use runtime::{EventBus, MapEvent, Tween};
use scene::{Projection, SelectionState, Transform};
use tracing::{debug, warn};

/// Duration of the eased zoom-to-country transition.
const ZOOM_ANIMATION_S: f64 = 0.75;
/// Wheel-delta to zoom-factor exponent.
const WHEEL_ZOOM_RATE: f64 = 0.002;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Panning,
    AnimatingZoom,
}

/// Inbound command from the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapCommand {
    CountrySelect { isocode: String, zoom_to: bool },
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct ZoomAnimation {
    tween: Tween,
    from: Transform,
    to: Transform,
}

/// Owns the camera transform and the selection state; every mutation of
/// either flows through here. Event delivery is serial, so no interior
/// locking is needed — handlers only have to tolerate rapid re-firing.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    state: ControllerState,
    transform: Transform,
    selection: SelectionState,
    animation: Option<ZoomAnimation>,
    viewport: (f64, f64),
    targeting: TargetingConfig,
    hide_markers: bool,
}

impl InteractionController {
    pub fn new(viewport: (f64, f64), targeting: TargetingConfig) -> Self {
        Self {
            state: ControllerState::Idle,
            transform: Transform::identity(),
            selection: SelectionState::new(),
            animation: None,
            viewport,
            targeting,
            hide_markers: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Whether the last targeting result asked for small-territory markers
    /// to be hidden.
    pub fn hide_markers(&self) -> bool {
        self.hide_markers
    }

    pub fn set_viewport(&mut self, viewport: (f64, f64)) {
        self.viewport = viewport;
    }

    /// A new pointer gesture takes over from any in-flight animation.
    pub fn on_pan_start(&mut self) {
        self.animation = None;
        self.state = ControllerState::Panning;
    }

    pub fn on_pan_move(&mut self, dx: f64, dy: f64) {
        if self.state != ControllerState::Panning {
            return;
        }
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
    }

    /// Exponential wheel zoom; positive delta zooms out. The scale is
    /// clamped to the free pan/zoom range on every update.
    pub fn on_wheel(&mut self, delta: f64) {
        self.animation = None;
        if self.state == ControllerState::AnimatingZoom {
            self.state = ControllerState::Idle;
        }
        self.transform.scale *= (-delta * WHEEL_ZOOM_RATE).exp();
        self.transform = self.transform.clamped_free();
    }

    pub fn on_gesture_end(&mut self) {
        if self.state == ControllerState::Panning {
            self.state = ControllerState::Idle;
        }
    }

    /// Transient hover highlight. Emits only on actual change, so a
    /// leave/enter pair fires exactly two notifications and repeats fire
    /// none.
    pub fn on_hover(&mut self, isocode: Option<&str>, bus: &mut EventBus) {
        if self.selection.set_hover(isocode) {
            bus.emit(MapEvent::CountryHover {
                isocode: isocode.map(str::to_string),
            });
        }
    }

    /// Click notification only; clicking never moves the camera.
    pub fn on_click(&self, isocode: &str, bus: &mut EventBus) {
        bus.emit(MapEvent::CountryClick {
            isocode: isocode.to_string(),
        });
    }

    /// Handles an external selection command. An unknown code clears the
    /// highlight and reports nothing; a targeting failure is a fatal
    /// invariant violation and surfaces as an error.
    pub fn handle_command(
        &mut self,
        command: MapCommand,
        data: &MapData,
        projection: &Projection,
    ) -> Result<(), TargetingError> {
        let MapCommand::CountrySelect { isocode, zoom_to } = command;

        let Some(feature) = data.find_by_iso_code(&isocode) else {
            warn!(isocode = %isocode, "select command matched no country");
            self.selection.clear_selection();
            return Ok(());
        };

        self.selection.select(feature.primary_code());
        if !zoom_to {
            return Ok(());
        }

        let (width, height) = self.viewport;
        let result = compute_transform(
            &feature.geometry,
            width,
            height,
            projection,
            &self.targeting,
        )?;
        self.hide_markers = result.hide_markers;
        self.animate_to(result.transform);
        debug!(isocode = %isocode, scale = result.transform.scale, "zooming to country");
        Ok(())
    }

    /// Starts (or supersedes) the eased transition toward `to`. Only the
    /// latest requested transform is meaningful, so an in-flight animation
    /// is cancelled rather than queued behind.
    fn animate_to(&mut self, to: Transform) {
        self.animation = Some(ZoomAnimation {
            tween: Tween::new(ZOOM_ANIMATION_S),
            from: self.transform,
            to,
        });
        self.state = ControllerState::AnimatingZoom;
    }

    /// Advances the in-flight animation; completion returns to `Idle`.
    pub fn tick(&mut self, dt_s: f64) {
        let Some(mut animation) = self.animation else {
            return;
        };
        let progress = animation.tween.advance(dt_s);
        self.transform = Transform::lerp(animation.from, animation.to, progress);
        if animation.tween.finished() {
            self.animation = None;
            self.state = ControllerState::Idle;
            debug!(scale = self.transform.scale, "zoom animation finished");
        } else {
            self.animation = Some(animation);
        }
    }
}
