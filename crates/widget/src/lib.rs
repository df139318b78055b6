pub mod controller;
pub mod options;

pub use controller::*;
pub use options::*;

use compute::{TargetingConfig, TargetingError};
use formats::{FeatureSource, LoadError, MapData};
use layers::{
    CountriesLayer, CountrySnapshot, DisputedLayer, DisputedSnapshot, LabelMetrics,
};
use runtime::{EventBus, MapEvent};
use scene::{Projection, SelectionState, Transform};
use tracing::debug;

#[derive(Debug)]
pub enum WorldMapError {
    Load(LoadError),
    Targeting(TargetingError),
}

impl std::fmt::Display for WorldMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldMapError::Load(e) => write!(f, "{e}"),
            WorldMapError::Targeting(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for WorldMapError {}

impl From<LoadError> for WorldMapError {
    fn from(e: LoadError) -> Self {
        WorldMapError::Load(e)
    }
}

impl From<TargetingError> for WorldMapError {
    fn from(e: TargetingError) -> Self {
        WorldMapError::Targeting(e)
    }
}

/// The embeddable countries map: loaded data, fitted projection, layers,
/// and the interaction controller, behind one facade. The external
/// drawing surface renders the snapshots; pointer and command events are
/// forwarded in, notifications are drained out.
#[derive(Debug)]
pub struct WorldMap {
    options: MapOptions,
    data: MapData,
    projection: Projection,
    countries_layer: CountriesLayer,
    disputed_layer: DisputedLayer,
    controller: InteractionController,
    bus: EventBus,
}

impl WorldMap {
    /// Loads both sources and fits the initial view. Nothing renders on
    /// failure: the error carries the first fetch/parse problem and no
    /// partial map escapes. A configured `iso` is selected and framed
    /// immediately, without the zoom animation.
    pub fn load(options: MapOptions, source: &dyn FeatureSource) -> Result<Self, WorldMapError> {
        let (width, height) = options.viewport();
        let data = MapData::load_all(
            source,
            &options.countries_source_url(),
            &options.disputed_source_url(),
        )?;

        let mut projection = Projection::new();
        projection.fit_extent([[0.0, 0.0], [width, height]], data.countries());

        let mut map = Self {
            countries_layer: CountriesLayer::new(options.style.clone()),
            disputed_layer: DisputedLayer::new(options.annotation_sides.clone()),
            controller: InteractionController::new((width, height), TargetingConfig::default()),
            bus: EventBus::new(),
            options,
            data,
            projection,
        };
        debug!(
            countries = map.data.countries().features.len(),
            disputed = map.data.disputed().lines.len(),
            "map data loaded"
        );

        if let Some(iso) = map.options.iso.clone() {
            map.preselect(&iso)?;
        }
        Ok(map)
    }

    fn preselect(&mut self, isocode: &str) -> Result<(), TargetingError> {
        self.controller.handle_command(
            MapCommand::CountrySelect {
                isocode: isocode.to_string(),
                zoom_to: true,
            },
            &self.data,
            &self.projection,
        )?;
        // Complete the transition instantly; there is nothing on screen
        // yet to animate from.
        self.controller.tick(1.0);
        self.sync_overlay();
        Ok(())
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn data(&self) -> &MapData {
        &self.data
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn transform(&self) -> Transform {
        self.controller.transform()
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn selection(&self) -> &SelectionState {
        self.controller.selection()
    }

    pub fn overlay_visible(&self) -> bool {
        self.disputed_layer.is_visible()
    }

    /// Re-fits the projection to a new viewport; layers and targeting see
    /// the new fit immediately.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.options.width = width;
        self.options.height = height;
        let viewport = self.options.viewport();
        self.controller.set_viewport(viewport);
        self.projection
            .fit_extent([[0.0, 0.0], [viewport.0, viewport.1]], self.data.countries());
    }

    pub fn handle_command(&mut self, command: MapCommand) -> Result<(), TargetingError> {
        self.controller
            .handle_command(command, &self.data, &self.projection)?;
        self.sync_overlay();
        Ok(())
    }

    pub fn on_pan_start(&mut self) {
        if self.options.disable_interactivity {
            return;
        }
        self.controller.on_pan_start();
    }

    pub fn on_pan_move(&mut self, dx: f64, dy: f64) {
        if self.options.disable_interactivity {
            return;
        }
        self.controller.on_pan_move(dx, dy);
        self.sync_overlay();
    }

    pub fn on_wheel(&mut self, delta: f64) {
        if self.options.disable_interactivity || self.options.disable_scroll_zoom {
            return;
        }
        self.controller.on_wheel(delta);
        self.sync_overlay();
    }

    pub fn on_gesture_end(&mut self) {
        if self.options.disable_interactivity {
            return;
        }
        self.controller.on_gesture_end();
    }

    pub fn on_hover(&mut self, isocode: Option<&str>) {
        if self.options.disable_interactivity {
            return;
        }
        self.controller.on_hover(isocode, &mut self.bus);
    }

    pub fn on_click(&mut self, isocode: &str) {
        if self.options.disable_interactivity {
            return;
        }
        self.controller.on_click(isocode, &mut self.bus);
    }

    /// Advances the zoom animation and keeps the overlay in sync with the
    /// animated scale.
    pub fn tick(&mut self, dt_s: f64) {
        self.controller.tick(dt_s);
        self.sync_overlay();
    }

    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        self.bus.drain()
    }

    pub fn country_snapshot(&self) -> CountrySnapshot {
        self.countries_layer.extract(
            self.data.countries(),
            &self.projection,
            self.controller.selection(),
            self.controller.hide_markers(),
        )
    }

    /// The disputed overlay, or `None` while it is hidden. Labels must be
    /// measurable before leader lines can be laid out, hence the metrics
    /// argument.
    pub fn disputed_snapshot(&self, metrics: &dyn LabelMetrics) -> Option<DisputedSnapshot> {
        if !self.disputed_layer.is_visible() {
            return None;
        }
        Some(
            self.disputed_layer
                .extract(self.data.disputed(), &self.projection, metrics),
        )
    }

    fn sync_overlay(&mut self) {
        let scale = self.controller.transform().scale;
        if self.disputed_layer.update_visibility(scale) {
            debug!(
                scale,
                visible = self.disputed_layer.is_visible(),
                "disputed overlay toggled"
            );
        }
    }
}
