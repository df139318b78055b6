use compute::{TargetingConfig, compute_transform};
use formats::{GeoPoint, Geometry, MemorySource};
use layers::{AnnotationSides, LabelMetrics, LabelSide};
use runtime::MapEvent;
use widget::{ControllerState, MapCommand, MapOptions, WorldMap, WorldMapError};

/// One country covering the whole data extent.
const WORLD_COUNTRY: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "properties": {"ISO_A2": "WL", "ISO_A3": "WLD", "NAME": "Worldland", "areakm": 100000000, "TA6_COUNTRY": false},
        "geometry": {"type": "Polygon", "coordinates": [[[-150, -70], [150, -70], [150, 70], [-150, 70], [-150, -70]]]}
    }]
}"#;

const MIXED_COUNTRIES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"ISO_A2": "BG", "ISO_A3": "BIG", "NAME": "Bigland", "areakm": 640000, "TA6_COUNTRY": false},
            "geometry": {"type": "Polygon", "coordinates": [[[-40, -20], [0, -20], [0, 20], [-40, 20], [-40, -20]]]}
        },
        {
            "type": "Feature",
            "properties": {"ISO_A2": "TY", "ISO_A3": "TNY", "NAME": "Tinyisle", "areakm": 50, "TA6_COUNTRY": true},
            "geometry": {"type": "Polygon", "coordinates": [[[30, 10], [30.2, 10], [30.2, 10.2], [30, 10.2], [30, 10]]]}
        },
        {
            "type": "Feature",
            "properties": {"ISO_A3": "SNF", "NAME": "Smallmain", "areakm": 50, "TA6_COUNTRY": false},
            "geometry": {"type": "Polygon", "coordinates": [[[35, 10], [35.2, 10], [35.2, 10.2], [35, 10.2], [35, 10]]]}
        },
        {
            "type": "Feature",
            "properties": {"ISO_A2": "ED", "ISO_A3": "EDG", "NAME": "Edgeland", "areakm": 20000, "TA6_COUNTRY": true},
            "geometry": {"type": "Polygon", "coordinates": [[[40, 10], [42, 10], [42, 12], [40, 12], [40, 10]]]}
        }
    ]
}"#;

const DISPUTED_LINES: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "properties": {"label": "northern limit"},
        "geometry": {"type": "LineString", "coordinates": [[-10, 30], [10, 30]]}
    }]
}"#;

struct FixedMetrics;

impl LabelMetrics for FixedMetrics {
    fn measure(&self, label: &str) -> [f64; 2] {
        [label.chars().count() as f64 * 6.0, 12.0]
    }
}

fn source_with(countries: &str) -> MemorySource {
    let mut source = MemorySource::new();
    source.insert("/countries-simplified.geojson", countries);
    source.insert("/disputed-lines.geojson", DISPUTED_LINES);
    source
}

fn options() -> MapOptions {
    let mut options = MapOptions::new(800.0, 600.0);
    options.annotation_sides =
        AnnotationSides::new(vec![("northern limit".to_string(), LabelSide::Top)]);
    options
}

/// Planar bounds of a geographic box, edge-sampled the way the targeting
/// engine measures it.
fn projected_box(map: &WorldMap, min: [f64; 2], max: [f64; 2]) -> ([f64; 2], [f64; 2]) {
    let corners = [
        [min[0], min[1]],
        [max[0], min[1]],
        [max[0], max[1]],
        [min[0], max[1]],
    ];
    let mut out_min = [f64::INFINITY, f64::INFINITY];
    let mut out_max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        for s in 0..=24 {
            let t = s as f64 / 24.0;
            let p = map.projection().project(GeoPoint::new(
                a[0] + (b[0] - a[0]) * t,
                a[1] + (b[1] - a[1]) * t,
            ));
            out_min[0] = out_min[0].min(p.x);
            out_min[1] = out_min[1].min(p.y);
            out_max[0] = out_max[0].max(p.x);
            out_max[1] = out_max[1].max(p.y);
        }
    }
    (out_min, out_max)
}

#[test]
fn full_extent_country_frames_per_the_targeting_formulas() {
    let mut map = WorldMap::load(options(), &source_with(WORLD_COUNTRY)).expect("load");
    map.handle_command(MapCommand::CountrySelect {
        isocode: "WLD".to_string(),
        zoom_to: true,
    })
    .expect("command");
    map.tick(1.0);
    assert_eq!(map.state(), ControllerState::Idle);

    let t = map.transform();
    let geometry = Geometry::Polygon(vec![vec![
        GeoPoint::new(-150.0, -70.0),
        GeoPoint::new(150.0, -70.0),
        GeoPoint::new(150.0, 70.0),
        GeoPoint::new(-150.0, 70.0),
        GeoPoint::new(-150.0, -70.0),
    ]]);
    let expected = compute_transform(
        &geometry,
        800.0,
        600.0,
        map.projection(),
        &TargetingConfig::default(),
    )
    .expect("targeting");
    assert_eq!(t, expected.transform);

    let (min, max) = projected_box(&map, [-150.0, -70.0], [150.0, 70.0]);
    let dx = max[0] - min[0];
    let dy = max[1] - min[1];
    let cx = (min[0] + max[0]) / 2.0;
    let cy = (min[1] + max[1]) / 2.0;

    assert!(dx * t.scale <= 800.0 * 0.9 + 1e-6);
    assert!(dy * t.scale <= 600.0 * 0.9 + 1e-6);
    assert!((t.translate_x - (800.0 / 4.0 - t.scale * cx)).abs() < 1e-6);
    assert!((t.translate_y - (600.0 / 2.0 - t.scale * cy)).abs() < 1e-6);
}

#[test]
fn unknown_code_with_zoom_leaves_everything_unchanged() {
    let mut map = WorldMap::load(options(), &source_with(WORLD_COUNTRY)).expect("load");
    let before = map.transform();

    map.handle_command(MapCommand::CountrySelect {
        isocode: "XX".to_string(),
        zoom_to: true,
    })
    .expect("command");
    map.tick(1.0);

    assert_eq!(map.transform(), before);
    assert_eq!(map.selection().selected(), None);
    assert_eq!(map.state(), ControllerState::Idle);
}

#[test]
fn overlay_visibility_tracks_the_zoom_threshold() {
    let mut map = WorldMap::load(options(), &source_with(WORLD_COUNTRY)).expect("load");
    assert!(!map.overlay_visible());
    assert!(map.disputed_snapshot(&FixedMetrics).is_none());

    // Zoom in past the threshold.
    map.on_wheel(-700.0);
    assert!(map.transform().scale >= 3.0);
    assert!(map.overlay_visible());
    let snapshot = map.disputed_snapshot(&FixedMetrics).expect("overlay");
    assert_eq!(snapshot.annotations.len(), 1);
    assert_eq!(snapshot.annotations[0].side, Some(LabelSide::Top));
    assert!(snapshot.annotations[0].leader.is_some());

    // Further zooming in keeps it shown.
    map.on_wheel(-50.0);
    assert!(map.overlay_visible());

    // Dropping back below the threshold hides it again.
    map.on_wheel(500.0);
    assert!(map.transform().scale < 3.0);
    assert!(!map.overlay_visible());
    assert!(map.disputed_snapshot(&FixedMetrics).is_none());
}

#[test]
fn marker_rule_follows_area_and_flag() {
    let map = WorldMap::load(options(), &source_with(MIXED_COUNTRIES)).expect("load");
    let snapshot = map.country_snapshot();

    let marker_codes: Vec<&str> = snapshot.markers.iter().map(|m| m.isocode.as_str()).collect();
    assert_eq!(marker_codes, vec!["TY"]);

    let path_codes: Vec<&str> = snapshot.paths.iter().map(|p| p.isocode.as_str()).collect();
    assert_eq!(path_codes, vec!["BG", "SNF", "ED"]);
    assert!(!snapshot.markers_hidden);
}

#[test]
fn hover_and_click_flow_out_as_events() {
    let mut map = WorldMap::load(options(), &source_with(MIXED_COUNTRIES)).expect("load");

    map.on_hover(Some("BG"));
    map.on_hover(Some("BG"));
    map.on_click("BG");
    map.on_hover(None);

    let events = map.drain_events();
    assert_eq!(
        events,
        vec![
            MapEvent::CountryHover {
                isocode: Some("BG".to_string())
            },
            MapEvent::CountryClick {
                isocode: "BG".to_string()
            },
            MapEvent::CountryHover { isocode: None },
        ]
    );

    // Hover highlights without touching the persisted selection.
    map.on_hover(Some("BG"));
    let snapshot = map.country_snapshot();
    assert!(snapshot.paths[0].highlighted);
    assert_eq!(map.selection().selected(), None);
}

#[test]
fn disabled_interactivity_suppresses_pointer_wiring() {
    let mut opts = options();
    opts.disable_interactivity = true;
    let mut map = WorldMap::load(opts, &source_with(MIXED_COUNTRIES)).expect("load");

    map.on_wheel(-700.0);
    map.on_pan_start();
    map.on_pan_move(50.0, 50.0);
    map.on_hover(Some("BG"));
    map.on_click("BG");

    assert_eq!(map.transform().scale, 1.0);
    assert_eq!(map.transform().translate_x, 0.0);
    assert!(map.drain_events().is_empty());

    // External commands still work.
    map.handle_command(MapCommand::CountrySelect {
        isocode: "BG".to_string(),
        zoom_to: false,
    })
    .expect("command");
    assert_eq!(map.selection().selected(), Some("BG"));
}

#[test]
fn disabled_scroll_zoom_still_allows_panning() {
    let mut opts = options();
    opts.disable_scroll_zoom = true;
    let mut map = WorldMap::load(opts, &source_with(MIXED_COUNTRIES)).expect("load");

    map.on_wheel(-700.0);
    assert_eq!(map.transform().scale, 1.0);

    map.on_pan_start();
    map.on_pan_move(25.0, 10.0);
    map.on_gesture_end();
    assert_eq!(map.transform().translate_x, 25.0);
    assert_eq!(map.state(), ControllerState::Idle);
}

#[test]
fn preselected_iso_is_framed_at_load() {
    let mut opts = options();
    opts.iso = Some("BIG".to_string());
    let map = WorldMap::load(opts, &source_with(MIXED_COUNTRIES)).expect("load");

    assert_eq!(map.selection().selected(), Some("BG"));
    assert_eq!(map.state(), ControllerState::Idle);
    assert_ne!(map.transform().translate_x, 0.0);
    assert!(map.transform().scale <= 0.9 + 1e-12);
}

#[test]
fn missing_source_fails_the_whole_load() {
    let mut source = MemorySource::new();
    source.insert("/countries-simplified.geojson", WORLD_COUNTRY);
    let err = WorldMap::load(options(), &source).unwrap_err();
    assert!(matches!(err, WorldMapError::Load(_)));
}

#[test]
fn resize_refits_the_projection() {
    let mut map = WorldMap::load(options(), &source_with(WORLD_COUNTRY)).expect("load");
    let before = map
        .projection()
        .project(GeoPoint::new(0.0, 0.0));
    map.resize(400.0, 300.0);
    let after = map.projection().project(GeoPoint::new(0.0, 0.0));
    assert_ne!(before, after);
    assert!(after.x <= 400.0 && after.y <= 300.0);
}
