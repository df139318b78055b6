use foundation::bounds::Aabb2;
use formats::{GeoPoint, Geometry};
use scene::{Projection, Transform};

use crate::geometry::{Part, bounding_box_all, box_area_m2, buffer, flatten_parts};

/// Samples per edge when pushing a geographic box through the projection;
/// curved edges (x extremes sit mid-edge near the equator) must not escape
/// the planar box.
const BOX_EDGE_SAMPLES: usize = 24;

/// Fraction of the tight viewport axis the framed region fills.
const FRAME_FILL: f64 = 0.9;

/// Calibrated framing constants. Values are tuned against the fixed world
/// projection's unit scale; a different projection needs re-tuning, which
/// is a configuration change here.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TargetingConfig {
    /// Parts smaller than this fraction of the largest part are dropped
    /// before framing, so slivers and far-flung exclaves cannot dominate
    /// the fitted box.
    pub big_part_ratio: f64,
    /// Outward growth per buffering pass (kilometers).
    pub buffer_step_km: f64,
    /// Buffering stops once the bounding box reaches this spherical area
    /// (square meters), giving every country a comparable minimum
    /// visual footprint.
    pub min_box_area_m2: f64,
    /// Invariant guard: valid source geometry converges in a handful of
    /// passes, so reaching this cap is a fatal precondition violation.
    pub max_buffer_iterations: u32,
    /// Ceiling on the produced scale. The default never frames tighter
    /// than 1:1; relax it to permit extreme zoom.
    pub scale_cap: f64,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            big_part_ratio: 0.1,
            buffer_step_km: 25.0,
            min_box_area_m2: 55_000_000_000.0,
            max_buffer_iterations: 500,
            scale_cap: 0.9,
        }
    }
}

impl TargetingConfig {
    /// Configuration variant that lets targeting zoom past 1:1.
    pub fn with_scale_cap(self, scale_cap: f64) -> Self {
        Self { scale_cap, ..self }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TargetingError {
    /// Vertex-free input; a framing request for it is a programming error.
    EmptyGeometry,
    /// The buffer loop hit its iteration cap without reaching the box-area
    /// target. Distinct from lookup misses: this means degenerate
    /// geometry reached the engine.
    BufferDidNotConverge { iterations: u32 },
}

impl std::fmt::Display for TargetingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetingError::EmptyGeometry => write!(f, "cannot frame empty geometry"),
            TargetingError::BufferDidNotConverge { iterations } => {
                write!(
                    f,
                    "bounding box failed to reach the area target after {iterations} buffer passes"
                )
            }
        }
    }
}

impl std::error::Error for TargetingError {}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TargetResult {
    pub transform: Transform,
    /// Once boundaries are legible (scale beyond 1:1), small-territory
    /// point markers are redundant and should be hidden.
    pub hide_markers: bool,
}

/// Computes the camera transform that frames `geometry` in the left half
/// of the viewport (the right half is reserved for auxiliary UI).
///
/// Applying the transform is the controller's business; this function is
/// pure and idempotent.
pub fn compute_transform(
    geometry: &Geometry,
    viewport_width: f64,
    viewport_height: f64,
    projection: &Projection,
    config: &TargetingConfig,
) -> Result<TargetResult, TargetingError> {
    let parts = flatten_parts(geometry);
    if parts.is_empty() {
        return Err(TargetingError::EmptyGeometry);
    }

    let max_area = parts.iter().map(|p| p.area_m2).fold(0.0, f64::max);
    let big: Vec<&Part> = parts
        .iter()
        .filter(|p| p.area_m2 >= max_area * config.big_part_ratio)
        .collect();
    // The largest part always passes its own threshold, so `big` is only
    // empty if every area came out NaN; fall back to the full set.
    let kept: Vec<Geometry> = if big.is_empty() {
        parts.iter().map(|p| p.geometry.clone()).collect()
    } else {
        big.into_iter().map(|p| p.geometry.clone()).collect()
    };

    let geo_box = grow_to_minimum_box(kept, config)?;
    let planar = project_box(projection, &geo_box);

    let dx = planar.width();
    let dy = planar.height();
    let [x, y] = planar.center();

    let scale = (FRAME_FILL / (dx / viewport_width).max(dy / viewport_height))
        .min(config.scale_cap);
    let transform = Transform::new(
        scale,
        viewport_width / 4.0 - scale * x,
        viewport_height / 2.0 - scale * y,
    );

    Ok(TargetResult {
        transform,
        hide_markers: scale > 1.0,
    })
}

/// Buffers the kept parts outward until their shared bounding box reaches
/// the configured minimum area.
fn grow_to_minimum_box(
    mut geometries: Vec<Geometry>,
    config: &TargetingConfig,
) -> Result<Aabb2, TargetingError> {
    let mut bounds = bounding_box_all(&geometries).ok_or(TargetingError::EmptyGeometry)?;
    let mut iterations = 0;
    while box_area_m2(&bounds) < config.min_box_area_m2 {
        if iterations >= config.max_buffer_iterations {
            return Err(TargetingError::BufferDidNotConverge { iterations });
        }
        geometries = geometries
            .iter()
            .map(|g| buffer(g, config.buffer_step_km))
            .collect();
        bounds = bounding_box_all(&geometries).ok_or(TargetingError::EmptyGeometry)?;
        iterations += 1;
    }
    Ok(bounds)
}

/// Planar bounds of a geographic box under the projection, sampling each
/// edge rather than trusting the corners alone.
fn project_box(projection: &Projection, geo_box: &Aabb2) -> Aabb2 {
    let corners = [
        [geo_box.min[0], geo_box.min[1]],
        [geo_box.max[0], geo_box.min[1]],
        [geo_box.max[0], geo_box.max[1]],
        [geo_box.min[0], geo_box.max[1]],
    ];

    let mut out: Option<Aabb2> = None;
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        for s in 0..=BOX_EDGE_SAMPLES {
            let t = s as f64 / BOX_EDGE_SAMPLES as f64;
            let p = projection.project(GeoPoint::new(
                a[0] + (b[0] - a[0]) * t,
                a[1] + (b[1] - a[1]) * t,
            ));
            match &mut out {
                Some(acc) => acc.include([p.x, p.y]),
                None => out = Some(Aabb2::new([p.x, p.y], [p.x, p.y])),
            }
        }
    }
    // The corner loop always runs, so the box always exists.
    out.unwrap_or(Aabb2::new([0.0, 0.0], [0.0, 0.0]))
}
