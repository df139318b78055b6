use foundation::bounds::Aabb2;
use foundation::math::{Vec2, ginzburg5_forward, ginzburg5_invert};
use formats::{CountryCollection, GeoPoint, Geometry};

/// Scale a freshly constructed projection sits at. Fitting measures bounds
/// at this scale and rescales from it, so repeated fits are idempotent.
const BASE_SCALE: f64 = 150.0;

/// The component's single fixed world projection, with fit state.
///
/// Forward output is screen-oriented: x grows east, y grows down. All
/// geometry consumers read the same fit state, so a re-fit (resize,
/// refocus) is immediately visible to every `path_for`/`centroid_of`
/// caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    k: f64,
    tx: f64,
    ty: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection {
    pub fn new() -> Self {
        Self {
            k: BASE_SCALE,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn project(&self, point: GeoPoint) -> Vec2 {
        let (x, y) = ginzburg5_forward(point.lon_deg.to_radians(), point.lat_deg.to_radians());
        Vec2::new(x * self.k + self.tx, self.ty - y * self.k)
    }

    pub fn invert(&self, planar: Vec2) -> GeoPoint {
        let (lambda, phi) =
            ginzburg5_invert((planar.x - self.tx) / self.k, (self.ty - planar.y) / self.k);
        GeoPoint::new(lambda.to_degrees(), phi.to_degrees())
    }

    /// Fits the collection into `extent` (`[[x0, y0], [x1, y1]]`): fully
    /// contained, aspect preserved, centered. Callable repeatedly;
    /// identical inputs produce identical fit state.
    pub fn fit_extent(&mut self, extent: [[f64; 2]; 2], countries: &CountryCollection) {
        self.k = BASE_SCALE;
        self.tx = 0.0;
        self.ty = 0.0;

        let projected = countries
            .features
            .iter()
            .flat_map(|f| f.geometry.points())
            .map(|p| {
                let v = self.project(p);
                [v.x, v.y]
            });
        let Some(bounds) = Aabb2::from_points(projected) else {
            return;
        };

        let w = extent[1][0] - extent[0][0];
        let h = extent[1][1] - extent[0][1];
        let k = (w / bounds.width()).min(h / bounds.height());
        if !k.is_finite() || k <= 0.0 {
            return;
        }

        self.tx = extent[0][0] + (w - k * (bounds.min[0] + bounds.max[0])) / 2.0;
        self.ty = extent[0][1] + (h - k * (bounds.min[1] + bounds.max[1])) / 2.0;
        self.k = BASE_SCALE * k;
    }

    /// Projected rings/strands in vertex order, ready for the external
    /// drawing surface.
    pub fn path_for(&self, geometry: &Geometry) -> Vec<Vec<Vec2>> {
        let rings: Vec<&Vec<GeoPoint>> = match geometry {
            Geometry::LineString(line) => vec![line],
            Geometry::MultiLineString(lines) => lines.iter().collect(),
            Geometry::Polygon(rings) => rings.iter().collect(),
            Geometry::MultiPolygon(polys) => polys.iter().flatten().collect(),
        };
        rings
            .into_iter()
            .map(|ring| ring.iter().map(|p| self.project(*p)).collect())
            .collect()
    }

    /// Planar centroid under the current fit: area-weighted for polygons,
    /// length-weighted for lines.
    pub fn centroid_of(&self, geometry: &Geometry) -> Vec2 {
        let paths = self.path_for(geometry);
        let centroid = match geometry {
            Geometry::LineString(_) | Geometry::MultiLineString(_) => line_centroid(&paths),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => area_centroid(&paths),
        };
        centroid.unwrap_or_else(|| vertex_average(&paths))
    }
}

fn line_centroid(paths: &[Vec<Vec2>]) -> Option<Vec2> {
    let mut total = 0.0;
    let mut sum = Vec2::new(0.0, 0.0);
    for path in paths {
        for pair in path.windows(2) {
            let len = (pair[1] - pair[0]).length();
            if !len.is_finite() || len <= 0.0 {
                continue;
            }
            let mid = Vec2::new(
                (pair[0].x + pair[1].x) * 0.5,
                (pair[0].y + pair[1].y) * 0.5,
            );
            sum = sum + mid.scale(len);
            total += len;
        }
    }
    if total <= 0.0 {
        return None;
    }
    Some(sum.scale(1.0 / total))
}

/// Shoelace centroid over all rings; oppositely wound holes subtract.
fn area_centroid(paths: &[Vec<Vec2>]) -> Option<Vec2> {
    let mut area2 = 0.0;
    let mut sum = Vec2::new(0.0, 0.0);
    for ring in paths {
        if ring.len() < 3 {
            continue;
        }
        let mut prev = *ring.last()?;
        for v in ring {
            let cross = prev.x * v.y - v.x * prev.y;
            area2 += cross;
            sum = sum + Vec2::new((prev.x + v.x) * cross, (prev.y + v.y) * cross);
            prev = *v;
        }
    }
    if area2.abs() <= f64::EPSILON {
        return None;
    }
    Some(sum.scale(1.0 / (3.0 * area2)))
}

fn vertex_average(paths: &[Vec<Vec2>]) -> Vec2 {
    let mut sum = Vec2::new(0.0, 0.0);
    let mut count = 0.0;
    for v in paths.iter().flatten() {
        if v.is_finite() {
            sum = sum + *v;
            count += 1.0;
        }
    }
    if count <= 0.0 {
        return Vec2::new(0.0, 0.0);
    }
    sum.scale(1.0 / count)
}
