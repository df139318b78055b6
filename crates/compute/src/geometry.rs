use foundation::bounds::Aabb2;
use formats::{GeoPoint, Geometry};

/// Mean Earth radius (meters) used for spherical area and for converting
/// buffer distances from kilometers to degrees.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Miter length is capped at this multiple of the buffer distance so spike
/// vertices cannot fling offsets arbitrarily far.
const MITER_LIMIT: f64 = 4.0;

/// A single-part geometry tagged with its own area.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub geometry: Geometry,
    pub area_m2: f64,
}

/// Spherical surface area in square meters. Polygon holes subtract;
/// line geometry and degenerate rings measure zero.
pub fn area_m2(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::LineString(_) | Geometry::MultiLineString(_) => 0.0,
        Geometry::Polygon(rings) => polygon_area_m2(rings),
        Geometry::MultiPolygon(polys) => polys.iter().map(|rings| polygon_area_m2(rings)).sum(),
    }
}

fn polygon_area_m2(rings: &[Vec<GeoPoint>]) -> f64 {
    let mut iter = rings.iter();
    let Some(outer) = iter.next() else {
        return 0.0;
    };
    let outer_area = ring_area_signed_m2(outer).abs();
    let holes: f64 = iter.map(|ring| ring_area_signed_m2(ring).abs()).sum();
    (outer_area - holes).max(0.0)
}

/// Signed spherical-excess ring area; sign follows winding order.
fn ring_area_signed_m2(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut total = 0.0;
    for i in 0..ring.len() {
        let p1 = ring[i];
        let p2 = ring[(i + 1) % ring.len()];
        total += (p2.lon_deg - p1.lon_deg).to_radians()
            * (2.0 + p1.lat_deg.to_radians().sin() + p2.lat_deg.to_radians().sin());
    }
    total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0
}

/// Geographic bounding box in degrees, or `None` for vertex-free geometry.
pub fn bounding_box(geometry: &Geometry) -> Option<Aabb2> {
    Aabb2::from_points(geometry.points().map(|p| [p.lon_deg, p.lat_deg]))
}

pub fn bounding_box_all(geometries: &[Geometry]) -> Option<Aabb2> {
    let mut out: Option<Aabb2> = None;
    for geometry in geometries {
        let Some(b) = bounding_box(geometry) else {
            continue;
        };
        out = Some(match out {
            Some(acc) => acc.union(&b),
            None => b,
        });
    }
    out
}

/// Spherical area of the box treated as a lon/lat-aligned quad.
pub fn box_area_m2(bounds: &Aabb2) -> f64 {
    let ring = vec![
        GeoPoint::new(bounds.min[0], bounds.min[1]),
        GeoPoint::new(bounds.max[0], bounds.min[1]),
        GeoPoint::new(bounds.max[0], bounds.max[1]),
        GeoPoint::new(bounds.min[0], bounds.max[1]),
    ];
    ring_area_signed_m2(&ring).abs()
}

/// Splits multi-part geometry into its single parts, each tagged with its
/// own area. Single-part input yields one element.
pub fn flatten_parts(geometry: &Geometry) -> Vec<Part> {
    let parts: Vec<Geometry> = match geometry {
        Geometry::LineString(line) => vec![Geometry::LineString(line.clone())],
        Geometry::MultiLineString(lines) => lines
            .iter()
            .map(|line| Geometry::LineString(line.clone()))
            .collect(),
        Geometry::Polygon(rings) => vec![Geometry::Polygon(rings.clone())],
        Geometry::MultiPolygon(polys) => polys
            .iter()
            .map(|rings| Geometry::Polygon(rings.clone()))
            .collect(),
    };
    parts
        .into_iter()
        .map(|geometry| {
            let area_m2 = area_m2(&geometry);
            Part { geometry, area_m2 }
        })
        .collect()
}

/// Expands polygonal geometry outward by `distance_km` using mitered
/// per-vertex offsets. The result may self-intersect; callers only consume
/// its bounding box. Line geometry passes through unchanged.
pub fn buffer(geometry: &Geometry, distance_km: f64) -> Geometry {
    match geometry {
        Geometry::Polygon(rings) => Geometry::Polygon(buffer_rings(rings, distance_km)),
        Geometry::MultiPolygon(polys) => Geometry::MultiPolygon(
            polys
                .iter()
                .map(|rings| buffer_rings(rings, distance_km))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn buffer_rings(rings: &[Vec<GeoPoint>], distance_km: f64) -> Vec<Vec<GeoPoint>> {
    rings
        .iter()
        .map(|ring| buffer_ring(ring, distance_km))
        .collect()
}

fn buffer_ring(ring: &[GeoPoint], distance_km: f64) -> Vec<GeoPoint> {
    // Work on the open ring; a closing duplicate is restored afterwards.
    let closed = ring.len() > 1 && ring.first() == ring.last();
    let open = if closed { &ring[..ring.len() - 1] } else { ring };
    if open.len() < 3 {
        return ring.to_vec();
    }

    let outward_sign = if planar_signed_area(open) >= 0.0 { 1.0 } else { -1.0 };
    let distance_deg = (distance_km * 1000.0 / EARTH_RADIUS_M).to_degrees();

    let n = open.len();
    let mut out = Vec::with_capacity(ring.len());
    for i in 0..n {
        let prev = open[(i + n - 1) % n];
        let v = open[i];
        let next = open[(i + 1) % n];

        // Edge directions in a locally scaled frame so east/north degrees
        // compare fairly away from the equator.
        let lat_scale = v.lat_deg.to_radians().cos().max(0.05);
        let d1 = local_direction(prev, v, lat_scale);
        let d2 = local_direction(v, next, lat_scale);
        let (Some(d1), Some(d2)) = (d1, d2) else {
            out.push(v);
            continue;
        };

        // Outward edge normals; their mitered bisector carries the vertex.
        let n1 = [outward_sign * d1[1], -outward_sign * d1[0]];
        let n2 = [outward_sign * d2[1], -outward_sign * d2[0]];
        let miter = miter_offset(n1, n2);

        out.push(GeoPoint::new(
            v.lon_deg + miter[0] * distance_deg / lat_scale,
            v.lat_deg + miter[1] * distance_deg,
        ));
    }

    if closed {
        if let Some(first) = out.first().copied() {
            out.push(first);
        }
    }
    out
}

fn local_direction(from: GeoPoint, to: GeoPoint, lat_scale: f64) -> Option<[f64; 2]> {
    let dx = (to.lon_deg - from.lon_deg) * lat_scale;
    let dy = to.lat_deg - from.lat_deg;
    let len = (dx * dx + dy * dy).sqrt();
    if !len.is_finite() || len <= 0.0 {
        return None;
    }
    Some([dx / len, dy / len])
}

/// Unit-distance miter vector for two outward edge normals: along the
/// bisector, lengthened so straight edges still move a full unit outward.
fn miter_offset(n1: [f64; 2], n2: [f64; 2]) -> [f64; 2] {
    let bx = n1[0] + n2[0];
    let by = n1[1] + n2[1];
    let blen = (bx * bx + by * by).sqrt();
    if blen <= 1e-12 {
        // Near-reflex spike; fall back to the incoming normal.
        return n1;
    }
    let dot = (n1[0] * n2[0] + n1[1] * n2[1]).clamp(-1.0, 1.0);
    let cos_half = ((1.0 + dot) / 2.0).sqrt().max(1.0 / MITER_LIMIT);
    let scale = 1.0 / cos_half;
    [bx / blen * scale, by / blen * scale]
}

fn planar_signed_area(ring: &[GeoPoint]) -> f64 {
    let mut total = 0.0;
    for i in 0..ring.len() {
        let p1 = ring[i];
        let p2 = ring[(i + 1) % ring.len()];
        total += p1.lon_deg * p2.lat_deg - p2.lon_deg * p1.lat_deg;
    }
    total / 2.0
}

/// Closest point on line geometry to `query`, for leader-line anchoring.
/// `None` for polygonal or vertex-free input.
pub fn nearest_point_on_line(line: &Geometry, query: GeoPoint) -> Option<GeoPoint> {
    let strands: Vec<&Vec<GeoPoint>> = match line {
        Geometry::LineString(points) => vec![points],
        Geometry::MultiLineString(lines) => lines.iter().collect(),
        _ => return None,
    };

    let mut best: Option<(f64, GeoPoint)> = None;
    for strand in strands {
        if strand.len() == 1 {
            consider(&mut best, query, strand[0]);
            continue;
        }
        for pair in strand.windows(2) {
            let candidate = project_onto_segment(pair[0], pair[1], query);
            consider(&mut best, query, candidate);
        }
    }
    best.map(|(_, p)| p)
}

fn consider(best: &mut Option<(f64, GeoPoint)>, query: GeoPoint, candidate: GeoPoint) {
    let dx = candidate.lon_deg - query.lon_deg;
    let dy = candidate.lat_deg - query.lat_deg;
    let d2 = dx * dx + dy * dy;
    if best.map(|(bd2, _)| d2 < bd2).unwrap_or(true) {
        *best = Some((d2, candidate));
    }
}

fn project_onto_segment(a: GeoPoint, b: GeoPoint, query: GeoPoint) -> GeoPoint {
    let abx = b.lon_deg - a.lon_deg;
    let aby = b.lat_deg - a.lat_deg;
    let len2 = abx * abx + aby * aby;
    if len2 <= 0.0 {
        return a;
    }
    let t = ((query.lon_deg - a.lon_deg) * abx + (query.lat_deg - a.lat_deg) * aby) / len2;
    let t = t.clamp(0.0, 1.0);
    GeoPoint::new(a.lon_deg + abx * t, a.lat_deg + aby * t)
}

#[cfg(test)]
mod tests {
    use super::{
        area_m2, bounding_box, box_area_m2, buffer, flatten_parts, nearest_point_on_line,
    };
    use formats::{GeoPoint, Geometry};

    fn square(lon0: f64, lat0: f64, size: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(lon0, lat0),
            GeoPoint::new(lon0 + size, lat0),
            GeoPoint::new(lon0 + size, lat0 + size),
            GeoPoint::new(lon0, lat0 + size),
            GeoPoint::new(lon0, lat0),
        ]
    }

    #[test]
    fn one_degree_square_area_at_equator() {
        let geometry = Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]);
        let area = area_m2(&geometry);
        // ~111.2 km per degree near the equator.
        let expected = 1.237e10;
        assert!((area - expected).abs() / expected < 0.01, "area {area}");
    }

    #[test]
    fn holes_subtract_and_degenerates_are_zero() {
        let outer = square(0.0, 0.0, 2.0);
        let hole = square(0.5, 0.5, 1.0);
        let solid = area_m2(&Geometry::Polygon(vec![outer.clone()]));
        let holed = area_m2(&Geometry::Polygon(vec![outer, hole.clone()]));
        let hole_only = area_m2(&Geometry::Polygon(vec![hole]));
        assert!((solid - holed - hole_only).abs() / solid < 1e-9);

        let sliver = Geometry::Polygon(vec![vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 1.0),
        ]]);
        assert_eq!(area_m2(&sliver), 0.0);
        let line = Geometry::LineString(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(5.0, 5.0)]);
        assert_eq!(area_m2(&line), 0.0);
    }

    #[test]
    fn area_is_winding_independent() {
        let ccw = Geometry::Polygon(vec![square(10.0, 10.0, 1.0)]);
        let mut reversed_ring = square(10.0, 10.0, 1.0);
        reversed_ring.reverse();
        let cw = Geometry::Polygon(vec![reversed_ring]);
        assert!((area_m2(&ccw) - area_m2(&cw)).abs() < 1.0);
    }

    #[test]
    fn bounding_box_spans_all_parts() {
        let geometry = Geometry::MultiPolygon(vec![
            vec![square(-10.0, -5.0, 2.0)],
            vec![square(30.0, 20.0, 1.0)],
        ]);
        let b = bounding_box(&geometry).unwrap();
        assert_eq!(b.min, [-10.0, -5.0]);
        assert_eq!(b.max, [31.0, 21.0]);
    }

    #[test]
    fn buffer_grows_the_bounding_box_by_the_distance() {
        let geometry = Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]);
        // ~1 degree of buffer at the equator.
        let km_per_deg = super::EARTH_RADIUS_M * std::f64::consts::PI / 180.0 / 1000.0;
        let buffered = buffer(&geometry, km_per_deg);
        let b = bounding_box(&buffered).unwrap();
        // Mitered right-angle corners move a full distance on each axis.
        assert!((b.min[0] - -1.0).abs() < 0.05, "min lon {}", b.min[0]);
        assert!((b.min[1] - -1.0).abs() < 0.05, "min lat {}", b.min[1]);
        assert!((b.max[0] - 2.0).abs() < 0.05, "max lon {}", b.max[0]);
        assert!((b.max[1] - 2.0).abs() < 0.05, "max lat {}", b.max[1]);
    }

    #[test]
    fn buffer_keeps_winding_direction_irrelevant() {
        let mut reversed_ring = square(0.0, 0.0, 1.0);
        reversed_ring.reverse();
        let cw = Geometry::Polygon(vec![reversed_ring]);
        let buffered = buffer(&cw, 111.0);
        let b = bounding_box(&buffered).unwrap();
        assert!(b.min[0] < -0.5 && b.max[0] > 1.5);
    }

    #[test]
    fn box_area_matches_ring_area() {
        let geometry = Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]);
        let b = bounding_box(&geometry).unwrap();
        let direct = area_m2(&geometry);
        assert!((box_area_m2(&b) - direct).abs() / direct < 1e-9);
    }

    #[test]
    fn flatten_tags_each_part_with_its_area() {
        let geometry = Geometry::MultiPolygon(vec![
            vec![square(0.0, 0.0, 2.0)],
            vec![square(50.0, 0.0, 1.0)],
        ]);
        let parts = flatten_parts(&geometry);
        assert_eq!(parts.len(), 2);
        assert!(parts[0].area_m2 > parts[1].area_m2);

        let single = flatten_parts(&Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]));
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn nearest_point_projects_and_clamps() {
        let line = Geometry::LineString(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(10.0, 0.0),
        ]);

        let on_segment = nearest_point_on_line(&line, GeoPoint::new(4.0, 3.0)).unwrap();
        assert!((on_segment.lon_deg - 4.0).abs() < 1e-12);
        assert!(on_segment.lat_deg.abs() < 1e-12);

        let clamped = nearest_point_on_line(&line, GeoPoint::new(-5.0, 2.0)).unwrap();
        assert_eq!(clamped, GeoPoint::new(0.0, 0.0));

        let polygon = Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]);
        assert!(nearest_point_on_line(&polygon, GeoPoint::new(0.0, 0.0)).is_none());
    }
}
