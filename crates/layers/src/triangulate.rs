//! Ear-clipping of lng/lat polygons (outer ring plus holes).
//!
//! Triangulation happens in lng/lat space; the caller projects the resulting
//! vertices onto the sphere afterwards.

use earcutr::earcut;

const AREA_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub enum TriangulationError {
    Empty,
    Degenerate { ring: usize },
    SelfIntersecting { ring: usize },
    Earcut(String),
    NoTriangles,
}

impl std::fmt::Display for TriangulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriangulationError::Empty => write!(f, "polygon has no rings"),
            TriangulationError::Degenerate { ring } => {
                write!(f, "ring {ring} is degenerate (fewer than 3 distinct points or zero area)")
            }
            TriangulationError::SelfIntersecting { ring } => {
                write!(f, "ring {ring} intersects itself")
            }
            TriangulationError::Earcut(reason) => write!(f, "ear clipping failed: {reason}"),
            TriangulationError::NoTriangles => write!(f, "ear clipping produced no triangles"),
        }
    }
}

impl std::error::Error for TriangulationError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    /// Outer ring first, then holes, closing duplicates removed.
    pub vertices: Vec<[f64; 2]>,
    /// Triangle list into `vertices`.
    pub indices: Vec<u32>,
    /// Length of the outer ring within `vertices`.
    pub outer_len: usize,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn outer_ring(&self) -> &[[f64; 2]] {
        &self.vertices[..self.outer_len]
    }
}

pub fn triangulate_polygon(rings: &[Vec<[f64; 2]>]) -> Result<Triangulation, TriangulationError> {
    if rings.is_empty() {
        return Err(TriangulationError::Empty);
    }

    let mut vertices: Vec<[f64; 2]> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();
    let mut outer_len = 0;

    for (ring_i, ring) in rings.iter().enumerate() {
        let ring_pts = validate_ring(ring, ring_i)?;
        if ring_i == 0 {
            outer_len = ring_pts.len();
        } else {
            hole_indices.push(vertices.len());
        }
        vertices.extend(ring_pts);
    }

    let coords: Vec<f64> = vertices.iter().flat_map(|p| [p[0], p[1]]).collect();
    let indices = earcut(&coords, &hole_indices, 2)
        .map_err(|e| TriangulationError::Earcut(format!("{e:?}")))?;
    if indices.is_empty() {
        return Err(TriangulationError::NoTriangles);
    }

    Ok(Triangulation {
        vertices,
        indices: indices.into_iter().map(|i| i as u32).collect(),
        outer_len,
    })
}

/// Drops the closing duplicate and rejects rings that cannot be filled.
pub fn validate_ring(ring: &[[f64; 2]], ring_i: usize) -> Result<Vec<[f64; 2]>, TriangulationError> {
    let mut pts: Vec<[f64; 2]> = Vec::with_capacity(ring.len());
    for p in ring {
        if !p[0].is_finite() || !p[1].is_finite() {
            return Err(TriangulationError::Degenerate { ring: ring_i });
        }
        if pts.last() != Some(p) {
            pts.push(*p);
        }
    }
    if pts.len() >= 2 && pts.first() == pts.last() {
        pts.pop();
    }

    if pts.len() < 3 || signed_area(&pts).abs() < AREA_EPSILON {
        return Err(TriangulationError::Degenerate { ring: ring_i });
    }
    if is_self_intersecting(&pts) {
        return Err(TriangulationError::SelfIntersecting { ring: ring_i });
    }
    Ok(pts)
}

pub fn signed_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        let [x0, y0] = ring[i];
        let [x1, y1] = ring[(i + 1) % n];
        sum += x0 * y1 - x1 * y0;
    }
    sum * 0.5
}

/// Any two non-adjacent edges of the closed ring crossing or touching.
fn is_self_intersecting(ring: &[[f64; 2]]) -> bool {
    let n = ring.len();
    for i in 0..n {
        let a = (ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            // Edges sharing a vertex are adjacent.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let b = (ring[j], ring[(j + 1) % n]);
            if segments_intersect(a.0, a.1, b.0, b.1) {
                return true;
            }
        }
    }
    false
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    p[0] >= a[0].min(b[0]) && p[0] <= a[0].max(b[0]) && p[1] >= a[1].min(b[1]) && p[1] <= a[1].max(b[1])
}

fn segments_intersect(p1: [f64; 2], p2: [f64; 2], q1: [f64; 2], q2: [f64; 2]) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}
