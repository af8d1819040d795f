//! Shared-arc border topology decoding.
//!
//! Arcs are delta-encoded polylines shared between neighbouring countries.
//! Each arc is expanded once into absolute lng/lat; rings are then stitched by
//! concatenating the arcs a geometry references (`~i` means arc `i` reversed).

use std::collections::BTreeMap;

use foundation::bounds::GeoBounds;
use foundation::ids::CountryId;
use foundation::math::LatLng;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// One ring as `[lng, lat]` points, conceptually closed.
pub type Ring = Vec<[f64; 2]>;

/// Name of the topology object holding country geometries.
pub const COUNTRIES_OBJECT: &str = "countries";

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub transform: Option<TopologyTransform>,
    #[serde(default)]
    pub objects: BTreeMap<String, TopologyObject>,
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct TopologyTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl TopologyTransform {
    fn apply(&self, q: [f64; 2]) -> [f64; 2] {
        [
            q[0] * self.scale[0] + self.translate[0],
            q[1] * self.scale[1] + self.translate[1],
        ]
    }
}

/// A named object; geometry records stay raw so one bad record cannot fail
/// the whole document.
#[derive(Debug, Clone, Deserialize)]
pub struct TopologyObject {
    #[serde(default)]
    pub geometries: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryPolygon {
    pub id: CountryId,
    pub name: String,
    pub rings: Vec<Ring>,
    /// Arithmetic mean of every ring point. Not area-weighted.
    pub centroid: LatLng,
    pub bounds: GeoBounds,
}

impl CountryPolygon {
    pub fn point_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }
}

/// Per-record problems encountered while decoding. None of them abort decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub skipped_records: usize,
    pub skipped_arc_refs: usize,
    pub dropped_rings: usize,
    pub unsupported_geometries: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTopology {
    pub countries: Vec<CountryPolygon>,
    pub report: DecodeReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopologyError {
    Parse(String),
    MissingObject(String),
    InvalidTransform,
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::Parse(reason) => write!(f, "topology parse error: {reason}"),
            TopologyError::MissingObject(name) => {
                write!(f, "topology has no object named {name:?}")
            }
            TopologyError::InvalidTransform => {
                write!(f, "topology transform has a zero or non-finite scale")
            }
        }
    }
}

impl std::error::Error for TopologyError {}

impl Topology {
    pub fn from_json_str(payload: &str) -> Result<Self, TopologyError> {
        serde_json::from_str(payload).map_err(|e| TopologyError::Parse(e.to_string()))
    }
}

/// Decode the `countries` object of a topology document.
pub fn decode_countries_str(payload: &str) -> Result<DecodedTopology, TopologyError> {
    let topology = Topology::from_json_str(payload)?;
    decode_countries(&topology, COUNTRIES_OBJECT)
}

pub fn decode_countries(
    topology: &Topology,
    object: &str,
) -> Result<DecodedTopology, TopologyError> {
    let geometries = &topology
        .objects
        .get(object)
        .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?
        .geometries;

    if let Some(t) = topology.transform {
        let valid = t
            .scale
            .iter()
            .chain(t.translate.iter())
            .all(|v| v.is_finite())
            && t.scale[0] != 0.0
            && t.scale[1] != 0.0;
        if !valid {
            return Err(TopologyError::InvalidTransform);
        }
    }

    let arcs = expand_arcs(&topology.arcs, topology.transform.as_ref());

    let mut report = DecodeReport::default();
    let mut countries = Vec::with_capacity(geometries.len());
    for (index, raw) in geometries.iter().enumerate() {
        match decode_geometry(raw, &arcs, &mut report) {
            Ok(Some(country)) => countries.push(country),
            Ok(None) => {}
            Err(reason) => {
                warn!(index, %reason, "skipping border record");
                report.skipped_records += 1;
            }
        }
    }

    debug!(
        countries = countries.len(),
        skipped = report.skipped_records,
        "decoded border topology"
    );
    Ok(DecodedTopology { countries, report })
}

/// Cumulative sum then affine transform, once per arc. Malformed arcs become
/// `None` and every reference to them is skipped.
fn expand_arcs(
    raw: &[Vec<Vec<f64>>],
    transform: Option<&TopologyTransform>,
) -> Vec<Option<Vec<[f64; 2]>>> {
    raw.iter()
        .map(|arc| {
            let mut out = Vec::with_capacity(arc.len());
            let (mut x, mut y) = (0.0, 0.0);
            for point in arc {
                let (&dx, &dy) = match (point.first(), point.get(1)) {
                    (Some(dx), Some(dy)) if dx.is_finite() && dy.is_finite() => (dx, dy),
                    _ => return None,
                };
                match transform {
                    Some(t) => {
                        x += dx;
                        y += dy;
                        out.push(t.apply([x, y]));
                    }
                    None => out.push([dx, dy]),
                }
            }
            Some(out)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct GeometryRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    arcs: Value,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

fn decode_geometry(
    raw: &Value,
    arcs: &[Option<Vec<[f64; 2]>>],
    report: &mut DecodeReport,
) -> Result<Option<CountryPolygon>, String> {
    let record: GeometryRecord =
        serde_json::from_value(raw.clone()).map_err(|e| format!("invalid geometry: {e}"))?;

    let name = record
        .properties
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let id = match &record.id {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => name.clone().ok_or("geometry has neither id nor name")?,
    };

    let polygons: Vec<Vec<Vec<i64>>> = match record.kind.as_str() {
        "Polygon" => vec![
            serde_json::from_value(record.arcs).map_err(|e| format!("{id}: bad arcs: {e}"))?,
        ],
        "MultiPolygon" => {
            serde_json::from_value(record.arcs).map_err(|e| format!("{id}: bad arcs: {e}"))?
        }
        other => {
            debug!(%id, kind = other, "ignoring non-areal border geometry");
            report.unsupported_geometries += 1;
            return Ok(None);
        }
    };

    let mut rings = Vec::new();
    for ring_refs in polygons.iter().flatten() {
        let ring = stitch_ring(ring_refs, arcs, &id, report);
        if ring.len() < 3 {
            report.dropped_rings += 1;
            continue;
        }
        rings.push(ring);
    }

    if rings.is_empty() {
        return Err(format!("{id}: no usable rings"));
    }

    let bounds = rings
        .iter()
        .filter_map(|r| GeoBounds::from_points(r))
        .reduce(GeoBounds::union)
        .ok_or_else(|| format!("{id}: empty bounds"))?;

    Ok(Some(CountryPolygon {
        name: name.unwrap_or_else(|| id.clone()),
        id: CountryId::new(id),
        centroid: mean_point(&rings),
        bounds,
        rings,
    }))
}

fn stitch_ring(
    refs: &[i64],
    arcs: &[Option<Vec<[f64; 2]>>],
    country: &str,
    report: &mut DecodeReport,
) -> Ring {
    let mut ring: Ring = Vec::new();
    for &r in refs {
        let (index, reversed) = if r >= 0 { (r, false) } else { (!r, true) };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|i| arcs.get(i))
            .and_then(Option::as_ref);
        let Some(arc) = arc else {
            warn!(country, arc = r, "skipping out-of-range arc reference");
            report.skipped_arc_refs += 1;
            continue;
        };

        let points: Box<dyn Iterator<Item = &[f64; 2]>> = if reversed {
            Box::new(arc.iter().rev())
        } else {
            Box::new(arc.iter())
        };
        for p in points {
            // Consecutive arcs share their junction point; emit it once.
            if ring.last() == Some(p) {
                continue;
            }
            ring.push(*p);
        }
    }
    ring
}

fn mean_point(rings: &[Ring]) -> LatLng {
    let mut sum = [0.0, 0.0];
    let mut n = 0usize;
    for p in rings.iter().flatten() {
        sum[0] += p[0];
        sum[1] += p[1];
        n += 1;
    }
    if n == 0 {
        return LatLng::default();
    }
    LatLng::new(sum[1] / n as f64, sum[0] / n as f64)
}
