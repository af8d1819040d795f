//! Frontline control-zone geometry (GeoJSON FeatureCollection).

use serde_json::{Map, Value};
use tracing::warn;

/// `[lng, lat]` in degrees.
pub type Position = [f64; 2];

/// Side key used when a feature carries no `controlled_by` property.
pub const UNKNOWN_SIDE: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    /// Outer ring first, holes after.
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrontlineFeature {
    pub side: String,
    /// Raw override color as supplied; parsed by the renderer.
    pub color: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrontlineSnapshot {
    pub date: String,
    pub features: Vec<FrontlineFeature>,
    /// Indices of input features that were rejected while parsing.
    pub rejected: Vec<usize>,
}

#[derive(Debug)]
pub enum FeatureError {
    Json(String),
    NotAFeatureCollection,
}

impl std::fmt::Display for FeatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureError::Json(reason) => write!(f, "JSON parse error: {reason}"),
            FeatureError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
        }
    }
}

impl std::error::Error for FeatureError {}

impl FrontlineSnapshot {
    pub fn from_geojson_str(date: &str, payload: &str) -> Result<Self, FeatureError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| FeatureError::Json(e.to_string()))?;
        Self::from_geojson_value(date, &value)
    }

    /// Invalid features are skipped and listed in `rejected`; only a
    /// document that is not a FeatureCollection fails.
    pub fn from_geojson_value(date: &str, value: &Value) -> Result<Self, FeatureError> {
        let obj = value.as_object().ok_or(FeatureError::NotAFeatureCollection)?;
        if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(FeatureError::NotAFeatureCollection);
        }
        let features_val = obj
            .get("features")
            .and_then(Value::as_array)
            .ok_or(FeatureError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        let mut rejected = Vec::new();
        for (index, feat_val) in features_val.iter().enumerate() {
            match parse_feature(feat_val) {
                Ok(feature) => features.push(feature),
                Err(reason) => {
                    warn!(date, index, %reason, "skipping frontline feature");
                    rejected.push(index);
                }
            }
        }

        Ok(Self {
            date: date.to_string(),
            features,
            rejected,
        })
    }
}

fn parse_feature(value: &Value) -> Result<FrontlineFeature, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let empty = Map::new();
    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let side = properties
        .get("controlled_by")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SIDE)
        .to_string();
    let color = properties
        .get("color")
        .and_then(Value::as_str)
        .map(str::to_string);

    let geometry = parse_geometry(obj.get("geometry").ok_or("feature missing geometry")?)?;
    Ok(FrontlineFeature {
        side,
        color,
        geometry,
    })
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value.as_object().ok_or("geometry must be an object")?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type")?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates")?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_position(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_positions(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_positions(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_nested(
            coords,
            parse_positions,
        )?)),
        "Polygon" => Ok(Geometry::Polygon(parse_nested(coords, parse_positions)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(parse_nested(coords, |poly| {
            parse_nested(poly, parse_positions)
        })?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(coords: &Value) -> Result<Position, String> {
    let arr = coords.as_array().ok_or("position must be an array")?;
    if arr.len() < 2 {
        return Err("position must have [lng, lat]".to_string());
    }
    let lng = arr[0].as_f64().ok_or("lng must be a number")?;
    let lat = arr[1].as_f64().ok_or("lat must be a number")?;
    if !lng.is_finite() || !lat.is_finite() {
        return Err("position must be finite".to_string());
    }
    Ok([lng, lat])
}

fn parse_positions(coords: &Value) -> Result<Vec<Position>, String> {
    parse_nested(coords, parse_position)
}

fn parse_nested<T>(
    coords: &Value,
    item: impl Fn(&Value) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    coords
        .as_array()
        .ok_or("coordinates must be an array")?
        .iter()
        .map(item)
        .collect()
}
