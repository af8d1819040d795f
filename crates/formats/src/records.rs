//! Typed records returned by the conflict data service, and the render-ready
//! conflicts built from them.

use foundation::ids::ConflictId;
use foundation::math::LatLng;
use foundation::time::{YearSpan, parse_year};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParticipantRecord {
    pub name: String,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub country_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConflictRecord {
    pub id: u64,
    pub name: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub conflict_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub intensity: Option<String>,
    #[serde(default)]
    pub participants: Vec<ParticipantRecord>,
}

/// Intensity arrives as a label or as a bare number depending on the source.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FrontlineConflictRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FrontlineDateRecord {
    pub date: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intensity {
    Low,
    Medium,
    High,
    Unknown,
}

impl Intensity {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Intensity::Unknown;
        };
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<f64>() {
            return match n {
                n if n >= 3.0 => Intensity::High,
                n if n >= 2.0 => Intensity::Medium,
                n if n >= 1.0 => Intensity::Low,
                _ => Intensity::Unknown,
            };
        }
        match raw.to_ascii_lowercase().as_str() {
            "low" | "minor" => Intensity::Low,
            "medium" | "moderate" => Intensity::Medium,
            "high" | "major" | "severe" | "war" => Intensity::High,
            _ => Intensity::Unknown,
        }
    }

    /// Marker scale multiplier.
    pub fn scale(self) -> f32 {
        match self {
            Intensity::Low => 0.9,
            Intensity::Medium | Intensity::Unknown => 1.0,
            Intensity::High => 1.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub name: String,
    pub side: Option<String>,
}

/// Render-ready conflict.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeConflict {
    pub id: ConflictId,
    pub name: String,
    pub span: YearSpan,
    pub position: LatLng,
    pub conflict_type: String,
    pub intensity: Intensity,
    pub participants: Vec<Participant>,
    pub has_frontlines: bool,
    pub frontline_id: Option<u64>,
}

impl GlobeConflict {
    pub fn is_active_in(&self, year: i32) -> bool {
        self.span.contains(year)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    MissingPosition,
    InvalidPosition { lat: f64, lng: f64 },
    InvalidStartDate(String),
    InvalidEndDate(String),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::MissingPosition => write!(f, "record has no coordinates"),
            RecordError::InvalidPosition { lat, lng } => {
                write!(f, "coordinates out of range: lat {lat}, lng {lng}")
            }
            RecordError::InvalidStartDate(d) => write!(f, "unparseable start date {d:?}"),
            RecordError::InvalidEndDate(d) => write!(f, "unparseable end date {d:?}"),
        }
    }
}

impl std::error::Error for RecordError {}

/// Conflicts that have dedicated frontline datasets.
#[derive(Debug, Clone, Default)]
pub struct FrontlineRegistry {
    entries: Vec<FrontlineConflictRecord>,
}

impl FrontlineRegistry {
    pub fn new(entries: Vec<FrontlineConflictRecord>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact id match first, then case-insensitive name containment in either
    /// direction.
    pub fn match_conflict(&self, id: u64, name: &str) -> Option<&FrontlineConflictRecord> {
        if let Some(hit) = self.entries.iter().find(|e| e.id == id) {
            return Some(hit);
        }
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        self.entries.iter().find(|e| {
            let other = e.name.trim().to_lowercase();
            !other.is_empty() && (other.contains(&name) || name.contains(&other))
        })
    }
}

impl ConflictRecord {
    pub fn to_globe_conflict(
        &self,
        present_year: i32,
        registry: &FrontlineRegistry,
    ) -> Result<GlobeConflict, RecordError> {
        let (lat, lng) = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(RecordError::MissingPosition),
        };
        let position = LatLng::new(lat, lng);
        if !position.is_valid() {
            return Err(RecordError::InvalidPosition { lat, lng });
        }

        let start = parse_year(&self.start_date)
            .ok_or_else(|| RecordError::InvalidStartDate(self.start_date.clone()))?;
        let span = match self.end_date.as_deref().map(str::trim) {
            None | Some("") => YearSpan::open_ended(start, present_year),
            Some(end) => YearSpan::new(
                start,
                parse_year(end).ok_or_else(|| RecordError::InvalidEndDate(end.to_string()))?,
            ),
        };

        let frontline = registry.match_conflict(self.id, &self.name);
        Ok(GlobeConflict {
            id: ConflictId(self.id),
            name: self.name.clone(),
            span,
            position,
            conflict_type: self
                .conflict_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            intensity: Intensity::parse(self.intensity.as_deref()),
            participants: self
                .participants
                .iter()
                .map(|p| Participant {
                    name: p.name.clone(),
                    side: p.side.clone(),
                })
                .collect(),
            has_frontlines: frontline.is_some(),
            frontline_id: frontline.map(|f| f.id),
        })
    }
}

/// Builds the render-ready conflicts active in `year`. Records that cannot be
/// converted are skipped.
pub fn build_globe_conflicts(
    records: &[ConflictRecord],
    year: i32,
    present_year: i32,
    registry: &FrontlineRegistry,
) -> Vec<GlobeConflict> {
    records
        .iter()
        .filter_map(|r| match r.to_globe_conflict(present_year, registry) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(id = r.id, error = %e, "skipping conflict record");
                None
            }
        })
        .filter(|c| c.is_active_in(year))
        .collect()
}

/// One year's payload, minus the entries that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictRecords {
    pub records: Vec<ConflictRecord>,
    /// Payload indices of rejected entries.
    pub rejected: Vec<usize>,
}

/// Fails only when the payload is not a JSON array.
pub fn parse_conflict_records(payload: &str) -> Result<ConflictRecords, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(payload)?;
    Ok(conflict_records_from_values(values))
}

pub fn conflict_records_from_values(values: Vec<Value>) -> ConflictRecords {
    let mut out = ConflictRecords::default();
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<ConflictRecord>(value) {
            Ok(record) => out.records.push(record),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed conflict record");
                out.rejected.push(index);
            }
        }
    }
    out
}

/// Dates a frontline dataset offers, oldest first, without duplicates.
/// Entries without a readable date are skipped.
pub fn parse_frontline_dates(payload: &str) -> Result<Vec<String>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(payload)?;
    let mut dates = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<FrontlineDateRecord>(value) {
            Ok(record) => dates.push(record.date),
            Err(e) => warn!(index, error = %e, "skipping malformed frontline date"),
        }
    }
    dates.sort();
    dates.dedup();
    Ok(dates)
}
