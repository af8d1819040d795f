use std::fmt;

use foundation::ids::{ConflictId, CountryId};
use layers::LegendEntry;
use streaming::{LoadState, Request};

/// Cache key for one frontline snapshot; displayed as `"conflictId|date"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrontlineKey {
    pub conflict: u64,
    pub date: String,
}

impl FrontlineKey {
    pub fn new(conflict: u64, date: impl Into<String>) -> Self {
        Self {
            conflict,
            date: date.into(),
        }
    }
}

impl fmt::Display for FrontlineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.conflict, self.date)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Dataset {
    Conflicts,
    Frontlines,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavigationTarget {
    Conflict(ConflictId),
    Country(CountryId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub conflict: ConflictId,
    pub name: String,
    pub x_px: f64,
    pub y_px: f64,
}

/// Everything the host UI reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobeEvent {
    Navigate(NavigationTarget),
    /// `None` when the pointer leaves the last hovered marker.
    Tooltip(Option<Tooltip>),
    LoadState { dataset: Dataset, state: LoadState },
    YearChanged(i32),
    Legend(Vec<LegendEntry>),
    /// Conflicts left visible by the active filter; empty means the host
    /// shows its empty state.
    FilterMatches(Vec<ConflictId>),
    SurfaceLost,
}

/// A fetch the host should perform and report back through
/// `GlobeViewer::complete_conflicts` / `complete_frontlines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRequest {
    Conflicts { request: Request, year: i32 },
    Frontlines { request: Request, key: FrontlineKey },
}

impl DataRequest {
    pub fn request(&self) -> Request {
        match self {
            DataRequest::Conflicts { request, .. } | DataRequest::Frontlines { request, .. } => {
                *request
            }
        }
    }
}
