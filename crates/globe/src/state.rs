//! The single authoritative view state.
//!
//! Only the viewer's input-facing methods write it. The frame loop reads it,
//! and what the loop produces (playback steps, debounced deliveries, resizes)
//! is applied through those same methods once the frame is submitted.

use std::sync::Arc;

use formats::features::FrontlineSnapshot;
use formats::records::GlobeConflict;
use layers::MarkerFilter;
use scene::components::Layer;

use crate::events::FrontlineKey;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LayerToggles {
    pub borders: bool,
    pub markers: bool,
    pub frontlines: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            borders: true,
            markers: true,
            frontlines: true,
        }
    }
}

impl LayerToggles {
    pub fn get(&self, layer: Layer) -> bool {
        match layer {
            Layer::Globe => true,
            Layer::Borders => self.borders,
            Layer::Markers => self.markers,
            Layer::Frontlines => self.frontlines,
        }
    }

    /// The globe body cannot be hidden.
    pub fn set(&mut self, layer: Layer, visible: bool) {
        match layer {
            Layer::Globe => {}
            Layer::Borders => self.borders = visible,
            Layer::Markers => self.markers = visible,
            Layer::Frontlines => self.frontlines = visible,
        }
    }
}

/// Which parts of the scene are out of date with the state. Owned by the
/// viewer, not by [`RenderState`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Dirty {
    pub markers: bool,
    pub frontlines: bool,
    pub filter: bool,
    pub layers: bool,
    pub borders: bool,
}

impl Dirty {
    pub fn all() -> Self {
        Self {
            markers: true,
            frontlines: true,
            filter: true,
            layers: true,
            borders: true,
        }
    }

    pub fn any(&self) -> bool {
        self.markers || self.frontlines || self.filter || self.layers || self.borders
    }
}

/// A frontline dataset the user opened, with the dates it offers.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontlineSelection {
    pub conflict: u64,
    pub dates: Vec<String>,
    pub date: String,
}

impl FrontlineSelection {
    pub fn key(&self) -> FrontlineKey {
        FrontlineKey::new(self.conflict, self.date.clone())
    }

    /// Keys of the dates either side of the selected one.
    pub fn adjacent(&self) -> Vec<FrontlineKey> {
        let Some(i) = self.dates.iter().position(|d| *d == self.date) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(2);
        if i > 0 {
            out.push(FrontlineKey::new(self.conflict, self.dates[i - 1].clone()));
        }
        if let Some(next) = self.dates.get(i + 1) {
            out.push(FrontlineKey::new(self.conflict, next.clone()));
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub year: i32,
    /// Conflicts currently drawn; for `conflicts_year`, which lags `year`
    /// while a fetch is outstanding.
    pub conflicts: Arc<Vec<GlobeConflict>>,
    pub conflicts_year: Option<i32>,
    pub frontline: Option<FrontlineSelection>,
    pub snapshot: Option<Arc<FrontlineSnapshot>>,
    pub filter: MarkerFilter,
    pub layers: LayerToggles,
    pub viewport: (u32, u32),
}

impl RenderState {
    pub fn new(year: i32, viewport: (u32, u32)) -> Self {
        Self {
            year,
            conflicts: Arc::new(Vec::new()),
            conflicts_year: None,
            frontline: None,
            snapshot: None,
            filter: MarkerFilter::default(),
            layers: LayerToggles::default(),
            viewport,
        }
    }

    pub fn set_conflicts(&mut self, year: i32, conflicts: Arc<Vec<GlobeConflict>>) {
        self.conflicts = conflicts;
        self.conflicts_year = Some(year);
    }

    pub fn set_snapshot(&mut self, snapshot: Option<Arc<FrontlineSnapshot>>) {
        self.snapshot = snapshot;
    }
}
