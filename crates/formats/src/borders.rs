use std::collections::BTreeMap;
use std::sync::Arc;

use crate::topology::CountryPolygon;

/// Decoded border sets keyed by the year they describe.
#[derive(Debug, Clone, Default)]
pub struct BorderAtlas {
    vintages: BTreeMap<i32, Arc<[CountryPolygon]>>,
}

impl BorderAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, countries: Vec<CountryPolygon>) -> Arc<[CountryPolygon]> {
        let shared: Arc<[CountryPolygon]> = countries.into();
        self.vintages.insert(year, shared.clone());
        shared
    }

    pub fn get(&self, year: i32) -> Option<Arc<[CountryPolygon]>> {
        self.vintages.get(&year).cloned()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.vintages.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.vintages.is_empty()
    }

    /// Latest vintage at or before `year`; falls back to the earliest one.
    pub fn vintage_for_year(&self, year: i32) -> Option<i32> {
        self.vintages
            .range(..=year)
            .next_back()
            .or_else(|| self.vintages.iter().next())
            .map(|(y, _)| *y)
    }

    pub fn for_year(&self, year: i32) -> Option<(i32, Arc<[CountryPolygon]>)> {
        let vintage = self.vintage_for_year(year)?;
        self.get(vintage).map(|c| (vintage, c))
    }
}
