//! Point-in-country lookup over decoded border polygons.
//!
//! Countries are scanned in load order and the first match wins. Overlapping
//! polygons therefore resolve by load order; nothing tries to disambiguate.

use foundation::bounds::GeoBounds;
use formats::topology::CountryPolygon;

/// Crossing-number test in lng/lat space.
///
/// An edge counts when it straddles the point's latitude under the half-open
/// rule `(yi > py) != (yj > py)` and the crossing lies strictly east of the
/// point. Points exactly on an edge therefore resolve the same way every time.
pub fn point_in_ring(point: [f64; 2], ring: &[[f64; 2]]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let [px, py] = point;
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > py) != (yj > py) {
            let intersect_x = (xj - xi) * (py - yi) / (yj - yi) + xi;
            if px < intersect_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Any ring of the country containing the point counts, holes included.
pub fn point_in_country(point: [f64; 2], country: &CountryPolygon) -> bool {
    country.rings.iter().any(|ring| point_in_ring(point, ring))
}

/// Linear scan; first country in load order containing `point`.
pub fn locate_country(countries: &[CountryPolygon], point: [f64; 2]) -> Option<&CountryPolygon> {
    countries.iter().find(|c| point_in_country(point, c))
}

/// [`locate_country`] with a per-country bounding-box reject in front.
#[derive(Debug, Clone, Default)]
pub struct CountryLocator {
    bounds: Vec<GeoBounds>,
}

impl CountryLocator {
    pub fn new(countries: &[CountryPolygon]) -> Self {
        Self {
            bounds: countries.iter().map(|c| c.bounds).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// `countries` must be the slice this locator was built from.
    pub fn locate<'a>(
        &self,
        countries: &'a [CountryPolygon],
        point: [f64; 2],
    ) -> Option<&'a CountryPolygon> {
        countries
            .iter()
            .zip(&self.bounds)
            .filter(|(_, b)| b.contains(point))
            .map(|(c, _)| c)
            .find(|c| point_in_country(point, c))
    }
}
