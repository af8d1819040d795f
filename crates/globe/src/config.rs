use serde::{Deserialize, Serialize};
use streaming::PipelineConfig;

/// Year axis and playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub min_year: i32,
    pub max_year: i32,
    /// End year assumed for conflicts that are still ongoing.
    pub present_year: i32,
    pub initial_year: i32,
    /// Discrete playback multipliers offered to the user.
    pub speeds: Vec<f64>,
    /// Wall-clock seconds per year at 1× speed.
    pub seconds_per_year: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: 2025,
            present_year: 2025,
            initial_year: 2025,
            speeds: vec![0.5, 1.0, 2.0, 4.0],
            seconds_per_year: 1.0,
        }
    }
}

/// Bounds and timers for the two data caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub year_capacity: usize,
    pub year_debounce_s: f64,
    pub year_prefetch_delay_s: f64,
    pub frontline_capacity: usize,
    pub frontline_debounce_s: f64,
    pub frontline_prefetch_delay_s: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let years = PipelineConfig::YEARS;
        let frontlines = PipelineConfig::FRONTLINES;
        Self {
            year_capacity: years.capacity,
            year_debounce_s: years.debounce_s,
            year_prefetch_delay_s: years.prefetch_delay_s,
            frontline_capacity: frontlines.capacity,
            frontline_debounce_s: frontlines.debounce_s,
            frontline_prefetch_delay_s: frontlines.prefetch_delay_s,
        }
    }
}

impl CacheConfig {
    pub fn years(&self) -> PipelineConfig {
        PipelineConfig {
            capacity: self.year_capacity,
            debounce_s: self.year_debounce_s,
            prefetch_delay_s: self.year_prefetch_delay_s,
        }
    }

    pub fn frontlines(&self) -> PipelineConfig {
        PipelineConfig {
            capacity: self.frontline_capacity,
            debounce_s: self.frontline_debounce_s,
            prefetch_delay_s: self.frontline_prefetch_delay_s,
        }
    }
}

/// Camera distances are in globe radii from the centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub initial_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub fov_y_deg: f64,
    /// Exponential easing rate (1/s) toward a fly-to orientation.
    pub orientation_easing: f64,
    /// Exponential easing rate (1/s) toward a zoom target.
    pub zoom_easing: f64,
    /// Fly-to is considered settled once both axes are within this (rad).
    pub settle_epsilon_rad: f64,
    pub zoom_epsilon: f64,
    pub auto_rotate: bool,
    pub auto_rotate_rad_per_s: f64,
    /// Wheel delta to log-distance factor.
    pub wheel_zoom_rate: f64,
    pub drag_rad_per_px: f64,
    pub initial_lat: f64,
    pub initial_lng: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_distance: 3.0,
            min_distance: 1.3,
            max_distance: 6.0,
            fov_y_deg: 45.0,
            orientation_easing: 4.0,
            zoom_easing: 6.0,
            settle_epsilon_rad: 1e-3,
            zoom_epsilon: 1e-3,
            auto_rotate: true,
            auto_rotate_rad_per_s: 0.05,
            wheel_zoom_rate: 0.001,
            drag_rad_per_px: 0.005,
            initial_lat: 20.0,
            initial_lng: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer travel that turns a press into a drag; shorter releases click.
    pub drag_threshold_px: f64,
    pub resize_debounce_s: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 5.0,
            resize_debounce_s: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub timeline: TimelineConfig,
    pub cache: CacheConfig,
    pub camera: CameraConfig,
    pub interaction: InteractionConfig,
    /// Seed for marker pulse phases; `None` seeds from the OS.
    pub pulse_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Json(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(reason) => write!(f, "config parse error: {reason}"),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(reason.into())
}

impl GlobeConfig {
    /// Parses and validates; missing fields take their defaults.
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(payload).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timeline;
        if t.min_year > t.max_year {
            return Err(invalid(format!(
                "timeline.min_year {} is after max_year {}",
                t.min_year, t.max_year
            )));
        }
        if !(t.min_year..=t.max_year).contains(&t.initial_year) {
            return Err(invalid("timeline.initial_year is outside [min_year, max_year]"));
        }
        if t.speeds.is_empty() || t.speeds.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(invalid("timeline.speeds must be non-empty and positive"));
        }
        if !(t.seconds_per_year.is_finite() && t.seconds_per_year > 0.0) {
            return Err(invalid("timeline.seconds_per_year must be positive"));
        }

        let c = &self.cache;
        if c.year_capacity == 0 || c.frontline_capacity == 0 {
            return Err(invalid("cache capacities must be at least 1"));
        }
        let timers = [
            c.year_debounce_s,
            c.year_prefetch_delay_s,
            c.frontline_debounce_s,
            c.frontline_prefetch_delay_s,
        ];
        if timers.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(invalid("cache delays must be finite and non-negative"));
        }

        let cam = &self.camera;
        if !(cam.min_distance > foundation::math::GLOBE_RADIUS) {
            return Err(invalid("camera.min_distance must be outside the globe"));
        }
        if cam.min_distance > cam.max_distance {
            return Err(invalid("camera.min_distance is above max_distance"));
        }
        if !(cam.min_distance..=cam.max_distance).contains(&cam.initial_distance) {
            return Err(invalid("camera.initial_distance is outside [min, max]"));
        }
        if !(cam.fov_y_deg > 0.0 && cam.fov_y_deg < 180.0) {
            return Err(invalid("camera.fov_y_deg must be in (0, 180)"));
        }
        if cam.orientation_easing <= 0.0 || cam.zoom_easing <= 0.0 {
            return Err(invalid("camera easing rates must be positive"));
        }
        if cam.settle_epsilon_rad <= 0.0 || cam.zoom_epsilon <= 0.0 {
            return Err(invalid("camera epsilons must be positive"));
        }

        let i = &self.interaction;
        if !(i.drag_threshold_px >= 0.0) || !(i.resize_debounce_s >= 0.0) {
            return Err(invalid("interaction thresholds must be non-negative"));
        }
        Ok(())
    }
}
