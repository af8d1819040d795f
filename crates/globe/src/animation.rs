//! Camera easing: fly-to orientation, zoom and idle auto-rotation.
//!
//! Both eases are frame-rate independent: each step closes the fraction
//! `1 - exp(-rate * dt)` of the remaining gap.

use foundation::math::Orientation;

use crate::config::CameraConfig;

/// Tilt stays short of the poles so the up vector never flips.
const MAX_TILT_RAD: f64 = 1.45;

pub fn ease_factor(rate: f64, dt_s: f64) -> f64 {
    1.0 - (-rate * dt_s).exp()
}

#[derive(Debug, Clone)]
pub struct Animator {
    config: CameraConfig,
    orientation: Orientation,
    fly_target: Option<Orientation>,
    distance: f64,
    zoom_target: Option<f64>,
    auto_rotate: bool,
}

impl Animator {
    pub fn new(config: CameraConfig) -> Self {
        let orientation = Orientation::facing(config.initial_lng, config.initial_lat, 0.0);
        Self {
            orientation,
            fly_target: None,
            distance: config.initial_distance,
            zoom_target: None,
            auto_rotate: config.auto_rotate,
            config,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn fly_target(&self) -> Option<Orientation> {
        self.fly_target
    }

    pub fn zoom_target(&self) -> Option<f64> {
        self.zoom_target
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    /// Eases toward `(lat, lng)` facing the camera; idle rotation stops.
    pub fn fly_to(&mut self, lat: f64, lng: f64, distance: Option<f64>) {
        self.fly_target = Some(Orientation::facing(lng, lat, self.orientation.y_rad));
        self.auto_rotate = false;
        if let Some(d) = distance {
            self.set_zoom_target(d);
        }
    }

    pub fn set_zoom_target(&mut self, distance: f64) {
        if !distance.is_nan() {
            self.zoom_target =
                Some(distance.clamp(self.config.min_distance, self.config.max_distance));
        }
    }

    /// Positive deltas zoom out.
    pub fn wheel(&mut self, delta: f64) {
        let from = self.zoom_target.unwrap_or(self.distance);
        self.set_zoom_target(from * (delta * self.config.wheel_zoom_rate).exp());
    }

    /// Direct rotation from a pointer drag; cancels any fly-to.
    pub fn drag(&mut self, dx_px: f64, dy_px: f64) {
        self.fly_target = None;
        let rate = self.config.drag_rad_per_px;
        self.orientation.y_rad += dx_px * rate;
        self.orientation.x_rad =
            (self.orientation.x_rad + dy_px * rate).clamp(-MAX_TILT_RAD, MAX_TILT_RAD);
    }

    /// Drops the fly-to target, restores the default zoom and resumes idle
    /// rotation.
    pub fn reset(&mut self) {
        self.fly_target = None;
        self.auto_rotate = true;
        self.set_zoom_target(self.config.initial_distance);
    }

    pub fn step(&mut self, dt_s: f64, dragging: bool) {
        if let Some(target) = self.fly_target {
            let k = ease_factor(self.config.orientation_easing, dt_s);
            let dx = target.x_rad - self.orientation.x_rad;
            let dy = target.y_rad - self.orientation.y_rad;
            self.orientation.x_rad += dx * k;
            self.orientation.y_rad += dy * k;
            let eps = self.config.settle_epsilon_rad;
            if (target.x_rad - self.orientation.x_rad).abs() < eps
                && (target.y_rad - self.orientation.y_rad).abs() < eps
            {
                self.orientation = target;
                self.fly_target = None;
            }
        } else if self.auto_rotate && !dragging {
            self.orientation.y_rad += self.config.auto_rotate_rad_per_s * dt_s;
        }

        if let Some(target) = self.zoom_target {
            let k = ease_factor(self.config.zoom_easing, dt_s);
            self.distance += (target - self.distance) * k;
            if (target - self.distance).abs() < self.config.zoom_epsilon {
                self.distance = target;
                self.zoom_target = None;
            }
        }
        self.distance = self
            .distance
            .clamp(self.config.min_distance, self.config.max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::{Animator, ease_factor};
    use crate::config::CameraConfig;
    use foundation::math::Orientation;

    fn still() -> CameraConfig {
        CameraConfig {
            auto_rotate: false,
            ..CameraConfig::default()
        }
    }

    #[test]
    fn ease_is_frame_rate_independent() {
        let one = ease_factor(4.0, 0.1);
        let two = 1.0 - (1.0 - ease_factor(4.0, 0.05)).powi(2);
        assert!((one - two).abs() < 1e-12);
    }

    #[test]
    fn fly_to_converges_and_clears() {
        let mut anim = Animator::new(still());
        anim.fly_to(48.0, 2.0, Some(2.0));
        let target = anim.fly_target().expect("target");
        for _ in 0..600 {
            anim.step(1.0 / 60.0, false);
        }
        assert!(anim.fly_target().is_none());
        assert!(anim.zoom_target().is_none());
        assert_eq!(anim.orientation(), target);
        assert_eq!(anim.distance(), 2.0);
    }

    #[test]
    fn auto_rotation_pauses_while_dragging_and_after_fly_to() {
        let mut anim = Animator::new(CameraConfig::default());
        let start = anim.orientation().y_rad;
        anim.step(0.1, true);
        assert_eq!(anim.orientation().y_rad, start);
        anim.step(0.1, false);
        assert!(anim.orientation().y_rad > start);

        anim.fly_to(0.0, 0.0, None);
        assert!(!anim.is_auto_rotating());
        anim.reset();
        assert!(anim.is_auto_rotating());
        assert!(anim.fly_target().is_none());
    }

    #[test]
    fn drag_cancels_fly_to_and_clamps_tilt() {
        let mut anim = Animator::new(still());
        anim.fly_to(10.0, 10.0, None);
        anim.drag(0.0, 10_000.0);
        assert!(anim.fly_target().is_none());
        assert!(anim.orientation().x_rad <= 1.45);
        assert_ne!(anim.orientation(), Orientation::default());
    }

    #[test]
    fn zoom_is_clamped() {
        let config = still();
        let mut anim = Animator::new(config.clone());
        anim.wheel(1e6);
        assert_eq!(anim.zoom_target(), Some(config.max_distance));
        anim.wheel(-1e7);
        assert_eq!(anim.zoom_target(), Some(config.min_distance));
    }
}
