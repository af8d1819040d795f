use runtime::timer::Accumulator;

use crate::config::TimelineConfig;

/// Playback clock for the year axis. The year itself lives in the render
/// state; this only says how many years to advance.
#[derive(Debug, Clone)]
pub struct Timeline {
    min_year: i32,
    max_year: i32,
    speeds: Vec<f64>,
    speed: f64,
    playing: bool,
    clock: Accumulator,
}

impl Timeline {
    pub fn new(config: &TimelineConfig) -> Self {
        let speed = config
            .speeds
            .iter()
            .copied()
            .find(|s| *s == 1.0)
            .or_else(|| config.speeds.first().copied())
            .unwrap_or(1.0);
        Self {
            min_year: config.min_year,
            max_year: config.max_year,
            speeds: config.speeds.clone(),
            speed,
            playing: false,
            clock: Accumulator::new(config.seconds_per_year),
        }
    }

    pub fn range(&self) -> (i32, i32) {
        (self.min_year, self.max_year)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.clock.reset();
    }

    /// Only the configured multipliers are accepted.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        if self.speeds.contains(&speed) {
            self.speed = speed;
            true
        } else {
            false
        }
    }

    pub fn clamp_year(&self, year: i32) -> i32 {
        year.clamp(self.min_year, self.max_year)
    }

    /// Manual scrubbing restarts the partial year.
    pub fn restart_clock(&mut self) {
        self.clock.reset();
    }

    /// Whole years crossed during `dt_s` of playback.
    pub fn advance(&mut self, dt_s: f64) -> u32 {
        if !self.playing {
            return 0;
        }
        self.clock.advance(dt_s * self.speed)
    }

    /// `year` moved forward by `steps`, wrapping from max back to min.
    pub fn step_year(&self, year: i32, steps: u32) -> i32 {
        let span = i64::from(self.max_year - self.min_year) + 1;
        let offset = i64::from(self.clamp_year(year) - self.min_year) + i64::from(steps);
        self.min_year + (offset % span) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::Timeline;
    use crate::config::TimelineConfig;

    fn timeline() -> Timeline {
        Timeline::new(&TimelineConfig {
            min_year: 1990,
            max_year: 1995,
            ..TimelineConfig::default()
        })
    }

    #[test]
    fn playback_wraps_from_max_to_min() {
        let t = timeline();
        assert_eq!(t.step_year(1994, 1), 1995);
        assert_eq!(t.step_year(1995, 1), 1990);
        assert_eq!(t.step_year(1993, 8), 1995);
    }

    #[test]
    fn paused_timeline_does_not_advance() {
        let mut t = timeline();
        assert_eq!(t.advance(5.0), 0);
        t.play();
        assert_eq!(t.advance(0.6), 0);
        assert_eq!(t.advance(0.6), 1);
        t.pause();
        t.play();
        assert_eq!(t.advance(0.6), 0);
    }

    #[test]
    fn speed_scales_playback_and_rejects_unknown_multipliers() {
        let mut t = timeline();
        assert_eq!(t.speed(), 1.0);
        assert!(t.set_speed(4.0));
        assert!(!t.set_speed(3.0));
        assert_eq!(t.speed(), 4.0);
        t.play();
        assert_eq!(t.advance(0.5), 2);
    }
}
