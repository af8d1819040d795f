use foundation::time::Time;

/// Longest step the animation will integrate in one frame. A tab that was
/// backgrounded for minutes must not fling the globe or skip decades.
pub const MAX_FRAME_DT_S: f64 = 0.1;

/// Per-frame timing handed to every system that runs inside the frame callback.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Clamped delta time (seconds).
    pub dt_s: f64,
    /// Host clock at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64, time: Time) -> Self {
        Self {
            index,
            dt_s: clamp_dt(dt_s),
            time,
        }
    }

    pub fn first(time: Time) -> Self {
        Self::new(0, 0.0, time)
    }

    /// Frame following `self`, stamped at host time `now`.
    pub fn advance(self, now: Time) -> Self {
        Self::new(self.index + 1, now.0 - self.time.0, now)
    }
}

fn clamp_dt(dt_s: f64) -> f64 {
    if !dt_s.is_finite() {
        return 0.0;
    }
    dt_s.clamp(0.0, MAX_FRAME_DT_S)
}

#[cfg(test)]
mod tests {
    use super::{Frame, MAX_FRAME_DT_S};
    use foundation::time::Time;

    #[test]
    fn advance_measures_host_time() {
        let f0 = Frame::first(Time(10.0));
        let f1 = f0.advance(Time(10.016));
        assert_eq!(f1.index, 1);
        assert!((f1.dt_s - 0.016).abs() < 1e-9);
        assert_eq!(f1.time, Time(10.016));
    }

    #[test]
    fn long_gaps_and_clock_skew_are_clamped() {
        let f0 = Frame::first(Time(0.0));
        assert_eq!(f0.advance(Time(120.0)).dt_s, MAX_FRAME_DT_S);
        assert_eq!(f0.advance(Time(-1.0)).dt_s, 0.0);
        assert_eq!(Frame::new(3, f64::NAN, Time(0.0)).dt_s, 0.0);
    }
}
