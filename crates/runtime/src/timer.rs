use foundation::time::Time;

/// Deadline-based debounce.
///
/// Timers are plain deadlines compared against the host clock inside the
/// frame callback, so nothing fires outside it and teardown is just `cancel`.
#[derive(Debug, Clone, PartialEq)]
pub struct Debounce<T> {
    delay_s: f64,
    pending: Option<(Time, T)>,
}

impl<T> Debounce<T> {
    pub fn new(delay_s: f64) -> Self {
        Self {
            delay_s: delay_s.max(0.0),
            pending: None,
        }
    }

    pub fn delay_s(&self) -> f64 {
        self.delay_s
    }

    /// (Re)arms the timer; any previously pending value is replaced.
    pub fn schedule(&mut self, now: Time, value: T) {
        self.pending = Some((now.after(self.delay_s), value));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, v)| v)
    }

    pub fn deadline(&self) -> Option<Time> {
        self.pending.as_ref().map(|(t, _)| *t)
    }

    /// Returns the pending value once `now` has reached the deadline.
    pub fn poll(&mut self, now: Time) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now.0 >= deadline.0 => self.cancel(),
            _ => None,
        }
    }
}

/// Accumulates elapsed time and reports how many whole periods have passed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Accumulator {
    period_s: f64,
    elapsed_s: f64,
}

impl Accumulator {
    pub fn new(period_s: f64) -> Self {
        Self {
            period_s: period_s.max(f64::EPSILON),
            elapsed_s: 0.0,
        }
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn reset(&mut self) {
        self.elapsed_s = 0.0;
    }

    /// Adds `dt_s` and returns the number of periods crossed.
    pub fn advance(&mut self, dt_s: f64) -> u32 {
        if dt_s <= 0.0 || !dt_s.is_finite() {
            return 0;
        }
        self.elapsed_s += dt_s;
        let mut steps = 0;
        while self.elapsed_s >= self.period_s {
            self.elapsed_s -= self.period_s;
            steps += 1;
        }
        steps
    }
}
