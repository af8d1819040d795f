/// Host clock reading in seconds. Only differences are meaningful.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub fn after(self, seconds: f64) -> Self {
        Time(self.0 + seconds)
    }
}

/// Inclusive span of calendar years.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct YearSpan {
    pub start: i32,
    pub end: i32,
}

impl YearSpan {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// A span with no recorded end runs through `present`.
    pub fn open_ended(start: i32, present: i32) -> Self {
        Self {
            start,
            end: present,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    pub fn len_years(&self) -> i32 {
        (self.end - self.start + 1).max(0)
    }
}

/// Parses the year out of `YYYY`, `YYYY-MM` or `YYYY-MM-DD` (a leading `-`
/// marks years BCE).
pub fn parse_year(date: &str) -> Option<i32> {
    let date = date.trim();
    let (sign, digits) = match date.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, date),
    };
    let year_part = digits.split(['-', 'T']).next()?;
    if year_part.is_empty() || !year_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year_part.parse::<i32>().ok().map(|y| y * sign)
}

#[cfg(test)]
mod tests {
    use super::{Time, YearSpan, parse_year};

    #[test]
    fn open_ended_span_runs_through_present() {
        let span = YearSpan::open_ended(1945, 2025);
        assert!(!span.contains(1944));
        assert!((1945..=2025).all(|y| span.contains(y)));
        assert!(!span.contains(2026));
        assert_eq!(span.len_years(), 81);
    }

    #[test]
    fn parses_common_date_shapes() {
        assert_eq!(parse_year("1945-01-01"), Some(1945));
        assert_eq!(parse_year("1999"), Some(1999));
        assert_eq!(parse_year("2014-02-20T00:00:00Z"), Some(2014));
        assert_eq!(parse_year("-0031-09-02"), Some(-31));
        assert_eq!(parse_year("unknown"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn time_after_adds_seconds() {
        assert_eq!(Time(1.5).after(0.5), Time(2.0));
    }
}
