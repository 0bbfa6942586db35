//! Rational time values.
//!
//! A [`Time`] is a tick count in a timescale (ticks per second), the representation used by the
//! `mvhd`, `mdhd` and `stts` atoms. Comparisons are exact regardless of timescale, arithmetic
//! happens in the least common timescale of both operands.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

/// A point in time or a length of time, `value / timescale` seconds.
#[derive(Clone, Copy, Debug)]
pub struct Time {
    /// The number of ticks.
    pub value: i64,
    /// The number of ticks per second. Never zero.
    pub timescale: u32,
}

impl Time {
    /// Creates a time value of `value` ticks at `timescale` ticks per second.
    ///
    /// # Panics
    /// Panics if `timescale` is zero.
    pub const fn new(value: i64, timescale: u32) -> Self {
        assert!(timescale != 0, "timescale must not be zero");
        Self { value, timescale }
    }

    /// Zero in the given timescale.
    pub const fn zero(timescale: u32) -> Self {
        Self::new(0, timescale)
    }

    /// Whole seconds in a timescale of one.
    pub const fn from_secs(secs: i64) -> Self {
        Self::new(secs, 1)
    }

    /// Milliseconds in a timescale of 1000.
    pub const fn from_millis(millis: i64) -> Self {
        Self::new(millis, 1000)
    }

    /// Converts seconds to ticks of `timescale`, rounded to the nearest tick.
    pub fn from_secs_f64(secs: f64, timescale: u32) -> Self {
        Self::new((secs * timescale as f64).round() as i64, timescale)
    }

    /// Converts a duration to ticks of `timescale`, truncating partial ticks.
    pub fn from_duration(duration: Duration, timescale: u32) -> Self {
        let secs = duration.as_secs() as i128 * timescale as i128;
        let nanos = duration.subsec_nanos() as i128 * timescale as i128 / 1_000_000_000;
        Self::new((secs + nanos).min(i64::MAX as i128) as i64, timescale)
    }

    /// Converts this time to a duration. Negative values saturate at zero.
    pub fn to_duration(self) -> Duration {
        if self.value <= 0 {
            return Duration::ZERO;
        }
        let value = self.value as u64;
        let timescale = self.timescale as u64;
        let secs = value / timescale;
        let nanos = (value % timescale) * 1_000_000_000 / timescale;
        Duration::new(secs, nanos as u32)
    }

    /// Returns this time in seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.value as f64 / self.timescale as f64
    }

    /// Returns `true` if this is zero in any timescale.
    pub const fn is_zero(self) -> bool {
        self.value == 0
    }

    /// Returns `true` if this is greater than zero.
    pub const fn is_positive(self) -> bool {
        self.value > 0
    }

    /// Returns `true` if this is less than zero.
    pub const fn is_negative(self) -> bool {
        self.value < 0
    }

    /// Converts this time to another timescale, rounding half away from zero. Returns `None` if
    /// the result doesn't fit into 64 bits.
    pub fn rescale(self, timescale: u32) -> Option<Self> {
        if timescale == 0 {
            return None;
        }
        if timescale == self.timescale {
            return Some(self);
        }
        let num = self.value as i128 * timescale as i128;
        let den = self.timescale as i128;
        let half = den / 2;
        let value = if num >= 0 { (num + half) / den } else { (num - half) / den };
        i64::try_from(value).ok().map(|v| Self::new(v, timescale))
    }

    /// Returns the least common timescale of both values, or the larger of both if the least
    /// common multiple doesn't fit into 32 bits.
    pub fn common_timescale(a: u32, b: u32) -> u32 {
        if a == b {
            return a;
        }
        let lcm = a as u64 / gcd(a as u64, b as u64) * b as u64;
        u32::try_from(lcm).unwrap_or(a.max(b))
    }

    /// Adds two values in their common timescale.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        let timescale = Self::common_timescale(self.timescale, other.timescale);
        let a = self.rescale(timescale)?;
        let b = other.rescale(timescale)?;
        a.value.checked_add(b.value).map(|v| Self::new(v, timescale))
    }

    /// Subtracts `other` from `self` in their common timescale.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let timescale = Self::common_timescale(self.timescale, other.timescale);
        let a = self.rescale(timescale)?;
        let b = other.rescale(timescale)?;
        a.value.checked_sub(b.value).map(|v| Self::new(v, timescale))
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.value as i128 * other.timescale as i128;
        let b = other.value as i128 * self.timescale as i128;
        a.cmp(&b)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}s", self.value, self.timescale)
    }
}

/// The decode timestamp of a sample. Chapter samples are never reordered, so it is usually
/// absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodeTime {
    /// The sample is decoded at this time.
    Present(Time),
    /// The sample is decoded at its presentation time.
    #[default]
    Absent,
}

impl DecodeTime {
    /// Returns the decode time if present.
    pub fn time(self) -> Option<Time> {
        match self {
            Self::Present(t) => Some(t),
            Self::Absent => None,
        }
    }
}

/// A half open range of time, `[start, start + duration)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    /// The start of the range.
    pub start: Time,
    /// The length of the range.
    pub duration: Time,
}

impl TimeRange {
    /// Creates a range starting at `start` lasting `duration`.
    pub const fn new(start: Time, duration: Time) -> Self {
        Self { start, duration }
    }

    /// Returns the end of the range, or `None` on overflow.
    pub fn end(&self) -> Option<Time> {
        self.start.checked_add(self.duration)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn compare_across_timescales() {
        assert_eq!(Time::new(42_500, 1000), Time::new(85, 2));
        assert!(Time::new(599, 600) < Time::from_secs(1));
        assert!(Time::new(601, 600) > Time::from_millis(1000));
    }

    #[test]
    fn rescale_rounds_half_away_from_zero() {
        assert_eq!(Time::new(1, 3).rescale(2).unwrap().value, 1);
        assert_eq!(Time::new(1, 4).rescale(2).unwrap().value, 1);
        assert_eq!(Time::new(-1, 4).rescale(2).unwrap().value, -1);
        assert_eq!(Time::new(42_500, 1000).rescale(600).unwrap().value, 25_500);
        assert_eq!(Time::new(i64::MAX, 1).rescale(1000), None);
    }

    #[test]
    fn arithmetic_uses_common_timescale() {
        let sum = Time::new(1, 3).checked_add(Time::new(1, 2)).unwrap();
        assert_eq!(sum.timescale, 6);
        assert_eq!(sum.value, 5);

        let diff = Time::from_secs(150).checked_sub(Time::new(120_000, 1000)).unwrap();
        assert_eq!(diff, Time::from_secs(30));
    }

    #[test]
    fn common_timescale_falls_back_to_max() {
        assert_eq!(Time::common_timescale(600, 1000), 3000);
        assert_eq!(Time::common_timescale(4_294_967_291, 4_294_967_279), 4_294_967_291);
    }

    #[test]
    fn duration_conversion() {
        let t = Time::from_duration(Duration::new(234, 324_000_000), 1000);
        assert_eq!(t.value, 234_324);
        assert_eq!(t.to_duration(), Duration::new(234, 324_000_000));
        assert_eq!(Time::new(-5, 1).to_duration(), Duration::ZERO);
    }
}
