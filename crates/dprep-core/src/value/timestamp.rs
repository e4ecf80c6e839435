//! Timestamps con resolución de 100 ns ("ticks since year 1").
//!
//! Internamente se guarda el número de ticks desde 0001-01-01T00:00:00 UTC.
//! Esa representación es entera, total y preserva el orden, así que sirve
//! directamente para rangos y muestreo estratificado. La vista en milisegundos
//! desde el epoch Unix se deriva de ella.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::constants::{TICKS_AT_UNIX_EPOCH, TICKS_PER_MILLISECOND, TICKS_PER_SECOND};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    ticks: i64,
}

impl Timestamp {
    pub const fn from_ticks(ticks: i64) -> Self {
        Self { ticks }
    }

    /// Milisegundos desde 1970-01-01T00:00:00 UTC.
    pub fn from_millis(millis: i64) -> Self {
        Self { ticks: TICKS_AT_UNIX_EPOCH.saturating_add(millis.saturating_mul(TICKS_PER_MILLISECOND)) }
    }

    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Ticks relativos al epoch Unix; en i128 no hay desbordamiento posible.
    fn since_epoch(&self) -> i128 {
        i128::from(self.ticks) - i128::from(TICKS_AT_UNIX_EPOCH)
    }

    /// Milisegundos desde el epoch Unix (redondeo hacia abajo).
    pub fn millis(&self) -> i64 {
        let millis = self.since_epoch().div_euclid(i128::from(TICKS_PER_MILLISECOND));
        i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
    }

    /// Satura en los extremos de `i64` para fechas que chrono admite pero
    /// que no caben en ticks (más allá del año ~29228).
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        let ticks = i128::from(TICKS_AT_UNIX_EPOCH)
                    + i128::from(dt.timestamp()) * i128::from(TICKS_PER_SECOND)
                    + i128::from(dt.timestamp_subsec_nanos() / 100);
        Self { ticks: i64::try_from(ticks).unwrap_or(if ticks < 0 { i64::MIN } else { i64::MAX }) }
    }

    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        Self::from_datetime(&dt.and_utc())
    }

    /// Vuelve a `DateTime<Utc>`; `None` fuera del rango que chrono representa.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let since_epoch = self.since_epoch();
        let per_second = i128::from(TICKS_PER_SECOND);
        let secs = i64::try_from(since_epoch.div_euclid(per_second)).ok()?;
        let nanos = u32::try_from(since_epoch.rem_euclid(per_second) * 100).ok()?;
        DateTime::from_timestamp(secs, nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "ticks({})", self.ticks),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Timestamp::from_datetime(&dt)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Timestamp::from_naive(&dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn unix_epoch_maps_to_known_ticks() {
        let ts = Timestamp::from_millis(0);
        assert_eq!(ts.ticks(), TICKS_AT_UNIX_EPOCH);
        assert_eq!(ts.millis(), 0);
    }

    #[test]
    fn year_one_is_tick_zero() {
        let dt = NaiveDate::from_ymd_opt(1, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Timestamp::from_naive(&dt).ticks(), 0);
    }

    #[test]
    fn chrono_round_trip_keeps_sub_millisecond_precision() {
        let dt = Utc.with_ymd_and_hms(2019, 2, 17, 10, 30, 0).unwrap() + chrono::Duration::microseconds(1234);
        let ts = Timestamp::from_datetime(&dt);
        assert_eq!(ts.to_datetime(), Some(dt));
        assert_eq!(ts.millis(), dt.timestamp_millis());
    }

    #[test]
    fn ordering_follows_time() {
        let a = Timestamp::from_millis(-5);
        let b = Timestamp::from_millis(10);
        assert!(a < b);
        assert_eq!(a.millis(), -5);
    }

    #[test]
    fn extreme_ticks_convert_without_overflow() {
        for ticks in [i64::MIN, i64::MAX] {
            let ts = Timestamp::from_ticks(ticks);
            let dt = ts.to_datetime().expect("dentro del rango de chrono");
            assert_eq!(Timestamp::from_datetime(&dt), ts);
            assert_eq!(ts.millis(), dt.timestamp_millis());
            assert!(!ts.to_string().starts_with("ticks("));
        }
    }

    #[test]
    fn far_future_datetimes_saturate() {
        let dt = Utc.with_ymd_and_hms(100_000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Timestamp::from_datetime(&dt).ticks(), i64::MAX);
        let dt = Utc.with_ymd_and_hms(-100_000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Timestamp::from_datetime(&dt).ticks(), i64::MIN);
    }
}
