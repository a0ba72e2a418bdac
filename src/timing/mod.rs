//! Wall-clock capture timestamps
//!
//! Every file of a segment is named from one timestamp taken when the segment
//! finishes capturing. The date goes into the directory name, the unix time
//! (with its decimal point removed) into the file name.

use chrono::{DateTime, Local, TimeZone, Utc};

/// The instant a segment was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTimestamp {
    at: DateTime<Local>,
}

impl CaptureTimestamp {
    /// Timestamp for the current moment
    pub fn now() -> Self {
        Self { at: Local::now() }
    }

    /// Build a timestamp from unix seconds and microseconds
    ///
    /// Returns `None` when the value is out of chrono's range.
    pub fn from_unix(secs: i64, micros: u32) -> Option<Self> {
        let utc = Utc.timestamp_opt(secs, micros.checked_mul(1_000)?).single()?;
        Some(Self {
            at: utc.with_timezone(&Local),
        })
    }

    pub fn datetime(&self) -> DateTime<Local> {
        self.at
    }

    /// Local calendar date as `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        self.at.format("%Y-%m-%d").to_string()
    }

    /// Unix time in seconds as a float, rendered in its shortest round-trip
    /// form with the dot removed.
    ///
    /// Whole seconds keep one fractional zero: 1700000000.25 -> "170000000025",
    /// 1700000000.0 -> "17000000000".
    pub fn epoch_digits(&self) -> String {
        let mut text = self.unix_seconds().to_string();
        if !text.contains('.') {
            text.push_str(".0");
        }
        text.replace('.', "")
    }

    /// Seconds since the unix epoch, with sub-second precision
    pub fn unix_seconds(&self) -> f64 {
        self.at.timestamp() as f64 + f64::from(self.at.timestamp_subsec_nanos()) / 1e9
    }
}

impl Default for CaptureTimestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_digits_trims_fraction() {
        let ts = CaptureTimestamp::from_unix(1_700_000_000, 250_000).unwrap();
        assert_eq!(ts.epoch_digits(), "170000000025");
    }

    #[test]
    fn test_epoch_digits_whole_second() {
        let ts = CaptureTimestamp::from_unix(1_700_000_000, 0).unwrap();
        assert_eq!(ts.epoch_digits(), "17000000000");
    }

    #[test]
    fn test_epoch_digits_keep_sub_microsecond_digits() {
        let ts = CaptureTimestamp::from_unix(1_700_000_000, 500_000).unwrap();
        assert_eq!(ts.epoch_digits(), "17000000005");

        let ts = CaptureTimestamp::from_unix(1_700_000_000, 123_456).unwrap();
        let digits = ts.epoch_digits();
        assert!(!digits.contains('.'));
        let (secs, fraction) = digits.split_at(10);
        assert_eq!(secs, "1700000000");
        assert!(fraction.starts_with("12345"));
        let parsed: f64 = format!("{}.{}", secs, fraction).parse().unwrap();
        assert_eq!(parsed, ts.unix_seconds());
    }

    #[test]
    fn test_date_string_matches_local_date() {
        let ts = CaptureTimestamp::from_unix(1_700_000_000, 0).unwrap();
        let expected = ts.datetime().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(ts.date_string(), expected);
        assert_eq!(ts.date_string().len(), 10);
    }

    #[test]
    fn test_now_is_monotonic_enough() {
        let a = CaptureTimestamp::now();
        let b = CaptureTimestamp::now();
        assert!(b.datetime() >= a.datetime());
    }
}
