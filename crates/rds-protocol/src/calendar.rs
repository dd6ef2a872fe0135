//! Modified Julian Date conversion
//!
//! RDS transmits the date as a 17-bit Modified Julian Day number. The
//! conversion below is the one given in the RDS standard (Annex G) and is
//! valid from 1900-03-01 to 2100-02-28. The floor operations on the
//! fractional divisions decide the month and year boundaries, so they must
//! stay exactly as written.

use std::fmt;

/// First MJD the conversion is valid for (1900-03-01)
pub const MJD_VALID_FROM: u32 = 15_079;

/// Last MJD the conversion is valid for (2100-02-28)
pub const MJD_VALID_UNTIL: u32 = 88_127;

/// A Gregorian calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarDate {
    /// Year
    pub year: i32,
    /// Month (1-12)
    pub month: u8,
    /// Day of month (1-31)
    pub day: u8,
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Convert a Modified Julian Day to a calendar date
pub fn mjd_to_date(mjd: u32) -> CalendarDate {
    let mjd = f64::from(mjd);

    let y = ((mjd - 15078.2) / 365.25).floor();
    let year_days = (y * 365.25).floor();
    let m = (((mjd - 14956.1) - year_days) / 30.6001).floor();
    let d = mjd - 14956.0 - year_days - (m * 30.60001).floor();

    let k = if m == 14.0 || m == 15.0 { 1 } else { 0 };
    let y = y as i32 + k;
    let m = m as i32 - 1 - k * 12;

    CalendarDate {
        year: y + 1900,
        month: m as u8,
        day: d as u8,
    }
}

/// Number of days in a month, `None` for a month outside 1-12
pub fn days_in_month(year: i32, month: u8) -> Option<u8> {
    let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if leap => Some(29),
        2 => Some(28),
        _ => None,
    }
}

/// Convert a calendar date to a Modified Julian Day
///
/// Inverse of [`mjd_to_date`]. Returns `None` for an impossible date or
/// one outside the validity range.
pub fn date_to_mjd(year: i32, month: u8, day: u8) -> Option<u32> {
    if day == 0 || day > days_in_month(year, month)? {
        return None;
    }

    let leap = if month <= 2 { 1.0 } else { 0.0 };
    let y = f64::from(year.checked_sub(1900)?) - leap;
    let m = f64::from(month) + 1.0 + leap * 12.0;

    let mjd = 14956.0 + f64::from(day) + (y * 365.25).floor() + (m * 30.6001).floor();
    if mjd < f64::from(MJD_VALID_FROM) || mjd > f64::from(MJD_VALID_UNTIL) {
        return None;
    }
    Some(mjd as u32)
}

/// ISO weekday (1 = Monday .. 7 = Sunday)
pub fn weekday(mjd: u32) -> u8 {
    ((mjd + 2) % 7) as u8 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(year: i32, month: u8, day: u8) -> CalendarDate {
        CalendarDate { year, month, day }
    }

    #[test]
    fn test_reference_dates() {
        assert_eq!(mjd_to_date(53_736), date(2006, 1, 1));
        assert_eq!(mjd_to_date(51_603), date(2000, 2, 29));
        assert_eq!(mjd_to_date(60_675), date(2024, 12, 31));
        assert_eq!(mjd_to_date(60_735), date(2025, 3, 1));
    }

    #[test]
    fn test_month_boundaries() {
        // last day of February in a leap year and the day after
        assert_eq!(mjd_to_date(60_369), date(2024, 2, 29));
        assert_eq!(mjd_to_date(60_370), date(2024, 3, 1));
        // year rollover
        assert_eq!(mjd_to_date(53_735), date(2005, 12, 31));
    }

    #[test]
    fn test_validity_range_edges() {
        assert_eq!(mjd_to_date(MJD_VALID_FROM), date(1900, 3, 1));
        assert_eq!(mjd_to_date(MJD_VALID_UNTIL), date(2100, 2, 28));
    }

    #[test]
    fn test_date_to_mjd() {
        assert_eq!(date_to_mjd(2006, 1, 1), Some(53_736));
        assert_eq!(date_to_mjd(2000, 2, 29), Some(51_603));
    }

    #[test]
    fn test_date_to_mjd_rejects_impossible_dates() {
        assert_eq!(date_to_mjd(2024, 2, 31), None);
        assert_eq!(date_to_mjd(2023, 2, 29), None);
        assert_eq!(date_to_mjd(2024, 4, 31), None);
        assert_eq!(date_to_mjd(2024, 13, 1), None);
        assert_eq!(date_to_mjd(2024, 1, 0), None);
    }

    #[test]
    fn test_date_to_mjd_rejects_out_of_range_years() {
        assert_eq!(date_to_mjd(1900, 2, 28), None);
        assert_eq!(date_to_mjd(2100, 3, 1), None);
        assert_eq!(date_to_mjd(2300, 1, 1), None);
        assert_eq!(date_to_mjd(i32::MIN, 1, 1), None);
        assert_eq!(date_to_mjd(i32::MAX, 1, 1), None);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2025, 11), Some(30));
        assert_eq!(days_in_month(2025, 0), None);
    }

    #[test]
    fn test_weekday() {
        assert_eq!(weekday(53_736), 7); // Sunday
        assert_eq!(weekday(51_603), 2); // Tuesday
        assert_eq!(weekday(60_735), 6); // Saturday
    }

    #[test]
    fn test_display() {
        assert_eq!(mjd_to_date(53_736).to_string(), "2006-01-01");
    }

    proptest! {
        #[test]
        fn conversion_inverts_within_range(mjd in MJD_VALID_FROM..=MJD_VALID_UNTIL) {
            let d = mjd_to_date(mjd);
            prop_assert!((1..=12).contains(&d.month));
            prop_assert!((1..=31).contains(&d.day));
            prop_assert_eq!(date_to_mjd(d.year, d.month, d.day), Some(mjd));
        }
    }
}
