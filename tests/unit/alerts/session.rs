//! Unit tests for SessionBoundary

use atralert::alerts::session::SessionBoundary;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

#[test]
fn test_fires_once_per_date_at_close() {
    let mut boundary = SessionBoundary::default();
    assert_eq!(boundary.close(), NaiveTime::from_hms_opt(15, 0, 0).unwrap());

    // 14:59 Shanghai
    assert!(!boundary.check(Utc.with_ymd_and_hms(2024, 3, 15, 6, 59, 0).unwrap()));
    // 15:00 Shanghai
    assert!(boundary.check(Utc.with_ymd_and_hms(2024, 3, 15, 7, 0, 0).unwrap()));
    assert_eq!(boundary.last_fired(), NaiveDate::from_ymd_opt(2024, 3, 15));
    // Later the same evening
    assert!(!boundary.check(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()));
    // Next trading day before and after the close
    assert!(!boundary.check(Utc.with_ymd_and_hms(2024, 3, 16, 1, 0, 0).unwrap()));
    assert!(boundary.check(Utc.with_ymd_and_hms(2024, 3, 16, 7, 30, 0).unwrap()));
}

#[test]
fn test_uses_local_date_not_utc_date() {
    let mut boundary = SessionBoundary::default();
    // 2024-03-15 23:30 UTC is already 2024-03-16 07:30 in Shanghai
    assert!(!boundary.check(Utc.with_ymd_and_hms(2024, 3, 15, 23, 30, 0).unwrap()));
    assert!(boundary.check(Utc.with_ymd_and_hms(2024, 3, 16, 7, 0, 0).unwrap()));
    assert_eq!(boundary.last_fired(), NaiveDate::from_ymd_opt(2024, 3, 16));
}

#[test]
fn test_custom_close_and_timezone() {
    let close = NaiveTime::from_hms_opt(16, 30, 0).unwrap();
    let mut boundary = SessionBoundary::new(close, chrono_tz::America::New_York);
    assert_eq!(boundary.timezone(), chrono_tz::America::New_York);

    // 16:00 EDT
    assert!(!boundary.check(Utc.with_ymd_and_hms(2024, 6, 3, 20, 0, 0).unwrap()));
    // 16:30 EDT
    assert!(boundary.check(Utc.with_ymd_and_hms(2024, 6, 3, 20, 30, 0).unwrap()));
}
