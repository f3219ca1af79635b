use chrono::NaiveDate;

use zodiac_momentum::manual_log;
use zodiac_momentum::zodiac::Zodiac;

#[test]
fn record_appends_one_row_per_valid_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manual_day_events.csv");
    let date = NaiveDate::from_ymd_opt(2024, 11, 9).unwrap();

    let written =
        manual_log::record_observation(&path, &["Leo", "leo", "Bogus", "Pisces"], date).unwrap();
    assert_eq!(written, 3);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("date,Zodiac,performed\n"));
    assert!(raw.contains("2024-11-09,Leo,1\n"));

    let observations = manual_log::load_manual_log(&path).unwrap();
    assert_eq!(observations.len(), 3);
    assert_eq!(
        observations.iter().filter(|o| o.zodiac == Zodiac::Leo).count(),
        2
    );
    assert!(observations.iter().all(|o| o.date == date));
}

#[test]
fn recording_twice_doubles_the_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("manual.csv");
    let date = NaiveDate::from_ymd_opt(2024, 11, 9).unwrap();

    manual_log::record_observation(&path, &["Virgo"], date).unwrap();
    manual_log::record_observation(&path, &["Virgo"], date).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.matches("date,Zodiac,performed").count(), 1);
    assert_eq!(manual_log::load_manual_log(&path).unwrap().len(), 2);
}

#[test]
fn nothing_valid_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manual.csv");
    let date = NaiveDate::from_ymd_opt(2024, 11, 9).unwrap();
    assert_eq!(manual_log::record_observation(&path, &["", "xyz"], date).unwrap(), 0);
    assert!(!path.exists());
}

#[test]
fn missing_log_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let observations = manual_log::load_manual_log(&dir.path().join("absent.csv")).unwrap();
    assert!(observations.is_empty());
}
