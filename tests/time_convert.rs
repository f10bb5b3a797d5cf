use chrono::NaiveDate;
use nebula_terminal::time_convert::{PLACEHOLDER, ViewerZone, convert, convert_at};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn zone(name: &str) -> ViewerZone {
    ViewerZone::detect(Some(name))
}

#[test]
fn malformed_input_yields_placeholder() {
    for raw in ["", "25:00 AM", "9:60 PM", "noon", "9:30", "9:30 PMX", "TBD"] {
        assert_eq!(convert(raw), PLACEHOLDER, "{raw:?}");
        assert_eq!(
            convert_at(raw, day(2026, 10, 17), zone("UTC")),
            PLACEHOLDER,
            "{raw:?}"
        );
    }
}

#[test]
fn midnight_maps_to_hour_zero() {
    // 00:00 EDT == 04:00 UTC
    assert_eq!(
        convert_at("12:00 AM", day(2026, 10, 17), zone("UTC")),
        "Sat, Oct 17, 4:00 AM UTC"
    );
}

#[test]
fn noon_maps_to_hour_twelve() {
    assert_eq!(
        convert_at("12:00 PM", day(2026, 10, 17), zone("UTC")),
        "Sat, Oct 17, 4:00 PM UTC"
    );
}

#[test]
fn source_zone_viewer_sees_the_same_wall_clock() {
    assert_eq!(
        convert_at("7:30 AM", day(2026, 10, 17), zone("America/New_York")),
        "Sat, Oct 17, 7:30 AM EDT"
    );
}

#[test]
fn converts_to_summer_time_abbreviation() {
    assert_eq!(
        convert_at("3:30 PM", day(2026, 10, 17), zone("Europe/Berlin")),
        "Sat, Oct 17, 9:30 PM CEST"
    );
}

#[test]
fn late_kickoff_rolls_into_next_day_for_eastern_viewers() {
    // 21:00 EST == 02:00 GMT on the following day.
    assert_eq!(
        convert_at("9:00 PM", day(2026, 1, 15), zone("Europe/London")),
        "Fri, Jan 16, 2:00 AM GMT"
    );
}

#[test]
fn period_is_case_insensitive() {
    assert_eq!(
        convert_at("9:00 pm", day(2026, 10, 17), zone("UTC")),
        convert_at("9:00 PM", day(2026, 10, 17), zone("UTC"))
    );
}

#[test]
fn unknown_zone_override_falls_back() {
    assert_eq!(
        ViewerZone::detect(Some("Mars/Olympus_Mons")),
        ViewerZone::detect(None)
    );
}
