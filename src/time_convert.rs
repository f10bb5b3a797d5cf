use chrono::{
    DateTime, Duration as ChronoDuration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use chrono_tz::Tz;

/// Shown wherever a time (or any other field) cannot be produced.
pub const PLACEHOLDER: &str = "—";

/// Zone the reference feed writes its start times in.
pub const SOURCE_TZ: Tz = chrono_tz::America::New_York;

const DISPLAY_FORMAT: &str = "%a, %b %-d, %-I:%M %p %Z";

/// A parsed `H:MM AM/PM` value in 24-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn on(self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_hms_opt(self.hour, self.minute, 0)
    }
}

/// Zone the viewer wants times rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerZone {
    Named(Tz),
    /// Fallback when no IANA name can be resolved: the process's local offset.
    SystemLocal,
}

impl ViewerZone {
    /// Resolves an explicit zone name first, then the OS zone, then the local offset.
    pub fn detect(override_name: Option<&str>) -> Self {
        if let Some(tz) = override_name.and_then(|name| name.trim().parse::<Tz>().ok()) {
            return Self::Named(tz);
        }
        iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| name.parse::<Tz>().ok())
            .map(Self::Named)
            .unwrap_or(Self::SystemLocal)
    }

    pub fn label(&self) -> String {
        match self {
            Self::Named(tz) => tz.name().to_string(),
            Self::SystemLocal => "local".to_string(),
        }
    }

    fn format(&self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Named(tz) => instant.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
            Self::SystemLocal => instant
                .with_timezone(&Local)
                .format(DISPLAY_FORMAT)
                .to_string(),
        }
    }
}

/// Parses `H:MM AM` / `HH:MM PM` (period case-insensitive, single space).
/// Hours outside 1..=12 and minutes outside 0..=59 are rejected.
pub fn parse_clock(raw: &str) -> Option<ClockTime> {
    let (time, period) = raw.split_once(' ')?;
    // Lowercase "pm" converts the same as "PM", not as a morning time.
    let is_pm = if period.eq_ignore_ascii_case("PM") {
        true
    } else if period.eq_ignore_ascii_case("AM") {
        false
    } else {
        return None;
    };

    let (hour, minute) = time.split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    Some(ClockTime {
        hour: to_24_hour(hour, is_pm),
        minute,
    })
}

pub fn to_24_hour(hour: u32, is_pm: bool) -> u32 {
    if is_pm && hour != 12 {
        hour + 12
    } else {
        hour % 12
    }
}

/// Converts a source-zone start time to the viewer's zone, anchored to today.
pub fn convert(raw: &str) -> String {
    convert_at(raw, Local::now().date_naive(), ViewerZone::detect(None))
}

/// Same as [`convert`] with an explicit calendar date and viewer zone.
///
/// The date is always `today`: a kickoff that actually falls on another
/// calendar day is still shown on `today`.
pub fn convert_at(raw: &str, today: NaiveDate, viewer: ViewerZone) -> String {
    let Some(clock) = parse_clock(raw) else {
        return PLACEHOLDER.to_string();
    };
    let Some(wall_clock) = clock.on(today) else {
        return PLACEHOLDER.to_string();
    };
    match in_source_zone(wall_clock) {
        Some(instant) => viewer.format(instant),
        None => PLACEHOLDER.to_string(),
    }
}

/// Reads a naive wall clock as source-zone time. Ambiguous times take the
/// earlier instant; times inside a spring-forward gap move one hour later.
pub fn in_source_zone(wall_clock: NaiveDateTime) -> Option<DateTime<Utc>> {
    SOURCE_TZ
        .from_local_datetime(&wall_clock)
        .earliest()
        .or_else(|| {
            SOURCE_TZ
                .from_local_datetime(&(wall_clock + ChronoDuration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}
