//! Origin cycle resolver
//!
//! Maps a calendar date to its position (1..=18) in the 18-day cycle that
//! starts at an anchor date. Dates are date-only, so there is no timezone
//! skew between the anchor and the birthdate.

use std::error::Error;
use std::fmt;

use chrono::NaiveDate;

/// Days in one cycle
pub const CYCLE_LENGTH: i64 = 18;

/// Expected input format
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// Empty or whitespace-only input
    Empty,
    /// Input was not a valid `YYYY-MM-DD` calendar date
    Malformed(String),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::Empty => write!(f, "date is empty"),
            CycleError::Malformed(input) => {
                write!(f, "'{}' is not a YYYY-MM-DD date", input)
            }
        }
    }
}

impl Error for CycleError {}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate, CycleError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CycleError::Empty);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| CycleError::Malformed(trimmed.to_string()))
}

/// Position of `date` in the cycle anchored at `anchor` (anchor itself is 1)
pub fn cycle_position(anchor: NaiveDate, date: NaiveDate) -> u8 {
    let days = date.signed_duration_since(anchor).num_days();
    (days.rem_euclid(CYCLE_LENGTH) + 1) as u8
}

/// Origin cycle day of a birthdate relative to the anchor date
pub fn origin_cycle_day(birthdate: &str, anchor: &str) -> Result<u8, CycleError> {
    let anchor = parse_date(anchor)?;
    let birth = parse_date(birthdate)?;
    Ok(cycle_position(anchor, birth))
}

/// Where `today` falls in the cycle that starts on the birthdate
pub fn today_cycle_day(birthdate: &str, today: NaiveDate) -> Result<u8, CycleError> {
    let birth = parse_date(birthdate)?;
    Ok(cycle_position(birth, today))
}

/// Lenient variant for the render path: invalid input yields `None`
pub fn resolve_origin(birthdate: &str, anchor: &str) -> Option<u8> {
    match origin_cycle_day(birthdate, anchor) {
        Ok(day) => Some(day),
        Err(e) => {
            log::debug!("No cycle day for birthdate: {}", e);
            None
        }
    }
}

/// Today's calendar date in the viewer's local timezone
#[cfg(target_arch = "wasm32")]
pub fn local_today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
}

/// Today's calendar date in the viewer's local timezone
#[cfg(not(target_arch = "wasm32"))]
pub fn local_today() -> Option<NaiveDate> {
    Some(chrono::Local::now().date_naive())
}
