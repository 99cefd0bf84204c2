// libs/appointment-cell/src/services/slot.rs
//
// The backend stores a slot as two strings: `slotDate` in `D_M_YYYY` form
// (underscore separated, no zero padding, 1-based month) and `slotTime` as
// `h:mm AM|PM`. Every chronological comparison goes through `parse_slot`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotParseError {
    #[error("slot date {0:?} is not in D_M_YYYY form")]
    MalformedDate(String),

    #[error("slot date {0:?} is not a calendar date")]
    InvalidDate(String),

    #[error("slot time {0:?} is not in h:mm AM/PM form")]
    MalformedTime(String),

    #[error("slot time {0:?} is out of range")]
    InvalidTime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

pub fn parse_slot_date(raw: &str) -> Result<NaiveDate, SlotParseError> {
    let malformed = || SlotParseError::MalformedDate(raw.to_string());

    let parts: Vec<&str> = raw.trim().split('_').collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(malformed());
    };

    let day: u32 = day.trim().parse().map_err(|_| malformed())?;
    let month: u32 = month.trim().parse().map_err(|_| malformed())?;
    let year: i32 = year.trim().parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| SlotParseError::InvalidDate(raw.to_string()))
}

/// Parse `h:mm AM|PM`. A missing marker is read as a 24-hour clock, which is
/// how a handful of manually created slots are stored.
pub fn parse_slot_time(raw: &str) -> Result<NaiveTime, SlotParseError> {
    let malformed = || SlotParseError::MalformedTime(raw.to_string());
    let invalid = || SlotParseError::InvalidTime(raw.to_string());

    let mut tokens = raw.split_whitespace();
    let clock = tokens.next().ok_or_else(malformed)?;
    let meridiem = match tokens.next() {
        None => None,
        Some(marker) if marker.eq_ignore_ascii_case("AM") => Some(Meridiem::Am),
        Some(marker) if marker.eq_ignore_ascii_case("PM") => Some(Meridiem::Pm),
        Some(_) => return Err(malformed()),
    };
    if tokens.next().is_some() {
        return Err(malformed());
    }

    let (hour, minute) = clock.split_once(':').ok_or_else(malformed)?;
    let mut hour: u32 = hour.parse().map_err(|_| malformed())?;
    let minute: u32 = minute.parse().map_err(|_| malformed())?;

    match meridiem {
        Some(_) if hour > 12 => return Err(invalid()),
        Some(Meridiem::Pm) if hour < 12 => hour += 12,
        Some(Meridiem::Am) if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

pub fn parse_slot(slot_date: &str, slot_time: &str) -> Result<NaiveDateTime, SlotParseError> {
    let date = parse_slot_date(slot_date)?;
    let time = parse_slot_time(slot_time)?;
    Ok(date.and_time(time))
}
