// MS-DOS date/time fields carried in directory entries

use chrono::{NaiveDate, NaiveDateTime};

/// Decode a date/time pair, `None` when the fields are blank or invalid.
/// Date: bits 15-9 year since 1980, 8-5 month, 4-0 day.
/// Time: bits 15-11 hours, 10-5 minutes, 4-0 seconds/2.
pub fn dos_datetime(date: u16, time: u16) -> Option<NaiveDateTime> {
    if date == 0 {
        return None;
    }

    let year = ((date >> 9) & 0x7F) as i32 + 1980;
    let month = ((date >> 5) & 0x0F) as u32;
    let day = (date & 0x1F) as u32;

    let hour = ((time >> 11) & 0x1F) as u32;
    let minute = ((time >> 5) & 0x3F) as u32;
    let second = ((time & 0x1F) * 2) as u32;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}
