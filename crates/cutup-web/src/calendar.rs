#![forbid(unsafe_code)]

//! Local calendar date for download file names.

use time::{Date, Month};

/// Build a date from JS `Date` parts (`getMonth()` is zero-based).
pub fn date_from_js_parts(year: u32, month_index: u32, day: u32) -> Option<Date> {
    let year = i32::try_from(year).ok()?;
    let month = u8::try_from(month_index.checked_add(1)?).ok()?;
    let month = Month::try_from(month).ok()?;
    let day = u8::try_from(day).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Today in the browser's local time zone.
#[cfg(target_arch = "wasm32")]
pub fn today() -> Date {
    let now = js_sys::Date::new_0();
    date_from_js_parts(now.get_full_year(), now.get_month(), now.get_date()).unwrap_or_else(|| {
        tracing::error!("local date out of range, using epoch");
        time::OffsetDateTime::UNIX_EPOCH.date()
    })
}
