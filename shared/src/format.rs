//! Display helpers for identifiers and phone numbers.
//!
//! Values are stored as bare digit strings; these helpers produce the
//! hyphenated forms shown to users and written to CSV exports.

use chrono::{Datelike, NaiveDate};

/// Country calling code prepended to 8-digit local numbers in WhatsApp links
pub const COUNTRY_CODE: &str = "506";

/// Strip every non-digit character
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `88887777` -> `8888-7777`; anything else is returned unchanged
pub fn format_phone(value: &str) -> String {
    let d = digits_only(value);
    if d.len() == 8 {
        format!("{}-{}", &d[..4], &d[4..])
    } else {
        value.to_string()
    }
}

/// `112340567` -> `1-1234-0567`, `12345678` -> `1234-5678`
pub fn format_cedula(value: &str) -> String {
    let d = digits_only(value);
    match d.len() {
        9 => format!("{}-{}-{}", &d[..1], &d[1..5], &d[5..]),
        8 => format!("{}-{}", &d[..4], &d[4..]),
        _ => value.to_string(),
    }
}

/// Build a wa.me link, or an empty string when the number has no usable shape
pub fn whatsapp_link(phone: &str) -> String {
    let d = digits_only(phone);
    match d.len() {
        8 => format!("https://wa.me/{}{}", COUNTRY_CODE, d),
        11..=13 => format!("https://wa.me/{}", d),
        _ => String::new(),
    }
}

/// Age in whole years on `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years.max(0) as u32
}
