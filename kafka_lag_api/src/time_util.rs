use chrono::{DateTime, TimeZone};
use std::fmt::Display;

pub const RESPONSE_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait ResponseDateTimeFormat {
    fn to_response_string(&self) -> String;
}

impl<Tz: TimeZone> ResponseDateTimeFormat for DateTime<Tz>
where
    Tz::Offset: Display,
{
    fn to_response_string(&self) -> String {
        self.format(RESPONSE_DATE_TIME_FORMAT).to_string()
    }
}
