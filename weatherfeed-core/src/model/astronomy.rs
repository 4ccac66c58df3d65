use chrono::NaiveTime;
use serde::Serialize;

use crate::{
    error::{RecordError, ValidationError},
    mapper::{Coercion, FieldSpec, Fields, Record},
};

/// Format of sunrise and sunset in the feed, e.g. "7:07 am".
pub const TIME_FORMAT: &str = "%I:%M %p";

const DISPLAY_FORMAT: &str = "%-I:%M %P";

/// Today's sunrise and sunset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Astronomy {
    sunrise: NaiveTime,
    sunset: NaiveTime,
}

impl Astronomy {
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self { sunrise, sunset }
    }

    /// Parse both times from the feed's "h:mm am/pm" notation.
    pub fn parse(sunrise: &str, sunset: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(parse_time("sunrise", sunrise)?, parse_time("sunset", sunset)?))
    }

    pub fn sunrise(&self) -> NaiveTime {
        self.sunrise
    }

    pub fn sunset(&self) -> NaiveTime {
        self.sunset
    }
}

/// Render a time of day the way the feed writes it ("6:17 pm").
pub fn format_time(time: NaiveTime) -> String {
    time.format(DISPLAY_FORMAT).to_string()
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|e| ValidationError::new(field, value, format!("expected 'h:mm am/pm' ({e})")))
}

impl Record for Astronomy {
    const SECTION: &'static str = "astronomy";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("sunrise", Coercion::Text),
        FieldSpec::required("sunset", Coercion::Text),
    ];

    fn from_fields(fields: Fields) -> Result<Self, RecordError> {
        Ok(Self::parse(&fields.text("sunrise")?, &fields.text("sunset")?)?)
    }
}
