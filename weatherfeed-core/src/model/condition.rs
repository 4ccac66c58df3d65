use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    error::{RecordError, ValidationError},
    mapper::{Coercion, FieldSpec, Fields, Record},
};

/// Format of the observation date once the leading weekday and the trailing
/// zone abbreviation are cut off. Full feed value: "Fri, 07 Mar 2014 7:20 am CET".
pub const DATE_FORMAT: &str = "%d %b %Y %I:%M %p";

/// Current weather conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    text: String,
    code: i64,
    temperature: f64,
    date: NaiveDateTime,
    zone: String,
}

impl Condition {
    pub fn new(
        text: impl Into<String>,
        code: i64,
        temperature: f64,
        date: &str,
    ) -> Result<Self, ValidationError> {
        let (date, zone) = parse_date(date)?;
        Ok(Self { text: text.into(), code, temperature, date, zone })
    }

    /// Textual description, e.g. "Partly Cloudy".
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Condition code. Opaque, see the feed's condition code table.
    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Local observation time as printed in the feed.
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// Zone abbreviation that followed the date ("CET"), empty if none.
    pub fn zone(&self) -> &str {
        &self.zone
    }
}

fn parse_date(value: &str) -> Result<(NaiveDateTime, String), ValidationError> {
    let trimmed = value.trim();

    // The weekday is not checked against the date.
    let body = match trimmed.split_once(',') {
        Some((day, rest)) if day.chars().all(|c| c.is_ascii_alphabetic()) => rest.trim_start(),
        _ => trimmed,
    };

    let (stamp, zone) = match body.rsplit_once(' ') {
        Some((head, tail))
            if tail.chars().all(|c| c.is_ascii_alphabetic())
                && !tail.eq_ignore_ascii_case("am")
                && !tail.eq_ignore_ascii_case("pm") =>
        {
            (head, tail)
        }
        _ => (body, ""),
    };

    let date = NaiveDateTime::parse_from_str(&midnight_as_twelve(stamp), DATE_FORMAT).map_err(|e| {
        ValidationError::new("date", value, format!("expected 'Fri, 07 Mar 2014 7:20 am CET' ({e})"))
    })?;

    Ok((date, zone.to_string()))
}

/// The feed writes the hour after midnight as "0:17 am"; `%I` only takes 1 to 12.
fn midnight_as_twelve(stamp: &str) -> String {
    stamp
        .split(' ')
        .map(|token| match token.split_once(':') {
            Some((hour, minute)) if !hour.is_empty() && hour.chars().all(|c| c == '0') => {
                format!("12:{minute}")
            }
            _ => token.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Record for Condition {
    const SECTION: &'static str = "condition";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("text", Coercion::Text),
        FieldSpec::required("code", Coercion::Int),
        FieldSpec::required("temperature", Coercion::Float).from_key("temp"),
        FieldSpec::required("date", Coercion::Text),
    ];

    fn from_fields(fields: Fields) -> Result<Self, RecordError> {
        Ok(Self::new(
            fields.text("text")?,
            fields.int("code")?,
            fields.float("temperature")?,
            &fields.text("date")?,
        )?)
    }
}
