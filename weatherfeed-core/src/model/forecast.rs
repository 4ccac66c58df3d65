use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    error::{RecordError, ValidationError},
    mapper::{Coercion, FieldSpec, Fields, Record},
};

/// Format of a forecast day, e.g. "14 Mar 2014".
pub const DATE_FORMAT: &str = "%d %b %Y";

/// Forecast for a single day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    date: NaiveDate,
    low: f64,
    high: f64,
    text: String,
    code: i64,
}

impl Forecast {
    pub fn new(
        date: &str,
        low: f64,
        high: f64,
        text: impl Into<String>,
        code: i64,
    ) -> Result<Self, ValidationError> {
        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|e| {
            ValidationError::new("date", date, format!("expected 'dd Mon yyyy' ({e})"))
        })?;

        Ok(Self { date, low, high, text: text.into(), code })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn code(&self) -> i64 {
        self.code
    }
}

impl Record for Forecast {
    const SECTION: &'static str = "forecast";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("date", Coercion::Text),
        FieldSpec::required("low", Coercion::Float),
        FieldSpec::required("high", Coercion::Float),
        FieldSpec::required("text", Coercion::Text),
        FieldSpec::required("code", Coercion::Int),
    ];

    fn from_fields(fields: Fields) -> Result<Self, RecordError> {
        Ok(Self::new(
            &fields.text("date")?,
            fields.float("low")?,
            fields.float("high")?,
            fields.text("text")?,
            fields.int("code")?,
        )?)
    }
}
