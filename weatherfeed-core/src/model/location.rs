use serde::Serialize;

use crate::{
    error::RecordError,
    mapper::{Coercion, FieldSpec, Fields, Record},
};

/// Where the forecast applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    city: String,
    region: String,
    country: String,
}

impl Location {
    pub fn new(city: impl Into<String>, region: impl Into<String>, country: impl Into<String>) -> Self {
        Self { city: city.into(), region: region.into(), country: country.into() }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// State, territory or region. Often empty.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Country name or code, whatever the feed delivers.
    pub fn country(&self) -> &str {
        &self.country
    }
}

impl Record for Location {
    const SECTION: &'static str = "location";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("city", Coercion::Text),
        FieldSpec::optional("region", Coercion::Text),
        FieldSpec::optional("country", Coercion::Text),
    ];

    fn from_fields(fields: Fields) -> Result<Self, RecordError> {
        Ok(Self::new(fields.text("city")?, fields.text("region")?, fields.text("country")?))
    }
}
