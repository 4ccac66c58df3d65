use serde::Serialize;

use crate::{
    error::{RecordError, ValidationError},
    mapper::{Coercion, FieldSpec, Fields, Record},
};

/// State of the barometric pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureTrend {
    Steady,
    Rising,
    Falling,
}

impl PressureTrend {
    /// The feed's numeric code: 0 steady, 1 rising, 2 falling.
    pub fn code(&self) -> u8 {
        match self {
            PressureTrend::Steady => 0,
            PressureTrend::Rising => 1,
            PressureTrend::Falling => 2,
        }
    }
}

impl TryFrom<i64> for PressureTrend {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PressureTrend::Steady),
            1 => Ok(PressureTrend::Rising),
            2 => Ok(PressureTrend::Falling),
            _ => Err(ValidationError::new(
                "rising",
                value,
                "expected 0 (steady), 1 (rising) or 2 (falling)",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atmosphere {
    humidity: f64,
    visibility: f64,
    pressure: f64,
    rising: PressureTrend,
}

impl Atmosphere {
    pub fn new(
        humidity: f64,
        visibility: f64,
        pressure: f64,
        rising: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self { humidity, visibility, pressure, rising: PressureTrend::try_from(rising)? })
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    pub fn visibility(&self) -> f64 {
        self.visibility
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn rising(&self) -> PressureTrend {
        self.rising
    }
}

impl Record for Atmosphere {
    const SECTION: &'static str = "atmosphere";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("humidity", Coercion::Float),
        FieldSpec::required("visibility", Coercion::Float),
        FieldSpec::required("pressure", Coercion::Float),
        FieldSpec::required("rising", Coercion::Int),
    ];

    fn from_fields(fields: Fields) -> Result<Self, RecordError> {
        Ok(Self::new(
            fields.float("humidity")?,
            fields.float("visibility")?,
            fields.float("pressure")?,
            fields.int("rising")?,
        )?)
    }
}
