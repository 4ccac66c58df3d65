use serde::Serialize;

use crate::{
    error::RecordError,
    mapper::{Coercion, FieldSpec, Fields, Record},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wind {
    chill: f64,
    direction: f64,
    speed: f64,
}

impl Wind {
    pub fn new(chill: f64, direction: f64, speed: f64) -> Self {
        Self { chill, direction, speed }
    }

    /// Wind chill temperature.
    pub fn chill(&self) -> f64 {
        self.chill
    }

    /// Direction in degrees.
    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl Record for Wind {
    const SECTION: &'static str = "wind";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("chill", Coercion::Float),
        FieldSpec::required("direction", Coercion::Float),
        FieldSpec::required("speed", Coercion::Float),
    ];

    fn from_fields(fields: Fields) -> Result<Self, RecordError> {
        Ok(Self::new(fields.float("chill")?, fields.float("direction")?, fields.float("speed")?))
    }
}
