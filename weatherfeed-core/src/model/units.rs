use serde::Serialize;

use crate::{
    error::RecordError,
    mapper::{Coercion, FieldSpec, Fields, Record},
};

/// Units the feed reports its values in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Units {
    temperature: String,
    distance: String,
    pressure: String,
    speed: String,
}

impl Units {
    /// The temperature unit is stored upper case ("c" becomes "C").
    pub fn new(
        temperature: &str,
        distance: impl Into<String>,
        pressure: impl Into<String>,
        speed: impl Into<String>,
    ) -> Self {
        Self {
            temperature: temperature.to_uppercase(),
            distance: distance.into(),
            pressure: pressure.into(),
            speed: speed.into(),
        }
    }

    pub fn temperature(&self) -> &str {
        &self.temperature
    }

    pub fn distance(&self) -> &str {
        &self.distance
    }

    pub fn pressure(&self) -> &str {
        &self.pressure
    }

    pub fn speed(&self) -> &str {
        &self.speed
    }
}

impl Record for Units {
    const SECTION: &'static str = "units";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("temperature", Coercion::Text),
        FieldSpec::required("distance", Coercion::Text),
        FieldSpec::required("pressure", Coercion::Text),
        FieldSpec::required("speed", Coercion::Text),
    ];

    fn from_fields(fields: Fields) -> Result<Self, RecordError> {
        Ok(Self::new(
            &fields.text("temperature")?,
            fields.text("distance")?,
            fields.text("pressure")?,
            fields.text("speed")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::MappingReason, mapper::map_section};
    use serde_json::json;

    #[test]
    fn temperature_is_uppercased() {
        let raw = json!({"distance": "km", "pressure": "mb", "speed": "km/h", "temperature": "c"});

        let units: Units = map_section(raw.as_object().unwrap()).unwrap();
        assert_eq!(units.temperature(), "C");
        assert_eq!(units.distance(), "km");
        assert_eq!(units.pressure(), "mb");
        assert_eq!(units.speed(), "km/h");
    }

    #[test]
    fn missing_speed_fails() {
        let raw = json!({"distance": "mi", "pressure": "in", "temperature": "f"});

        let err = map_section::<Units>(raw.as_object().unwrap()).unwrap_err();
        match err {
            RecordError::Mapping(err) => {
                assert_eq!(err.field, "speed");
                assert_eq!(err.reason, MappingReason::Missing);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
