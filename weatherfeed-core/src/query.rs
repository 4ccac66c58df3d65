//! Building the outbound feed URL.

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{accessor::FeedShape, error::ConfigError};

/// Default endpoint of the JSON (YQL) feed.
pub const DEFAULT_JSON_ENDPOINT: &str = "https://query.yahooapis.com/v1/public/yql";

/// Default endpoint of the XML (RSS) feed.
pub const DEFAULT_XML_ENDPOINT: &str = "http://weather.yahooapis.com/forecastrss";

/// System of units the feed should report in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// Celsius, kilometers, millibars, km/h.
    #[default]
    #[serde(rename = "c")]
    International,
    /// Fahrenheit, miles, pounds per square inch, mph.
    #[serde(rename = "f")]
    Us,
}

impl UnitSystem {
    /// Token sent to the feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::International => "c",
            UnitSystem::Us => "f",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::International, UnitSystem::Us]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "c" => Ok(UnitSystem::International),
            "f" => Ok(UnitSystem::Us),
            _ => Err(ConfigError::InvalidUnitSystem(value.to_string())),
        }
    }
}

/// What to ask the feed about: a place name or a numeric location id (WOEID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationId {
    Id(u64),
    Name(String),
}

impl LocationId {
    /// All-digit input is taken as a numeric id, anything else as a name.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<u64>() {
            Ok(id) => LocationId::Id(id),
            Err(_) => LocationId::Name(trimmed.to_string()),
        }
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationId::Id(id) => write!(f, "{id}"),
            LocationId::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for LocationId {
    fn from(id: u64) -> Self {
        LocationId::Id(id)
    }
}

impl From<&str> for LocationId {
    fn from(name: &str) -> Self {
        LocationId::Name(name.to_string())
    }
}

impl From<String> for LocationId {
    fn from(name: String) -> Self {
        LocationId::Name(name)
    }
}

/// The YQL statement selecting the forecast for `location`.
pub fn yql_statement(location: &LocationId, units: UnitSystem) -> String {
    match location {
        LocationId::Name(name) => format!(
            "select * from weather.forecast where woeid in \
             (select woeid from geo.places(1) where text=\"{}\") and u=\"{}\"",
            name.replace('"', "\\\""),
            units
        ),
        LocationId::Id(id) => {
            format!("select * from weather.forecast where woeid={id} and u=\"{units}\"")
        }
    }
}

/// Query parameters for the given feed shape.
pub fn query_params(
    shape: FeedShape,
    location: &LocationId,
    units: UnitSystem,
) -> Result<Vec<(&'static str, String)>, ConfigError> {
    match shape {
        FeedShape::Json => Ok(vec![
            ("q", yql_statement(location, units)),
            ("format", "json".to_string()),
        ]),
        FeedShape::Xml => match location {
            LocationId::Id(id) => Ok(vec![("w", id.to_string()), ("u", units.to_string())]),
            LocationId::Name(name) => Err(ConfigError::LocationNotNumeric(name.clone())),
        },
    }
}

/// Full request URL: `endpoint` plus the shape's query parameters.
///
/// Parameters already present on the endpoint are kept.
pub fn build_url(
    endpoint: &str,
    shape: FeedShape,
    location: &LocationId,
    units: UnitSystem,
) -> Result<Url, ConfigError> {
    let params = query_params(shape, location, units)?;
    Url::parse_with_params(endpoint, params).map_err(|e| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_system_as_str_roundtrip() {
        for units in UnitSystem::all() {
            let parsed = UnitSystem::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unknown_unit_system_error() {
        for token in ["z", "", "C", "metric"] {
            let err = UnitSystem::try_from(token).unwrap_err();
            assert_eq!(err, ConfigError::InvalidUnitSystem(token.to_string()));
        }
    }

    #[test]
    fn location_id_parse() {
        assert_eq!(LocationId::parse("667931"), LocationId::Id(667931));
        assert_eq!(LocationId::parse(" Cologne "), LocationId::Name("Cologne".into()));
    }

    #[test]
    fn json_url_carries_yql_statement() {
        let url = build_url(
            DEFAULT_JSON_ENDPOINT,
            FeedShape::Json,
            &LocationId::from("Cologne"),
            UnitSystem::International,
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "q".to_string(),
                    "select * from weather.forecast where woeid in (select woeid from \
                     geo.places(1) where text=\"Cologne\") and u=\"c\""
                        .to_string()
                ),
                ("format".to_string(), "json".to_string()),
            ]
        );
        assert!(url.as_str().starts_with(DEFAULT_JSON_ENDPOINT));
    }

    #[test]
    fn json_url_with_numeric_id() {
        let statement = yql_statement(&LocationId::Id(667931), UnitSystem::Us);
        assert_eq!(statement, "select * from weather.forecast where woeid=667931 and u=\"f\"");
    }

    #[test]
    fn xml_url_uses_w_and_u() {
        let url = build_url(
            DEFAULT_XML_ENDPOINT,
            FeedShape::Xml,
            &LocationId::Id(667931),
            UnitSystem::Us,
        )
        .unwrap();

        assert_eq!(url.as_str(), "http://weather.yahooapis.com/forecastrss?w=667931&u=f");
    }

    #[test]
    fn xml_url_rejects_place_names() {
        let err = build_url(
            DEFAULT_XML_ENDPOINT,
            FeedShape::Xml,
            &LocationId::from("Cologne"),
            UnitSystem::International,
        )
        .unwrap_err();

        assert_eq!(err, ConfigError::LocationNotNumeric("Cologne".to_string()));
    }

    #[test]
    fn invalid_endpoint_is_a_config_error() {
        let err = build_url(
            "not a url",
            FeedShape::Json,
            &LocationId::from("Cologne"),
            UnitSystem::International,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }
}
