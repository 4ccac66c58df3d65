//! Core library of the `weatherfeed` tool.
//!
//! This crate defines:
//! - Typed weather records (location, units, wind, atmosphere, astronomy,
//!   current condition, daily forecast)
//! - Name-bound mapping of raw feed sections into those records
//! - Parsing of JSON and XML feeds and lookup of their sections
//! - The feed client that builds the request, fetches and swaps in a report
//!
//! The transport is pluggable through [`Transport`]; [`HttpTransport`] is the
//! reqwest based default.

pub mod accessor;
pub mod client;
pub mod config;
pub mod error;
pub mod mapper;
pub mod model;
pub mod query;
pub mod transport;

pub use accessor::{FeedDocument, FeedShape};
pub use client::{ClientState, FeedClient, FeedConfig};
pub use config::Config;
pub use error::{
    ConfigError, Error, FetchCause, MappingError, ParseError, PathError, TransportError,
    ValidationError,
};
pub use model::{
    Astronomy, Atmosphere, Condition, Forecast, Location, PressureTrend, Units, WeatherReport,
    Wind,
};
pub use query::{LocationId, UnitSystem};
pub use transport::{HttpTransport, Transport};
