//! Immutable weather records built from a feed.

use serde::Serialize;

pub mod astronomy;
pub mod atmosphere;
pub mod condition;
pub mod forecast;
pub mod location;
pub mod units;
pub mod wind;

pub use astronomy::Astronomy;
pub use atmosphere::{Atmosphere, PressureTrend};
pub use condition::Condition;
pub use forecast::Forecast;
pub use location::Location;
pub use units::Units;
pub use wind::Wind;

/// Everything one successful fetch produced.
///
/// A report is assembled completely before it is handed to the client, so a
/// caller never sees records from two different fetches mixed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: Location,
    pub units: Units,
    pub wind: Wind,
    pub atmosphere: Atmosphere,
    pub astronomy: Astronomy,
    pub condition: Condition,
    pub forecast: Vec<Forecast>,
    pub title: String,
    pub link: String,
}
