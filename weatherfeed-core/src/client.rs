//! The feed client: configuration, fetching and the current report.

use std::{sync::Arc, time::Duration};

use reqwest::Url;
use tracing::{debug, info, warn};

use crate::{
    accessor::{FeedDocument, FeedShape},
    error::{ConfigError, Error, FetchCause, TransportError},
    mapper::{Record, map_section},
    model::{Astronomy, Atmosphere, Condition, Forecast, Location, Units, WeatherReport, Wind},
    query::{DEFAULT_JSON_ENDPOINT, DEFAULT_XML_ENDPOINT, LocationId, UnitSystem, build_url},
    transport::{HttpTransport, Transport},
};

/// Default time allowed for one transport call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the client needs to build a request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub location: Option<LocationId>,
    pub units: UnitSystem,
    pub shape: FeedShape,
    /// Overrides the shape's default endpoint.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            location: None,
            units: UnitSystem::default(),
            shape: FeedShape::default(),
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FeedConfig {
    /// The configured endpoint, or the default one for the shape.
    pub fn endpoint(&self) -> &str {
        match (&self.endpoint, self.shape) {
            (Some(endpoint), _) => endpoint.as_str(),
            (None, FeedShape::Json) => DEFAULT_JSON_ENDPOINT,
            (None, FeedShape::Xml) => DEFAULT_XML_ENDPOINT,
        }
    }

    /// Request URL for the current settings.
    pub fn request_url(&self) -> Result<Url, ConfigError> {
        let location = self.location.as_ref().ok_or(ConfigError::NoLocation)?;
        build_url(self.endpoint(), self.shape, location, self.units)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No location set yet.
    Unconfigured,
    /// Ready to fetch, nothing fetched yet.
    Configured,
    /// A fetch is in flight.
    Fetching,
    /// The last fetch succeeded.
    Ready,
    /// The last fetch failed. A report from an earlier fetch may still be held.
    Failed,
}

/// Fetches the feed and holds the records of the last successful fetch.
///
/// A fetch either replaces the whole report or leaves it untouched; there is
/// no partially updated state. Before the first successful fetch every record
/// accessor returns `None`.
#[derive(Debug)]
pub struct FeedClient {
    config: FeedConfig,
    transport: Arc<dyn Transport>,
    report: Option<Arc<WeatherReport>>,
    state: ClientState,
}

impl FeedClient {
    pub fn new(config: FeedConfig, transport: Arc<dyn Transport>) -> Self {
        let state = match config.location {
            Some(_) => ClientState::Configured,
            None => ClientState::Unconfigured,
        };
        Self { config, transport, report: None, state }
    }

    /// Client talking HTTP through reqwest.
    pub fn http(config: FeedConfig) -> Self {
        Self::new(config, Arc::new(HttpTransport::new()))
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn set_location(&mut self, location: impl Into<LocationId>) {
        self.config.location = Some(location.into());
        if self.state == ClientState::Unconfigured {
            self.state = ClientState::Configured;
        }
    }

    pub fn location_id(&self) -> Option<&LocationId> {
        self.config.location.as_ref()
    }

    /// Set the unit system from its token ("c" or "f").
    ///
    /// An unknown token is rejected here and the previous setting is kept.
    pub fn set_unit_system(&mut self, token: &str) -> Result<(), ConfigError> {
        self.config.units = UnitSystem::try_from(token)?;
        Ok(())
    }

    pub fn set_units(&mut self, units: UnitSystem) {
        self.config.units = units;
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.config.units
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.config.endpoint = Some(endpoint.into());
    }

    pub fn endpoint(&self) -> &str {
        self.config.endpoint()
    }

    pub fn set_shape(&mut self, shape: FeedShape) {
        self.config.shape = shape;
    }

    pub fn shape(&self) -> FeedShape {
        self.config.shape
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Fetch the feed and replace the current report.
    ///
    /// On error the previously held report, if any, stays in place.
    pub async fn fetch(&mut self) -> Result<Arc<WeatherReport>, Error> {
        let url = self.config.request_url()?;
        debug!(url = %url, shape = %self.config.shape, "fetching weather feed");

        let mut pending = PendingFetch::start(&mut self.state);
        match load(&self.config, self.transport.as_ref(), url.as_str()).await {
            Ok(report) => {
                let report = Arc::new(report);
                self.report = Some(Arc::clone(&report));
                pending.finish(ClientState::Ready);
                info!(
                    location = %report.location.city(),
                    forecast_days = report.forecast.len(),
                    "weather feed fetched"
                );
                Ok(report)
            }
            Err(cause) => {
                pending.finish(ClientState::Failed);
                warn!(url = %url, error = %cause, "weather feed fetch failed");
                Err(Error::fetch(url.as_str(), cause))
            }
        }
    }

    /// Shared handle on the current report.
    pub fn report(&self) -> Option<Arc<WeatherReport>> {
        self.report.clone()
    }

    pub fn location(&self) -> Option<&Location> {
        self.report.as_deref().map(|r| &r.location)
    }

    pub fn units(&self) -> Option<&Units> {
        self.report.as_deref().map(|r| &r.units)
    }

    pub fn wind(&self) -> Option<&Wind> {
        self.report.as_deref().map(|r| &r.wind)
    }

    pub fn atmosphere(&self) -> Option<&Atmosphere> {
        self.report.as_deref().map(|r| &r.atmosphere)
    }

    pub fn astronomy(&self) -> Option<&Astronomy> {
        self.report.as_deref().map(|r| &r.astronomy)
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.report.as_deref().map(|r| &r.condition)
    }

    pub fn forecast(&self) -> Option<&[Forecast]> {
        self.report.as_deref().map(|r| r.forecast.as_slice())
    }

    pub fn title(&self) -> Option<&str> {
        self.report.as_deref().map(|r| r.title.as_str())
    }

    pub fn link(&self) -> Option<&str> {
        self.report.as_deref().map(|r| r.link.as_str())
    }
}

/// Holds the client in `Fetching` while a fetch is in flight.
///
/// Dropped without [`PendingFetch::finish`], e.g. when the caller drops the
/// fetch future, it leaves the client `Failed`.
struct PendingFetch<'a> {
    state: &'a mut ClientState,
}

impl<'a> PendingFetch<'a> {
    fn start(state: &'a mut ClientState) -> Self {
        *state = ClientState::Fetching;
        Self { state }
    }

    fn finish(&mut self, outcome: ClientState) {
        *self.state = outcome;
    }
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        if *self.state == ClientState::Fetching {
            warn!("weather feed fetch cancelled");
            *self.state = ClientState::Failed;
        }
    }
}

async fn load(
    config: &FeedConfig,
    transport: &dyn Transport,
    url: &str,
) -> Result<WeatherReport, FetchCause> {
    let content = tokio::time::timeout(config.timeout, transport.fetch(url))
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))??;

    let document = FeedDocument::parse(config.shape, &content)?;
    build_report(&document)
}

/// Map every section of a parsed feed into a report.
pub fn build_report(document: &FeedDocument) -> Result<WeatherReport, FetchCause> {
    Ok(WeatherReport {
        location: record(document, &["location"])?,
        units: record(document, &["units"])?,
        wind: record(document, &["wind"])?,
        atmosphere: record(document, &["atmosphere"])?,
        astronomy: record(document, &["astronomy"])?,
        condition: record(document, &["item", "condition"])?,
        forecast: forecast(document)?,
        title: document.text(&["title"]).unwrap_or_default(),
        link: document.text(&["link"]).unwrap_or_default(),
    })
}

fn record<T: Record>(document: &FeedDocument, path: &[&str]) -> Result<T, FetchCause> {
    let raw = document.section(path)?;
    debug!(section = T::SECTION, "mapping feed section");
    Ok(map_section(raw)?)
}

fn forecast(document: &FeedDocument) -> Result<Vec<Forecast>, FetchCause> {
    document
        .items(&["item", "forecast"], &["day"])?
        .iter()
        .map(|raw| map_section::<Forecast>(raw).map_err(FetchCause::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{MappingReason, ParseError, PathReason},
        model::PressureTrend,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::{collections::VecDeque, sync::Mutex};

    const JSON_FEED: &str = include_str!("../fixtures/feed_cologne.json");
    const XML_FEED: &str = include_str!("../fixtures/feed_cologne.xml");

    #[derive(Debug)]
    enum Reply {
        Body(String),
        Status(u16),
        Hang,
    }

    /// Replays canned replies in order and records requested URLs.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Reply>>,
        requested: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies.into_iter().collect()), ..Self::default() })
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn fetch(&self, url: &str) -> Result<String, TransportError> {
            self.requested.lock().unwrap().push(url.to_string());
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Status(status)) => {
                    Err(TransportError::Status { status, body: String::new() })
                }
                Some(Reply::Hang) | None => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    fn client(replies: impl IntoIterator<Item = Reply>) -> (FeedClient, Arc<ScriptedTransport>) {
        let transport = ScriptedTransport::new(replies);
        let config = FeedConfig { location: Some("Cologne".into()), ..FeedConfig::default() };
        (FeedClient::new(config, transport.clone()), transport)
    }

    /// The JSON fixture with `edit` applied to its channel.
    fn edited_feed(edit: impl FnOnce(&mut Value)) -> String {
        let mut feed: Value = serde_json::from_str(JSON_FEED).unwrap();
        edit(&mut feed["query"]["results"]["channel"]);
        feed.to_string()
    }

    #[tokio::test]
    async fn fetches_cologne_json_feed() {
        let (mut client, transport) = client([Reply::Body(JSON_FEED.to_string())]);

        client.fetch().await.unwrap();

        assert_eq!(client.state(), ClientState::Ready);
        assert_eq!(client.location().unwrap().city(), "Cologne");
        assert_eq!(client.location().unwrap().country(), "Germany");
        assert_eq!(client.units().unwrap().temperature(), "C");
        assert_eq!(client.wind().unwrap().speed(), 11.27);
        assert_eq!(client.atmosphere().unwrap().rising(), PressureTrend::Steady);
        assert_eq!(client.condition().unwrap().text(), "Fair");
        assert_eq!(client.condition().unwrap().temperature(), 9.0);
        assert_eq!(client.title(), Some("Yahoo! Weather - Cologne, NW, DE"));
        assert!(client.link().unwrap().starts_with("http://us.rd.yahoo.com/"));

        let forecast = client.forecast().unwrap();
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[0].high(), 16.0);
        assert_eq!(forecast[0].date(), NaiveDate::from_ymd_opt(2014, 3, 14).unwrap());
        assert_eq!(forecast[1].text(), "Cloudy");

        let requested = transport.requested();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].starts_with(DEFAULT_JSON_ENDPOINT));
        assert!(requested[0].contains("format=json"));
    }

    #[tokio::test]
    async fn fetches_xml_feed() {
        let transport = ScriptedTransport::new([Reply::Body(XML_FEED.to_string())]);
        let config = FeedConfig {
            location: Some(LocationId::Id(667931)),
            units: UnitSystem::Us,
            shape: FeedShape::Xml,
            ..FeedConfig::default()
        };
        let mut client = FeedClient::new(config, transport.clone());

        let report = client.fetch().await.unwrap();

        assert_eq!(report.location.country(), "DE");
        assert_eq!(report.units.temperature(), "F");
        assert_eq!(report.atmosphere.rising(), PressureTrend::Rising);
        assert_eq!(report.condition.code(), 33);
        assert_eq!(report.forecast.len(), 2);
        assert_eq!(report.forecast[1].low(), 39.0);
        assert_eq!(report.title, "Yahoo! Weather - Cologne, DE");
        assert_eq!(
            transport.requested(),
            vec!["http://weather.yahooapis.com/forecastrss?w=667931&u=f".to_string()]
        );
    }

    #[tokio::test]
    async fn accessors_are_empty_before_first_fetch() {
        let (client, _) = client([]);

        assert_eq!(client.state(), ClientState::Configured);
        assert!(client.location().is_none());
        assert!(client.units().is_none());
        assert!(client.wind().is_none());
        assert!(client.atmosphere().is_none());
        assert!(client.astronomy().is_none());
        assert!(client.condition().is_none());
        assert!(client.forecast().is_none());
        assert!(client.title().is_none());
        assert!(client.report().is_none());
    }

    #[tokio::test]
    async fn fetch_without_location_fails_without_transition() {
        let transport = ScriptedTransport::new([]);
        let mut client = FeedClient::new(FeedConfig::default(), transport.clone());

        let err = client.fetch().await.unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::NoLocation)));
        assert_eq!(client.state(), ClientState::Unconfigured);
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn invalid_unit_token_is_rejected_before_fetch() {
        let (mut client, transport) = client([]);

        let err = client.set_unit_system("k").unwrap_err();

        assert_eq!(err, ConfigError::InvalidUnitSystem("k".to_string()));
        assert_eq!(client.unit_system(), UnitSystem::International);
        assert!(transport.requested().is_empty());

        client.set_unit_system("f").unwrap();
        assert_eq!(client.unit_system(), UnitSystem::Us);
    }

    #[tokio::test]
    async fn missing_field_fails_and_keeps_previous_report() {
        let broken = edited_feed(|channel| {
            channel["wind"].as_object_mut().unwrap().remove("speed");
            channel["location"]["city"] = Value::from("Bonn");
        });
        let (mut client, _) = client([Reply::Body(JSON_FEED.to_string()), Reply::Body(broken)]);

        let first = client.fetch().await.unwrap();
        let err = client.fetch().await.unwrap_err();

        let mapping = err.mapping_error().expect("mapping error");
        assert_eq!(mapping.section, "wind");
        assert_eq!(mapping.field, "speed");
        assert_eq!(mapping.reason, MappingReason::Missing);

        assert_eq!(client.state(), ClientState::Failed);
        assert_eq!(client.location().unwrap().city(), "Cologne");
        assert!(Arc::ptr_eq(&first, &client.report().unwrap()));
    }

    #[tokio::test]
    async fn missing_forecast_is_a_path_error() {
        let broken = edited_feed(|channel| {
            channel["item"].as_object_mut().unwrap().remove("forecast");
        });
        let (mut client, _) = client([Reply::Body(broken)]);

        let err = client.fetch().await.unwrap_err();

        let path = err.path_error().expect("path error");
        assert_eq!(path.path, "item.forecast");
        assert_eq!(path.reason, PathReason::KeyMissing);
        assert!(client.location().is_none());
    }

    #[tokio::test]
    async fn missing_item_is_a_subpath_error() {
        let broken = edited_feed(|channel| {
            channel.as_object_mut().unwrap().remove("item");
        });
        let (mut client, _) = client([Reply::Body(broken)]);

        let err = client.fetch().await.unwrap_err();

        let path = err.path_error().expect("path error");
        assert_eq!(path.path, "item.condition");
        assert_eq!(path.reason, PathReason::SubpathMissing);
    }

    #[tokio::test]
    async fn bad_forecast_date_is_a_validation_error() {
        let broken = edited_feed(|channel| {
            channel["item"]["forecast"][1]["date"] = Value::from("tomorrow");
        });
        let (mut client, _) = client([Reply::Body(broken)]);

        let err = client.fetch().await.unwrap_err();

        let validation = err.validation_error().expect("validation error");
        assert_eq!(validation.field, "date");
        assert_eq!(validation.value, "tomorrow");
        assert!(client.forecast().is_none());
    }

    #[tokio::test]
    async fn transport_and_parse_failures_are_fetch_errors() {
        let (mut client, _) =
            client([Reply::Status(404), Reply::Body("{\"query\": {\"count\": 0}}".to_string())]);

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(
            err.cause(),
            Some(FetchCause::Transport(TransportError::Status { status: 404, .. }))
        ));
        match &err {
            Error::Fetch { endpoint, .. } => assert!(endpoint.starts_with(DEFAULT_JSON_ENDPOINT)),
            other => panic!("unexpected error: {other}"),
        }

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err.cause(), Some(FetchCause::Parse(ParseError::MissingRoot(_)))));
        assert_eq!(client.state(), ClientState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_transport_times_out() {
        let (mut client, _) = client([Reply::Hang]);
        client.set_timeout(Duration::from_secs(2));

        let err = client.fetch().await.unwrap_err();

        assert!(matches!(
            err.cause(),
            Some(FetchCause::Transport(TransportError::Timeout(t))) if *t == Duration::from_secs(2)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_fetch_leaves_client_failed() {
        let (mut client, _) = client([Reply::Hang]);

        let outcome = tokio::time::timeout(Duration::from_millis(10), client.fetch()).await;

        assert!(outcome.is_err());
        assert_eq!(client.state(), ClientState::Failed);
        assert!(client.report().is_none());
    }

    #[tokio::test]
    async fn dropped_fetch_keeps_previous_report() {
        let (mut client, _) = client([Reply::Body(JSON_FEED.to_string()), Reply::Hang]);
        let first = client.fetch().await.unwrap();

        let outcome = tokio::time::timeout(Duration::from_millis(10), client.fetch()).await;

        assert!(outcome.is_err());
        assert_eq!(client.state(), ClientState::Failed);
        assert!(Arc::ptr_eq(&first, &client.report().unwrap()));
    }

    #[tokio::test]
    async fn key_order_does_not_change_records() {
        let reversed = edited_feed(|channel| {
            for section in ["location", "units", "wind", "atmosphere", "astronomy"] {
                let map = channel[section].as_object().unwrap().clone();
                let reversed: serde_json::Map<String, Value> = map.into_iter().rev().collect();
                channel[section] = Value::Object(reversed);
            }
        });
        let (mut client, _) =
            client([Reply::Body(JSON_FEED.to_string()), Reply::Body(reversed)]);

        let first = client.fetch().await.unwrap();
        let second = client.fetch().await.unwrap();

        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn setters_do_not_fetch() {
        let (mut client, transport) = client([]);

        client.set_location(667931_u64);
        client.set_endpoint("http://localhost:8080/feed");
        client.set_shape(FeedShape::Xml);
        client.set_units(UnitSystem::Us);

        assert!(transport.requested().is_empty());
        assert_eq!(client.location_id(), Some(&LocationId::Id(667931)));
        assert_eq!(client.endpoint(), "http://localhost:8080/feed");
        assert_eq!(
            client.config().request_url().unwrap().as_str(),
            "http://localhost:8080/feed?w=667931&u=f"
        );
    }
}
