//! Connection facade over the session, cache, and endpoint parsers.

use crate::cache::{CacheKey, CacheStats, ResponseCache};
use crate::endpoints::{apod, donki, exoplanet, neo, rover};
use crate::http::ReqwestTransport;
use crate::session::Session;
use secrecy::{ExposeSecret, SecretString};
use skyfeed_core::{
    ApodQuery, ClientConfig, Clock, Endpoint, ExoplanetQuery, HttpRequest, NeoFeedQuery,
    QueryOutput, ResponseError, RoverPhotosQuery, SkyfeedError, SkyfeedResult, SpaceWeatherQuery,
    SystemClock, Table, Transport,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Long-lived handle for querying the NASA open data APIs.
///
/// Each endpoint has two methods: `try_*` returns the typed error, the plain
/// variant logs the failure and returns `None`.
pub struct SkyfeedConnection {
    api_key: SecretString,
    exoplanet_url: String,
    default_ttl: Duration,
    session: Session,
    cache: ResponseCache<QueryOutput>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SkyfeedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkyfeedConnection")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.session.base_url())
            .field("exoplanet_url", &self.exoplanet_url)
            .field("default_ttl", &self.default_ttl)
            .field("cache", &self.cache)
            .finish()
    }
}

impl SkyfeedConnection {
    /// Validate `config` and connect over HTTP.
    pub fn connect(config: ClientConfig) -> SkyfeedResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.request_timeout())?;
        info!(
            base_url = %config.base_url,
            max_attempts = config.retry.max_attempts,
            cache_ttl_secs = config.cache_ttl_secs,
            "Connected"
        );
        Ok(Self::with_parts(
            config,
            Arc::new(transport),
            Arc::new(SystemClock),
        ))
    }

    /// Assemble a connection from an explicit transport and clock.
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let default_ttl = config.cache_ttl();
        let ClientConfig {
            api_key,
            base_url,
            exoplanet_url,
            retry,
            ..
        } = config;

        Self {
            api_key,
            exoplanet_url,
            default_ttl,
            session: Session::connect(base_url, retry, transport),
            cache: ResponseCache::new(clock.clone()),
            clock,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache(&self) -> &ResponseCache<QueryOutput> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // ========================================================================
    // DAILY IMAGE
    // ========================================================================

    pub async fn try_apod(&self, query: &ApodQuery) -> SkyfeedResult<Table> {
        let key = CacheKey::new(Endpoint::Apod, query.cache_args());
        let output = self
            .cached(key, query.ttl, || async {
                let url = self.session.url(Endpoint::Apod.path());
                let request = apod::request(url, self.api_key.expose_secret(), query);
                let body = self.fetch(&request).await?;
                Ok::<_, SkyfeedError>(QueryOutput::Table(apod::parse(&body)?))
            })
            .await?;
        expect_table(output)
    }

    pub async fn apod(&self, query: &ApodQuery) -> Option<Table> {
        collapse(Endpoint::Apod, self.try_apod(query).await)
    }

    // ========================================================================
    // ROVER PHOTOS
    // ========================================================================

    pub async fn try_rover_photos(&self, query: &RoverPhotosQuery) -> SkyfeedResult<Table> {
        let key = CacheKey::new(Endpoint::RoverPhotos, query.cache_args());
        let output = self
            .cached(key, query.ttl, || async {
                let url = self.session.url(&rover::path(query));
                let request = rover::request(url, self.api_key.expose_secret(), query);
                let body = self.fetch(&request).await?;
                Ok::<_, SkyfeedError>(QueryOutput::Table(rover::parse(&body)?))
            })
            .await?;
        expect_table(output)
    }

    pub async fn rover_photos(&self, query: &RoverPhotosQuery) -> Option<Table> {
        collapse(Endpoint::RoverPhotos, self.try_rover_photos(query).await)
    }

    // ========================================================================
    // NEAR-EARTH OBJECTS
    // ========================================================================

    pub async fn try_neo_feed(&self, query: &NeoFeedQuery) -> SkyfeedResult<Table> {
        let key = CacheKey::new(Endpoint::NeoFeed, query.cache_args());
        let output = self
            .cached(key, query.ttl, || async {
                let url = self.session.url(Endpoint::NeoFeed.path());
                let request = neo::request(url, self.api_key.expose_secret(), query);
                let body = self.fetch(&request).await?;
                Ok::<_, SkyfeedError>(QueryOutput::Table(neo::parse(&body)?))
            })
            .await?;
        expect_table(output)
    }

    pub async fn neo_feed(&self, query: &NeoFeedQuery) -> Option<Table> {
        collapse(Endpoint::NeoFeed, self.try_neo_feed(query).await)
    }

    // ========================================================================
    // SPACE WEATHER
    // ========================================================================

    pub async fn try_space_weather(&self, query: &SpaceWeatherQuery) -> SkyfeedResult<QueryOutput> {
        let (start_date, end_date) = query.resolve_dates(self.clock.now());
        let key = CacheKey::new(
            Endpoint::SpaceWeather,
            vec![
                query.kind.as_api_str().to_string(),
                start_date.clone(),
                end_date.clone(),
            ],
        );
        self.cached(key, query.ttl, || async {
            let url = self.session.url(&donki::path(query));
            let request = donki::request(url, self.api_key.expose_secret(), &start_date, &end_date);
            let body = self.fetch(&request).await?;
            Ok::<_, SkyfeedError>(donki::parse(&body)?)
        })
        .await
    }

    pub async fn space_weather(&self, query: &SpaceWeatherQuery) -> Option<QueryOutput> {
        collapse(Endpoint::SpaceWeather, self.try_space_weather(query).await)
    }

    // ========================================================================
    // EXOPLANET ARCHIVE
    // ========================================================================

    pub async fn try_exoplanet(&self, query: &ExoplanetQuery) -> SkyfeedResult<Table> {
        query.validate()?;
        let key = CacheKey::new(Endpoint::Exoplanet, query.cache_args());
        let output = self
            .cached(key, query.ttl, || async {
                let api_key = Some(self.api_key.expose_secret()).filter(|k| !k.is_empty());
                let request = exoplanet::request(&self.exoplanet_url, api_key, query);
                let body = self.fetch(&request).await?;
                Ok::<_, SkyfeedError>(QueryOutput::Table(exoplanet::parse(&body)?))
            })
            .await?;
        expect_table(output)
    }

    pub async fn exoplanet(&self, query: &ExoplanetQuery) -> Option<Table> {
        collapse(Endpoint::Exoplanet, self.try_exoplanet(query).await)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    async fn cached<F, Fut>(
        &self,
        key: CacheKey,
        ttl: Option<Duration>,
        compute: F,
    ) -> SkyfeedResult<QueryOutput>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SkyfeedResult<QueryOutput>>,
    {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let endpoint = key.endpoint;
        let read = self.cache.get_or_compute(key, ttl, compute).await?;
        if read.was_cache_hit() {
            debug!(
                endpoint = %endpoint,
                cached_at = %read.cached_at(),
                age_secs = read.age_at(self.clock.now()).as_secs(),
                ttl_secs = ttl.as_secs(),
                "Serving cached response"
            );
        }
        Ok(read.into_value())
    }

    async fn fetch(&self, request: &HttpRequest) -> SkyfeedResult<String> {
        let response = self.session.get(request).await?;
        Ok(response.body)
    }
}

fn expect_table(output: QueryOutput) -> SkyfeedResult<Table> {
    output.into_table().ok_or_else(|| {
        SkyfeedError::from(ResponseError::NotTabular {
            reason: "cached output is not a table".to_string(),
        })
    })
}

/// Log a failed query and turn it into the "no result" signal.
fn collapse<T>(endpoint: Endpoint, result: SkyfeedResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(endpoint = %endpoint, kind = ?e.kind(), error = %e, "Query failed");
            None
        }
    }
}
