//! Typed query arguments, one struct per endpoint.
//!
//! Each struct enumerates the optional parameters its endpoint accepts.
//! `ttl` overrides the connection's default cache lifetime for that call.

use crate::enums::{ExoplanetFormat, Rover, SpaceWeatherKind};
use crate::error::ValidationError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;

/// Days covered by the default space-weather window.
pub const SPACE_WEATHER_DEFAULT_DAYS: i64 = 30;

/// Maximum number of rover photos kept per query.
pub const ROVER_PHOTO_LIMIT: usize = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// DAILY IMAGE
// ============================================================================

/// Which picture of the day to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApodDate {
    Latest,
    /// `YYYY-MM-DD`, passed through unchecked.
    On(String),
}

impl ApodDate {
    /// `latest` (any case) selects the newest picture.
    pub fn parse(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("latest") {
            ApodDate::Latest
        } else {
            ApodDate::On(input.trim().to_string())
        }
    }

    pub fn as_param(&self) -> Option<&str> {
        match self {
            ApodDate::Latest => None,
            ApodDate::On(date) => Some(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApodQuery {
    pub date: ApodDate,
    /// Ask for a thumbnail URL when the picture is a video.
    pub thumbs: bool,
    pub ttl: Option<Duration>,
}

impl ApodQuery {
    pub fn new(date: &str) -> Self {
        Self {
            date: ApodDate::parse(date),
            thumbs: false,
            ttl: None,
        }
    }

    pub fn latest() -> Self {
        Self::new("latest")
    }

    pub fn with_thumbs(mut self, thumbs: bool) -> Self {
        self.thumbs = thumbs;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn cache_args(&self) -> Vec<String> {
        vec![
            self.date.as_param().unwrap_or("latest").to_string(),
            self.thumbs.to_string(),
        ]
    }
}

// ============================================================================
// ROVER PHOTOS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoverPhotosQuery {
    pub rover: Rover,
    pub sol: u32,
    /// Camera abbreviation such as `FHAZ` or `NAVCAM`.
    pub camera: Option<String>,
    pub page: Option<u32>,
    pub ttl: Option<Duration>,
}

impl RoverPhotosQuery {
    pub fn new(rover: Rover, sol: u32) -> Self {
        Self {
            rover,
            sol,
            camera: None,
            page: None,
            ttl: None,
        }
    }

    /// Build a query from a sol given as text.
    pub fn from_sol_str(rover: Rover, sol: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(rover, parse_sol(sol)?))
    }

    pub fn with_camera(mut self, camera: impl Into<String>) -> Self {
        self.camera = Some(camera.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn cache_args(&self) -> Vec<String> {
        vec![
            self.rover.as_api_str().to_string(),
            self.sol.to_string(),
            self.camera.clone().unwrap_or_default(),
            self.page.map(|p| p.to_string()).unwrap_or_default(),
        ]
    }
}

/// Parse a Martian sol: a non-negative integer.
pub fn parse_sol(raw: &str) -> Result<u32, ValidationError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidValue {
            field: "sol".to_string(),
            value: raw.to_string(),
            reason: "must be a non-negative integer".to_string(),
        })
}

// ============================================================================
// NEAR-EARTH OBJECTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeoFeedQuery {
    pub start_date: String,
    pub end_date: String,
    pub ttl: Option<Duration>,
}

impl NeoFeedQuery {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn cache_args(&self) -> Vec<String> {
        vec![self.start_date.clone(), self.end_date.clone()]
    }
}

// ============================================================================
// SPACE WEATHER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceWeatherQuery {
    pub kind: SpaceWeatherKind,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub ttl: Option<Duration>,
}

impl SpaceWeatherQuery {
    pub fn new(kind: SpaceWeatherKind) -> Self {
        Self {
            kind,
            start_date: None,
            end_date: None,
            ttl: None,
        }
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Fill in missing dates relative to `now`.
    ///
    /// End defaults to the current UTC date and start to
    /// [`SPACE_WEATHER_DEFAULT_DAYS`] before the current UTC date. Each
    /// default is independent of the other field. Explicit dates are sent as
    /// given and checked by the service.
    pub fn resolve_dates(&self, now: DateTime<Utc>) -> (String, String) {
        let today = now.date_naive();
        let end = self
            .end_date
            .clone()
            .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());
        let start = self.start_date.clone().unwrap_or_else(|| {
            (today - ChronoDuration::days(SPACE_WEATHER_DEFAULT_DAYS))
                .format(DATE_FORMAT)
                .to_string()
        });
        (start, end)
    }
}

// ============================================================================
// EXOPLANET ARCHIVE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExoplanetQuery {
    pub table: String,
    /// Filter clause, appended to the URL as written.
    pub where_clause: Option<String>,
    pub select: Option<String>,
    pub order: Option<String>,
    pub format: ExoplanetFormat,
    pub ttl: Option<Duration>,
}

impl ExoplanetQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: None,
            select: None,
            order: None,
            format: ExoplanetFormat::Csv,
            ttl: None,
        }
    }

    pub fn with_where(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_format(mut self, format: ExoplanetFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Reject arguments that cannot produce a table.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.format != ExoplanetFormat::Csv {
            return Err(ValidationError::UnsupportedFormat {
                format: self.format.as_api_str().to_string(),
            });
        }
        if self.table.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "table".to_string(),
                value: self.table.clone(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn cache_args(&self) -> Vec<String> {
        vec![
            self.table.clone(),
            self.where_clause.clone().unwrap_or_default(),
            self.select.clone().unwrap_or_default(),
            self.order.clone().unwrap_or_default(),
            self.format.as_api_str().to_string(),
        ]
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any u32 written as text parses back to the same sol.
        #[test]
        fn prop_parse_sol_accepts_integers(sol in any::<u32>()) {
            prop_assert_eq!(parse_sol(&sol.to_string()), Ok(sol));
        }

        /// Negative numbers are never valid sols.
        #[test]
        fn prop_parse_sol_rejects_negative(sol in 1i64..1_000_000) {
            prop_assert!(parse_sol(&(-sol).to_string()).is_err());
        }
    }
}
