//! Enum types for SKYFEED endpoints and their parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ROVERS
// ============================================================================

/// Mars rovers served by the rover-photos endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rover {
    Curiosity,
    Opportunity,
    Spirit,
}

impl Rover {
    pub const ALL: [Rover; 3] = [Rover::Curiosity, Rover::Opportunity, Rover::Spirit];

    /// Path segment used in the rover-photos URL.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Rover::Curiosity => "Curiosity",
            Rover::Opportunity => "Opportunity",
            Rover::Spirit => "Spirit",
        }
    }

    pub fn from_api_str(s: &str) -> Result<Self, RoverParseError> {
        match s.to_lowercase().as_str() {
            "curiosity" => Ok(Rover::Curiosity),
            "opportunity" => Ok(Rover::Opportunity),
            "spirit" => Ok(Rover::Spirit),
            _ => Err(RoverParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Rover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_api_str())
    }
}

impl FromStr for Rover {
    type Err = RoverParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_api_str(s)
    }
}

/// Error when parsing an invalid rover name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoverParseError(pub String);

impl fmt::Display for RoverParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid rover: {}", self.0)
    }
}

impl std::error::Error for RoverParseError {}

// ============================================================================
// SPACE WEATHER
// ============================================================================

/// DONKI event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceWeatherKind {
    /// Coronal mass ejection
    Cme,
    /// Geomagnetic storm
    Gst,
    /// Solar flare
    Flr,
    /// Solar energetic particle
    Sep,
    /// Magnetopause crossing
    Mpc,
    /// Radiation belt enhancement
    Rbe,
    /// High speed stream
    Hss,
    Notifications,
}

impl SpaceWeatherKind {
    pub const ALL: [SpaceWeatherKind; 8] = [
        SpaceWeatherKind::Cme,
        SpaceWeatherKind::Gst,
        SpaceWeatherKind::Flr,
        SpaceWeatherKind::Sep,
        SpaceWeatherKind::Mpc,
        SpaceWeatherKind::Rbe,
        SpaceWeatherKind::Hss,
        SpaceWeatherKind::Notifications,
    ];

    /// Path segment used in the DONKI URL.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            SpaceWeatherKind::Cme => "CME",
            SpaceWeatherKind::Gst => "GST",
            SpaceWeatherKind::Flr => "FLR",
            SpaceWeatherKind::Sep => "SEP",
            SpaceWeatherKind::Mpc => "MPC",
            SpaceWeatherKind::Rbe => "RBE",
            SpaceWeatherKind::Hss => "HSS",
            SpaceWeatherKind::Notifications => "notifications",
        }
    }

    pub fn from_api_str(s: &str) -> Result<Self, SpaceWeatherKindParseError> {
        match s.to_lowercase().as_str() {
            "cme" => Ok(SpaceWeatherKind::Cme),
            "gst" => Ok(SpaceWeatherKind::Gst),
            "flr" => Ok(SpaceWeatherKind::Flr),
            "sep" => Ok(SpaceWeatherKind::Sep),
            "mpc" => Ok(SpaceWeatherKind::Mpc),
            "rbe" => Ok(SpaceWeatherKind::Rbe),
            "hss" => Ok(SpaceWeatherKind::Hss),
            "notifications" => Ok(SpaceWeatherKind::Notifications),
            _ => Err(SpaceWeatherKindParseError(s.to_string())),
        }
    }
}

impl fmt::Display for SpaceWeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_api_str())
    }
}

impl FromStr for SpaceWeatherKind {
    type Err = SpaceWeatherKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_api_str(s)
    }
}

/// Error when parsing an invalid space-weather event kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceWeatherKindParseError(pub String);

impl fmt::Display for SpaceWeatherKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid space weather kind: {}", self.0)
    }
}

impl std::error::Error for SpaceWeatherKindParseError {}

// ============================================================================
// EXOPLANET FORMAT
// ============================================================================

/// Output formats accepted by the exoplanet archive.
///
/// Only `Csv` can be parsed into a table; the others are rejected before a
/// request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExoplanetFormat {
    #[default]
    Csv,
    Ipac,
    Json,
    Votable,
}

impl ExoplanetFormat {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ExoplanetFormat::Csv => "csv",
            ExoplanetFormat::Ipac => "ipac",
            ExoplanetFormat::Json => "json",
            ExoplanetFormat::Votable => "votable",
        }
    }

    pub fn from_api_str(s: &str) -> Result<Self, ExoplanetFormatParseError> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExoplanetFormat::Csv),
            "ipac" => Ok(ExoplanetFormat::Ipac),
            "json" => Ok(ExoplanetFormat::Json),
            "votable" => Ok(ExoplanetFormat::Votable),
            _ => Err(ExoplanetFormatParseError(s.to_string())),
        }
    }
}

impl fmt::Display for ExoplanetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_api_str())
    }
}

impl FromStr for ExoplanetFormat {
    type Err = ExoplanetFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_api_str(s)
    }
}

/// Error when parsing an invalid exoplanet output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExoplanetFormatParseError(pub String);

impl fmt::Display for ExoplanetFormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid exoplanet format: {}", self.0)
    }
}

impl std::error::Error for ExoplanetFormatParseError {}

// ============================================================================
// ENDPOINTS
// ============================================================================

/// Identity of a query function, used in cache keys and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Apod,
    RoverPhotos,
    NeoFeed,
    SpaceWeather,
    Exoplanet,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Apod => "apod",
            Endpoint::RoverPhotos => "rover_photos",
            Endpoint::NeoFeed => "neo_feed",
            Endpoint::SpaceWeather => "space_weather",
            Endpoint::Exoplanet => "exoplanet",
        }
    }

    /// Path below the base URL. The exoplanet archive has its own URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Apod => "planetary/apod",
            Endpoint::RoverPhotos => "mars-photos/api/v1/rovers",
            Endpoint::NeoFeed => "neo/rest/v1/feed",
            Endpoint::SpaceWeather => "DONKI",
            Endpoint::Exoplanet => "",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
