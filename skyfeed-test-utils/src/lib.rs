//! SKYFEED Test Utilities
//!
//! Shared test infrastructure for the SKYFEED workspace:
//! - A scripted `Transport` that records every request it sees
//! - A manually advanced `Clock`
//! - JSON and CSV response fixtures
//! - Proptest generators

pub use skyfeed_core::{
    Clock, HttpError, HttpRequest, HttpResponse, Rover, SpaceWeatherKind, Table, Transport, Value,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// SCRIPTED TRANSPORT
// ============================================================================

/// Transport that replays queued outcomes and records requests.
///
/// Outcomes are consumed in order. Once the queue is empty the fallback is
/// returned for every further request.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    fallback: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Every request answers with `status` and `body`.
    pub fn always(status: u16, body: impl Into<String>) -> Self {
        Self::with_fallback(Ok(HttpResponse::new(status, body)))
    }

    /// Every request answers 200 with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::always(200, body)
    }

    pub fn with_fallback(fallback: Result<HttpResponse, HttpError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response ahead of the fallback.
    pub fn then_respond(self, status: u16, body: impl Into<String>) -> Self {
        self.then(Ok(HttpResponse::new(status, body)))
    }

    /// Queue a transport-level failure ahead of the fallback.
    pub fn then_fail(self, reason: impl Into<String>) -> Self {
        self.then(Err(HttpError::Transport {
            url: "scripted".to_string(),
            reason: reason.into(),
        }))
    }

    pub fn then(self, outcome: Result<HttpResponse, HttpError>) -> Self {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(outcome);
        self
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock poisoned").len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .last()
            .cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request.clone());

        let next = self.script.lock().expect("script lock poisoned").pop_front();
        match next.unwrap_or_else(|| self.fallback.clone()) {
            Err(HttpError::Transport { reason, .. }) => Err(HttpError::Transport {
                url: request.url.clone(),
                reason,
            }),
            other => other,
        }
    }
}

// ============================================================================
// MANUAL CLOCK
// ============================================================================

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Clock fixed at 2024-03-15T12:00:00Z.
    pub fn fixed() -> Self {
        Self::new(fixtures::reference_time())
    }

    pub fn advance(&self, by: Duration) {
        let delta = ChronoDuration::from_std(by).expect("duration out of range");
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += delta;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().expect("clock lock poisoned") = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use serde_json::{json, Value as Json};

    pub fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
            .single()
            .expect("valid reference time")
    }

    /// A picture-of-the-day payload for `date`.
    pub fn apod_json(date: &str) -> Json {
        json!({
            "date": date,
            "explanation": "A cosmic cloud of gas and dust.",
            "hdurl": "https://apod.nasa.gov/apod/image/hd.jpg",
            "media_type": "image",
            "service_version": "v1",
            "title": "Pillars of Creation",
            "url": "https://apod.nasa.gov/apod/image/sd.jpg"
        })
    }

    fn neo_object(id: &str, name: &str, date: &str, hazardous: bool) -> Json {
        json!({
            "id": id,
            "neo_reference_id": id,
            "name": name,
            "nasa_jpl_url": format!("http://ssd.jpl.nasa.gov/sbdb.cgi?sstr={}", id),
            "absolute_magnitude_h": 20.5,
            "estimated_diameter": {
                "kilometers": {"estimated_diameter_min": 0.2, "estimated_diameter_max": 0.45},
                "meters": {"estimated_diameter_min": 200.0, "estimated_diameter_max": 450.0}
            },
            "is_potentially_hazardous_asteroid": hazardous,
            "close_approach_data": [
                {
                    "close_approach_date": date,
                    "relative_velocity": {"kilometers_per_second": "12.5"},
                    "miss_distance": {"kilometers": "5000000.1"},
                    "orbiting_body": "Earth"
                },
                {
                    "close_approach_date": "2100-01-01",
                    "relative_velocity": {"kilometers_per_second": "99.9"},
                    "miss_distance": {"kilometers": "1.0"},
                    "orbiting_body": "Mars"
                }
            ]
        })
    }

    /// Feed with two date buckets listed out of date order: two objects on
    /// 2015-09-08 and one on 2015-09-07.
    pub fn neo_feed_json() -> Json {
        json!({
            "element_count": 3,
            "near_earth_objects": {
                "2015-09-08": [
                    neo_object("2465633", "465633 (2009 JR5)", "2015-09-08", true),
                    neo_object("3426410", "(2008 QV11)", "2015-09-08", false)
                ],
                "2015-09-07": [
                    neo_object("2440012", "440012 (2002 LE27)", "2015-09-07", false)
                ]
            }
        })
    }

    /// Feed where one object has no close-approach records.
    pub fn neo_feed_missing_approach_json() -> Json {
        let mut object = neo_object("1", "broken", "2015-09-07", false);
        object["close_approach_data"] = json!([]);
        json!({
            "element_count": 1,
            "near_earth_objects": {"2015-09-07": [object]}
        })
    }

    /// Rover response with `count` photos numbered from 1.
    pub fn rover_photos_json(count: usize) -> Json {
        let photos: Vec<Json> = (1..=count)
            .map(|i| {
                json!({
                    "id": i,
                    "sol": 1000,
                    "camera": {"id": 20, "name": "FHAZ", "rover_id": 5, "full_name": "Front Hazard Avoidance Camera"},
                    "img_src": format!("http://mars.jpl.nasa.gov/msl-raw-images/{}.JPG", i),
                    "earth_date": "2015-05-30",
                    "rover": {"id": 5, "name": "Curiosity", "status": "active"}
                })
            })
            .collect();
        json!({ "photos": photos })
    }

    /// Flat notification records with differing key sets.
    pub fn donki_flat_json() -> Json {
        json!([
            {"messageType": "FLR", "messageID": "20240301-AL-001", "messageIssueTime": "2024-03-01T10:00Z"},
            {"messageType": "CME", "messageID": "20240302-AL-002", "messageURL": "https://kauai.ccmc.gsfc.nasa.gov/DONKI/view/Alert/1"}
        ])
    }

    /// Event records with nested arrays, as CME responses have.
    pub fn donki_irregular_json() -> Json {
        json!([
            {
                "activityID": "2024-03-01T12:00:00-CME-001",
                "startTime": "2024-03-01T12:00Z",
                "instruments": [{"displayName": "SOHO: LASCO/C2"}],
                "linkedEvents": null
            }
        ])
    }

    pub const EXOPLANET_CANDIDATE_WHERE: &str =
        "koi_disposition like 'CANDIDATE' and koi_period > 300 and koi_prad < 2";

    /// Cumulative KOI table excerpt.
    pub fn exoplanet_csv() -> &'static str {
        "kepid,kepoi_name,kepler_name,koi_disposition,koi_period,koi_prad\n\
         8311864,K01830.02,,CANDIDATE,384.846,1.65\n\
         5640085,K00448.02,Kepler-159 c,CANDIDATE,43.59,1.9\n"
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_rover() -> impl Strategy<Value = Rover> {
        prop_oneof![
            Just(Rover::Curiosity),
            Just(Rover::Opportunity),
            Just(Rover::Spirit),
        ]
    }

    pub fn arb_space_weather_kind() -> impl Strategy<Value = SpaceWeatherKind> {
        proptest::sample::select(SpaceWeatherKind::ALL.to_vec())
    }

    /// JSON scalar values.
    pub fn arb_json_scalar() -> impl Strategy<Value = serde_json::Value> {
        prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(serde_json::Value::from),
        ]
    }

    /// A flat JSON object with keys drawn from a small alphabet.
    pub fn arb_flat_record() -> impl Strategy<Value = serde_json::Value> {
        prop::collection::btree_map("[a-f]", arb_json_scalar(), 0..6).prop_map(|fields| {
            serde_json::Value::Object(fields.into_iter().collect())
        })
    }

    /// Sizes around the rover photo cap.
    pub fn arb_photo_count() -> impl Strategy<Value = usize> {
        0usize..250
    }
}
