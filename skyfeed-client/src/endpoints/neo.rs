//! Near-earth object feed.

use super::decode_json;
use skyfeed_core::{Endpoint, HttpRequest, NeoFeedQuery, ResponseError, Table, Value};

/// Output columns and the JSON pointer each one is read from.
const COLUMNS: [(&str, &str); 14] = [
    ("id", "/id"),
    ("name", "/name"),
    ("neo_reference_id", "/neo_reference_id"),
    (
        "close_approach_date",
        "/close_approach_data/0/close_approach_date",
    ),
    ("nasa_jpl_url", "/nasa_jpl_url"),
    ("absolute_magnitude_h", "/absolute_magnitude_h"),
    (
        "estimated_diameter_min_km",
        "/estimated_diameter/kilometers/estimated_diameter_min",
    ),
    (
        "estimated_diameter_max_km",
        "/estimated_diameter/kilometers/estimated_diameter_max",
    ),
    (
        "estimated_diameter_min_m",
        "/estimated_diameter/meters/estimated_diameter_min",
    ),
    (
        "estimated_diameter_max_m",
        "/estimated_diameter/meters/estimated_diameter_max",
    ),
    (
        "is_potentially_hazardous_asteroid",
        "/is_potentially_hazardous_asteroid",
    ),
    (
        "relative_velocity_kms",
        "/close_approach_data/0/relative_velocity/kilometers_per_second",
    ),
    (
        "miss_distance_km",
        "/close_approach_data/0/miss_distance/kilometers",
    ),
    ("orbiting_body", "/close_approach_data/0/orbiting_body"),
];

pub fn request(url: String, api_key: &str, query: &NeoFeedQuery) -> HttpRequest {
    HttpRequest::get(url)
        .param("start_date", query.start_date.as_str())
        .param("end_date", query.end_date.as_str())
        .param("api_key", api_key)
}

/// One row per object across all date buckets, buckets in ascending date
/// order. Only the first close-approach record of each object is read; a
/// missing field anywhere fails the whole parse.
pub fn parse(body: &str) -> Result<Table, ResponseError> {
    let value = decode_json(Endpoint::NeoFeed, body)?;
    let buckets = value
        .get("near_earth_objects")
        .and_then(|v| v.as_object())
        .ok_or_else(|| missing("/near_earth_objects"))?;

    let mut dates: Vec<&String> = buckets.keys().collect();
    dates.sort();

    let mut table = Table::with_columns(COLUMNS.iter().map(|(name, _)| *name));
    for date in dates {
        let objects = buckets[date.as_str()]
            .as_array()
            .ok_or_else(|| missing(&format!("/near_earth_objects/{}", date)))?;
        for object in objects {
            let row = COLUMNS
                .iter()
                .map(|(_, pointer)| {
                    object
                        .pointer(pointer)
                        .map(cell)
                        .ok_or_else(|| missing(pointer))
                })
                .collect::<Result<Vec<_>, _>>()?;
            table.push_row(row);
        }
    }
    Ok(table)
}

fn cell(value: &serde_json::Value) -> Value {
    Value::from_json(value).unwrap_or_else(|| Value::Text(value.to_string()))
}

fn missing(path: &str) -> ResponseError {
    ResponseError::MissingField {
        endpoint: Endpoint::NeoFeed.as_str().to_string(),
        path: path.to_string(),
    }
}
