//! Space weather notifications (DONKI).

use super::decode_json;
use skyfeed_core::{Endpoint, HttpRequest, QueryOutput, ResponseError, SpaceWeatherQuery, Table};

pub fn path(query: &SpaceWeatherQuery) -> String {
    format!("{}/{}", Endpoint::SpaceWeather.path(), query.kind.as_api_str())
}

/// `start_date` and `end_date` must already be resolved.
pub fn request(url: String, api_key: &str, start_date: &str, end_date: &str) -> HttpRequest {
    HttpRequest::get(url)
        .param("startDate", start_date)
        .param("endDate", end_date)
        .param("api_key", api_key)
}

/// A table when the body is an array of flat objects, otherwise the
/// decoded value unchanged.
pub fn parse(body: &str) -> Result<QueryOutput, ResponseError> {
    let value = decode_json(Endpoint::SpaceWeather, body)?;
    let table = match value.as_array() {
        Some(items) => Table::from_json_records(items).ok(),
        None => None,
    };
    Ok(match table {
        Some(table) => QueryOutput::Table(table),
        None => QueryOutput::Raw(value),
    })
}
