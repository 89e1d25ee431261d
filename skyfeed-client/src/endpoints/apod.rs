//! Astronomy picture of the day.

use super::decode_json;
use skyfeed_core::{ApodQuery, Endpoint, HttpRequest, ResponseError, Table};

pub fn request(url: String, api_key: &str, query: &ApodQuery) -> HttpRequest {
    HttpRequest::get(url)
        .param("api_key", api_key)
        .param_opt("date", query.date.as_param())
        .param_opt("thumbs", query.thumbs.then_some("true"))
}

/// One-row table from the picture object.
pub fn parse(body: &str) -> Result<Table, ResponseError> {
    let value = decode_json(Endpoint::Apod, body)?;
    if !value.is_object() {
        return Err(ResponseError::NotTabular {
            reason: "picture of the day response is not an object".to_string(),
        });
    }
    Table::from_json_records_flattened(std::slice::from_ref(&value))
}
