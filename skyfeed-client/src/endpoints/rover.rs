//! Mars rover photos.

use super::decode_json;
use skyfeed_core::{
    Endpoint, HttpRequest, ResponseError, RoverPhotosQuery, Table, ROVER_PHOTO_LIMIT,
};

/// Path below the base URL for `query`'s rover.
pub fn path(query: &RoverPhotosQuery) -> String {
    format!(
        "{}/{}/photos",
        Endpoint::RoverPhotos.path(),
        query.rover.as_api_str()
    )
}

pub fn request(url: String, api_key: &str, query: &RoverPhotosQuery) -> HttpRequest {
    HttpRequest::get(url)
        .param("sol", query.sol.to_string())
        .param("api_key", api_key)
        .param_opt("camera", query.camera.as_deref())
        .param_opt("page", query.page.map(|p| p.to_string()))
}

/// First [`ROVER_PHOTO_LIMIT`] photos, in response order. A body without a
/// `photos` key yields an empty table.
pub fn parse(body: &str) -> Result<Table, ResponseError> {
    let value = decode_json(Endpoint::RoverPhotos, body)?;
    let photos = match value.get("photos") {
        None => return Ok(Table::default()),
        Some(photos) => photos.as_array().ok_or_else(|| ResponseError::NotTabular {
            reason: "photos is not an array".to_string(),
        })?,
    };
    let kept = &photos[..photos.len().min(ROVER_PHOTO_LIMIT)];
    Table::from_json_records_flattened(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfeed_core::{Rover, Value};
    use skyfeed_test_utils::fixtures;

    #[test]
    fn test_path_uses_rover_name() {
        let query = RoverPhotosQuery::new(Rover::Spirit, 1);
        assert_eq!(path(&query), "mars-photos/api/v1/rovers/Spirit/photos");
    }

    #[test]
    fn test_request_params() {
        let query = RoverPhotosQuery::new(Rover::Curiosity, 1000)
            .with_camera("FHAZ")
            .with_page(2);
        let request = request("u".to_string(), "k", &query);
        assert_eq!(request.query_value("sol"), Some("1000"));
        assert_eq!(request.query_value("api_key"), Some("k"));
        assert_eq!(request.query_value("camera"), Some("FHAZ"));
        assert_eq!(request.query_value("page"), Some("2"));

        let plain = super::request("u".to_string(), "k", &RoverPhotosQuery::new(Rover::Curiosity, 0));
        assert!(!plain.has_param("camera"));
        assert!(!plain.has_param("page"));
    }

    #[test]
    fn test_parse_truncates_to_limit_in_order() {
        let body = fixtures::rover_photos_json(150).to_string();
        let table = parse(&body).unwrap();

        assert_eq!(table.len(), 100);
        assert_eq!(table.cell(0, "id"), Some(&Value::Integer(1)));
        assert_eq!(table.cell(99, "id"), Some(&Value::Integer(100)));
        assert!(table.columns().iter().any(|c| c == "img_src"));
        assert!(table.columns().iter().any(|c| c == "earth_date"));
        assert_eq!(table.cell(0, "camera.name"), Some(&Value::from("FHAZ")));
    }

    #[test]
    fn test_parse_missing_photos_key() {
        let table = parse(r#"{"errors": "No Photos"}"#).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_empty_photos() {
        let table = parse(r#"{"photos": []}"#).unwrap();
        assert!(table.is_empty());
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use skyfeed_test_utils::{fixtures, generators::arb_photo_count};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Row count is the photo count capped at the limit.
        #[test]
        fn prop_row_count_capped(count in arb_photo_count()) {
            let body = fixtures::rover_photos_json(count).to_string();
            let table = parse(&body).unwrap();
            prop_assert_eq!(table.len(), count.min(ROVER_PHOTO_LIMIT));
        }
    }
}
