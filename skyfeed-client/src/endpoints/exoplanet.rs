//! Exoplanet archive table queries.

use skyfeed_core::{ExoplanetQuery, HttpRequest, ResponseError, Table};

/// `table` and `where` are written into the URL as given; the service
/// expects the clause unencoded. `select`, `order` and `api_key` go through
/// regular query encoding and are sent only when present.
pub fn request(archive_url: &str, api_key: Option<&str>, query: &ExoplanetQuery) -> HttpRequest {
    let mut url = format!(
        "{}?table={}",
        archive_url.trim_end_matches('?'),
        query.table
    );
    if let Some(clause) = query.where_clause.as_deref().filter(|c| !c.is_empty()) {
        url.push_str("&where=");
        url.push_str(clause);
    }

    HttpRequest::get(url)
        .param_opt("select", query.select.as_deref())
        .param_opt("order", query.order.as_deref())
        .param_opt("api_key", api_key)
}

/// Columns equal the CSV header; cells are type-inferred.
pub fn parse(body: &str) -> Result<Table, ResponseError> {
    Table::from_csv(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfeed_core::{Value, DEFAULT_EXOPLANET_URL};
    use skyfeed_test_utils::fixtures;

    #[test]
    fn test_where_clause_appended_verbatim() {
        let query = ExoplanetQuery::new("cumulative")
            .with_where(fixtures::EXOPLANET_CANDIDATE_WHERE)
            .with_order("kepid");
        let request = request(DEFAULT_EXOPLANET_URL, Some("k"), &query);

        assert_eq!(
            request.url,
            format!(
                "{}?table=cumulative&where={}",
                DEFAULT_EXOPLANET_URL,
                fixtures::EXOPLANET_CANDIDATE_WHERE
            )
        );
        assert_eq!(request.query_value("order"), Some("kepid"));
        assert_eq!(request.query_value("api_key"), Some("k"));
        assert!(!request.has_param("select"));
        assert!(!request.has_param("where"));
    }

    #[test]
    fn test_trailing_question_mark_tolerated() {
        let query = ExoplanetQuery::new("ps");
        let request = request("https://archive.example/api?", None, &query);
        assert_eq!(request.url, "https://archive.example/api?table=ps");
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_parse_keeps_header() {
        let table = parse(fixtures::exoplanet_csv()).unwrap();
        assert_eq!(
            table.columns(),
            &["kepid", "kepoi_name", "kepler_name", "koi_disposition", "koi_period", "koi_prad"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "kepler_name"), Some(&Value::Null));
        assert_eq!(table.cell(0, "koi_period"), Some(&Value::Float(384.846)));
        assert_eq!(table.cell(1, "kepid"), Some(&Value::Integer(5640085)));
    }

    #[test]
    fn test_parse_empty_body_is_error() {
        assert!(matches!(parse(""), Err(ResponseError::Csv { .. })));
    }
}
