use foundation::ids::FrameId;
use serde_json::Value;

/// One entry of a `/search` response: frame identifier plus relevance score.
///
/// Response order is server order; the client does not re-sort.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub frame_id: FrameId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchResponseError {
    Json(String),
    MissingResults,
    ResultsNotArray,
    BadHit { index: usize, reason: &'static str },
}

impl std::fmt::Display for SearchResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchResponseError::Json(msg) => write!(f, "invalid JSON: {msg}"),
            SearchResponseError::MissingResults => write!(f, "missing \"results\" key"),
            SearchResponseError::ResultsNotArray => write!(f, "\"results\" is not an array"),
            SearchResponseError::BadHit { index, reason } => {
                write!(f, "bad result at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for SearchResponseError {}

/// Parse a `/search` response body: `{"results": [[frameId, score], ...]}`.
///
/// `frameId` may arrive as a JSON string or integer; both normalize to the
/// same [`FrameId`].
pub fn parse_search_response(body: &str) -> Result<Vec<SearchHit>, SearchResponseError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| SearchResponseError::Json(e.to_string()))?;
    let results = value
        .get("results")
        .ok_or(SearchResponseError::MissingResults)?;
    let pairs = results
        .as_array()
        .ok_or(SearchResponseError::ResultsNotArray)?;

    let mut hits = Vec::with_capacity(pairs.len());
    for (index, pair) in pairs.iter().enumerate() {
        let pair = pair.as_array().ok_or(SearchResponseError::BadHit {
            index,
            reason: "entry is not a pair",
        })?;
        if pair.len() != 2 {
            return Err(SearchResponseError::BadHit {
                index,
                reason: "entry is not a pair",
            });
        }
        let frame_id = frame_id_from_json(&pair[0]).ok_or(SearchResponseError::BadHit {
            index,
            reason: "frame id is not a string or integer",
        })?;
        let score = pair[1].as_f64().ok_or(SearchResponseError::BadHit {
            index,
            reason: "score is not a number",
        })?;
        hits.push(SearchHit { frame_id, score });
    }
    Ok(hits)
}

/// Normalize a JSON frame identifier (string or integer) to a [`FrameId`].
pub(crate) fn frame_id_from_json(value: &Value) -> Option<FrameId> {
    if let Some(s) = value.as_str() {
        return Some(FrameId::new(s));
    }
    if let Some(i) = value.as_i64() {
        return Some(FrameId::from_integer(i));
    }
    if let Some(u) = value.as_u64() {
        return Some(FrameId::new(u.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{SearchResponseError, parse_search_response};
    use foundation::ids::FrameId;

    #[test]
    fn parses_mixed_id_forms_in_server_order() {
        let hits =
            parse_search_response(r#"{"results": [["12", 0.9], [7, 0.2]]}"#).expect("parse");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].frame_id, FrameId::new("12"));
        assert_eq!(hits[0].score, 0.9);
        assert_eq!(hits[1].frame_id, FrameId::new("7"));
        assert_eq!(hits[1].score, 0.2);
    }

    #[test]
    fn empty_results_are_ok() {
        assert!(parse_search_response(r#"{"results": []}"#).expect("parse").is_empty());
    }

    #[test]
    fn negative_scores_pass_through() {
        let hits = parse_search_response(r#"{"results": [[3, -0.25]]}"#).expect("parse");
        assert_eq!(hits[0].score, -0.25);
    }

    #[test]
    fn missing_results_key_is_an_error() {
        assert_eq!(
            parse_search_response(r#"{"frame_ids": [1, 2]}"#),
            Err(SearchResponseError::MissingResults)
        );
    }

    #[test]
    fn non_array_results_is_an_error() {
        assert_eq!(
            parse_search_response(r#"{"results": "nope"}"#),
            Err(SearchResponseError::ResultsNotArray)
        );
    }

    #[test]
    fn malformed_pair_is_an_error() {
        assert!(matches!(
            parse_search_response(r#"{"results": [["12"]]}"#),
            Err(SearchResponseError::BadHit { index: 0, .. })
        ));
        assert!(matches!(
            parse_search_response(r#"{"results": [[null, 0.5]]}"#),
            Err(SearchResponseError::BadHit { index: 0, .. })
        ));
        assert!(matches!(
            parse_search_response(r#"{"results": [["12", "high"]]}"#),
            Err(SearchResponseError::BadHit { index: 0, .. })
        ));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            parse_search_response("not json"),
            Err(SearchResponseError::Json(_))
        ));
    }

    #[test]
    fn handles_a_full_top_50_response() {
        let pairs: Vec<String> = (0..50)
            .map(|i| format!("[{i}, {}]", 1.0 - i as f64 / 50.0))
            .collect();
        let body = format!(r#"{{"results": [{}]}}"#, pairs.join(","));
        let hits = parse_search_response(&body).expect("parse");
        assert_eq!(hits.len(), 50);
        assert_eq!(hits[49].frame_id, FrameId::new("49"));
    }
}
