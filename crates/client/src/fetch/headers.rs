//! Conversion between reqwest header maps and the engine's header lists.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Headers that describe one hop of the connection, not the resource.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Flatten a response header map, dropping hop-by-hop headers and values
/// that are not valid UTF-8.
///
/// `content-length` and `content-encoding` are dropped as well: the body
/// has already been decompressed and may be replayed from the cache.
pub fn from_header_map(map: &HeaderMap) -> Vec<(String, String)> {
    map.iter()
        .filter(|(name, _)| {
            !is_hop_by_hop(name.as_str()) && *name != header::CONTENT_LENGTH && *name != header::CONTENT_ENCODING
        })
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Build an outgoing header map, skipping hop-by-hop and malformed entries.
pub fn to_header_map(headers: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        if is_hop_by_hop(name) {
            continue;
        }
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                map.append(name, value);
            }
            _ => tracing::debug!(header = %name, "skipping malformed request header"),
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header_map_filters() {
        let mut map = HeaderMap::new();
        map.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/css"));
        map.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        map.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        map.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        map.insert(header::ETAG, HeaderValue::from_static("\"abc\""));

        let mut flat = from_header_map(&map);
        flat.sort();

        assert_eq!(
            flat,
            vec![
                ("content-type".to_string(), "text/css".to_string()),
                ("etag".to_string(), "\"abc\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_to_header_map_skips_bad_entries() {
        let headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Connection".to_string(), "close".to_string()),
            ("bad header".to_string(), "x".to_string()),
            ("X-Multi".to_string(), "a".to_string()),
            ("X-Multi".to_string(), "b".to_string()),
        ];

        let map = to_header_map(&headers);

        assert_eq!(map.get(header::ACCEPT).unwrap(), "application/json");
        assert!(map.get(header::CONNECTION).is_none());
        assert_eq!(map.get_all("x-multi").iter().count(), 2);
        assert_eq!(map.len(), 3);
    }
}
