//! Identifier normalization.
//!
//! Users paste channel identifiers in many shapes: canonical IDs, `@handles`,
//! display names and full channel URLs. [`clean_identifier`] reduces all of
//! them to a bare name or ID, and [`is_canonical_id`] tells whether that
//! result can be used without a search call.

use url::Url;

/// Every canonical channel ID starts with this prefix.
pub const CANONICAL_PREFIX: &str = "UC";

/// Canonical channel IDs are at least this long (prefix included).
pub const CANONICAL_MIN_LEN: usize = 24;

const URL_PATH_MARKERS: [&str; 3] = ["c", "channel", "user"];

const SCHEMELESS_HOSTS: [&str; 3] = ["youtube.com/", "www.youtube.com/", "m.youtube.com/"];

/// Whether `value` already has the shape of a canonical channel ID.
pub fn is_canonical_id(value: &str) -> bool {
    value.len() >= CANONICAL_MIN_LEN
        && value.starts_with(CANONICAL_PREFIX)
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Strip URL prefixes and handle markers from a raw identifier.
///
/// Cleaning is idempotent: `clean_identifier(&clean_identifier(x)) == clean_identifier(x)`.
pub fn clean_identifier(raw: &str) -> String {
    let unmarked = raw.replace('@', "");
    let trimmed = unmarked.trim();

    let name = match parse_channel_url(trimmed) {
        Some(url) => channel_segment(&url).unwrap_or_default(),
        None => trimmed.to_string(),
    };

    name.trim().to_string()
}

fn parse_channel_url(value: &str) -> Option<Url> {
    let lower = value.to_ascii_lowercase();
    let url = if lower.starts_with("http://") || lower.starts_with("https://") {
        Url::parse(value).ok()?
    } else if SCHEMELESS_HOSTS.iter().any(|host| lower.starts_with(host)) {
        Url::parse(&format!("https://{}", value)).ok()?
    } else {
        return None;
    };

    let host = url.host_str()?.to_ascii_lowercase();
    if host == "youtube.com" || host.ends_with(".youtube.com") {
        Some(url)
    } else {
        None
    }
}

/// First meaningful path segment, skipping `c/`, `channel/` and `user/`.
fn channel_segment(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty()).peekable();

    if let Some(first) = segments.peek() {
        if URL_PATH_MARKERS.contains(&first.to_ascii_lowercase().as_str()) {
            segments.next();
        }
    }

    segments.next().map(decode_segment)
}

/// Path segments come back percent-encoded; names may be any Unicode.
fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.replace('@', ""),
        Err(_) => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_shape() {
        assert!(is_canonical_id("UCBJycsmduvYEL83R_U4JriQ"));
        assert!(is_canonical_id("UC_x5XG1OV2P6uZZ5FSM9Ttw"));
        assert!(!is_canonical_id("UCshort"));
        assert!(!is_canonical_id("mkbhd"));
        assert!(!is_canonical_id("XXBJycsmduvYEL83R_U4JriQ"));
        assert!(!is_canonical_id("UCLA Bruins Official Channel"));
    }

    #[test]
    fn test_clean_handles_and_whitespace() {
        assert_eq!(clean_identifier("@mkbhd"), "mkbhd");
        assert_eq!(clean_identifier("  Linus Tech Tips  "), "Linus Tech Tips");
        assert_eq!(clean_identifier("@ mkbhd"), "mkbhd");
    }

    #[test]
    fn test_clean_urls() {
        assert_eq!(clean_identifier("https://www.youtube.com/@mkbhd"), "mkbhd");
        assert_eq!(
            clean_identifier("https://youtube.com/channel/UCBJycsmduvYEL83R_U4JriQ"),
            "UCBJycsmduvYEL83R_U4JriQ"
        );
        assert_eq!(clean_identifier("http://www.youtube.com/c/veritasium"), "veritasium");
        assert_eq!(clean_identifier("youtube.com/user/pewdiepie/videos"), "pewdiepie");
        assert_eq!(clean_identifier("https://m.youtube.com/@mkbhd?si=abc"), "mkbhd");
        assert_eq!(clean_identifier("https://www.youtube.com/"), "");
    }

    #[test]
    fn test_clean_decodes_url_segments() {
        assert_eq!(
            clean_identifier("https://www.youtube.com/@日本のチャンネル"),
            clean_identifier("@日本のチャンネル")
        );
        assert_eq!(
            clean_identifier("https://www.youtube.com/@%E6%97%A5%E6%9C%AC"),
            "日本"
        );
        assert_eq!(clean_identifier("https://www.youtube.com/c/a%20b"), "a b");
        assert_eq!(clean_identifier("https://www.youtube.com/%40mkbhd"), "mkbhd");
    }

    #[test]
    fn test_non_youtube_urls_are_left_alone() {
        assert_eq!(
            clean_identifier("https://example.com/@someone"),
            "https://example.com/someone"
        );
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let samples = [
            "@mkbhd",
            "  @ youtube.com/x ",
            "https://www.youtube.com/@mkbhd",
            "https://youtube.com/channel/UCBJycsmduvYEL83R_U4JriQ",
            "youtube.com/c/youtube.com",
            "Linus Tech Tips",
            "https://example.com/@someone",
            "https://www.youtube.com/c/a%20b",
            "https://www.youtube.com/@日本のチャンネル",
            "@日本のチャンネル",
            "@@",
            "",
        ];

        for sample in samples {
            let once = clean_identifier(sample);
            let twice = clean_identifier(&once);
            assert_eq!(once, twice, "cleaning {:?} is not idempotent", sample);
        }
    }
}
