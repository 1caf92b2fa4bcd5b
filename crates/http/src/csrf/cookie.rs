//! Cookie reconciliation helper

use percent_encoding::percent_decode_str;

/// Locate `name` in a `Cookie`-header-shaped string and URL-decode its value.
///
/// The cookie jar renders its contents the same way `document.cookie`
/// does in a browser: `name=value` pairs separated by `;`. Empty values
/// count as absent.
pub fn token_from_header(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key != name {
            return None;
        }
        percent_decode_str(value)
            .decode_utf8()
            .ok()
            .map(|decoded| decoded.into_owned())
            .filter(|decoded| !decoded.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_token_among_other_cookies() {
        let header = "session=abc; XSRF-TOKEN=tok-123; theme=dark";
        assert_eq!(
            token_from_header(header, "XSRF-TOKEN").as_deref(),
            Some("tok-123")
        );
    }

    #[test]
    fn decodes_percent_encoded_values() {
        let header = "XSRF-TOKEN=a%2Bb%3D%3D";
        assert_eq!(
            token_from_header(header, "XSRF-TOKEN").as_deref(),
            Some("a+b==")
        );
    }

    #[test]
    fn missing_cookie_returns_none() {
        assert_eq!(token_from_header("session=abc", "XSRF-TOKEN"), None);
    }

    #[test]
    fn empty_value_counts_as_absent() {
        assert_eq!(token_from_header("XSRF-TOKEN=", "XSRF-TOKEN"), None);
    }

    #[test]
    fn name_must_match_exactly() {
        let header = "CSRF-TOKEN=legacy; XSRF-TOKEN=current";
        assert_eq!(
            token_from_header(header, "CSRF-TOKEN").as_deref(),
            Some("legacy")
        );
    }

    #[test]
    fn tolerates_malformed_pairs() {
        let header = "garbage; XSRF-TOKEN=tok";
        assert_eq!(token_from_header(header, "XSRF-TOKEN").as_deref(), Some("tok"));
    }
}
