use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Characters left untouched in the path, besides ASCII alphanumerics
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b';')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.');

/// Characters left untouched in the query, besides ASCII alphanumerics
const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'=')
    .remove(b'&')
    .remove(b'%')
    .remove(b'/')
    .remove(b':')
    .remove(b'+')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.');

/// Resolves a link against a base URL and percent-encodes the result
///
/// # Normalization Steps
///
/// 1. Trim the href; empty hrefs are absent
/// 2. Resolve against `base` (absolute hrefs replace it)
/// 3. Reject anything that is not http(s) after resolution
/// 4. Percent-encode path and query per RFC 3986, keeping existing `%XX` escapes
///
/// # Arguments
///
/// * `href` - The raw `href`/`src` attribute value
/// * `base` - The page URL the attribute was found on
///
/// # Returns
///
/// The absolute, encoded URL, or `None` when the link is empty or malformed.
///
/// # Examples
///
/// ```
/// use news_harvest::url::abs_and_encode;
/// use url::Url;
///
/// let base = Url::parse("https://www.example.com/news").unwrap();
/// let url = abs_and_encode("/news/l'euro-zone.html", &base).unwrap();
/// assert_eq!(url, "https://www.example.com/news/l%27euro-zone.html");
/// ```
pub fn abs_and_encode(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = match base.join(href) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Dropping unresolvable link {:?}: {}", href, e);
            return None;
        }
    };

    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    Some(encode_parsed(absolute))
}

/// Percent-encodes the path and query of an absolute URL
///
/// Idempotent: encoding an already-encoded URL returns it unchanged.
///
/// # Returns
///
/// * `Some(String)` - The encoded URL
/// * `None` - The input does not parse as an absolute URL
///
/// # Examples
///
/// ```
/// use news_harvest::url::encode_url;
///
/// let once = encode_url("https://example.com/a b/it's.html?q=x y").unwrap();
/// assert_eq!(once, "https://example.com/a%20b/it%27s.html?q=x%20y");
/// assert_eq!(encode_url(&once).unwrap(), once);
/// ```
pub fn encode_url(url: &str) -> Option<String> {
    Url::parse(url).ok().map(encode_parsed)
}

fn encode_parsed(mut url: Url) -> String {
    let path = encode_component(url.path(), PATH_SAFE);
    url.set_path(&path);

    if let Some(query) = url.query() {
        let query = encode_component(query, QUERY_SAFE);
        url.set_query(Some(&query));
    }

    url.into()
}

/// Encodes every character outside `safe`, copying valid `%XX` escapes verbatim
fn encode_component(input: &str, safe: &'static AsciiSet) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        if c == '%' && is_escape(&input.as_bytes()[i..]) {
            out.push_str(&input[i..i + 3]);
            chars.next();
            chars.next();
            continue;
        }

        let mut buf = [0u8; 4];
        out.extend(utf8_percent_encode(c.encode_utf8(&mut buf), safe));
    }

    out
}

fn is_escape(bytes: &[u8]) -> bool {
    bytes.len() >= 3 && bytes[1].is_ascii_hexdigit() && bytes[2].is_ascii_hexdigit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.econostream-media.com/news").unwrap()
    }

    #[test]
    fn test_relative_link_resolved() {
        let result = abs_and_encode("/news/ecb-holds-rates.html", &base()).unwrap();
        assert_eq!(
            result,
            "https://www.econostream-media.com/news/ecb-holds-rates.html"
        );
    }

    #[test]
    fn test_absolute_link_kept() {
        let result = abs_and_encode("https://other.com/page.html", &base()).unwrap();
        assert_eq!(result, "https://other.com/page.html");
    }

    #[test]
    fn test_empty_link_is_absent() {
        assert_eq!(abs_and_encode("", &base()), None);
        assert_eq!(abs_and_encode("   ", &base()), None);
    }

    #[test]
    fn test_non_http_scheme_is_absent() {
        assert_eq!(abs_and_encode("javascript:void(0)", &base()), None);
        assert_eq!(abs_and_encode("mailto:desk@example.com", &base()), None);
    }

    #[test]
    fn test_malformed_link_is_absent() {
        assert_eq!(abs_and_encode("http://[::1", &base()), None);
    }

    #[test]
    fn test_apostrophe_encoded() {
        let result = abs_and_encode("/news/lagarde's-view.html", &base()).unwrap();
        assert_eq!(
            result,
            "https://www.econostream-media.com/news/lagarde%27s-view.html"
        );
    }

    #[test]
    fn test_curly_apostrophe_encoded() {
        let result = abs_and_encode("/news/lagarde’s-view.html", &base()).unwrap();
        assert_eq!(
            result,
            "https://www.econostream-media.com/news/lagarde%E2%80%99s-view.html"
        );
    }

    #[test]
    fn test_path_safe_characters_preserved() {
        let result = encode_url("https://example.com/a:b@c&d=e+f$g,h;i~j*(k)-l_m.html").unwrap();
        assert_eq!(
            result,
            "https://example.com/a:b@c&d=e+f$g,h;i~j*(k)-l_m.html"
        );
    }

    #[test]
    fn test_query_encoded() {
        let result = encode_url("https://example.com/news?offset=20&tag=rate cut").unwrap();
        assert_eq!(result, "https://example.com/news?offset=20&tag=rate%20cut");
    }

    #[test]
    fn test_query_question_mark_encoded() {
        let result = encode_url("https://example.com/news?q=why?").unwrap();
        assert_eq!(result, "https://example.com/news?q=why%3F");
    }

    #[test]
    fn test_existing_escapes_not_doubled() {
        let result = encode_url("https://example.com/a%20b/c%27d.html").unwrap();
        assert_eq!(result, "https://example.com/a%20b/c%27d.html");
    }

    #[test]
    fn test_stray_percent_encoded_once() {
        let once = encode_url("https://example.com/100%pure.html").unwrap();
        assert_eq!(once, "https://example.com/100%25pure.html");
        assert_eq!(encode_url(&once).unwrap(), once);
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let inputs = [
            "https://example.com/news/it’s a deal.html?x=1&y=a b",
            "https://example.com/news/l'euro.html",
            "https://example.com/news/%E2%80%99.html?q=%20",
        ];
        for input in inputs {
            let once = encode_url(input).unwrap();
            let twice = encode_url(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_relative_input_to_encode_url_is_absent() {
        assert_eq!(encode_url("/news/relative.html"), None);
    }
}
