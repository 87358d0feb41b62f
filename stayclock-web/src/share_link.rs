//! Share links: a page URL carrying the visit list in its `data` parameter.
use stayclock_engine::constants::SHARE_QUERY_PARAM;

/// Extract the share token from a `location.search` string such as
/// `?lang=en&data=W3si...`. Empty values are treated as absent.
#[must_use]
pub fn share_token_from_search(search: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(name, _)| *name == SHARE_QUERY_PARAM)
        .find_map(|(_, value)| {
            let decoded = urlencoding::decode(value).ok()?;
            let token = decoded.trim();
            (!token.is_empty()).then(|| token.to_string())
        })
}

/// Build a link to `page_url` that loads `token` in shared mode.
///
/// Any existing query string or fragment on `page_url` is replaced.
#[must_use]
pub fn share_url(page_url: &str, token: &str) -> String {
    let base = page_url.split(['?', '#']).next().unwrap_or(page_url);
    format!("{base}?{SHARE_QUERY_PARAM}={}", urlencoding::encode(token))
}
