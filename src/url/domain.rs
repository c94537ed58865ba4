use crate::UrlError;
use url::Url;

/// Extracts the network authority (host and explicit port) from a URL
///
/// This is the key a crawl is scoped to: two URLs belong to the same domain
/// crawl exactly when their authorities are equal. The host is lower-cased;
/// default ports are not part of the authority.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use corpus_crawler::url::extract_domain;
///
/// let url = Url::parse("https://Example.ORG/congress").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.org".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Parses an event homepage and returns it with its domain
pub fn parse_homepage(homepage: &str) -> Result<(Url, String), UrlError> {
    let mut url = Url::parse(homepage.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);
    let domain = extract_domain(&url).ok_or(UrlError::MissingDomain)?;
    Ok((url, domain))
}
