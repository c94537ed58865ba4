use url::Url;

/// Name used when a URL path yields nothing usable
const DEFAULT_NAME: &str = "index";

/// Derives the snapshot file name for a page
///
/// Every run of non-alphanumeric characters in the path collapses to a single
/// `_`, separators at both ends are trimmed, and an empty result maps to
/// `index`. The query string is not part of the name.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use corpus_crawler::url::snapshot_file_name;
///
/// let url = Url::parse("https://example.org/congress/2025-programme/").unwrap();
/// assert_eq!(snapshot_file_name(&url), "congress_2025_programme.html");
/// ```
pub fn snapshot_file_name(url: &Url) -> String {
    let mut name = String::with_capacity(url.path().len());
    let mut pending_separator = false;

    for c in url.path().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !name.is_empty() {
                name.push('_');
            }
            pending_separator = false;
            name.push(c);
        } else {
            pending_separator = true;
        }
    }

    if name.is_empty() {
        name.push_str(DEFAULT_NAME);
    }
    name.push_str(".html");
    name
}

/// Derives the on-disk name of a downloaded asset: the URL's base name
pub fn asset_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .unwrap_or(DEFAULT_NAME)
        .to_string()
}
