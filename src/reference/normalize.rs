use crate::reference::Reference;
use crate::ReferenceError;
use url::Url;

/// Normalizes a URL (or a path relative to `base`) into a [`Reference`]
///
/// # Normalization Steps
///
/// 1. Resolve the input against `base`; reject if malformed
/// 2. Require an HTTP or HTTPS scheme and a host (the host is lowercased
///    by the parser)
/// 3. Normalize the path:
///    - Remove empty segments (repeated slashes)
///    - Remove trailing slash (except for root /)
/// 4. Remove the fragment (everything after #)
/// 5. Remove an empty query string (trailing ?)
///
/// Applying the function to its own output yields the same reference.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_sprawl::reference::normalize_reference;
///
/// let base = Url::parse("https://en.wikipedia.org").unwrap();
/// let reference = normalize_reference("/wiki/Europe#History", &base).unwrap();
/// assert_eq!(reference.as_str(), "https://en.wikipedia.org/wiki/Europe");
/// ```
pub fn normalize_reference(input: &str, base: &Url) -> Result<Reference, ReferenceError> {
    let input = input.trim();

    // Step 1: Resolve
    let mut url = base
        .join(input)
        .map_err(|e| ReferenceError::Parse(format!("{}: {}", input, e)))?;

    // Step 2: Scheme and host
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ReferenceError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(ReferenceError::MissingHost);
    }

    // Step 3: Path
    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    // Step 4: Fragment
    url.set_fragment(None);

    // Step 5: Empty query
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(Reference::from_normalized(url.into()))
}

/// Drops empty segments and the trailing slash
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://en.wikipedia.org").unwrap()
    }

    fn normalize(input: &str) -> String {
        normalize_reference(input, &base()).unwrap().as_str().to_string()
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(normalize("/wiki/Europe"), "https://en.wikipedia.org/wiki/Europe");
    }

    #[test]
    fn test_absolute_url_kept() {
        assert_eq!(
            normalize("https://simple.wikipedia.org/wiki/List_of_countries"),
            "https://simple.wikipedia.org/wiki/List_of_countries"
        );
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(
            normalize("https://en.wikipedia.org/wiki/Organ_stop#Reed_stops"),
            "https://en.wikipedia.org/wiki/Organ_stop"
        );
    }

    #[test]
    fn test_lowercase_host() {
        assert_eq!(
            normalize("https://EN.Wikipedia.ORG/wiki/Europe"),
            "https://en.wikipedia.org/wiki/Europe"
        );
    }

    #[test]
    fn test_path_case_preserved() {
        assert_ne!(normalize("/wiki/Europe"), normalize("/wiki/europe"));
    }

    #[test]
    fn test_multiple_slashes() {
        assert_eq!(
            normalize("https://en.wikipedia.org//wiki///Europe/"),
            "https://en.wikipedia.org/wiki/Europe"
        );
    }

    #[test]
    fn test_dot_segments() {
        assert_eq!(
            normalize("/wiki/../wiki/./Europe"),
            "https://en.wikipedia.org/wiki/Europe"
        );
    }

    #[test]
    fn test_empty_query_removed() {
        assert_eq!(normalize("/wiki/Europe?"), "https://en.wikipedia.org/wiki/Europe");
    }

    #[test]
    fn test_raw_and_escaped_unicode_agree() {
        assert_eq!(normalize("/wiki/Étude"), normalize("/wiki/%C3%89tude"));
    }

    #[test]
    fn test_subpage_slash_kept() {
        assert_eq!(normalize("/wiki/AC/DC"), "https://en.wikipedia.org/wiki/AC/DC");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "/wiki/Europe",
            "https://EN.wikipedia.org//wiki/Pop_music/#x",
            "/wiki/%C3%89tude",
            "/wiki/B%C3%BClban",
            "/wiki/Étude",
            "/wiki/Who_Framed_Roger_Rabbit%3F",
            "/wiki/Europe?",
            "https://en.wikipedia.org",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_reference("mailto:someone@example.com", &base());
        assert!(matches!(result, Err(ReferenceError::InvalidScheme(_))));
    }

    #[test]
    fn test_root_path() {
        assert_eq!(normalize("https://en.wikipedia.org"), "https://en.wikipedia.org/");
    }
}
