// URL helpers - path and fragment extraction for relative and absolute URLs
use url::Url;

/// Placeholder origin used to parse relative URLs.
const RELATIVE_BASE: &str = "http://relative.invalid/";

fn parse(url: &str) -> Option<Url> {
    Url::parse(url)
        .or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(url)))
        .ok()
}

/// Path component of `url`, without query or fragment.
pub fn path(url: &str) -> String {
    parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|| url.split(['?', '#']).next().unwrap_or_default().to_string())
}

/// Anchor after the first `#`, if any.
pub fn fragment(url: &str) -> Option<&str> {
    url.split_once('#').map(|(_, anchor)| anchor).filter(|a| !a.is_empty())
}

/// Join a relative URL onto the configured base URL.
pub fn join(base: &str, relative: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path() {
        assert_eq!(path("/monitoring/list/hosts?sort=name#top"), "/monitoring/list/hosts");
        assert_eq!(path("http://example.com/search?q=web"), "/search");
    }

    #[test]
    fn test_fragment() {
        assert_eq!(fragment("/doc/page#section-2"), Some("section-2"));
        assert_eq!(fragment("/doc/page"), None);
        assert_eq!(fragment("/doc/page#"), None);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/icingaweb/", "/dashboard"), "/icingaweb/dashboard");
        assert_eq!(join("", "/dashboard"), "/dashboard");
    }
}
