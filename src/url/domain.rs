use url::Url;

/// Extracts the lowercase host from a URL string
///
/// Returns `None` when the string does not parse or has no host.
///
/// # Examples
///
/// ```
/// use linkwalk::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.com:8080/a"), Some("example.com".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        assert_eq!(
            extract_host("https://example.com/"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_extract_subdomain_ignores_port_and_path() {
        assert_eq!(
            extract_host("https://api.v2.example.com:8443/path?q=1#frag"),
            Some("api.v2.example.com".to_string())
        );
    }

    #[test]
    fn test_extract_ip_host() {
        assert_eq!(
            extract_host("http://127.0.0.1:3000/"),
            Some("127.0.0.1".to_string())
        );
    }

    #[test]
    fn test_no_host() {
        assert_eq!(extract_host("mailto:someone@example.com"), None);
        assert_eq!(extract_host(""), None);
    }
}
