use crate::url::domain::extract_host;
use crate::UrlError;

/// A host allow-list entry
///
/// Two forms are supported:
/// 1. Exact: `example.com` matches only `example.com`
/// 2. Wildcard: `*.example.com` matches `example.com` and any subdomain
///    (`blog.example.com`, `api.v2.example.com`)
///
/// Patterns are stored lowercase; hosts are lowercased before matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPattern {
    base: String,
    wildcard: bool,
}

impl DomainPattern {
    /// Parses a domain pattern
    ///
    /// # Examples
    ///
    /// ```
    /// use linkwalk::url::DomainPattern;
    ///
    /// let pattern = DomainPattern::parse("*.example.com").unwrap();
    /// assert!(pattern.matches_host("blog.example.com"));
    /// assert!(!pattern.matches_host("example.org"));
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, UrlError> {
        let pattern = pattern.trim().to_lowercase();
        let (base, wildcard) = match pattern.strip_prefix("*.") {
            Some(base) => (base.to_string(), true),
            None => (pattern, false),
        };

        if base.is_empty() {
            return Err(UrlError::InvalidPattern("pattern cannot be empty".to_string()));
        }

        if !base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(UrlError::InvalidPattern(format!(
                "'{}' contains invalid characters",
                base
            )));
        }

        if base.starts_with('.')
            || base.ends_with('.')
            || base.starts_with('-')
            || base.ends_with('-')
            || base.contains("..")
        {
            return Err(UrlError::InvalidPattern(format!(
                "'{}' is not a valid host name",
                base
            )));
        }

        Ok(Self { base, wildcard })
    }

    /// Checks a bare host against the pattern
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        if self.wildcard {
            host == self.base || host.ends_with(&format!(".{}", self.base))
        } else {
            host == self.base
        }
    }

    /// Checks the host of a URL string against the pattern
    ///
    /// Unparseable URLs and URLs without a host never match.
    pub fn matches_url(&self, url: &str) -> bool {
        extract_host(url).map_or(false, |host| self.matches_host(&host))
    }
}

impl std::fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.wildcard {
            write!(f, "*.{}", self.base)
        } else {
            f.write_str(&self.base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern() {
        let pattern = DomainPattern::parse("example.com").unwrap();
        assert!(pattern.matches_host("example.com"));
        assert!(pattern.matches_host("EXAMPLE.com"));
        assert!(!pattern.matches_host("blog.example.com"));
        assert!(!pattern.matches_host("other.com"));
    }

    #[test]
    fn test_wildcard_pattern() {
        let pattern = DomainPattern::parse("*.example.com").unwrap();
        assert!(pattern.matches_host("example.com"));
        assert!(pattern.matches_host("blog.example.com"));
        assert!(pattern.matches_host("deep.nested.example.com"));
        assert!(!pattern.matches_host("myexample.com"));
        assert!(!pattern.matches_host("example.com.org"));
    }

    #[test]
    fn test_matches_url() {
        let pattern = DomainPattern::parse("127.0.0.1").unwrap();
        assert!(pattern.matches_url("http://127.0.0.1:9000/page"));
        assert!(!pattern.matches_url("http://localhost:9000/page"));
        assert!(!pattern.matches_url("not a url"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(DomainPattern::parse("").is_err());
        assert!(DomainPattern::parse("*.").is_err());
        assert!(DomainPattern::parse(".example.com").is_err());
        assert!(DomainPattern::parse("example..com").is_err());
        assert!(DomainPattern::parse("exa mple.com").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(
            DomainPattern::parse("*.Example.com").unwrap().to_string(),
            "*.example.com"
        );
        assert_eq!(DomainPattern::parse("localhost").unwrap().to_string(), "localhost");
    }
}
