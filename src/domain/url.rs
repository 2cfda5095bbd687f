use url::Url;

use crate::errors::AnalysisError;

/// A validated, canonical absolute URL.
///
/// Every analysis is keyed by this form, so two spellings of the same
/// address (`Example.com/`, `https://www.example.com`) land on one cache
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Canonicalize a user-supplied string into a fetchable absolute URL.
    ///
    /// Missing schemes default to `https://`. The `www.` prefix, fragment
    /// and a bare trailing slash are dropped. Fails when no plausible host
    /// is present.
    pub fn parse(raw: &str) -> Result<Self, AnalysisError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AnalysisError::InvalidUrl("URL is empty".to_string()));
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else if trimmed.contains("://") {
            return Err(AnalysisError::InvalidUrl(format!(
                "Unsupported scheme in {}",
                trimmed
            )));
        } else {
            format!("https://{}", trimmed)
        };

        let parsed = Url::parse(&with_scheme)
            .map_err(|e| AnalysisError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| AnalysisError::InvalidUrl(format!("No host in {}", trimmed)))?;
        let host = host.strip_prefix("www.").unwrap_or(host).to_lowercase();

        if !is_valid_host(&host) {
            return Err(AnalysisError::InvalidUrl(format!(
                "No valid host segment in {}",
                trimmed
            )));
        }

        let mut canonical = format!("{}://{}", parsed.scheme(), host);
        if let Some(port) = parsed.port() {
            canonical.push_str(&format!(":{}", port));
        }

        let path = parsed.path().trim_end_matches('/');
        canonical.push_str(path);

        if let Some(query) = parsed.query() {
            if !query.is_empty() {
                canonical.push('?');
                canonical.push_str(query);
            }
        }

        Ok(NormalizedUrl(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A host is valid when it is an IP literal or a dotted domain whose labels
/// are alphanumeric-with-hyphens. Single-label names like `localhost` are
/// rejected, matching the permissive-but-not-anything input pattern.
fn is_valid_host(host: &str) -> bool {
    if host.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    // TLD must be at least two characters
    if labels.last().map_or(true, |tld| tld.len() < 2) {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::NormalizedUrl;

    #[test]
    fn bare_hostname_gets_https_scheme() {
        let url = NormalizedUrl::parse("example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com");
    }

    #[test]
    fn explicit_http_scheme_is_preserved() {
        let url = NormalizedUrl::parse("http://example.com/about").unwrap();
        assert_eq!(url.as_str(), "http://example.com/about");
    }

    #[test]
    fn www_prefix_and_trailing_slash_are_stripped() {
        let url = NormalizedUrl::parse("https://www.Example.com/").unwrap();
        assert_eq!(url.as_str(), "https://example.com");
    }

    #[test]
    fn path_query_kept_fragment_dropped() {
        let url = NormalizedUrl::parse("example.com/blog/post?page=2#top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/blog/post?page=2");
    }

    #[test]
    fn ip_literal_with_port_is_accepted() {
        let url = NormalizedUrl::parse("http://127.0.0.1:8080/index.html").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/index.html");
    }

    #[test]
    fn inputs_without_a_host_are_rejected() {
        for bad in ["", "   ", "not a url", "https://", "ftp://example.com", "localhost"] {
            assert!(NormalizedUrl::parse(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn hyphenated_domains_are_valid() {
        let url = NormalizedUrl::parse("my-shop.co.uk").unwrap();
        assert_eq!(url.as_str(), "https://my-shop.co.uk");
    }
}
