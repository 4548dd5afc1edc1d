//! Target site addressing

use serde::{Deserialize, Serialize};

/// The site instance a page lives on, split around the base host
///
/// For `www.crunchyroll.com` the subdomain is `"www."` and the extension is
/// `".com"`; both keep their dots so they concatenate directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteTarget {
    #[serde(default)]
    pub subdomain: String,
    pub extension: String,
}

impl SiteTarget {
    pub fn new(subdomain: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            extension: extension.into(),
        }
    }

    /// Split a page hostname around `base_host`
    pub fn from_hostname(hostname: &str, base_host: &str) -> crate::Result<Self> {
        let needle = format!("{}.", base_host);
        let start = hostname.find(&needle).ok_or_else(|| {
            crate::Error::validation(
                "hostname",
                &format!("'{}' is not a {} host", hostname, base_host),
            )
        })?;

        Ok(Self {
            subdomain: hostname[..start].to_string(),
            extension: hostname[start + base_host.len()..].to_string(),
        })
    }

    /// Cookie domain, e.g. `www.crunchyroll.com`
    pub fn domain(&self, base_host: &str) -> String {
        format!("{}{}{}", self.subdomain, base_host, self.extension)
    }

    /// Cookie URL, e.g. `https://www.crunchyroll.com`
    pub fn origin(&self, base_host: &str) -> String {
        format!("https://{}", self.domain(base_host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("www.crunchyroll.com", "www.", ".com")]
    #[case("crunchyroll.com", "", ".com")]
    #[case("beta.crunchyroll.co.uk", "beta.", ".co.uk")]
    fn test_from_hostname(#[case] host: &str, #[case] subdomain: &str, #[case] extension: &str) {
        let target = SiteTarget::from_hostname(host, "crunchyroll").unwrap();
        assert_eq!(target.subdomain, subdomain);
        assert_eq!(target.extension, extension);
        assert_eq!(target.domain("crunchyroll"), host);
    }

    #[test]
    fn test_from_foreign_hostname_fails() {
        assert!(SiteTarget::from_hostname("example.com", "crunchyroll").is_err());
    }

    #[test]
    fn test_origin() {
        let target = SiteTarget::new("www.", ".com");
        assert_eq!(target.origin("crunchyroll"), "https://www.crunchyroll.com");
    }
}
