//! Configuration for a [`SignedCookieStore`].
//!
//! Check out the [`StoreConfig`] struct for more information.
//!
//! [`SignedCookieStore`]: crate::SignedCookieStore
use crate::SameSite;
use serde::{Deserialize, Deserializer};

/// Thirty days, in seconds.
pub const DEFAULT_TTL: u32 = 2_592_000;

/// `StoreConfig` specifies the attributes of the cookie that a
/// [`SignedCookieStore`] sends back to the client.
///
/// Every field has a default, so you only need to override what you care about:
///
/// ```rust
/// use tiramisu::config::StoreConfig;
/// use tiramisu::SameSite;
///
/// let config = StoreConfig::default()
///     .with_domain("example.com")
///     .with_secure(true)
///     .with_same_site(SameSite::Lax);
/// assert_eq!(config.ttl, 2_592_000);
/// assert_eq!(config.path.as_deref(), Some("/"));
/// assert!(config.http_only);
/// ```
///
/// `StoreConfig` can also be deserialized, e.g. from your application settings.
/// Missing fields fall back to their defaults.
///
/// [`SignedCookieStore`]: crate::SignedCookieStore
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct StoreConfig {
    /// How long, in seconds, the browser should keep the cookie around
    /// after each flush.
    ///
    /// By default, this field is set to 30 days.
    pub ttl: u32,
    /// The `Path` attribute. Omitted from the cookie if `None` or empty.
    ///
    /// By default, this field is `Some("/")`.
    pub path: Option<String>,
    /// The `Domain` attribute. Omitted from the cookie if `None` or empty.
    ///
    /// By default, this field is `None`.
    pub domain: Option<String>,
    /// Whether the cookie should be marked `Secure`.
    ///
    /// A cookie with `SameSite=None` is always marked `Secure`, since browsers
    /// reject it otherwise.
    ///
    /// By default, this field is `false`.
    pub secure: bool,
    /// Whether the cookie should be marked `HttpOnly`.
    ///
    /// By default, this field is `true`.
    #[serde(alias = "httponly")]
    pub http_only: bool,
    /// The `SameSite` attribute. Omitted from the cookie if `None`.
    ///
    /// When deserializing, the value is matched case-insensitively against
    /// `strict`, `lax` and `none`. Any other string leaves the attribute out.
    ///
    /// By default, this field is `Some(SameSite::Strict)`.
    #[serde(alias = "samesite", deserialize_with = "lenient_same_site")]
    pub same_site: Option<SameSite>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            ttl: DEFAULT_TTL,
            path: Some("/".to_string()),
            domain: None,
            secure: false,
            http_only: true,
            same_site: Some(SameSite::Strict),
        }
    }
}

impl StoreConfig {
    /// Set the lifetime of the cookie, in seconds.
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the `Path` attribute.
    pub fn with_path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Remove the `Path` attribute.
    pub fn without_path(mut self) -> Self {
        self.path = None;
        self
    }

    /// Set the `Domain` attribute.
    pub fn with_domain<D: Into<String>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Mark (or unmark) the cookie as `Secure`.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Mark (or unmark) the cookie as `HttpOnly`.
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set (or, with `None`, remove) the `SameSite` attribute.
    pub fn with_same_site<S: Into<Option<SameSite>>>(mut self, same_site: S) -> Self {
        self.same_site = same_site.into();
        self
    }

    /// The `Path` attribute, if it should be sent.
    pub(crate) fn effective_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }

    /// The `Domain` attribute, if it should be sent.
    pub(crate) fn effective_domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }
}

fn lenient_same_site<'de, D>(deserializer: D) -> Result<Option<SameSite>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match raw.parse() {
        Ok(same_site) => Some(same_site),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring the `SameSite` option");
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;
    use crate::SameSite;
    use googletest::prelude::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_that!(config, eq(StoreConfig::default()));

        let config: StoreConfig = serde_json::from_str(r#"{"ttl": 60, "secure": true}"#).unwrap();
        assert_that!(config.ttl, eq(60));
        assert!(config.secure);
        assert!(config.http_only);
        assert_that!(config.path.as_deref(), some(eq("/")));
    }

    #[test]
    fn legacy_option_names_are_accepted() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"httponly": false, "samesite": "lax"}"#).unwrap();
        assert!(!config.http_only);
        assert_that!(config.same_site, some(eq(SameSite::Lax)));
    }

    #[test]
    fn unknown_same_site_is_omitted() {
        let config: StoreConfig = serde_json::from_str(r#"{"same_site": "sometimes"}"#).unwrap();
        assert_that!(config.same_site, none());

        let config: StoreConfig = serde_json::from_str(r#"{"same_site": null}"#).unwrap();
        assert_that!(config.same_site, none());

        let config: StoreConfig = serde_json::from_str(r#"{"same_site": "NONE"}"#).unwrap();
        assert_that!(config.same_site, some(eq(SameSite::None)));
    }

    #[test]
    fn empty_path_and_domain_are_not_sent() {
        let config = StoreConfig::default().with_path("").with_domain("");
        assert_that!(config.effective_path(), none());
        assert_that!(config.effective_domain(), none());

        let config = StoreConfig::default().with_domain("example.com");
        assert_that!(config.effective_path(), some(eq("/")));
        assert_that!(config.effective_domain(), some(eq("example.com")));
    }
}
