use crate::ResponseCookie;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A cookie that, when sent to the client, removes the store's cookie from the
/// client's machine.
///
/// It carries the same `Path` and `Domain` as the cookie it removes: browsers
/// only drop a cookie if both match.
///
/// It's what [`SignedCookieStore::destroy`] hands to [`Transport::expire_cookie`].
///
/// [`SignedCookieStore::destroy`]: crate::SignedCookieStore::destroy
/// [`Transport::expire_cookie`]: crate::Transport::expire_cookie
pub struct RemovalCookie<'c> {
    /// The cookie's name.
    pub(crate) name: Cow<'c, str>,
    /// The cookie's domain, if any.
    pub(crate) domain: Option<Cow<'c, str>>,
    /// The cookie's path, if any.
    pub(crate) path: Option<Cow<'c, str>>,
}

impl<'c> RemovalCookie<'c> {
    /// Creates a new [`RemovalCookie`] with the given name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tiramisu::RemovalCookie;
    ///
    /// let removal = RemovalCookie::new("name")
    ///     .set_path("/");
    /// assert_eq!(removal.name(), "name");
    /// assert_eq!(removal.path(), Some("/"));
    /// assert_eq!(removal.domain(), None);
    /// ```
    pub fn new<N>(name: N) -> Self
    where
        N: Into<Cow<'c, str>>,
    {
        Self {
            name: name.into(),
            domain: None,
            path: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[inline]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn set_path<P: Into<Cow<'c, str>>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn set_domain<D: Into<Cow<'c, str>>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

impl<'c> From<RemovalCookie<'c>> for ResponseCookie<'c> {
    fn from(value: RemovalCookie<'c>) -> Self {
        let mut c = ResponseCookie::new(value.name, "");
        if let Some(domain) = value.domain {
            c = c.set_domain(domain);
        }
        if let Some(path) = value.path {
            c = c.set_path(path);
        }
        // A date in the past to ensure the client removes the cookie.
        c.set_expires(time::OffsetDateTime::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use crate::{RemovalCookie, ResponseCookie};

    #[test]
    fn renders_an_expired_cookie() {
        let removal = RemovalCookie::new("prefs").set_path("/").set_domain("example.com");
        let cookie: ResponseCookie = removal.into();
        assert_eq!(
            cookie.to_string(),
            "prefs=; Path=/; Domain=example.com; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }
}
