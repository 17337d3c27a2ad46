use crate::SameSite;
use std::borrow::Cow;
use std::fmt;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// The cookie that a [`SignedCookieStore`] hands to its [`Transport`] when flushing.
///
/// It carries the encoded value of the store together with the attributes
/// derived from its [`StoreConfig`].
/// Its [`Display`](fmt::Display) implementation renders a `Set-Cookie` header value.
///
/// ```rust
/// use tiramisu::{ResponseCookie, SameSite};
///
/// let cookie = ResponseCookie::new("name", "value")
///     .set_path("/")
///     .set_http_only(true)
///     .set_same_site(SameSite::Strict);
/// assert_eq!(cookie.to_string(), "name=value; HttpOnly; SameSite=Strict; Path=/");
/// ```
///
/// [`SignedCookieStore`]: crate::SignedCookieStore
/// [`Transport`]: crate::Transport
/// [`StoreConfig`]: crate::config::StoreConfig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie<'c> {
    /// The cookie's name.
    pub(crate) name: Cow<'c, str>,
    /// The cookie's value.
    pub(crate) value: Cow<'c, str>,
    /// The cookie's expiration, if any.
    pub(crate) expires: Option<OffsetDateTime>,
    /// The cookie's domain, if any.
    pub(crate) domain: Option<Cow<'c, str>>,
    /// The cookie's path, if any.
    pub(crate) path: Option<Cow<'c, str>>,
    /// Whether this cookie was marked Secure.
    pub(crate) secure: Option<bool>,
    /// Whether this cookie was marked HttpOnly.
    pub(crate) http_only: Option<bool>,
    pub(crate) same_site: Option<SameSite>,
}

impl<'c> ResponseCookie<'c> {
    /// Creates a new [`ResponseCookie`] with the given name and value, and no attributes.
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<Cow<'c, str>>,
        V: Into<Cow<'c, str>>,
    {
        ResponseCookie {
            name: name.into(),
            value: value.into(),
            expires: None,
            domain: None,
            path: None,
            secure: None,
            http_only: None,
            same_site: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    #[inline]
    pub fn value(&self) -> &str {
        self.value.as_ref()
    }

    #[inline]
    pub fn http_only(&self) -> Option<bool> {
        self.http_only
    }

    #[inline]
    pub fn secure(&self) -> Option<bool> {
        self.secure
    }

    #[inline]
    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the `Domain` of the cookie, if one was specified.
    ///
    /// A leading `.` is stripped.
    ///
    /// ```
    /// use tiramisu::ResponseCookie;
    ///
    /// let c = ResponseCookie::new("name", "value").set_domain(".crates.io");
    /// assert_eq!(c.domain(), Some("crates.io"));
    /// ```
    #[inline]
    pub fn domain(&self) -> Option<&str> {
        match self.domain {
            Some(ref c) => {
                let domain = c.as_ref();
                domain.strip_prefix('.').or(Some(domain))
            }
            None => None,
        }
    }

    #[inline]
    pub fn expires(&self) -> Option<OffsetDateTime> {
        self.expires
    }

    pub fn set_name<N: Into<Cow<'c, str>>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_value<V: Into<Cow<'c, str>>>(mut self, value: V) -> Self {
        self.value = value.into();
        self
    }

    pub fn set_http_only<T: Into<Option<bool>>>(mut self, value: T) -> Self {
        self.http_only = value.into();
        self
    }

    pub fn set_secure<T: Into<Option<bool>>>(mut self, value: T) -> Self {
        self.secure = value.into();
        self
    }

    /// Sets the `SameSite` attribute.
    ///
    /// A cookie with `SameSite=None` is rendered with the `Secure` flag unless
    /// `secure` was explicitly set to `false`.
    pub fn set_same_site<T: Into<Option<SameSite>>>(mut self, value: T) -> Self {
        self.same_site = value.into();
        self
    }

    pub fn set_path<P: Into<Cow<'c, str>>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn set_domain<D: Into<Cow<'c, str>>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn set_expires<T: Into<Option<OffsetDateTime>>>(mut self, time: T) -> Self {
        self.expires = time.into();
        self
    }

    fn fmt_parameters(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(true) = self.http_only() {
            write!(f, "; HttpOnly")?;
        }

        if let Some(same_site) = self.same_site() {
            write!(f, "; SameSite={}", same_site)?;
        }

        if self.secure() == Some(true)
            || self.secure().is_none() && self.same_site() == Some(SameSite::None)
        {
            write!(f, "; Secure")?;
        }

        if let Some(path) = self.path() {
            write!(f, "; Path={}", path)?;
        }

        if let Some(domain) = self.domain() {
            write!(f, "; Domain={}", domain)?;
        }

        if let Some(time) = self.expires() {
            let time = time.to_offset(UtcOffset::UTC);

            // From http://tools.ietf.org/html/rfc2616#section-3.3.1.
            static FMT1: &[FormatItem<'_>] = format_description!("[weekday repr:short], [day] [month repr:short] [year padding:none] [hour]:[minute]:[second] GMT");
            write!(
                f,
                "; Expires={}",
                time.format(&FMT1).map_err(|_| fmt::Error)?
            )?;
        }

        Ok(())
    }
}

impl<'c> fmt::Display for ResponseCookie<'c> {
    /// Formats the cookie `self` as a `Set-Cookie` header value.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.name(), self.value())?;
        self.fmt_parameters(f)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ResponseCookie, SameSite};
    use time::{Date, Month, OffsetDateTime};

    #[test]
    fn format() {
        let cookie = ResponseCookie::new("foo", "bar");
        assert_eq!(&cookie.to_string(), "foo=bar");

        let cookie = ResponseCookie::new("foo", "bar").set_http_only(true);
        assert_eq!(&cookie.to_string(), "foo=bar; HttpOnly");

        let cookie = ResponseCookie::new("foo", "bar").set_http_only(false);
        assert_eq!(&cookie.to_string(), "foo=bar");

        let cookie = ResponseCookie::new("foo", "bar").set_secure(true);
        assert_eq!(&cookie.to_string(), "foo=bar; Secure");

        let cookie = ResponseCookie::new("foo", "bar").set_path("/");
        assert_eq!(&cookie.to_string(), "foo=bar; Path=/");

        let cookie = ResponseCookie::new("foo", "bar").set_domain("www.rust-lang.org");
        assert_eq!(&cookie.to_string(), "foo=bar; Domain=www.rust-lang.org");

        let cookie = ResponseCookie::new("foo", "bar").set_domain(".rust-lang.org");
        assert_eq!(&cookie.to_string(), "foo=bar; Domain=rust-lang.org");

        let expires = OffsetDateTime::new_in_offset(
            Date::from_calendar_date(2015, Month::October, 21).unwrap(),
            time::macros::time!(07:28:00),
            time::UtcOffset::UTC,
        );
        let cookie = ResponseCookie::new("foo", "bar").set_expires(expires);
        assert_eq!(
            &cookie.to_string(),
            "foo=bar; Expires=Wed, 21 Oct 2015 07:28:00 GMT"
        );

        let cookie = ResponseCookie::new("foo", "bar").set_same_site(SameSite::Strict);
        assert_eq!(&cookie.to_string(), "foo=bar; SameSite=Strict");

        let cookie = ResponseCookie::new("foo", "bar").set_same_site(SameSite::Lax);
        assert_eq!(&cookie.to_string(), "foo=bar; SameSite=Lax");

        let cookie = ResponseCookie::new("foo", "bar").set_same_site(SameSite::None);
        assert_eq!(&cookie.to_string(), "foo=bar; SameSite=None; Secure");

        let mut c = ResponseCookie::new("foo", "bar")
            .set_same_site(SameSite::None)
            .set_secure(false);
        assert_eq!(&c.to_string(), "foo=bar; SameSite=None");
        c = c.set_secure(true);
        assert_eq!(&c.to_string(), "foo=bar; SameSite=None; Secure");
    }

    #[test]
    fn all_attributes() {
        let cookie = ResponseCookie::new("prefs", "abc")
            .set_http_only(true)
            .set_secure(true)
            .set_same_site(SameSite::Strict)
            .set_path("/")
            .set_domain("example.com")
            .set_expires(OffsetDateTime::UNIX_EPOCH);
        assert_eq!(
            &cookie.to_string(),
            "prefs=abc; HttpOnly; SameSite=Strict; Secure; Path=/; Domain=example.com; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }
}
