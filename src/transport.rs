use crate::encoding::encode;
use crate::{RemovalCookie, RequestCookies, ResponseCookie};

/// The bridge between a [`SignedCookieStore`] and the HTTP layer.
///
/// A store reads the incoming cookie once, when it's created, and writes
/// at most once per flush.
/// Writes report failures with a boolean: they must not panic.
///
/// You can use [`HeaderTransport`] if your framework gives you access to the raw
/// `Cookie` header and lets you set `Set-Cookie` headers, or implement this trait
/// on top of your framework's own cookie jar.
///
/// [`SignedCookieStore`]: crate::SignedCookieStore
pub trait Transport {
    /// Returns the raw value of the cookie named `name` sent by the client, if any.
    fn read_incoming_cookie(&self, name: &str) -> Option<String>;

    /// Queues `cookie` to be sent to the client.
    /// Returns `false` if the cookie could not be set.
    fn write_cookie(&mut self, cookie: ResponseCookie<'static>) -> bool;

    /// Asks the client to delete the cookie described by `cookie`.
    /// Returns `false` if the removal could not be queued.
    fn expire_cookie(&mut self, cookie: RemovalCookie<'static>) -> bool;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_incoming_cookie(&self, name: &str) -> Option<String> {
        (**self).read_incoming_cookie(name)
    }

    fn write_cookie(&mut self, cookie: ResponseCookie<'static>) -> bool {
        (**self).write_cookie(cookie)
    }

    fn expire_cookie(&mut self, cookie: RemovalCookie<'static>) -> bool {
        (**self).expire_cookie(cookie)
    }
}

/// A [`Transport`] that works with raw header values.
///
/// Incoming cookies are parsed out of the request's `Cookie` header(s).
/// Outgoing cookies are collected in order, ready to be turned into
/// `Set-Cookie` header values via [`HeaderTransport::header_values`].
///
/// # Example
///
/// ```rust
/// use tiramisu::{HeaderTransport, Transport, ResponseCookie};
///
/// let mut transport = HeaderTransport::from_request_header("prefs=abc; other=1");
/// assert_eq!(transport.read_incoming_cookie("prefs").as_deref(), Some("abc"));
///
/// transport.write_cookie(ResponseCookie::new("prefs", "xyz").set_path("/"));
/// let headers: Vec<String> = transport.header_values().collect();
/// assert_eq!(headers, vec!["prefs=xyz; Path=/".to_string()]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct HeaderTransport<'h> {
    incoming: RequestCookies<'h>,
    outgoing: Vec<ResponseCookie<'static>>,
}

impl<'h> HeaderTransport<'h> {
    /// A transport for a request that carried no cookies.
    pub fn new() -> Self {
        Default::default()
    }

    /// A transport for a request with a single `Cookie` header.
    pub fn from_request_header(header: &'h str) -> Self {
        Self::from_request_headers(std::iter::once(header))
    }

    /// A transport for a request with zero or more `Cookie` headers.
    ///
    /// Malformed fragments are skipped, see [`RequestCookies::extend_from_header`].
    pub fn from_request_headers<I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'h str>,
    {
        let mut incoming = RequestCookies::new();
        for header in headers {
            incoming.extend_from_header(header);
        }
        HeaderTransport {
            incoming,
            outgoing: vec![],
        }
    }

    /// The cookies queued so far, in the order they were written.
    pub fn outgoing(&self) -> &[ResponseCookie<'static>] {
        &self.outgoing
    }

    /// The `Set-Cookie` header values for the queued cookies.
    /// Names and values are percent-encoded.
    pub fn header_values(&self) -> impl Iterator<Item = String> + '_ {
        self.outgoing.iter().map(|cookie| {
            let name = encode(cookie.name()).to_string();
            let value = encode(cookie.value()).to_string();
            cookie.clone().set_name(name).set_value(value).to_string()
        })
    }
}

impl<'h> Transport for HeaderTransport<'h> {
    fn read_incoming_cookie(&self, name: &str) -> Option<String> {
        self.incoming.get(name).map(ToOwned::to_owned)
    }

    fn write_cookie(&mut self, cookie: ResponseCookie<'static>) -> bool {
        self.outgoing.push(cookie);
        true
    }

    fn expire_cookie(&mut self, cookie: RemovalCookie<'static>) -> bool {
        self.outgoing.push(cookie.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{HeaderTransport, Transport};
    use crate::{RemovalCookie, ResponseCookie};

    #[test]
    fn reads_percent_decoded_cookies() {
        let transport = HeaderTransport::from_request_headers(["a=1; my%20prefs=x%3By", "b=2"]);
        assert_eq!(transport.read_incoming_cookie("my prefs").as_deref(), Some("x;y"));
        assert_eq!(transport.read_incoming_cookie("b").as_deref(), Some("2"));
        assert_eq!(transport.read_incoming_cookie("c"), None);
        assert_eq!(HeaderTransport::new().read_incoming_cookie("a"), None);
    }

    #[test]
    fn malformed_fragments_do_not_hide_other_cookies() {
        for header in [
            "legacyflag; prefs=abc",
            "x=%FF; prefs=abc",
            "=v; prefs=abc",
            "prefs=abc; yo",
        ] {
            let transport = HeaderTransport::from_request_header(header);
            assert_eq!(
                transport.read_incoming_cookie("prefs").as_deref(),
                Some("abc"),
                "Failed for header: `{header}`"
            );
        }
    }

    #[test]
    fn collects_outgoing_cookies_in_order() {
        let mut transport = HeaderTransport::new();
        assert!(transport.expire_cookie(RemovalCookie::new("prefs").set_path("/")));
        assert!(transport.write_cookie(ResponseCookie::new("my prefs", "a;b")));
        assert_eq!(transport.outgoing().len(), 2);

        let headers: Vec<_> = transport.header_values().collect();
        assert_eq!(
            headers,
            vec![
                "prefs=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT".to_string(),
                "my%20prefs=a%3Bb".to_string(),
            ]
        );
    }

    #[test]
    fn works_through_a_mutable_reference() {
        fn write<T: Transport>(mut transport: T) -> bool {
            transport.write_cookie(ResponseCookie::new("a", "b"))
        }

        let mut transport = HeaderTransport::new();
        assert!(write(&mut transport));
        assert_eq!(transport.outgoing().len(), 1);
    }
}
