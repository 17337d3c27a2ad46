use std::borrow::Cow;
use std::collections::HashMap;

use anyhow::Context;
use percent_encoding::percent_decode;

#[derive(Default, Debug, Clone)]
/// The cookies attached to an HTTP request using the `Cookie` header.
///
/// Names and values are percent-decoded.
/// If the same name appears more than once, the first value wins.
pub struct RequestCookies<'cookie> {
    cookies: HashMap<Cow<'cookie, str>, Cow<'cookie, str>>,
}

impl<'cookie> RequestCookies<'cookie> {
    /// Creates a new, empty [`RequestCookies`] map.
    pub fn new() -> RequestCookies<'cookie> {
        Default::default()
    }

    /// Get the value of a cookie by name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tiramisu::RequestCookies;
    ///
    /// let mut cookies = RequestCookies::new();
    /// cookies.extend_from_header("name=value1; broken; name=value2");
    /// assert_eq!(cookies.get("name"), Some("value1"));
    /// assert_eq!(cookies.get("other"), None);
    /// ```
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|v| v.as_ref())
    }

    /// Parse a `Cookie` header value and add its cookies to `self`.
    ///
    /// The client controls this header, and other applications on the same domain
    /// can set cookies we know nothing about: a fragment that can't be parsed is
    /// skipped, it doesn't invalidate the rest of the header.
    pub fn extend_from_header(&mut self, header: &'cookie str) {
        for fragment in header.split(';') {
            match parse_fragment(fragment) {
                Ok(Some((name, value))) => {
                    self.cookies.entry(name).or_insert(value);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(
                        error = &e as &(dyn std::error::Error + 'static),
                        "Skipping a malformed fragment of the `Cookie` header"
                    );
                }
            }
        }
    }
}

/// Parses a single `name=value` fragment of a `Cookie` header.
///
/// Returns `Ok(None)` for blank fragments.
fn parse_fragment(fragment: &str) -> Result<Option<(Cow<'_, str>, Cow<'_, str>)>, ParseError> {
    if fragment.chars().all(char::is_whitespace) {
        return Ok(None);
    }

    let (name, value) = match fragment.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => {
            let e = MissingPairError {
                fragment: fragment.to_string(),
            };
            return Err(ParseError::MissingPair(e));
        }
    };

    if name.is_empty() {
        let e = EmptyNameError {
            value: value.to_string(),
        };
        return Err(ParseError::EmptyName(e));
    }

    let decoded_name = percent_decode(name.as_bytes())
        .decode_utf8()
        .context("Failed to percent-decode the cookie name")
        .map_err(|e| ParseError::Decoding(DecodingError { source: e }))?;
    let decoded_value = percent_decode(value.as_bytes())
        .decode_utf8()
        .with_context(|| {
            format!("Failed to percent-decode the value of the `{decoded_name}` cookie: `{value}`")
        })
        .map_err(|e| ParseError::Decoding(DecodingError { source: e }))?;

    Ok(Some((decoded_name, decoded_value)))
}

#[derive(Debug, thiserror::Error)]
/// The reason a fragment of a `Cookie` header was skipped.
pub(crate) enum ParseError {
    #[error("Failed to parse a cookie out of a header value")]
    MissingPair(#[source] MissingPairError),
    #[error("Failed to parse a cookie out of a header value")]
    EmptyName(#[source] EmptyNameError),
    #[error("Failed to parse a cookie out of a header value")]
    Decoding(#[source] DecodingError),
}

#[derive(Debug, thiserror::Error)]
#[error("Expected a name-value pair, but no `=` was found in `{fragment}`")]
pub(crate) struct MissingPairError {
    fragment: String,
}

#[derive(Debug, thiserror::Error)]
#[error("The name of a cookie cannot be empty, but found an empty name with `{value}` as value")]
pub(crate) struct EmptyNameError {
    value: String,
}

#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub(crate) struct DecodingError {
    source: anyhow::Error,
}
