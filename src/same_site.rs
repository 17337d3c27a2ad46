use std::fmt;
use std::str::FromStr;

/// The `SameSite` attribute attached to the store's cookie.
///
/// If the `SameSite` attribute is "Strict", the cookie is never sent in
/// cross-site requests.
/// If it is "Lax", the cookie is only sent in cross-site requests with "safe"
/// HTTP methods, i.e. `GET`, `HEAD`, `OPTIONS`, `TRACE`.
/// If it is "None", the cookie is sent in all cross-site requests, but browsers
/// will ignore it unless the `Secure` flag is set as well.
///
/// The store defaults to [`SameSite::Strict`].
///
/// # Parsing
///
/// `SameSite` can be parsed, case-insensitively, from `"strict"`, `"lax"` or `"none"`:
///
/// ```rust
/// use tiramisu::SameSite;
///
/// assert_eq!("LAX".parse::<SameSite>().unwrap(), SameSite::Lax);
/// assert!("sometimes".parse::<SameSite>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum SameSite {
    /// The "Strict" `SameSite` attribute.
    #[default]
    Strict,
    /// The "Lax" `SameSite` attribute.
    Lax,
    /// The "None" `SameSite` attribute.
    None,
}

impl SameSite {
    /// Returns the `SameSite` attribute as a string slice.
    pub fn as_str(&self) -> &'static str {
        match *self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameSite {
    type Err = UnknownSameSiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("strict") {
            Ok(SameSite::Strict)
        } else if s.eq_ignore_ascii_case("lax") {
            Ok(SameSite::Lax)
        } else if s.eq_ignore_ascii_case("none") {
            Ok(SameSite::None)
        } else {
            Err(UnknownSameSiteError {
                raw: s.to_string(),
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("`{raw}` is not a valid `SameSite` value. Expected one of `strict`, `lax` or `none`")]
/// The error returned when parsing a [`SameSite`] out of an unknown string.
pub struct UnknownSameSiteError {
    raw: String,
}

#[cfg(test)]
mod tests {
    use super::SameSite;
    use googletest::prelude::*;

    #[test]
    fn parsing_is_case_insensitive() {
        for (raw, expected) in [
            ("strict", SameSite::Strict),
            ("Strict", SameSite::Strict),
            ("LAX", SameSite::Lax),
            ("lAx", SameSite::Lax),
            ("none", SameSite::None),
            (" None ", SameSite::None),
        ] {
            let parsed: SameSite = raw.parse().unwrap();
            assert_that!(parsed, eq(expected));
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        let err = "sometimes".parse::<SameSite>().unwrap_err();
        assert_that!(
            err.to_string(),
            eq("`sometimes` is not a valid `SameSite` value. Expected one of `strict`, `lax` or `none`")
        );
        assert!("".parse::<SameSite>().is_err());
    }
}
