use crate::errors::InvalidArgument;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

const GENERATED_SALT_LENGTH: usize = 32;

/// The server-side secret used to sign the store's cookie.
///
/// It is never sent to the client. Anyone who knows it can forge cookies,
/// so it should be loaded from a secret management system and rotated
/// if it leaks.
#[derive(Clone, Eq)]
pub struct Salt(String);

impl PartialEq for Salt {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;

        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&"***").finish()
    }
}

impl Salt {
    /// Creates a new [`Salt`] from a secret string.
    ///
    /// Surrounding whitespace is trimmed. It fails if nothing is left.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tiramisu::Salt;
    ///
    /// assert!(Salt::new("  a secret  ").is_ok());
    /// assert!(Salt::new("   ").is_err());
    /// ```
    pub fn new<S: AsRef<str>>(raw: S) -> Result<Salt, InvalidArgument> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidArgument::new("Cookie salt value cannot be empty."));
        }
        Ok(Salt(trimmed.to_string()))
    }

    /// Generates a salt from a secure, random source.
    ///
    /// # Panics
    ///
    /// Panics if randomness cannot be retrieved from the operating system. See
    /// [`Salt::try_generate()`] for a non-panicking version.
    pub fn generate() -> Salt {
        Self::try_generate().expect("failed to generate `Salt` from randomness")
    }

    /// Attempts to generate a salt from a secure, random source.
    /// If randomness cannot be retrieved from the underlying operating system,
    /// returns `None`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tiramisu::Salt;
    ///
    /// let salt = Salt::try_generate().unwrap();
    /// // Persist it somewhere safe, then load it back with `Salt::new`.
    /// let reloaded = Salt::new(salt.expose_secret()).unwrap();
    /// assert_eq!(salt, reloaded);
    /// ```
    pub fn try_generate() -> Option<Salt> {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; GENERATED_SALT_LENGTH];
        rng.try_fill_bytes(&mut bytes).ok()?;
        Some(Salt(BASE64_URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Returns the secret, e.g. to persist a freshly generated salt.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}
