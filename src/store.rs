use crate::clock::{Clock, SystemClock};
use crate::codec::{self, Entries, Entry};
use crate::config::StoreConfig;
use crate::crypto::signing::SigningKey;
use crate::{CookieValue, IntoCookieValue, RemovalCookie, ResponseCookie, Salt, Transport};
use std::borrow::Cow;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Many values, a single signed cookie.
///
/// A `SignedCookieStore` is created at the beginning of a request: it reads
/// the store's cookie from the [`Transport`], verifies its signature and decodes
/// the entries it contains.
/// Each entry has its own, optional, expiry.
///
/// You can then read and modify the entries. Modifications are staged in memory
/// and written back, as a single re-signed cookie, when the store is flushed:
/// either explicitly, via [`SignedCookieStore::flush`], or automatically when
/// the store goes out of scope.
/// Nothing is written if nothing changed.
///
/// # Tampering
///
/// The cookie is signed with HMAC-SHA256, using a key derived from the salt.
/// A cookie that fails to decode or verify is discarded: the store starts empty
/// and the cookie is overwritten on the next flush.
/// Values are **not** encrypted: the client can read them.
///
/// # Expired entries
///
/// Expiry is checked lazily. [`has`](Self::has), [`get`](Self::get) and
/// [`all`](Self::all) remove the expired entries they come across, which
/// marks the store as modified even though they look like read-only accessors.
///
/// # Example
///
/// ```rust
/// use tiramisu::config::StoreConfig;
/// use tiramisu::{HeaderTransport, SignedCookieStore};
///
/// let mut transport = HeaderTransport::new();
/// {
///     let mut store =
///         SignedCookieStore::new("prefs", "a secret salt", StoreConfig::default(), &mut transport)
///             .unwrap();
///     assert!(store.all().is_empty());
///     store.set("theme", "dark", None).unwrap();
///     // Flushed when `store` goes out of scope.
/// }
/// let set_cookie = transport.header_values().next().unwrap();
/// assert!(set_cookie.starts_with("prefs="));
/// ```
pub struct SignedCookieStore<T: Transport> {
    name: String,
    key: SigningKey,
    config: StoreConfig,
    entries: Entries,
    /// `true` iff `entries` changed since the last flush.
    dirty: bool,
    transport: T,
    clock: Box<dyn Clock>,
}

impl<T: Transport> std::fmt::Debug for SignedCookieStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCookieStore")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("entries", &self.entries)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> SignedCookieStore<T> {
    /// Creates a store backed by the cookie named `name`, using the system clock.
    ///
    /// `name` and `salt` are trimmed. It fails if either is empty.
    pub fn new<N, S>(
        name: N,
        salt: S,
        config: StoreConfig,
        transport: T,
    ) -> Result<Self, InvalidArgument>
    where
        N: AsRef<str>,
        S: AsRef<str>,
    {
        Self::with_clock(name, salt, config, transport, SystemClock)
    }

    /// Like [`SignedCookieStore::new`], but with a custom [`Clock`].
    pub fn with_clock<N, S, C>(
        name: N,
        salt: S,
        config: StoreConfig,
        transport: T,
        clock: C,
    ) -> Result<Self, InvalidArgument>
    where
        N: AsRef<str>,
        S: AsRef<str>,
        C: Clock + 'static,
    {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(InvalidArgument::new("Cookie name cannot be empty."));
        }
        let salt = Salt::new(salt)?;
        let mut store = SignedCookieStore {
            name: name.to_string(),
            key: SigningKey::derive(&salt),
            config,
            entries: Entries::new(),
            dirty: false,
            transport,
            clock: Box::new(clock),
        };
        store.load();
        Ok(store)
    }

    fn load(&mut self) {
        let Some(raw) = self.transport.read_incoming_cookie(&self.name) else {
            return;
        };
        if raw.trim().is_empty() {
            return;
        }
        match codec::decode(&raw, &self.key, &self.name) {
            Ok(entries) => {
                self.entries = entries;
            }
            Err(e) => {
                tracing::debug!(
                    cookie = %self.name,
                    error = &e as &(dyn std::error::Error + 'static),
                    "Discarding the incoming cookie"
                );
                // Any undecodable cookie, not only a forged signature, is
                // replaced on the next flush.
                self.dirty = true;
            }
        }
    }

    fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Removes `key` if it has expired.
    fn sweep(&mut self, key: &str) {
        let now = self.now();
        if self.entries.get(key).is_some_and(|e| e.is_expired(now)) {
            self.entries.remove(key);
            self.dirty = true;
        }
    }

    fn expiry(&self, ttl: Option<i64>) -> Result<Option<i64>, InvalidArgument> {
        let Some(ttl) = ttl else {
            return Ok(None);
        };
        let ttl = ttl.unsigned_abs();
        if ttl == 0 {
            return Err(InvalidArgument::new("ttl must be null or positive"));
        }
        let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
        Ok(Some(self.now().saturating_add(ttl)))
    }

    fn entry<K, V>(
        key: K,
        value: V,
        expires_at: Option<i64>,
    ) -> Result<(String, Entry), InvalidArgument>
    where
        K: Into<String>,
        V: IntoCookieValue,
    {
        let key = key.into();
        if key.is_empty() {
            return Err(InvalidArgument::new("Cookie key cannot be empty."));
        }
        let value = value.into_cookie_value()?;
        Ok((key, Entry { value, expires_at }))
    }

    /// The (trimmed) name of the cookie backing this store.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns `true` if the store has changes that haven't been flushed yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Returns `true` if `key` is in the store and hasn't expired.
    ///
    /// An expired entry is removed.
    pub fn has(&mut self, key: &str) -> bool {
        self.sweep(key);
        self.entries.contains_key(key)
    }

    /// Returns the value stored under `key`, unless it's missing or expired.
    ///
    /// An expired entry is removed.
    pub fn get(&mut self, key: &str) -> Option<CookieValue> {
        self.sweep(key);
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Like [`SignedCookieStore::get`], falling back to `default`.
    pub fn get_or<D: Into<CookieValue>>(&mut self, key: &str, default: D) -> CookieValue {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Returns the value stored under `key`, if any, and removes it from the store.
    pub fn pull(&mut self, key: &str) -> Option<CookieValue> {
        let value = self.get(key);
        self.remove([key]);
        value
    }

    /// Like [`SignedCookieStore::pull`], falling back to `default`.
    pub fn pull_or<D: Into<CookieValue>>(&mut self, key: &str, default: D) -> CookieValue {
        self.pull(key).unwrap_or_else(|| default.into())
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// With `ttl` set to `None` the entry never expires. Otherwise it expires
    /// `|ttl|` seconds from now; a `ttl` of zero is rejected.
    ///
    /// ```rust
    /// # use tiramisu::{HeaderTransport, SignedCookieStore, config::StoreConfig};
    /// # let transport = HeaderTransport::new();
    /// # let mut store =
    /// #     SignedCookieStore::new("prefs", "salt", StoreConfig::default(), transport).unwrap();
    /// store
    ///     .set("theme", "dark", None)?
    ///     .set("visits", 3, Some(3600))?;
    /// assert!(store.set("oops", 1, Some(0)).is_err());
    /// # Ok::<(), tiramisu::errors::InvalidArgument>(())
    /// ```
    pub fn set<K, V>(
        &mut self,
        key: K,
        value: V,
        ttl: Option<i64>,
    ) -> Result<&mut Self, InvalidArgument>
    where
        K: Into<String>,
        V: IntoCookieValue,
    {
        let expires_at = self.expiry(ttl)?;
        let (key, entry) = Self::entry(key, value, expires_at)?;
        self.entries.insert(key, entry);
        self.dirty = true;
        Ok(self)
    }

    /// Stores several values at once, all sharing the same `ttl`.
    ///
    /// Every pair is validated before the store is touched: if any of them
    /// is invalid, nothing is stored.
    pub fn set_many<I, K, V>(
        &mut self,
        pairs: I,
        ttl: Option<i64>,
    ) -> Result<&mut Self, InvalidArgument>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoCookieValue,
    {
        let expires_at = self.expiry(ttl)?;
        let entries = pairs
            .into_iter()
            .map(|(key, value)| Self::entry(key, value, expires_at))
            .collect::<Result<Vec<_>, _>>()?;
        self.entries.extend(entries);
        self.dirty = true;
        Ok(self)
    }

    /// Like [`SignedCookieStore::set_many`], for a JSON object built at runtime.
    ///
    /// Anything but an object (e.g. an array, whose keys would be positions)
    /// is rejected.
    pub fn set_many_json(
        &mut self,
        values: serde_json::Value,
        ttl: Option<i64>,
    ) -> Result<&mut Self, InvalidArgument> {
        match values {
            serde_json::Value::Object(map) => self.set_many(map, ttl),
            _ => Err(InvalidArgument::new("Cookie keys can only be strings.")),
        }
    }

    /// Stores `value` under `key` and hands it back.
    pub fn push<K, V>(
        &mut self,
        key: K,
        value: V,
        ttl: Option<i64>,
    ) -> Result<CookieValue, InvalidArgument>
    where
        K: Into<String>,
        V: IntoCookieValue,
    {
        let value = value.into_cookie_value()?;
        self.set(key, value.clone(), ttl)?;
        Ok(value)
    }

    /// A snapshot of every entry that hasn't expired.
    ///
    /// Expired entries are removed.
    pub fn all(&mut self) -> BTreeMap<String, CookieValue> {
        let now = self.now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        if self.entries.len() != before {
            self.dirty = true;
        }
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect()
    }

    /// Removes the given keys. Missing keys are ignored.
    pub fn remove<I, K>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.entries.remove(key.as_ref());
        }
        self.dirty = true;
        self
    }

    /// Removes every entry.
    ///
    /// The cookie is kept on the client, it'll just be empty after the next flush.
    /// Use [`SignedCookieStore::destroy`] to delete it.
    pub fn clear(&mut self) -> bool {
        self.entries.clear();
        self.dirty = true;
        true
    }

    /// Asks the client to delete the cookie right away.
    ///
    /// If the transport accepts the removal, the store is emptied and
    /// there is nothing left to flush.
    /// Returns whether the transport accepted the removal.
    pub fn destroy(&mut self) -> bool {
        let mut removal = RemovalCookie::new(self.name.clone());
        if let Some(path) = self.config.effective_path() {
            removal = removal.set_path(path.to_owned());
        }
        if let Some(domain) = self.config.effective_domain() {
            removal = removal.set_domain(domain.to_owned());
        }
        let removed = self.transport.expire_cookie(removal);
        if removed {
            self.entries.clear();
            self.dirty = false;
            tracing::debug!(cookie = %self.name, "Cookie store destroyed");
        } else {
            tracing::debug!(cookie = %self.name, "The transport refused to expire the cookie");
        }
        removed
    }

    /// Sends the entries to the client, if they changed since the last flush.
    ///
    /// Returns `true` if there was nothing to send, otherwise whether the
    /// transport accepted the cookie.
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return true;
        }
        self.dirty = false;

        let now = self.now();
        let value = match codec::encode(&self.entries, &self.key, &self.name, now) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    cookie = %self.name,
                    error = %format!("{e:#}"),
                    "Failed to encode the cookie store"
                );
                return false;
            }
        };

        let expires =
            OffsetDateTime::from_unix_timestamp(now.saturating_add(i64::from(self.config.ttl)))
                .ok();
        // Left unset when `secure` is off, so that `SameSite=None` still gets `Secure`.
        let mut cookie = ResponseCookie::new(self.name.clone(), value)
            .set_expires(expires)
            .set_secure(self.config.secure.then_some(true))
            .set_http_only(self.config.http_only)
            .set_same_site(self.config.same_site);
        if let Some(path) = self.config.effective_path() {
            cookie = cookie.set_path(path.to_owned());
        }
        if let Some(domain) = self.config.effective_domain() {
            cookie = cookie.set_domain(domain.to_owned());
        }

        let written = self.transport.write_cookie(cookie);
        tracing::debug!(cookie = %self.name, written, "Flushed the cookie store");
        written
    }

    /// Flushes the store and consumes it.
    ///
    /// Dropping the store flushes it as well, but the outcome is lost:
    /// use this method if you need to know whether the cookie was sent.
    pub fn finish(mut self) -> bool {
        self.flush()
    }
}

impl<T: Transport> Drop for SignedCookieStore<T> {
    fn drop(&mut self) {
        if self.dirty && !self.flush() {
            tracing::warn!(
                cookie = %self.name,
                "Failed to send the cookie store when it went out of scope"
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
/// The error returned when a [`SignedCookieStore`] is misused: an empty name or
/// salt, an empty key, a value that isn't a string, boolean or number,
/// or a zero `ttl`.
pub struct InvalidArgument {
    message: Cow<'static, str>,
}

impl InvalidArgument {
    pub(crate) fn new<M: Into<Cow<'static, str>>>(message: M) -> Self {
        InvalidArgument {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
