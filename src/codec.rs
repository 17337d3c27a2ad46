//! The format of the cookie value written by a [`SignedCookieStore`].
//!
//! ```text
//! cookie    = base64url( json({ "cookies": <payload>, "signature": <signature> }) )
//! signature = base64url( hmac(u64_be(len(name)) || name || payload) )
//! payload   = json({ "<key>": { "value": <value>, "ttl": <unix seconds, or null> }, ... })
//! ```
//!
//! Changing this format invalidates every cookie issued before the change:
//! they will fail to decode and be replaced on the next flush.
//!
//! [`SignedCookieStore`]: crate::SignedCookieStore
use crate::crypto::signing::SigningKey;
use crate::CookieValue;
use anyhow::Context;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use std::collections::BTreeMap;

/// A value held by the store, along with its expiry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub(crate) struct Entry {
    pub(crate) value: CookieValue,
    /// Unix timestamp, in seconds. `None` means the entry never expires.
    #[serde(rename = "ttl")]
    pub(crate) expires_at: Option<i64>,
}

impl Entry {
    pub(crate) fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }
}

pub(crate) type Entries = BTreeMap<String, Entry>;

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope<'a> {
    #[serde(borrow)]
    cookies: std::borrow::Cow<'a, str>,
    #[serde(borrow)]
    signature: std::borrow::Cow<'a, str>,
}

/// Serializes and signs the entries that haven't expired yet.
pub(crate) fn encode(
    entries: &Entries,
    key: &SigningKey,
    name: &str,
    now: i64,
) -> Result<String, anyhow::Error> {
    let live: BTreeMap<&str, &Entry> = entries
        .iter()
        .filter(|(_, entry)| !entry.is_expired(now))
        .map(|(key, entry)| (key.as_str(), entry))
        .collect();
    let payload = serde_json::to_string(&live).context("Failed to serialize the store entries")?;
    let signature = key.sign(name, &payload);
    let envelope = serde_json::to_vec(&Envelope {
        cookies: payload.into(),
        signature: signature.into(),
    })
    .context("Failed to serialize the signed envelope")?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(envelope))
}

/// Verifies and deserializes a cookie value produced by [`encode`].
pub(crate) fn decode(raw: &str, key: &SigningKey, name: &str) -> Result<Entries, DecodeError> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(raw.trim())
        .map_err(|e| DecodeError::Base64(e.into()))?;
    let envelope: Envelope<'_> =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Envelope(e.into()))?;
    key.verify(name, &envelope.cookies, &envelope.signature)
        .map_err(DecodeError::Signature)?;
    let entries: Entries =
        serde_json::from_str(&envelope.cookies).map_err(|e| DecodeError::Payload(e.into()))?;
    if entries.keys().any(|k| k.is_empty()) {
        return Err(DecodeError::Payload(anyhow::anyhow!(
            "The payload contains an entry with an empty key"
        )));
    }
    Ok(entries)
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The reasons why an incoming cookie was discarded.
///
/// The store never surfaces this error: a cookie that can't be decoded is
/// treated as empty. It's reported in the logs at `DEBUG` level.
pub enum DecodeError {
    #[error("The cookie value is not valid base64 (URL-safe, no padding)")]
    Base64(#[source] anyhow::Error),
    #[error("The cookie value is not a signed envelope")]
    Envelope(#[source] anyhow::Error),
    #[error("The cookie signature doesn't match its content")]
    Signature(#[source] anyhow::Error),
    #[error("The signed payload could not be deserialized")]
    Payload(#[source] anyhow::Error),
}
