use crate::Salt;
use anyhow::Context;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;

const SIGNING_KEY_LEN: usize = 32;
const KEY_DERIVATION_INFO: &[u8] = b"tiramisu:store-signing";

/// The HMAC-SHA256 key used to sign the store's payload.
///
/// It's derived from a [`Salt`] of arbitrary length using HKDF-SHA256.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct SigningKey([u8; SIGNING_KEY_LEN]);

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey").finish()
    }
}

impl SigningKey {
    pub(crate) fn derive(salt: &Salt) -> Self {
        let hk = Hkdf::<Sha256>::new(None, salt.expose_secret().as_bytes());
        let mut key = [0u8; SIGNING_KEY_LEN];
        hk.expand(KEY_DERIVATION_INFO, &mut key)
            .expect("32 bytes is a valid HKDF-SHA256 output length");
        SigningKey(key)
    }

    fn mac(&self, name: &str, payload: &str) -> Hmac<Sha256> {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.0).expect("HMAC accepts keys of any length");
        // The cookie name is part of the signed message, so a payload can't be
        // moved to a differently named store sharing the same salt.
        // Length-prefixed: the boundary between name and payload is unambiguous.
        mac.update(&(name.len() as u64).to_be_bytes());
        mac.update(name.as_bytes());
        mac.update(payload.as_bytes());
        mac
    }

    /// Computes the signature of `payload`, base64-encoded (URL-safe, no padding).
    pub(crate) fn sign(&self, name: &str, payload: &str) -> String {
        let tag = self.mac(name, payload).finalize().into_bytes();
        BASE64_URL_SAFE_NO_PAD.encode(tag)
    }

    /// Checks, in constant time, that `signature` was produced by [`SigningKey::sign`]
    /// for the same name and payload.
    pub(crate) fn verify(
        &self,
        name: &str,
        payload: &str,
        signature: &str,
    ) -> Result<(), anyhow::Error> {
        let digest = BASE64_URL_SAFE_NO_PAD
            .decode(signature)
            .context("Failed to decode the signature using base64 (URL-safe, no padding)")?;
        self.mac(name, payload)
            .verify_slice(&digest)
            .context("Failed to verify the payload using HMAC")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SigningKey;
    use crate::Salt;

    fn key(salt: &str) -> SigningKey {
        SigningKey::derive(&Salt::new(salt).unwrap())
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(key("salt"), key("salt"));
        assert_ne!(key("salt"), key("pepper"));
    }

    #[test]
    fn roundtrip() {
        let key = key("salt");
        let signature = key.sign("prefs", "{}");
        assert!(key.verify("prefs", "{}", &signature).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let key = key("salt");
        let signature = key.sign("prefs", r#"{"admin":false}"#);
        let err = key
            .verify("prefs", r#"{"admin":true}"#, &signature)
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to verify the payload using HMAC");
    }

    #[test]
    fn signature_is_bound_to_name_and_key() {
        let signature = key("salt").sign("prefs", "{}");
        assert!(key("salt").verify("cart", "{}", &signature).is_err());
        assert!(key("pepper").verify("prefs", "{}", &signature).is_err());
    }

    #[test]
    fn name_and_payload_boundary_is_unambiguous() {
        let key = key("salt");
        let signature = key.sign("prefs", "x{}");
        assert!(key.verify("prefsx", "{}", &signature).is_err());
        assert!(key.verify("pref", "sx{}", &signature).is_err());
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let err = key("salt").verify("prefs", "{}", "not base64!").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to decode the signature using base64 (URL-safe, no padding)"
        );
        assert!(key("salt").verify("prefs", "{}", "").is_err());
    }
}
