//! Many values, one signed HTTP cookie.
//!
//! # Overview
//!
//! `tiramisu` lets a server keep a small set of values on the client, packed
//! into a single cookie.
//!
//! - Each value can be a string, a boolean, an integer or a float, and its type
//!   is preserved across requests
//! - Each value can have its own expiry, independent from the cookie's
//! - The cookie is signed (HMAC-SHA256): values tampered with by the client are discarded
//! - Changes are written back at most once, and only if something changed,
//!   when the store is flushed or goes out of scope
//!
//! `tiramisu` doesn't talk to your HTTP framework directly. It goes through a
//! [`Transport`], which reads the incoming cookie and queues the outgoing one.
//! [`HeaderTransport`] works with raw `Cookie`/`Set-Cookie` header values.
//!
//! # Non-goals
//!
//! Values are signed, **not** encrypted: the client can read them.
//! Don't store secrets in a [`SignedCookieStore`].
//!
//! # Quickstart
//!
//! ```rust
//! use tiramisu::config::StoreConfig;
//! use tiramisu::{CookieValue, HeaderTransport, SignedCookieStore};
//!
//! // First request: no cookie.
//! let mut transport = HeaderTransport::from_request_header("");
//! {
//!     let mut store =
//!         SignedCookieStore::new("prefs", "a secret salt", StoreConfig::default(), &mut transport)
//!             .unwrap();
//!     store
//!         .set("theme", "dark", None)
//!         .unwrap()
//!         // Gone in ten minutes.
//!         .set("flash", "Settings saved!", Some(600))
//!         .unwrap();
//! }
//! let set_cookie = transport.header_values().next().unwrap();
//!
//! // Second request: the browser sends the cookie back.
//! let cookie_header = set_cookie.split(';').next().unwrap();
//! let mut transport = HeaderTransport::from_request_header(cookie_header);
//! let mut store =
//!     SignedCookieStore::new("prefs", "a secret salt", StoreConfig::default(), &mut transport)
//!         .unwrap();
//! assert_eq!(store.get("theme"), Some(CookieValue::from("dark")));
//! // `pull` reads the value and removes it from the store.
//! assert_eq!(store.pull("flash"), Some(CookieValue::from("Settings saved!")));
//! assert_eq!(store.pull("flash"), None);
//! ```
//!
//! ## Credits
//!
//! The cookie types are derived from [`biscotti`](https://crates.io/crates/biscotti),
//! which in turn started as a fork of the [`cookie` crate](https://crates.io/crates/cookie)
//! [Copyright (c) 2017 Sergio Benitez, Copyright (c) 2014 Alex Crichton].

pub mod clock;
mod codec;
pub mod config;
mod crypto;
mod encoding;
mod removal;
mod request_cookies;
mod response_cookie;
mod same_site;
mod store;
mod transport;
mod value;


pub use crate::same_site::*;
pub use crypto::Salt;
pub use removal::RemovalCookie;
pub use request_cookies::RequestCookies;
pub use response_cookie::ResponseCookie;
pub use store::SignedCookieStore;
pub use time;
pub use transport::{HeaderTransport, Transport};
pub use value::{CookieValue, IntoCookieValue};

/// Errors that can occur when using `tiramisu`.
pub mod errors {
    pub use crate::codec::DecodeError;
    pub use crate::same_site::UnknownSameSiteError;
    pub use crate::store::InvalidArgument;
}
